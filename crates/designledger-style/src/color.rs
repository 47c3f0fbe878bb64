use std::fmt;

use crate::StyleError;

/// Brand colours recognised by name in project documents
const NAMED_COLORS: &[(&str, &str)] = &[
    ("blue", "#2563EB"),
    ("indigo", "#4F46E5"),
    ("violet", "#7C3AED"),
    ("purple", "#7C3AED"),
    ("pink", "#DB2777"),
    ("red", "#DC2626"),
    ("orange", "#EA580C"),
    ("amber", "#D97706"),
    ("yellow", "#D97706"),
    ("green", "#16A34A"),
    ("emerald", "#059669"),
    ("teal", "#0D9488"),
    ("cyan", "#0891B2"),
    ("slate", "#475569"),
    ("gray", "#4B5563"),
    ("grey", "#4B5563"),
];

const DARKEN_STEP: f64 = 0.05;
const MAX_DARKEN_STEPS: u32 = 20;

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, StyleError> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || StyleError::InvalidHex(s.to_string());

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// First `#RRGGBB` literal in free text
    pub fn find_hex(text: &str) -> Option<Self> {
        text.match_indices('#').find_map(|(pos, _)| {
            let candidate: String = text[pos + 1..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            if candidate.len() == 6 {
                Self::from_hex(&candidate).ok()
            } else {
                None
            }
        })
    }

    /// First colour word in free text, with the word that matched
    pub fn find_named(text: &str) -> Option<(&'static str, Self)> {
        let lower = text.to_lowercase();
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(|word| {
                NAMED_COLORS
                    .iter()
                    .find(|(name, _)| *name == word)
                    .and_then(|(name, hex)| Self::from_hex(hex).ok().map(|c| (*name, c)))
            })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// WCAG 2.x relative luminance
    pub fn relative_luminance(&self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// WCAG contrast ratio, always >= 1.0
    pub fn contrast_ratio(&self, other: &Rgb) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (light, dark) = if a > b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }

    /// Blend towards `other`; `weight` 0.0 keeps self, 1.0 gives other
    pub fn mix(&self, other: &Rgb, weight: f64) -> Rgb {
        let w = weight.clamp(0.0, 1.0);
        let blend = |a: u8, b: u8| (a as f64 * (1.0 - w) + b as f64 * w).round() as u8;
        Rgb::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }

    /// Darken in fixed steps until the colour reaches `target` contrast on
    /// `background`. Returns the colour and the number of steps taken.
    pub fn darken_to_contrast(&self, background: &Rgb, target: f64) -> (Rgb, u32) {
        (0..=MAX_DARKEN_STEPS)
            .map(|step| (self.mix(&Rgb::BLACK, DARKEN_STEP * step as f64), step))
            .find(|(c, _)| c.contrast_ratio(background) >= target)
            .unwrap_or((Rgb::BLACK, MAX_DARKEN_STEPS))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// `5.17:1`
pub fn format_ratio(ratio: f64) -> String {
    format!("{:.2}:1", ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#2563EB").unwrap(), Rgb::new(0x25, 0x63, 0xEB));
        assert_eq!(Rgb::from_hex("fff").unwrap(), Rgb::WHITE);
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("a nice blue").is_err());
    }

    #[test]
    fn test_to_hex_is_uppercase() {
        assert_eq!(Rgb::from_hex("#2563eb").unwrap().to_hex(), "#2563EB");
    }

    #[test]
    fn test_contrast_extremes() {
        let ratio = Rgb::BLACK.contrast_ratio(&Rgb::WHITE);
        assert!((ratio - 21.0).abs() < 0.001);
        assert!((Rgb::WHITE.contrast_ratio(&Rgb::WHITE) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_brand_blue_contrast_on_white() {
        let blue = Rgb::from_hex("#2563EB").unwrap();
        let ratio = blue.contrast_ratio(&Rgb::WHITE);
        assert!(ratio > 5.1 && ratio < 5.25, "ratio was {}", ratio);
        assert_eq!(format_ratio(ratio), "5.17:1");
    }

    #[test]
    fn test_darken_to_contrast() {
        let amber = Rgb::from_hex("#D97706").unwrap();
        assert!(amber.contrast_ratio(&Rgb::WHITE) < 4.5);

        let (darker, steps) = amber.darken_to_contrast(&Rgb::WHITE, 4.5);
        assert!(steps > 0);
        assert!(darker.contrast_ratio(&Rgb::WHITE) >= 4.5);

        let blue = Rgb::from_hex("#2563EB").unwrap();
        assert_eq!(blue.darken_to_contrast(&Rgb::WHITE, 4.5), (blue, 0));
    }

    #[test]
    fn test_find_hex_and_named() {
        assert_eq!(
            Rgb::find_hex("Brand: #0EA5E9, accents #fff").unwrap().to_hex(),
            "#0EA5E9"
        );
        assert!(Rgb::find_hex("issue #123 mentions nothing").is_none());

        let (name, color) = Rgb::find_named("An e-commerce app, blue brand.").unwrap();
        assert_eq!(name, "blue");
        assert_eq!(color.to_hex(), "#2563EB");

        // Whole words only
        assert!(Rgb::find_named("credit card checkout").is_none());
    }

    #[test]
    fn test_mix() {
        assert_eq!(Rgb::WHITE.mix(&Rgb::BLACK, 0.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.mix(&Rgb::BLACK, 1.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.mix(&Rgb::BLACK, 0.5), Rgb::new(128, 128, 128));
    }
}

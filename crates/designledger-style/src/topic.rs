use serde::{Deserialize, Serialize};
use std::fmt;

use crate::StyleError;

/// Topic areas of the style pass, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicArea {
    Color,
    Typography,
    Spacing,
    Components,
    Borders,
    Icons,
    Motion,
}

impl TopicArea {
    pub const ALL: [TopicArea; 7] = [
        TopicArea::Color,
        TopicArea::Typography,
        TopicArea::Spacing,
        TopicArea::Components,
        TopicArea::Borders,
        TopicArea::Icons,
        TopicArea::Motion,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            TopicArea::Color => "Color",
            TopicArea::Typography => "Typography",
            TopicArea::Spacing => "Spacing",
            TopicArea::Components => "Components",
            TopicArea::Borders => "Borders & Shadows",
            TopicArea::Icons => "Icons",
            TopicArea::Motion => "Motion",
        }
    }

    /// Color, typography and spacing: the areas a quick pass still covers
    pub fn is_core(&self) -> bool {
        matches!(
            self,
            TopicArea::Color | TopicArea::Typography | TopicArea::Spacing
        )
    }

    pub fn section(&self) -> Section {
        match self {
            TopicArea::Color => Section::Colors,
            TopicArea::Typography => Section::Typography,
            TopicArea::Spacing => Section::Spacing,
            TopicArea::Components => Section::Components,
            TopicArea::Borders => Section::BordersShadows,
            TopicArea::Icons => Section::Icons,
            TopicArea::Motion => Section::Motion,
        }
    }

    /// Reason stored in the DEFERRED record for this area
    pub fn deferral_reason(&self) -> String {
        format!("{}: not covered in quick mode", self.title())
    }

    /// Recover the area from a DEFERRED reason (`<Title>: ...`)
    pub fn from_deferral(reason: &str) -> Option<Self> {
        let (title, _) = reason.split_once(':')?;
        let title = title.trim();
        Self::ALL
            .into_iter()
            .find(|area| area.title().eq_ignore_ascii_case(title))
    }
}

impl fmt::Display for TopicArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl std::str::FromStr for TopicArea {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "color" | "colors" | "colour" | "colours" => Ok(TopicArea::Color),
            "typography" | "type" => Ok(TopicArea::Typography),
            "spacing" => Ok(TopicArea::Spacing),
            "components" | "component" => Ok(TopicArea::Components),
            "borders" | "borders_shadows" | "borders_effects" | "effects" => {
                Ok(TopicArea::Borders)
            }
            "icons" | "icon" => Ok(TopicArea::Icons),
            "motion" => Ok(TopicArea::Motion),
            _ => Err(StyleError::UnknownArea(s.to_string())),
        }
    }
}

/// How much of the checklist a run covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Full,
    Quick,
}

impl Mode {
    pub fn covers(&self, area: TopicArea) -> bool {
        match self {
            Mode::Full => true,
            Mode::Quick => area.is_core(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Full => write!(f, "full"),
            Mode::Quick => write!(f, "quick"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Mode::Full),
            "quick" => Ok(Mode::Quick),
            _ => Err(StyleError::UnknownMode(s.to_string())),
        }
    }
}

/// Top-level sections of the style guide, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Colors,
    Typography,
    Spacing,
    Components,
    BordersShadows,
    Icons,
    Motion,
    Rules,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Colors,
        Section::Typography,
        Section::Spacing,
        Section::Components,
        Section::BordersShadows,
        Section::Icons,
        Section::Motion,
        Section::Rules,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            Section::Colors => "Colors",
            Section::Typography => "Typography",
            Section::Spacing => "Spacing",
            Section::Components => "Components",
            Section::BordersShadows => "Borders & Shadows",
            Section::Icons => "Icons",
            Section::Motion => "Motion",
            Section::Rules => "Rules",
        }
    }

    pub fn area(&self) -> Option<TopicArea> {
        TopicArea::ALL.into_iter().find(|a| a.section() == *self)
    }

    /// Pick the section an assertion key belongs to. First match wins, so
    /// `Button radius` lands in Components and `Border color` in Borders.
    pub fn route(key: &str) -> Section {
        const ROUTES: &[(Section, &[&str])] = &[
            (Section::Rules, &["rule", "contrast"]),
            (Section::Icons, &["icon"]),
            (
                Section::Motion,
                &["motion", "duration", "easing", "transition", "animation"],
            ),
            (
                Section::Components,
                &[
                    "component", "button", "input", "card", "modal", "dialog", "badge", "focus",
                ],
            ),
            (Section::BordersShadows, &["border", "radius", "shadow"]),
            (Section::Colors, &["color", "colour"]),
            (
                Section::Typography,
                &["font", "type", "line height", "letter", "heading", "text size"],
            ),
            (
                Section::Spacing,
                &[
                    "spacing", "space", "gutter", "grid", "container", "breakpoint", "padding",
                    "margin", "gap",
                ],
            ),
        ];

        let key = key.to_lowercase();
        ROUTES
            .iter()
            .find(|(_, words)| words.iter().any(|w| key.contains(w)))
            .map(|(section, _)| *section)
            .unwrap_or(Section::Components)
    }
}

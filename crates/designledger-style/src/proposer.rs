//! Derives concrete decisions for each topic area from the run inputs.

use serde::Serialize;

use designledger_ledger::{normalize, Assertion, DecisionRecord, RecordDraft};

use crate::color::format_ratio;
use crate::{FrontendStack, OperatorAnswers, ProductProfile, Rgb, TopicArea};

const AA_CONTRAST: f64 = 4.5;
const AAA_CONTRAST: f64 = 7.0;
const DEFAULT_BRAND: Rgb = Rgb::new(0x25, 0x63, 0xEB);

const TEXT: Rgb = Rgb::new(0x11, 0x18, 0x27);
const MUTED_TEXT: Rgb = Rgb::new(0x4B, 0x55, 0x63);
const SURFACE: Rgb = Rgb::new(0xF9, 0xFA, 0xFB);
const BORDER: Rgb = Rgb::new(0xE5, 0xE7, 0xEB);
const SUCCESS: Rgb = Rgb::new(0x15, 0x80, 0x3D);
const WARNING: Rgb = Rgb::new(0xB4, 0x53, 0x09);
const ERROR: Rgb = Rgb::new(0xB9, 0x1C, 0x1C);

/// Documents a proposal may draw on
#[derive(Debug, Clone, Copy)]
pub struct ProposalInputs<'a> {
    pub project_spec: &'a str,
    pub constraints: Option<&'a str>,
    pub domain_knowledge: Option<&'a str>,
    /// Active records written by upstream stages
    pub upstream: &'a [DecisionRecord],
}

/// Where a proposed value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSource {
    /// Read from or computed from the inputs
    Derived,
    /// Nothing in the inputs; a fixed default was used
    Default,
    Operator,
}

/// A decision ready to be checked and appended
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub area: TopicArea,
    pub assertion: Assertion,
    pub rationale: Option<String>,
    pub source: ProposalSource,
}

impl Proposal {
    fn new(area: TopicArea, key: &str, value: impl Into<String>) -> Self {
        Self {
            area,
            assertion: Assertion::new(key, value),
            rationale: None,
            source: ProposalSource::Derived,
        }
    }

    fn note(mut self, note: impl Into<String>) -> Self {
        self.assertion = self.assertion.with_note(note);
        self
    }

    fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    fn source(mut self, source: ProposalSource) -> Self {
        self.source = source;
        self
    }

    pub fn statement(&self) -> String {
        self.assertion.statement()
    }

    pub fn into_draft(self) -> RecordDraft {
        let draft = RecordDraft::active(self.assertion.statement());
        match self.rationale {
            Some(rationale) => draft.with_rationale(rationale),
            None => draft,
        }
    }
}

#[derive(Debug, Clone)]
struct Brand {
    color: Rgb,
    rationale: String,
    source: ProposalSource,
}

/// Size and density tokens that vary with the product profile
struct Metrics {
    control_height: u32,
    control_padding_x: u32,
    card_padding: u32,
    gutter: u32,
    section: u32,
    container: u32,
    radius: [u32; 3],
    icon_stroke: &'static str,
    spacing_scale: &'static [u32],
}

struct TypeSpec {
    body: &'static str,
    headings: &'static str,
    mono: &'static str,
    base_px: u32,
    ratio: f64,
    body_line_height: &'static str,
}

/// Proposes decisions for each topic area.
pub struct StyleProposer {
    profile: ProductProfile,
    stack: FrontendStack,
    brand: Brand,
    contrast_target: f64,
    reduced_motion: bool,
    answers: OperatorAnswers,
}

impl StyleProposer {
    pub fn new(inputs: &ProposalInputs<'_>, answers: OperatorAnswers) -> Self {
        let constraints = inputs.constraints.unwrap_or_default().to_lowercase();
        let contrast_target = if constraints
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|w| w == "aaa")
        {
            AAA_CONTRAST
        } else {
            AA_CONTRAST
        };
        let reduced_motion = ["no animation", "reduced motion", "no motion"]
            .iter()
            .any(|p| constraints.contains(p));

        let brand = Self::resolve_brand(inputs, &answers, contrast_target);

        Self {
            profile: ProductProfile::detect(inputs.project_spec),
            stack: FrontendStack::detect(inputs.upstream),
            brand,
            contrast_target,
            reduced_motion,
            answers,
        }
    }

    pub fn profile(&self) -> ProductProfile {
        self.profile
    }

    pub fn brand_color(&self) -> Rgb {
        self.brand.color
    }

    pub fn contrast_target(&self) -> f64 {
        self.contrast_target
    }

    /// Proposals for one area, operator answers applied
    pub fn propose(&self, area: TopicArea) -> Vec<Proposal> {
        let mut proposals = match area {
            TopicArea::Color => self.color(),
            TopicArea::Typography => self.typography(),
            TopicArea::Spacing => self.spacing(),
            TopicArea::Components => self.components(),
            TopicArea::Borders => self.borders(),
            TopicArea::Icons => self.icons(),
            TopicArea::Motion => self.motion(),
        };
        self.apply_answers(area, &mut proposals);
        proposals
    }

    fn resolve_brand(inputs: &ProposalInputs<'_>, answers: &OperatorAnswers, target: f64) -> Brand {
        if let Some(color) = answers
            .get(TopicArea::Color, "Primary color")
            .and_then(|v| v.split_whitespace().next())
            .and_then(|v| Rgb::from_hex(v).ok())
        {
            return Brand {
                color,
                rationale: "operator answer".to_string(),
                source: ProposalSource::Operator,
            };
        }

        let sources = [
            ("the project spec", Some(inputs.project_spec)),
            ("domain knowledge", inputs.domain_knowledge),
        ];
        let found = sources.iter().find_map(|(label, text)| {
            let text = (*text)?;
            if let Some(color) = Rgb::find_hex(text) {
                return Some((color, format!("hex value given in {}", label)));
            }
            Rgb::find_named(text)
                .map(|(name, color)| (color, format!("\"{}\" named in {}", name, label)))
        });

        let (color, mut rationale, source) = match found {
            Some((color, rationale)) => (color, rationale, ProposalSource::Derived),
            None => (
                DEFAULT_BRAND,
                "no brand colour in the inputs; default blue".to_string(),
                ProposalSource::Default,
            ),
        };

        let (adjusted, steps) = color.darken_to_contrast(&Rgb::WHITE, target);
        if steps > 0 {
            rationale.push_str(&format!(
                "; darkened from {} to reach {} on white",
                color,
                format_ratio(target)
            ));
        }

        Brand {
            color: adjusted,
            rationale,
            source,
        }
    }

    fn apply_answers(&self, area: TopicArea, proposals: &mut Vec<Proposal>) {
        for (key, value) in self.answers.for_area(area) {
            let mut answer = Proposal::new(area, key, value.clone())
                .rationale("operator answer")
                .source(ProposalSource::Operator);
            if let Some(note) = color_note(key, value) {
                answer = answer.note(note);
            }

            let normalized = normalize(key);
            match proposals
                .iter_mut()
                .find(|p| p.assertion.normalized_key() == normalized)
            {
                Some(existing) => {
                    answer.assertion.key = existing.assertion.key.clone();
                    *existing = answer;
                }
                None => proposals.push(answer),
            }
        }
    }

    fn metrics(&self) -> Metrics {
        const DEFAULT_SCALE: &[u32] = &[0, 4, 8, 12, 16, 24, 32, 48, 64];
        match self.profile {
            ProductProfile::Commerce => Metrics {
                control_height: 44,
                control_padding_x: 16,
                card_padding: 24,
                gutter: 24,
                section: 64,
                container: 1280,
                radius: [4, 8, 12],
                icon_stroke: "1.5px",
                spacing_scale: DEFAULT_SCALE,
            },
            ProductProfile::DataDense => Metrics {
                control_height: 32,
                control_padding_x: 12,
                card_padding: 16,
                gutter: 16,
                section: 32,
                container: 1440,
                radius: [2, 4, 6],
                icon_stroke: "2px",
                spacing_scale: &[0, 2, 4, 8, 12, 16, 24, 32],
            },
            ProductProfile::Editorial => Metrics {
                control_height: 40,
                control_padding_x: 16,
                card_padding: 24,
                gutter: 24,
                section: 96,
                container: 720,
                radius: [2, 4, 8],
                icon_stroke: "1.5px",
                spacing_scale: &[0, 4, 8, 12, 16, 24, 32, 48, 64, 96],
            },
            ProductProfile::General => Metrics {
                control_height: 40,
                control_padding_x: 16,
                card_padding: 24,
                gutter: 24,
                section: 64,
                container: 1280,
                radius: [4, 8, 12],
                icon_stroke: "1.5px",
                spacing_scale: DEFAULT_SCALE,
            },
        }
    }

    fn type_spec(&self) -> TypeSpec {
        match self.profile {
            ProductProfile::DataDense => TypeSpec {
                body: "IBM Plex Sans, system-ui, sans-serif",
                headings: "IBM Plex Sans, system-ui, sans-serif",
                mono: "IBM Plex Mono, ui-monospace, monospace",
                base_px: 14,
                ratio: 1.2,
                body_line_height: "1.4",
            },
            ProductProfile::Editorial => TypeSpec {
                body: "Source Serif 4, Georgia, serif",
                headings: "Inter, system-ui, sans-serif",
                mono: "JetBrains Mono, ui-monospace, monospace",
                base_px: 18,
                ratio: 1.333,
                body_line_height: "1.7",
            },
            ProductProfile::Commerce | ProductProfile::General => TypeSpec {
                body: "Inter, system-ui, sans-serif",
                headings: "Inter, system-ui, sans-serif",
                mono: "JetBrains Mono, ui-monospace, monospace",
                base_px: 16,
                ratio: 1.25,
                body_line_height: "1.5",
            },
        }
    }

    fn color(&self) -> Vec<Proposal> {
        let area = TopicArea::Color;
        let primary = self.brand.color;
        let standard = if self.contrast_target >= AAA_CONTRAST {
            "WCAG AAA"
        } else {
            "WCAG AA"
        };

        vec![
            Proposal::new(area, "Primary color", primary.to_hex())
                .note(on_white(primary))
                .rationale(self.brand.rationale.clone())
                .source(self.brand.source),
            hex_proposal(area, "Primary hover color", primary.mix(&Rgb::BLACK, 0.12)),
            Proposal::new(
                area,
                "Primary subtle color",
                primary.mix(&Rgb::WHITE, 0.9).to_hex(),
            )
            .note("tinted backgrounds only"),
            hex_proposal(area, "Text color", TEXT),
            hex_proposal(area, "Muted text color", MUTED_TEXT),
            Proposal::new(area, "Background color", Rgb::WHITE.to_hex()),
            Proposal::new(area, "Surface color", SURFACE.to_hex()),
            hex_proposal(area, "Success color", SUCCESS),
            hex_proposal(area, "Warning color", WARNING),
            hex_proposal(area, "Error color", ERROR),
            Proposal::new(area, "Minimum text contrast", format_ratio(self.contrast_target))
                .note(standard),
        ]
    }

    fn typography(&self) -> Vec<Proposal> {
        let area = TopicArea::Typography;
        let spec = self.type_spec();

        const STEPS: [(&str, i32); 7] = [
            ("sm", -1),
            ("base", 0),
            ("lg", 1),
            ("xl", 2),
            ("2xl", 3),
            ("3xl", 4),
            ("4xl", 5),
        ];
        let scale = STEPS
            .iter()
            .map(|(label, exp)| {
                let px = (spec.base_px as f64 * spec.ratio.powi(*exp)).round() as u32;
                format!("{} {}px", label, px)
            })
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            Proposal::new(area, "Font family (body)", spec.body)
                .rationale(format!("{} product profile", self.profile.label())),
            Proposal::new(area, "Font family (headings)", spec.headings),
            Proposal::new(area, "Font family (mono)", spec.mono),
            Proposal::new(area, "Base font size", format!("{}px", spec.base_px)),
            Proposal::new(area, "Type scale", scale).note(format!("ratio {}", spec.ratio)),
            Proposal::new(area, "Line height (body)", spec.body_line_height),
            Proposal::new(area, "Line height (headings)", "1.2"),
            Proposal::new(
                area,
                "Font weights",
                "400 regular, 500 medium, 600 semibold, 700 bold",
            ),
        ]
    }

    fn spacing(&self) -> Vec<Proposal> {
        let area = TopicArea::Spacing;
        let m = self.metrics();

        let mut unit = Proposal::new(area, "Spacing unit", "4px");
        if self.stack.tailwind {
            unit = unit.note("matches Tailwind spacing (1 = 4px)");
        }

        let scale = m
            .spacing_scale
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            unit,
            Proposal::new(area, "Spacing scale", format!("{}px", scale)),
            Proposal::new(area, "Container max width", format!("{}px", m.container)),
            Proposal::new(area, "Grid gutter", format!("{}px", m.gutter)),
            Proposal::new(area, "Section spacing", format!("{}px", m.section)),
            Proposal::new(area, "Breakpoints", "sm 640px, md 768px, lg 1024px, xl 1280px"),
        ]
    }

    fn components(&self) -> Vec<Proposal> {
        let area = TopicArea::Components;
        let m = self.metrics();

        let library = match self.stack.component_library {
            Some(ref upstream) => Proposal::new(area, "Component library", upstream.name.clone())
                .rationale(format!("reused from {}", upstream.id)),
            None if self.stack.framework.is_some() => Proposal::new(
                area,
                "Component library",
                self.stack.default_component_library(),
            )
            .rationale("default for the upstream frontend stack"),
            None => Proposal::new(
                area,
                "Component library",
                self.stack.default_component_library(),
            )
            .rationale("no upstream frontend decision")
            .source(ProposalSource::Default),
        };

        vec![
            library,
            Proposal::new(area, "Button height", format!("{}px", m.control_height)),
            Proposal::new(area, "Button padding", format!("0 {}px", m.control_padding_x)),
            Proposal::new(area, "Button radius", format!("{}px", m.radius[1])),
            Proposal::new(area, "Input height", format!("{}px", m.control_height)),
            Proposal::new(area, "Card padding", format!("{}px", m.card_padding)),
            Proposal::new(
                area,
                "Focus ring",
                format!("2px solid {}, 2px offset", self.brand.color),
            ),
        ]
    }

    fn borders(&self) -> Vec<Proposal> {
        let area = TopicArea::Borders;
        let [sm, md, lg] = self.metrics().radius;

        vec![
            Proposal::new(area, "Border width", "1px"),
            Proposal::new(area, "Border color", BORDER.to_hex()),
            Proposal::new(area, "Border radius (sm)", format!("{}px", sm)),
            Proposal::new(area, "Border radius (md)", format!("{}px", md)),
            Proposal::new(area, "Border radius (lg)", format!("{}px", lg)),
            Proposal::new(area, "Border radius (full)", "9999px"),
            Proposal::new(area, "Shadow (sm)", "0 1px 2px rgba(0, 0, 0, 0.05)"),
            Proposal::new(area, "Shadow (md)", "0 4px 6px -1px rgba(0, 0, 0, 0.1)"),
            Proposal::new(area, "Shadow (lg)", "0 10px 15px -3px rgba(0, 0, 0, 0.1)"),
        ]
    }

    fn icons(&self) -> Vec<Proposal> {
        let area = TopicArea::Icons;
        vec![
            Proposal::new(area, "Icon library", self.stack.icon_package()),
            Proposal::new(area, "Icon sizes", "16px, 20px, 24px"),
            Proposal::new(area, "Icon stroke width", self.metrics().icon_stroke),
        ]
    }

    fn motion(&self) -> Vec<Proposal> {
        let area = TopicArea::Motion;
        let durations = if self.reduced_motion {
            [0, 0, 0]
        } else {
            [150, 200, 300]
        };

        let mut proposals: Vec<Proposal> = ["fast", "base", "slow"]
            .into_iter()
            .zip(durations)
            .map(|(label, ms)| {
                let key = format!("Motion duration ({})", label);
                Proposal::new(area, &key, format!("{}ms", ms))
            })
            .collect();
        if self.reduced_motion {
            proposals[0] = proposals[0]
                .clone()
                .rationale("constraints rule out animation");
        }

        proposals.push(Proposal::new(area, "Motion easing", "cubic-bezier(0.4, 0, 0.2, 1)"));
        proposals.push(Proposal::new(
            area,
            "Reduced motion",
            "disable non-essential transitions under prefers-reduced-motion",
        ));
        proposals
    }
}

fn on_white(color: Rgb) -> String {
    format!("{} on white", format_ratio(color.contrast_ratio(&Rgb::WHITE)))
}

fn hex_proposal(area: TopicArea, key: &str, color: Rgb) -> Proposal {
    Proposal::new(area, key, color.to_hex()).note(on_white(color))
}

/// Contrast note for colour answers given as hex
fn color_note(key: &str, value: &str) -> Option<String> {
    let key = key.to_lowercase();
    if !(key.contains("color") || key.contains("colour")) {
        return None;
    }
    let first = value.split_whitespace().next()?;
    Rgb::from_hex(first).ok().map(on_white)
}

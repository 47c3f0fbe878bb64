use serde::Serialize;

use designledger_ledger::{normalize, DecisionId, DecisionRecord};

/// Kind of product, inferred from the project specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductProfile {
    Commerce,
    DataDense,
    Editorial,
    General,
}

impl ProductProfile {
    pub fn detect(project_spec: &str) -> Self {
        const KEYWORDS: &[(ProductProfile, &[&str])] = &[
            (
                ProductProfile::Commerce,
                &[
                    "e-commerce", "ecommerce", "shop", "store", "checkout", "cart",
                    "marketplace", "retail",
                ],
            ),
            (
                ProductProfile::DataDense,
                &[
                    "dashboard", "admin", "analytics", "internal tool", "back office",
                    "monitoring",
                ],
            ),
            (
                ProductProfile::Editorial,
                &["blog", "magazine", "news", "documentation", "docs site", "publication"],
            ),
        ];

        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| contains_word(project_spec, w)))
            .map(|(profile, _)| *profile)
            .unwrap_or(ProductProfile::General)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductProfile::Commerce => "commerce",
            ProductProfile::DataDense => "data-dense",
            ProductProfile::Editorial => "editorial",
            ProductProfile::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    React,
    Vue,
    Svelte,
    Angular,
}

impl Framework {
    fn detect(text: &str) -> Option<Self> {
        const KEYWORDS: &[(Framework, &[&str])] = &[
            (Framework::React, &["react", "next.js", "nextjs", "remix"]),
            (Framework::Vue, &["vue", "nuxt"]),
            (Framework::Svelte, &["svelte"]),
            (Framework::Angular, &["angular"]),
        ];
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| contains_word(text, w)))
            .map(|(fw, _)| *fw)
    }

    /// Lucide package for the framework
    pub fn icon_package(&self) -> &'static str {
        match self {
            Framework::React => "lucide-react",
            Framework::Vue => "lucide-vue-next",
            Framework::Svelte => "lucide-svelte",
            Framework::Angular => "lucide-angular",
        }
    }
}

/// Component libraries recognised in free-text upstream decisions
const COMPONENT_LIBRARIES: &[(&str, &str)] = &[
    ("shadcn", "shadcn/ui"),
    ("material ui", "MUI"),
    ("mui", "MUI"),
    ("chakra", "Chakra UI"),
    ("radix", "Radix UI"),
    ("ant design", "Ant Design"),
    ("headless ui", "Headless UI"),
    ("vuetify", "Vuetify"),
    ("angular material", "Angular Material"),
];

/// Component library chosen upstream, with the record that chose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamLibrary {
    pub id: DecisionId,
    pub name: String,
}

/// Frontend choices made by upstream stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendStack {
    pub framework: Option<Framework>,
    pub tailwind: bool,
    pub component_library: Option<UpstreamLibrary>,
}

impl FrontendStack {
    /// Scan active upstream records. Later records win.
    pub fn detect(records: &[DecisionRecord]) -> Self {
        let mut stack = FrontendStack::default();

        for record in records.iter().filter(|r| r.is_active()) {
            let text = record.statement.to_lowercase();

            if let Some(fw) = Framework::detect(&text) {
                stack.framework = Some(fw);
            }
            if text.contains("tailwind") {
                stack.tailwind = true;
            }

            let explicit = record
                .assertion()
                .filter(|a| a.normalized_key() == "component library")
                .map(|a| a.value);
            let mentioned = || {
                COMPONENT_LIBRARIES
                    .iter()
                    .find(|(needle, _)| contains_word(&text, needle))
                    .map(|(_, name)| name.to_string())
            };
            if let Some(name) = explicit.or_else(mentioned) {
                stack.component_library = Some(UpstreamLibrary {
                    id: record.id.clone(),
                    name,
                });
            }
        }

        stack
    }

    /// Library to use when no upstream stage picked one
    pub fn default_component_library(&self) -> &'static str {
        match (self.framework, self.tailwind) {
            (Some(Framework::React), true) => "shadcn/ui",
            (Some(Framework::React), false) => "Radix UI",
            (Some(Framework::Vue), _) => "Headless UI",
            (Some(Framework::Svelte), _) => "Bits UI",
            (Some(Framework::Angular), _) => "Angular CDK",
            (None, _) => "Native HTML elements",
        }
    }

    pub fn icon_package(&self) -> &'static str {
        self.framework
            .map(|fw| fw.icon_package())
            .unwrap_or("Lucide SVG sprite")
    }
}

/// Whole-word match, ignoring case and punctuation. A trailing plural `s`
/// on the text side still matches.
fn contains_word(text: &str, needle: &str) -> bool {
    let padded = format!(" {} ", words(text));
    let needle = words(needle);
    padded.contains(&format!(" {} ", needle)) || padded.contains(&format!(" {}s ", needle))
}

fn words(s: &str) -> String {
    normalize(&s.replace(|c: char| !c.is_alphanumeric(), " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(lines: &[&str]) -> Vec<DecisionRecord> {
        lines
            .iter()
            .map(|l| DecisionRecord::parse_line(l).unwrap())
            .collect()
    }

    #[test]
    fn test_detect_profile() {
        assert_eq!(
            ProductProfile::detect("E-commerce app, blue brand"),
            ProductProfile::Commerce
        );
        assert_eq!(
            ProductProfile::detect("Internal analytics dashboard"),
            ProductProfile::DataDense
        );
        assert_eq!(
            ProductProfile::detect("A personal blog"),
            ProductProfile::Editorial
        );
        assert_eq!(
            ProductProfile::detect("A todo list"),
            ProductProfile::General
        );
        assert_eq!(
            ProductProfile::detect("Marketplace for used bikes"),
            ProductProfile::Commerce
        );
        assert_eq!(
            ProductProfile::detect("Compare online shops"),
            ProductProfile::Commerce
        );
    }

    #[test]
    fn test_profile_keywords_match_whole_words() {
        for spec in [
            "Backup tool to restore snapshots",
            "Cartography viewer for survey maps",
            "Newsletter signup form",
        ] {
            assert_eq!(ProductProfile::detect(spec), ProductProfile::General, "{}", spec);
        }
    }

    #[test]
    fn test_detect_stack_from_free_text() {
        let stack = FrontendStack::detect(&records(&["FRONT-01: React + Tailwind"]));
        assert_eq!(stack.framework, Some(Framework::React));
        assert!(stack.tailwind);
        assert!(stack.component_library.is_none());
        assert_eq!(stack.default_component_library(), "shadcn/ui");
        assert_eq!(stack.icon_package(), "lucide-react");
    }

    #[test]
    fn test_framework_keywords_match_whole_words() {
        let stack = FrontendStack::detect(&records(&[
            "FRONT-01: React + Tailwind",
            "FRONT-02: Product cards use rectangular thumbnails",
            "FRONT-03: Weekly revue page is remixed from the old site",
        ]));
        assert_eq!(stack.framework, Some(Framework::React));
        assert_eq!(stack.icon_package(), "lucide-react");
        assert_eq!(stack.default_component_library(), "shadcn/ui");

        let stack = FrontendStack::detect(&records(&["FRONT-01: Next.js app router"]));
        assert_eq!(stack.framework, Some(Framework::React));
    }

    #[test]
    fn test_explicit_library_assertion() {
        let stack = FrontendStack::detect(&records(&[
            "FRONT-01: Vue 3 with Vite",
            "FRONT-02: component library = Vuetify",
        ]));
        let library = stack.component_library.unwrap();
        assert_eq!(library.name, "Vuetify");
        assert_eq!(library.id.to_string(), "FRONT-02");
    }

    #[test]
    fn test_library_mentioned_in_prose() {
        let stack = FrontendStack::detect(&records(&["FRONT-03: Use Chakra for components"]));
        assert_eq!(stack.component_library.unwrap().name, "Chakra UI");

        // "mui" must be a whole word
        let stack = FrontendStack::detect(&records(&["FRONT-04: community forum"]));
        assert!(stack.component_library.is_none());
    }
}

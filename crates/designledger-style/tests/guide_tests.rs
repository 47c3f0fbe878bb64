use designledger_ledger::{parse_ledger, DecisionId, DecisionRecord};
use designledger_style::{
    project_title, render_style_guide, GuideSnapshot, OperatorAnswers, ProposalInputs, Section,
    StyleProposer, TopicArea,
};

/// Number proposals the way the ledger would and render the result
fn render_full_pass(spec: &str, upstream_text: &str) -> String {
    let upstream = parse_ledger(upstream_text).records;
    let proposer = StyleProposer::new(
        &ProposalInputs {
            project_spec: spec,
            constraints: None,
            domain_knowledge: None,
            upstream: &upstream,
        },
        OperatorAnswers::new(),
    );

    let mut records: Vec<DecisionRecord> = upstream.clone();
    let mut seq = 0;
    for area in TopicArea::ALL {
        for proposal in proposer.propose(area) {
            seq += 1;
            let id = DecisionId::new("STYLE", seq).unwrap();
            records.push(proposal.into_draft().into_record(id));
        }
    }

    let title = project_title(spec);
    let prefixes = vec!["FRONT".to_string()];
    render_style_guide(&GuideSnapshot {
        title: &title,
        ledger_name: "decisions.md",
        prefix: "STYLE",
        upstream_prefixes: &prefixes,
        records: &records,
    })
}

fn section_body<'a>(guide: &'a str, section: Section) -> &'a str {
    let heading = format!("## {}\n", section.heading());
    let start = guide.find(&heading).unwrap() + heading.len();
    let rest = &guide[start..];
    let end = rest.find("\n## ").unwrap_or(rest.len());
    &rest[..end]
}

#[test]
fn test_full_pass_fills_every_section() {
    let guide = render_full_pass("e-commerce app, blue brand", "FRONT-01: React + Tailwind\n");

    assert!(guide.starts_with("# Style Guide: e-commerce app, blue brand\n"));
    for section in Section::ALL {
        let body = section_body(&guide, section);
        assert!(!body.trim().is_empty(), "{} is empty", section.heading());
        assert!(
            !body.contains("No decisions recorded"),
            "{} has no decisions",
            section.heading()
        );
    }

    assert!(guide.contains("| Primary color | `#2563EB` | 5.17:1 on white | STYLE-01 |"));
    assert!(section_body(&guide, Section::Components).contains("`shadcn/ui`"));
    assert!(section_body(&guide, Section::Icons).contains("`lucide-react`"));
    assert!(section_body(&guide, Section::Rules).contains("Minimum text contrast"));
}

#[test]
fn test_full_pass_is_repeatable() {
    let a = render_full_pass("Analytics dashboard in #0EA5E9", "FRONT-01: Vue 3\n");
    let b = render_full_pass("Analytics dashboard in #0EA5E9", "FRONT-01: Vue 3\n");
    assert_eq!(a, b);
    assert!(a.contains("`lucide-vue-next`"));
}

use std::collections::BTreeMap;

use designledger_ledger::normalize;

use crate::{Rgb, StyleError, TopicArea};

/// Words that mark a value as a placeholder rather than a decision
const VAGUE_WORDS: &[&str] = &[
    "nice", "good", "appropriate", "some", "tbd", "todo", "etc", "something", "maybe",
    "reasonable", "modern", "clean", "pleasant", "whatever", "decent",
];

/// Key fragments whose values must contain a number
const NUMERIC_KEYS: &[&str] = &[
    "size", "height", "width", "spacing", "unit", "radius", "duration", "gutter", "padding",
    "scale",
];

/// Values supplied by the operator, keyed by topic area.
///
/// An answer replaces the proposal with the same key; unknown keys become
/// extra decisions for that area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorAnswers {
    by_area: BTreeMap<TopicArea, Vec<(String, String)>>,
}

impl OperatorAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, area: TopicArea, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().trim().to_string();
        let value = value.into().trim().to_string();
        let entries = self.by_area.entry(area).or_default();
        match entries
            .iter_mut()
            .find(|(k, _)| normalize(k) == normalize(&key))
        {
            Some(existing) => existing.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn with(mut self, area: TopicArea, key: &str, value: &str) -> Self {
        self.insert(area, key, value);
        self
    }

    pub fn for_area(&self, area: TopicArea) -> &[(String, String)] {
        self.by_area.get(&area).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, area: TopicArea, key: &str) -> Option<&str> {
        let key = normalize(key);
        self.for_area(area)
            .iter()
            .find(|(k, _)| normalize(k) == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.by_area.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.by_area.values().map(Vec::len).sum()
    }

    /// Check every answer before anything is written
    pub fn validate(&self) -> Result<(), StyleError> {
        self.by_area
            .values()
            .flatten()
            .try_for_each(|(key, value)| check_concrete(key, value))
    }
}

/// Reject placeholder values ("a nice blue") in favour of literal ones
/// ("#2563EB").
pub fn check_concrete(key: &str, value: &str) -> Result<(), StyleError> {
    let not_concrete = |reason: &str| StyleError::NotConcrete {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let value_lower = value.to_lowercase();
    if value_lower.trim().is_empty() {
        return Err(not_concrete("value is empty"));
    }

    let vague = value_lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find(|w| VAGUE_WORDS.contains(w));
    if let Some(word) = vague {
        return Err(not_concrete(&format!("\"{}\" is not a concrete value", word)));
    }

    let key_lower = key.to_lowercase();
    let is_color = (key_lower.contains("color") || key_lower.contains("colour"))
        && !key_lower.contains("library");
    if is_color {
        let first = value.split_whitespace().next().unwrap_or_default();
        Rgb::from_hex(first)
            .map_err(|_| not_concrete("colours must start with a hex value such as #2563EB"))?;
        return Ok(());
    }

    let numeric = NUMERIC_KEYS.iter().any(|k| key_lower.contains(k));
    if numeric && !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(not_concrete("expected a literal size or duration"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vague_color_rejected() {
        let err = check_concrete("Primary color", "a nice blue").unwrap_err();
        assert!(matches!(err, StyleError::NotConcrete { .. }));
        assert!(check_concrete("Primary color", "blue").is_err());
        assert!(check_concrete("Primary color", "#2563EB").is_ok());
    }

    #[test]
    fn test_numeric_keys_need_digits() {
        assert!(check_concrete("Base font size", "medium").is_err());
        assert!(check_concrete("Base font size", "16px").is_ok());
        assert!(check_concrete("Motion duration (fast)", "150ms").is_ok());
        assert!(check_concrete("Component library", "Chakra UI").is_ok());
    }

    #[test]
    fn test_empty_value_rejected() {
        assert!(check_concrete("Icon library", "  ").is_err());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let answers = OperatorAnswers::new()
            .with(TopicArea::Color, "Primary color", "#111111")
            .with(TopicArea::Color, "primary  COLOR", "#222222");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get(TopicArea::Color, "Primary color"), Some("#222222"));
        assert!(answers.get(TopicArea::Spacing, "Primary color").is_none());
    }

    #[test]
    fn test_validate_reports_first_bad_answer() {
        let answers = OperatorAnswers::new()
            .with(TopicArea::Spacing, "Spacing unit", "4px")
            .with(TopicArea::Motion, "Motion easing", "something smooth");
        let err = answers.validate().unwrap_err();
        assert!(err.to_string().contains("Motion easing"));
    }
}

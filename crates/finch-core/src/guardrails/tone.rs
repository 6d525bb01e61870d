//! Tone validation for dynamically generated text
//!
//! Case-insensitive substring screen against five categorized phrase lists.
//! Any hit is a violation; shaming and judgmental phrases are high
//! severity. Pre-authored catalog copy is vetted editorially and is not
//! re-screened at request time - this gate exists for text produced at
//! runtime (AI-augmented rationales).

use serde::{Deserialize, Serialize};

/// Violation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneCategory {
    Shaming,
    Judgmental,
    NegativeFraming,
    Comparison,
    Pressure,
}

impl ToneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shaming => "shaming",
            Self::Judgmental => "judgmental",
            Self::NegativeFraming => "negative_framing",
            Self::Comparison => "comparison",
            Self::Pressure => "pressure",
        }
    }

    pub fn severity(&self) -> ToneSeverity {
        match self {
            Self::Shaming | Self::Judgmental => ToneSeverity::High,
            _ => ToneSeverity::Medium,
        }
    }
}

impl std::fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Violation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneSeverity {
    High,
    Medium,
}

const SHAMING_PHRASES: &[&str] = &[
    "shame on",
    "you should be ashamed",
    "embarrassing",
    "disgraceful",
    "reckless spending",
    "wasteful habits",
];

const JUDGMENTAL_PHRASES: &[&str] = &[
    "bad with money",
    "irresponsible",
    "careless",
    "foolish",
    "poor choices",
    "your own fault",
];

const NEGATIVE_FRAMING_PHRASES: &[&str] = &[
    "you failed",
    "you can't afford",
    "hopeless",
    "never be able to",
    "drowning in debt",
    "out of control",
];

const COMPARISON_PHRASES: &[&str] = &[
    "everyone else",
    "most people your age",
    "better than you",
    "falling behind your peers",
    "compared to others",
];

const PRESSURE_PHRASES: &[&str] = &[
    "act now",
    "don't miss out",
    "limited time only",
    "last chance",
    "before it's too late",
    "you must immediately",
];

const PHRASE_LISTS: &[(ToneCategory, &[&str])] = &[
    (ToneCategory::Shaming, SHAMING_PHRASES),
    (ToneCategory::Judgmental, JUDGMENTAL_PHRASES),
    (ToneCategory::NegativeFraming, NEGATIVE_FRAMING_PHRASES),
    (ToneCategory::Comparison, COMPARISON_PHRASES),
    (ToneCategory::Pressure, PRESSURE_PHRASES),
];

/// One flagged phrase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneViolation {
    pub phrase: String,
    pub category: ToneCategory,
    pub severity: ToneSeverity,
    /// Which input field contained the phrase
    pub field: String,
}

/// Validation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneReport {
    pub is_valid: bool,
    pub violations: Vec<ToneViolation>,
}

/// Text fields to screen
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFields<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub rationale: Option<&'a str>,
}

/// Screen every provided field against every phrase list
pub fn validate_content(fields: &ContentFields<'_>) -> ToneReport {
    let mut violations = Vec::new();

    let named_fields = [
        ("title", fields.title),
        ("description", fields.description),
        ("rationale", fields.rationale),
    ];

    for (field_name, text) in named_fields {
        let Some(text) = text else { continue };
        let lowered = text.to_lowercase();
        for (category, phrases) in PHRASE_LISTS {
            for phrase in *phrases {
                if lowered.contains(phrase) {
                    violations.push(ToneViolation {
                        phrase: phrase.to_string(),
                        category: *category,
                        severity: category.severity(),
                        field: field_name.to_string(),
                    });
                }
            }
        }
    }

    ToneReport {
        is_valid: violations.is_empty(),
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_passes() {
        let report = validate_content(&ContentFields {
            rationale: Some(
                "Based on your Savings Builder profile, your savings grew 4% over the last \
                 6 months. A high-yield account could grow it faster.",
            ),
            ..Default::default()
        });
        assert!(report.is_valid);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_shaming_is_high_severity() {
        let report = validate_content(&ContentFields {
            rationale: Some("Your reckless spending needs to stop."),
            ..Default::default()
        });
        assert!(!report.is_valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].category, ToneCategory::Shaming);
        assert_eq!(report.violations[0].severity, ToneSeverity::High);
        assert_eq!(report.violations[0].field, "rationale");
    }

    #[test]
    fn test_pressure_is_medium_severity() {
        let report = validate_content(&ContentFields {
            title: Some("Act NOW to fix your budget"),
            ..Default::default()
        });
        assert!(!report.is_valid);
        assert_eq!(report.violations[0].category, ToneCategory::Pressure);
        assert_eq!(report.violations[0].severity, ToneSeverity::Medium);
        assert_eq!(report.violations[0].field, "title");
    }

    #[test]
    fn test_match_is_case_insensitive_across_fields() {
        let report = validate_content(&ContentFields {
            title: Some("DON'T MISS OUT on this"),
            description: Some("Everyone ELSE is already saving more."),
            rationale: Some("You are bad With Money."),
        });
        assert_eq!(report.violations.len(), 3);
        let fields: Vec<&str> = report.violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"description"));
        assert!(fields.contains(&"rationale"));
    }
}

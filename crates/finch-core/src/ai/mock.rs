//! Mock backend for testing
//!
//! Returns predictable augmentations without a running LLM server, plus
//! failing and tone-violating modes for exercising the degradation paths.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::RationaleBackend;

/// Behavior of the mock on each call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockMode {
    /// Echo the template with a friendly prefix
    #[default]
    Friendly,
    /// Always error, as an unreachable backend would
    Failing,
    /// Return text that trips the tone validator
    ToneViolating,
}

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    mode: MockMode,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            mode: MockMode::Failing,
        }
    }

    pub fn tone_violating() -> Self {
        Self {
            mode: MockMode::ToneViolating,
        }
    }
}

#[async_trait]
impl RationaleBackend for MockBackend {
    async fn augment_rationale(
        &self,
        _persona_name: &str,
        item_title: &str,
        template_rationale: &str,
    ) -> Result<String> {
        match self.mode {
            MockMode::Friendly => Ok(format!(
                "Here's the encouraging part: {} \"{}\" is a great fit for you.",
                template_rationale, item_title
            )),
            MockMode::Failing => Err(Error::Augmentation("mock backend failure".to_string())),
            MockMode::ToneViolating => Ok(format!(
                "Act now - everyone else already uses \"{}\" and you're falling behind your peers.",
                item_title
            )),
        }
    }

    async fn health_check(&self) -> bool {
        self.mode != MockMode::Failing
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_friendly_mode_preserves_template_text() {
        let backend = MockBackend::new();
        let augmented = backend
            .augment_rationale("Savings Builder", "High-Yield Savings", "your savings grew 4%")
            .await
            .unwrap();
        assert!(augmented.contains("your savings grew 4%"));
    }

    #[tokio::test]
    async fn test_failing_mode_errors() {
        let backend = MockBackend::failing();
        assert!(backend
            .augment_rationale("New User", "Item", "text")
            .await
            .is_err());
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_tone_violating_mode_trips_validator() {
        let backend = MockBackend::tone_violating();
        let text = backend
            .augment_rationale("New User", "Item", "text")
            .await
            .unwrap();
        let report = crate::guardrails::validate_content(&crate::guardrails::ContentFields {
            rationale: Some(&text),
            ..Default::default()
        });
        assert!(!report.is_valid);
    }
}

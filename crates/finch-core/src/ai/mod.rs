//! Pluggable local AI backend for rationale augmentation
//!
//! A best-effort overlay that rephrases the template rationale into warmer
//! language. It never changes what is recommended: any failure, timeout, or
//! tone violation simply leaves the augmented field empty and the template
//! text stands.
//!
//! # Configuration
//!
//! Environment variables:
//! - `FINCH_AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Interface every augmentation backend implements
#[async_trait]
pub trait RationaleBackend: Send + Sync {
    /// Rephrase a template rationale for one recommended item.
    ///
    /// The returned text replaces nothing; it is surfaced alongside the
    /// template rationale after passing the tone gate.
    async fn augment_rationale(
        &self,
        persona_name: &str,
        item_title: &str,
        template_rationale: &str,
    ) -> Result<String>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

/// Concrete backend wrapper providing Clone + compile-time dispatch
#[derive(Clone)]
pub enum AIClient {
    Ollama(OllamaBackend),
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from environment configuration, if one is configured
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("FINCH_AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
        match backend.as_str() {
            "mock" => Some(Self::Mock(MockBackend::new())),
            "ollama" => {
                let host = std::env::var("OLLAMA_HOST").ok()?;
                let model =
                    std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
                Some(Self::Ollama(OllamaBackend::new(&host, &model)))
            }
            other => {
                tracing::warn!(backend = other, "Unknown AI backend; augmentation disabled");
                None
            }
        }
    }

    fn backend(&self) -> &dyn RationaleBackend {
        match self {
            Self::Ollama(backend) => backend,
            Self::Mock(backend) => backend,
        }
    }

    pub async fn augment_rationale(
        &self,
        persona_name: &str,
        item_title: &str,
        template_rationale: &str,
    ) -> Result<String> {
        self.backend()
            .augment_rationale(persona_name, item_title, template_rationale)
            .await
    }

    pub async fn health_check(&self) -> bool {
        self.backend().health_check().await
    }

    pub fn model(&self) -> &str {
        self.backend().model()
    }
}

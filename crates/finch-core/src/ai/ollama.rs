//! Ollama backend for rationale augmentation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::RationaleBackend;

/// Ollama HTTP client
#[derive(Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    host: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(host: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Augmentation(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response.trim().to_string())
    }
}

#[async_trait]
impl RationaleBackend for OllamaBackend {
    async fn augment_rationale(
        &self,
        persona_name: &str,
        item_title: &str,
        template_rationale: &str,
    ) -> Result<String> {
        let prompt = format!(
            "You write supportive, factual financial guidance. Rewrite the explanation \
             below in one or two warm, encouraging sentences. Keep every number exactly \
             as written. Never shame, judge, compare the reader to others, or pressure \
             them.\n\nReader profile: {}\nRecommended item: {}\nExplanation: {}\n\n\
             Rewritten explanation:",
            persona_name, item_title, template_rationale
        );

        let text = self.generate(&prompt).await?;
        if text.is_empty() {
            return Err(Error::Augmentation("empty Ollama response".to_string()));
        }
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

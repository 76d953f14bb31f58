use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use helpdesk_core::config::GeneratorSettings;
use helpdesk_core::traits::Generator;

/// Text completion against a local Ollama server (`/api/generate`, non-streaming).
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: Client,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaGenerator {
    pub fn new(settings: &GeneratorSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            client,
        })
    }
}

impl Generator for OllamaGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        tracing::debug!("POST {} (model {}, {} prompt chars)", url, self.model, prompt.chars().count());

        let res = self.client.post(&url).json(&body).send().with_context(|| format!("request to {url} failed"))?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().unwrap_or_default();
            bail!("Ollama returned {}: {}", status, text.trim());
        }
        let payload: GenerateResponse = res.json().context("Ollama response is not valid JSON")?;
        payload.response.ok_or_else(|| anyhow!("Ollama response has no 'response' field"))
    }
}

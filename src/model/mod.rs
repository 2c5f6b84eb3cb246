use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;

/// Upstream capability that turns a list of role/content messages into text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, model: &str, input: &[Value]) -> Result<String>;
}

// A wrapper for the OpenAI Responses API
pub struct OpenAiModel {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiModel {
    pub fn new(config: &Config) -> Result<Self> {
        info!("Using upstream model API at: {}", config.upstream_base_url);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            base_url: config.upstream_base_url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl Generator for OpenAiModel {
    async fn generate(&self, model: &str, input: &[Value]) -> Result<String> {
        let url = format!("{}/v1/responses", self.base_url);

        // Messages are forwarded exactly as the caller sent them
        let payload = json!({
            "model": model,
            "input": input,
        });

        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API request failed ({}): {}", status, error_text));
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        let text = extract_output_text(&response_json)
            .ok_or_else(|| anyhow!("Unexpected response body: {}", response_json))?;

        info!("Response length: {} characters", text.chars().count());
        Ok(text)
    }
}

/// Pull the generated text out of a Responses API body.
///
/// Prefers the top-level `output_text` field; otherwise joins every
/// `output_text` content part of the `output` items, in order. A response
/// with no text parts (refusal, reasoning-only, incomplete) yields `""`.
/// Only a body that is not a JSON object yields `None`.
fn extract_output_text(body: &Value) -> Option<String> {
    let body = body.as_object()?;

    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let text = body
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    Some(text)
}

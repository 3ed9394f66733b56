use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::json;

use crate::config::UpstreamConfig;

/// Outcome of one upstream inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamReply {
    /// Raw image bytes returned on success.
    Image(Vec<u8>),
    /// Non-success response, kept verbatim so it can be relayed to the caller.
    Failure {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
}

#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<UpstreamReply>;
    fn model(&self) -> &str;
}

/// Client for the Hugging Face hosted inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    http: Client,
    model: String,
    api_token: String,
    base_url: String,
}

impl HuggingFaceClient {
    /// Returns `None` when no API token is configured.
    pub fn from_config(config: &UpstreamConfig) -> anyhow::Result<Option<Self>> {
        match &config.api_token {
            Some(token) => Ok(Some(Self::new(
                token.clone(),
                &config.model,
                Some(config.base_url.clone()),
            )?)),
            None => Ok(None),
        }
    }

    pub fn new(api_token: String, model: &str, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("building upstream http client")?;
        let normalized_base = base_url
            .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http: client,
            model: model.to_string(),
            api_token,
            base_url: normalized_base,
        })
    }
}

#[async_trait]
impl ImageClient for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<UpstreamReply> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await
            .with_context(|| "sending request to inference API")?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response
            .bytes()
            .await
            .with_context(|| "reading inference API response body")?
            .to_vec();

        if status.is_success() {
            Ok(UpstreamReply::Image(body))
        } else {
            Ok(UpstreamReply::Failure {
                status: status.as_u16(),
                content_type,
                body,
            })
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

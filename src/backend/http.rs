//! reqwest implementation of the backend API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::Backend;
use crate::api_types::{Passport, Product, RecommendationResult, SurveyRequest, VibeReply, VibeRequest};
use crate::config::Config;
use crate::errors::Error;

/// Longest backend error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Backend client rooted at `{backend_url}/api/`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    api_base: Url,
}

impl HttpBackend {
    /// Build a client for `backend_url` with a per-request timeout.
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, Error> {
        let mut api_base = Url::parse(backend_url)
            .map_err(|e| Error::Config(format!("Invalid backend URL {backend_url}: {e}")))?;
        let path = format!("{}/api/", api_base.path().trim_end_matches('/'));
        api_base.set_path(&path);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_base })
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.api_base
            .join(path)
            .map_err(|e| Error::InvalidInput(format!("Invalid endpoint path {path}: {e}")))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Backend {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// FastAPI `detail` when present, otherwise the truncated body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn health(&self) -> Result<(), Error> {
        let response = self.client.get(self.endpoint("health")?).send().await?;
        let status = response.status();
        debug!(%status, "health probe");
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Backend {
                status: status.as_u16(),
                message: "health probe failed".to_string(),
            })
        }
    }

    async fn products(&self) -> Result<Vec<Product>, Error> {
        let response = self.client.get(self.endpoint("products")?).send().await?;
        Self::decode(response).await
    }

    async fn submit_survey(&self, request: &SurveyRequest) -> Result<RecommendationResult, Error> {
        debug!(?request, "submitting survey");
        let response = self
            .client
            .post(self.endpoint("survey")?)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn passport(&self, session_id: &str) -> Result<Passport, Error> {
        let mut url = self.endpoint("passport/")?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidInput("backend URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(session_id);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(session_id.to_string()));
        }
        Self::decode(response).await
    }

    async fn ai_vibe(&self, request: &VibeRequest) -> Result<VibeReply, Error> {
        let response = self
            .client
            .post(self.endpoint("ai/vibe")?)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }
}

//! HTTP client for the openFDA drug label endpoint.
//!
//! Each search is retried up to the configured attempt count on transport
//! errors, timeouts, and error statuses, with a short pause between attempts.
//! An upstream 404 is not an error: openFDA answers 404 when a search matches
//! no documents, so it maps to an empty result set.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::instrument;
use url::Url;

use crate::config::{OpenFdaSettings, OPENFDA_RETRY_PAUSE_MS};

use super::records::LabelResponse;

/// Upstream fetch failure, stringly-typed so it can cross broadcast channels.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Client for the openFDA drug label endpoint.
#[derive(Clone)]
pub struct OpenFdaClient {
    http: reqwest::Client,
    base_url: Url,
    max_retries: u32,
}

impl OpenFdaClient {
    /// Build a client from settings. Fails if the base URL is unparseable or
    /// the underlying HTTP client cannot be constructed.
    pub fn new(settings: &OpenFdaSettings) -> Result<Self, FetchError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            FetchError(format!(
                "invalid openFDA base URL '{}': {}",
                settings.base_url, e
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| FetchError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            max_retries: settings.max_retries.max(1),
        })
    }

    /// Run a label search, retrying failed attempts.
    #[instrument(name = "openfda.search", skip(self), fields(attempts))]
    pub async fn search(&self, expression: &str, limit: usize) -> Result<LabelResponse, FetchError> {
        let limit = limit.to_string();
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.attempt(expression, &limit).await {
                Ok(response) => {
                    tracing::Span::current().record("attempts", attempt);
                    tracing::debug!(results = response.results.len(), "openFDA query succeeded");
                    return Ok(response);
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        %error,
                        "openFDA request failed"
                    );
                    last_error = Some(error);
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(OPENFDA_RETRY_PAUSE_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError("openFDA request failed".to_string())))
    }

    async fn attempt(&self, expression: &str, limit: &str) -> Result<LabelResponse, FetchError> {
        let response = self
            .http
            .get(self.base_url.clone())
            .query(&[("search", expression), ("limit", limit)])
            .send()
            .await
            .map_err(|e| FetchError(format!("transport error: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%expression, "no labels matched query");
            return Ok(LabelResponse::default());
        }

        let response = response
            .error_for_status()
            .map_err(|e| FetchError(format!("status error: {}", e)))?;

        response
            .json::<LabelResponse>()
            .await
            .map_err(|e| FetchError(format!("malformed openFDA response: {}", e)))
    }
}

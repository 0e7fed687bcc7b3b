use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::VaultConfig;
use crate::errors::{ApiError, StartupError};

/// Client for the PCI-scoped card vault. Raw card numbers and CVVs pass
/// through this process only on their way here; the application database
/// keeps the returned reference token and nothing else.
#[derive(Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    config: VaultConfig,
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    card_number: &'a str,
    cvv: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CardToken {
    pub token: String,
}

impl VaultClient {
    pub fn new(config: VaultConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| StartupError::HttpClient)?;

        Ok(VaultClient { http, config })
    }

    pub async fn tokenize(&self, card_number: &str, cvv: &str) -> Result<CardToken, ApiError> {
        let response = self
            .http
            .post(format!("{}/tokens", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&TokenizeRequest { card_number, cvv })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "card vault unreachable");
                ApiError::Internal
            })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "card vault rejected tokenization");
            return Err(ApiError::Internal);
        }

        response.json::<CardToken>().await.map_err(|e| {
            tracing::error!(error = %e, "card vault returned an unreadable body");
            ApiError::Internal
        })
    }
}

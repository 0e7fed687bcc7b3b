use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;

use crate::config::MediaConfig;
use crate::errors::{ApiError, StartupError};

/// Narrow client for the external media host: one upload call, one URL
/// back. The host's own data model never leaks past this module.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
pub struct MediaUpload {
    pub secure_url: String,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|_| StartupError::HttpClient)?;

        Ok(MediaClient { http, config })
    }

    /// Uploads the video bytes under a per-course folder. The call is
    /// bounded by the configured timeout and retried once; uploads are
    /// idempotent on the host side (same content, new asset id).
    pub async fn upload_video(
        &self,
        course_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        let mut last_error = String::new();

        for attempt in 0..2 {
            let form = multipart::Form::new()
                .text("resource_type", "video")
                .text("folder", format!("teachable_course_videos/course_{course_id}"))
                .part(
                    "file",
                    multipart::Part::bytes(bytes.clone()).file_name(file_name.to_owned()),
                );

            let response = self
                .http
                .post(format!("{}/upload", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .multipart(form)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<MediaUpload>().await.map_err(|e| {
                        tracing::error!(error = %e, "media host returned an unreadable body");
                        ApiError::Internal
                    });
                }
                Ok(resp) => {
                    last_error = format!("media host answered {}", resp.status());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            tracing::warn!(attempt, error = %last_error, "video upload attempt failed");
        }

        tracing::error!(course_id, error = %last_error, "video upload failed");
        Err(ApiError::Internal)
    }
}

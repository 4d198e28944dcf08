//! HTTP client for the generation service.
//!
//! One attempt is exactly one `POST /generate`; nothing here retries. A
//! retry is the user's "regenerate" action, which rebuilds and resubmits.

use super::error::{classify_response, TimetableError};
use super::types::{GenerateResponse, GenerationRequest};
use super::{capacity_warnings, request_fingerprint};
use crate::config::ClientConfig;
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Instant;
use tracing::{error, info, warn};

const GENERATE_PATH: &str = "generate";

/// Client for the schedule generation endpoint.
pub struct GenerationClient {
    client: Client,
    config: ClientConfig,
}

impl GenerationClient {
    pub fn new(config: ClientConfig) -> Result<Self, TimetableError> {
        let client = config.http_client().map_err(|e| TimetableError::Network {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submits one request and waits for one response.
    ///
    /// # Returns
    /// * `Ok(GenerateResponse)` - The service produced a timetable
    /// * `Err(TimetableError)` - The classified failure
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, TimetableError> {
        let correlation_id = generate_correlation_id();
        let fingerprint = request_fingerprint(request);
        let url = self
            .config
            .endpoint(GENERATE_PATH)
            .map_err(|e| TimetableError::Network {
                message: e.to_string(),
            })?;

        for warning in capacity_warnings(request) {
            warn!(
                correlation_id = %correlation_id,
                issue = ?warning.issue,
                "{}", warning.message
            );
        }

        info!(
            correlation_id = %correlation_id,
            request = %fingerprint,
            title = %request.title,
            classes = request.classes.len(),
            faculty = request.faculty.len(),
            "Submitting timetable generation request"
        );

        let start = Instant::now();
        let result = self.send(url, request).await;

        match &result {
            Ok(response) => info!(
                correlation_id = %correlation_id,
                request = %fingerprint,
                classes = response.class_timetable.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Timetable generated"
            ),
            Err(e) => error!(
                correlation_id = %correlation_id,
                request = %fingerprint,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Timetable generation failed"
            ),
        }

        result
    }

    async fn send(&self, url: url::Url, request: &GenerationRequest) -> Result<GenerateResponse, TimetableError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        classify_response(status, &body)
    }
}

/// Generates a unique correlation ID for request tracing.
pub(crate) fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

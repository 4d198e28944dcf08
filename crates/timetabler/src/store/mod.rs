//! Client for the saved-timetable store.
//!
//! The store lives on the same service as the generator:
//! - `POST /add` saves a new result
//! - `PUT /update-timetable/:id` overwrites a saved one
//! - `GET /get-timetables/:userId` lists saved results, newest first
//! - `DELETE /delete-timetable/:id` removes one
pub mod cache;
mod types;

pub use cache::ListCache;
pub use types::SavedTimetable;

use crate::config::ClientConfig;
use crate::generation::client::generate_correlation_id;
use crate::grid::GenerationResult;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};
use types::{DeleteResponse, SaveRequest};
use url::Url;

const ADD_PATH: &str = "add";
const UPDATE_PATH: &str = "update-timetable";
const LIST_PATH: &str = "get-timetables";
const DELETE_PATH: &str = "delete-timetable";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Timetable not found: {id}")]
    NotFound { id: String },

    #[error("Unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network {
            message: err.to_string(),
        }
    }
}

/// Client for saving, listing and deleting timetables.
pub struct StoreClient {
    client: Client,
    config: ClientConfig,
    cache: ListCache,
}

impl StoreClient {
    pub fn new(config: ClientConfig) -> Result<Self, StoreError> {
        let client = config.http_client().map_err(|e| StoreError::Network {
            message: format!("Failed to build HTTP client: {}", e),
        })?;
        let cache = ListCache::new(config.list_cache_ttl());
        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Saves a result under the configured user. With an `id` the stored
    /// document is overwritten, otherwise a new one is created.
    pub async fn save(
        &self,
        result: &GenerationResult,
        id: Option<&str>,
    ) -> Result<SavedTimetable, StoreError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();

        let request = match id {
            Some(id) => self.client.put(self.url(UPDATE_PATH, Some(id))?),
            None => self.client.post(self.url(ADD_PATH, None)?),
        };
        let body = SaveRequest {
            user_id: &self.config.user_id,
            result,
        };
        let response = request.json(&body).send().await?;
        let saved = match (id, response.status()) {
            (Some(id), StatusCode::NOT_FOUND) => Err(StoreError::NotFound { id: id.to_string() }),
            _ => read_json::<SavedTimetable>(response).await,
        };

        self.cache.invalidate(&self.config.user_id);

        match &saved {
            Ok(saved) => info!(
                correlation_id = %correlation_id,
                id = %saved.id,
                updated = id.is_some(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Timetable saved"
            ),
            Err(e) => error!(
                correlation_id = %correlation_id,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Saving timetable failed"
            ),
        }

        saved
    }

    /// Lists the configured user's saved timetables, newest first.
    ///
    /// Served from the cache unless `force_refresh` is set.
    pub async fn list(&self, force_refresh: bool) -> Result<Arc<Vec<SavedTimetable>>, StoreError> {
        let user_id = &self.config.user_id;

        if !force_refresh {
            if let Some(cached) = self.cache.get(user_id) {
                debug!(user = %user_id, count = cached.len(), "Returning cached timetable list");
                return Ok(cached);
            }
        }

        let start = Instant::now();
        let response = self.client.get(self.url(LIST_PATH, Some(user_id))?).send().await?;
        let timetables = Arc::new(read_json::<Vec<SavedTimetable>>(response).await?);
        self.cache.insert(user_id, timetables.clone());

        info!(
            user = %user_id,
            count = timetables.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched saved timetables"
        );
        Ok(timetables)
    }

    /// Deletes a saved timetable; `Ok(false)` when the store had no such id.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let response = self.client.delete(self.url(DELETE_PATH, Some(id))?).send().await?;
        let body = read_json::<DeleteResponse>(response).await?;
        self.cache.invalidate(&self.config.user_id);

        match body.message.as_str() {
            "Deleted" => {
                info!(id = %id, "Timetable deleted");
                Ok(true)
            }
            "Not Found" => Ok(false),
            other => Err(StoreError::UnexpectedResponse {
                status: StatusCode::OK.as_u16(),
                message: other.to_string(),
            }),
        }
    }

    /// Endpoint URL with an optional percent-encoded trailing segment.
    fn url(&self, path: &str, segment: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.config.endpoint(path).map_err(|e| StoreError::Network {
            message: e.to_string(),
        })?;
        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| StoreError::Network {
                    message: format!("Base URL cannot take a path: {}", self.config.base_url),
                })?
                .push(segment);
        }
        Ok(url)
    }
}

/// Reads a JSON body, turning non-2xx statuses into `UnexpectedResponse`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);
        return Err(StoreError::UnexpectedResponse {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| StoreError::UnexpectedResponse {
        status: status.as_u16(),
        message: format!("Invalid response body: {}", e),
    })
}

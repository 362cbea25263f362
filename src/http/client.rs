use reqwest::{Client, StatusCode};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, error};

use crate::api::job::dto::{ErrorResponse, InsertRequest, UpdateRequest};
use crate::api::job::Job;

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Failure of a call to the remote job service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status
    #[error("remote service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never produced a response, or the body could not be read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body arrived but was not a valid job list
    #[error("invalid response body: {source}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

impl ApiError {
    /// Human-readable detail for the error region
    ///
    /// Priority: `error` field of a JSON body, then the raw body, then the
    /// transport message, then a fixed fallback.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { body, .. } | ApiError::Decode { body, .. } => {
                if let Some(message) = structured_error(body) {
                    return message;
                }
                if !body.trim().is_empty() {
                    return body.clone();
                }
                match self {
                    ApiError::Status { status, .. } => format!("Request failed with status {}", status),
                    _ => UNKNOWN_ERROR.to_string(),
                }
            }
            ApiError::Transport(e) => {
                let message = e.to_string();
                if message.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    message
                }
            }
        }
    }
}

fn structured_error(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.error {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// The three remote operations the controller depends on
pub trait JobApi: Send + Sync + 'static {
    fn fetch_jobs(&self) -> impl Future<Output = Result<Vec<Job>, ApiError>> + Send;

    fn update_job(&self, request: &UpdateRequest) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn insert_job(&self, request: &InsertRequest) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Endpoint set for the remote job service
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub data_url: String,
    pub update_url: String,
    pub insert_url: String,
}

/// `JobApi` over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: Client,
    endpoints: Endpoints,
}

impl HttpJobApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: Client::new(),
            endpoints,
        }
    }

    async fn post_json<T: serde::Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<(), ApiError> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("POST {} failed with status {}: {}", url, status, text);
            return Err(ApiError::Status { status, body: text });
        }

        debug!("POST {} succeeded: {}", url, text);
        Ok(())
    }
}

impl JobApi for HttpJobApi {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let url = &self.endpoints.data_url;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("GET {} failed with status {}: {}", url, status, text);
            return Err(ApiError::Status { status, body: text });
        }

        serde_json::from_str::<Vec<Job>>(&text).map_err(|source| {
            error!("Failed to decode job list from {}: {}", url, source);
            ApiError::Decode { source, body: text }
        })
    }

    async fn update_job(&self, request: &UpdateRequest) -> Result<(), ApiError> {
        debug!("Update request: {:?}", request);
        self.post_json(&self.endpoints.update_url, request).await
    }

    async fn insert_job(&self, request: &InsertRequest) -> Result<(), ApiError> {
        debug!("Insert request: {:?}", request);
        self.post_json(&self.endpoints.insert_url, request).await
    }
}

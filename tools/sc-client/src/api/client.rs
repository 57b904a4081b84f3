//! HTTP client for the status gateway.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use sc_01_auth_protocol::{
    mac, request_message, verify_response, RawTimestamp, SharedKey, SignedResponse, REQUEST_PATH,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when checking a subscription.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Server returned status {status}: {error}")]
    Status { status: u16, error: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Mismatching user_id in response: expected {expected:?}, got {actual:?}")]
    UserMismatch { expected: String, actual: String },
    #[error("Invalid HMAC on response; data may be tampered")]
    InvalidResponseTag,
}

/// Body of `POST /check_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub user_id: String,
    pub timestamp: i64,
    pub tag: String,
}

impl StatusRequest {
    /// Sign a request for `user_id` at `timestamp`.
    pub fn sign(user_id: &str, timestamp: i64, key: &SharedKey) -> Self {
        let canonical = request_message(user_id, &RawTimestamp::from_secs(timestamp));
        Self {
            user_id: user_id.to_string(),
            timestamp,
            tag: mac::compute(key, &canonical),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Status gateway client for one user.
pub struct StatusClient {
    client: Client,
    base_url: String,
    user_id: String,
    key: SharedKey,
}

impl StatusClient {
    /// Create a client for `user_id` against the gateway at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        key: SharedKey,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            user_id: user_id.into(),
            key,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Full URL of the status endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), REQUEST_PATH)
    }

    /// Signed request body for `timestamp`.
    pub fn build_request(&self, timestamp: i64) -> StatusRequest {
        StatusRequest::sign(&self.user_id, timestamp, &self.key)
    }

    /// Check the subscription as of the local clock.
    pub async fn check_status(&self) -> Result<SignedResponse, ClientError> {
        self.check_status_at(Utc::now().timestamp()).await
    }

    /// Check the subscription with an explicit request timestamp.
    pub async fn check_status_at(&self, timestamp: i64) -> Result<SignedResponse, ClientError> {
        let request = self.build_request(timestamp);
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, user_id = %self.user_id, timestamp, "Sending status check");

        let response = self
            .client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClientError::Connection(format!("Cannot connect to {}", self.base_url))
                } else {
                    ClientError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            let error = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                error,
            });
        }

        let signed: SignedResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        self.verify(&signed)?;
        Ok(signed)
    }

    /// Accept `response` only if it names this user and its tag verifies.
    pub fn verify(&self, response: &SignedResponse) -> Result<(), ClientError> {
        if response.user_id != self.user_id {
            return Err(ClientError::UserMismatch {
                expected: self.user_id.clone(),
                actual: response.user_id.clone(),
            });
        }
        if !verify_response(&self.key, response) {
            return Err(ClientError::InvalidResponseTag);
        }
        Ok(())
    }
}

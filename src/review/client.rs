//! Blocking HTTP client for the review server.
//!
//! Each method is one request; callers run them on the async task pool and
//! poll the task from a system. The client itself holds no connection state,
//! so a fresh instance per request is cheap and keeps the tasks `Send`.

use serde_json::json;
use thiserror::Error;

use super::model::Issue;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

fn map_ureq_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Status(code, _) => ApiError::Status(code),
        other => ApiError::Transport(other.to_string()),
    }
}

/// Request body for issue creation; a separate function so tests can assert
/// the exact payload that leaves the engine.
pub fn create_issue_body(frame: u64, position: &[f32], message: &str) -> serde_json::Value {
    json!({
        "frame": frame,
        "position": position,
        "message": message,
    })
}

pub struct ReviewClient {
    base_url: String,
}

impl ReviewClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn issues_url(&self, frame: u64) -> String {
        self.url(&format!("frames/{}/issues", frame))
    }

    pub fn issue_url(&self, issue_id: i64, suffix: &str) -> String {
        if suffix.is_empty() {
            self.url(&format!("issues/{}", issue_id))
        } else {
            self.url(&format!("issues/{}/{}", issue_id, suffix))
        }
    }

    /// Fetch all issues of one frame
    pub fn fetch_issues(&self, frame: u64) -> Result<Vec<Issue>, ApiError> {
        let response = ureq::get(&self.issues_url(frame))
            .set("Accept", "application/json")
            .call()
            .map_err(map_ureq_error)?;
        response
            .into_json::<Vec<Issue>>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Create an issue with its first comment
    pub fn create_issue(
        &self,
        frame: u64,
        position: &[f32],
        message: &str,
    ) -> Result<Issue, ApiError> {
        let response = ureq::post(&self.url("issues"))
            .send_json(create_issue_body(frame, position, message))
            .map_err(map_ureq_error)?;
        response
            .into_json::<Issue>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn resolve_issue(&self, issue_id: i64) -> Result<(), ApiError> {
        ureq::post(&self.issue_url(issue_id, "resolve"))
            .call()
            .map(|_| ())
            .map_err(map_ureq_error)
    }

    pub fn reopen_issue(&self, issue_id: i64) -> Result<(), ApiError> {
        ureq::post(&self.issue_url(issue_id, "reopen"))
            .call()
            .map(|_| ())
            .map_err(map_ureq_error)
    }

    pub fn comment_issue(&self, issue_id: i64, message: &str) -> Result<(), ApiError> {
        ureq::post(&self.issue_url(issue_id, "comments"))
            .send_json(json!({ "message": message }))
            .map(|_| ())
            .map_err(map_ureq_error)
    }

    pub fn delete_issue(&self, issue_id: i64) -> Result<(), ApiError> {
        ureq::delete(&self.issue_url(issue_id, ""))
            .call()
            .map(|_| ())
            .map_err(map_ureq_error)
    }
}

//! Issue and comment data model (wire format of the review server).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A threaded comment attached to an issue.
///
/// `created_date` may be absent for comments the server has not timestamped
/// yet; those render as "just now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// A positioned, threaded comment attached to a reviewed region.
///
/// Negative ids denote issues the server has accepted but not yet persisted;
/// id 0 never occurs (it is reserved for the draft region on the canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub frame: u64,
    /// Flat x,y polygon in data-space coordinates
    pub position: Vec<f32>,
    pub resolved: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Issue {
    pub fn is_persisted(&self) -> bool {
        self.id >= 0
    }

    pub fn first_comment(&self) -> Option<&Comment> {
        self.comments.first()
    }
}

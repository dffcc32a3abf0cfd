//! Message types for the persistence collaborator.
//!
//! Every user intent is an independent fire-and-forget request; nothing here
//! blocks and no request cancels another.

use bevy::prelude::*;

/// The four mutations that target an existing issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueAction {
    Resolve,
    Reopen,
    Comment,
    Delete,
}

impl IssueAction {
    /// Verb used in user-facing failure notifications
    pub fn verb(&self) -> &'static str {
        match self {
            IssueAction::Resolve => "resolve",
            IssueAction::Reopen => "reopen",
            IssueAction::Comment => "comment on",
            IssueAction::Delete => "delete",
        }
    }
}

#[derive(Message)]
pub struct ResolveIssueRequest {
    pub issue_id: i64,
}

#[derive(Message)]
pub struct ReopenIssueRequest {
    pub issue_id: i64,
}

#[derive(Message)]
pub struct CommentIssueRequest {
    pub issue_id: i64,
    pub message: String,
}

#[derive(Message)]
pub struct DeleteIssueRequest {
    pub issue_id: i64,
}

/// Create a new issue (with its first comment) from a submitted draft
#[derive(Message)]
pub struct CreateIssueRequest {
    pub position: Vec<f32>,
    pub message: String,
}

/// Re-fetch the issue snapshot for the current frame
#[derive(Message)]
pub struct RefreshIssuesRequest;

/// Move to another frame of the reviewed sequence
#[derive(Message)]
pub struct SwitchFrameRequest {
    /// Relative frame step; clamped to the valid range
    pub delta: i64,
}

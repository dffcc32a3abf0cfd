//! Persisted issues and the review-server collaborator.
//!
//! The overlay holds a read-only, frequently refreshed snapshot of the
//! current frame's issues and mutates nothing directly: every user intent
//! becomes an async HTTP request, and the snapshot is re-fetched after each
//! success.
//!
//! ## Module Structure
//!
//! - [`model`] - Issue and Comment wire types
//! - [`snapshot`] - Snapshot, frame/liveness and busy-state resources
//! - [`requests`] - Request message types
//! - [`client`] - Blocking HTTP client run on the task pool
//! - [`systems`] - Dispatch and poll systems
//!
//! ## Key Types
//!
//! - [`IssueSnapshot`] - Issues of the current frame, replaced wholesale
//! - [`FrameContext`] - Current frame plus the liveness generation
//! - [`PendingActions`] - Per-issue in-flight request tracking

mod client;
mod model;
mod requests;
mod snapshot;
mod systems;


// Re-exports - Model
pub use model::{Comment, Issue};

// Re-exports - Resources
pub use snapshot::{FrameContext, IssueSnapshot, PendingActions, SnapshotSync};

// Re-exports - Messages
pub use requests::{
    CommentIssueRequest, CreateIssueRequest, DeleteIssueRequest, IssueAction,
    RefreshIssuesRequest, ReopenIssueRequest, ResolveIssueRequest, SwitchFrameRequest,
};

// Re-exports - Client
pub use client::{create_issue_body, ApiError, ReviewClient};

use bevy::prelude::*;

use crate::config::ConfigLoaded;

pub struct ReviewPlugin;

impl Plugin for ReviewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IssueSnapshot>()
            .init_resource::<FrameContext>()
            .init_resource::<PendingActions>()
            .init_resource::<SnapshotSync>()
            .add_message::<ResolveIssueRequest>()
            .add_message::<ReopenIssueRequest>()
            .add_message::<CommentIssueRequest>()
            .add_message::<DeleteIssueRequest>()
            .add_message::<CreateIssueRequest>()
            .add_message::<RefreshIssuesRequest>()
            .add_message::<SwitchFrameRequest>()
            .add_systems(
                Startup,
                systems::request_initial_snapshot.after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    systems::poll_action_tasks,
                    systems::poll_create_tasks,
                    systems::poll_fetch_tasks,
                ),
            )
            .add_systems(
                Update,
                (
                    systems::frame_shortcuts,
                    systems::switch_frame_system.run_if(on_message::<SwitchFrameRequest>),
                    systems::handle_resolve_requests.run_if(on_message::<ResolveIssueRequest>),
                    systems::handle_reopen_requests.run_if(on_message::<ReopenIssueRequest>),
                    systems::handle_comment_requests.run_if(on_message::<CommentIssueRequest>),
                    systems::handle_delete_requests.run_if(on_message::<DeleteIssueRequest>),
                    systems::handle_create_requests.run_if(on_message::<CreateIssueRequest>),
                    systems::handle_refresh_requests.run_if(on_message::<RefreshIssuesRequest>),
                ),
            );
    }
}

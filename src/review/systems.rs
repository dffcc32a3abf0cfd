//! Bevy systems bridging user intents to the review server.
//!
//! Request messages spawn async tasks on the compute pool; poll systems
//! apply the results. Every outcome carries the liveness generation captured
//! at dispatch so results that arrive after a frame switch are discarded
//! without touching state.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;

use crate::config::AppConfig;
use crate::overlay::{DialogState, DraftState};
use crate::ui::Notifications;

use super::client::ReviewClient;
use super::model::Issue;
use super::requests::{
    CommentIssueRequest, CreateIssueRequest, DeleteIssueRequest, IssueAction,
    RefreshIssuesRequest, ReopenIssueRequest, ResolveIssueRequest, SwitchFrameRequest,
};
use super::snapshot::{FrameContext, IssueSnapshot, PendingActions, SnapshotSync};

/// Result of a resolve/reopen/comment/delete request
pub struct ActionOutcome {
    pub issue_id: i64,
    pub action: IssueAction,
    pub generation: u64,
    pub error: Option<String>,
}

/// Result of an issue creation request
pub struct CreateOutcome {
    pub generation: u64,
    pub issue: Option<Issue>,
    pub error: Option<String>,
}

/// Result of a snapshot fetch
pub struct FetchOutcome {
    pub frame: u64,
    pub generation: u64,
    pub issues: Option<Vec<Issue>>,
    pub error: Option<String>,
}

/// Background task for an issue action
#[derive(Component)]
pub struct IssueActionTask(pub Task<ActionOutcome>);

/// Background task for issue creation
#[derive(Component)]
pub struct CreateIssueTask(pub Task<CreateOutcome>);

/// Background task for a snapshot fetch
#[derive(Component)]
pub struct FetchIssuesTask(pub Task<FetchOutcome>);

fn dispatch_action(
    commands: &mut Commands,
    config: &AppConfig,
    frame_ctx: &FrameContext,
    pending: &mut PendingActions,
    issue_id: i64,
    action: IssueAction,
    message: Option<String>,
) {
    // One click, one request: the busy spinner keeps the user from stacking
    // requests on the same issue, so a second arrival here is a logic slip
    if pending.is_busy(issue_id) {
        warn!("Issue {} already has a request in flight", issue_id);
        return;
    }
    pending.begin(issue_id, action);

    let client = ReviewClient::new(&config.data.server_url);
    let generation = frame_ctx.generation;

    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move {
        let result = match action {
            IssueAction::Resolve => client.resolve_issue(issue_id),
            IssueAction::Reopen => client.reopen_issue(issue_id),
            IssueAction::Comment => {
                client.comment_issue(issue_id, message.as_deref().unwrap_or_default())
            }
            IssueAction::Delete => client.delete_issue(issue_id),
        };
        ActionOutcome {
            issue_id,
            action,
            generation,
            error: result.err().map(|e| e.to_string()),
        }
    });

    commands.spawn(IssueActionTask(task));
}

pub fn handle_resolve_requests(
    mut commands: Commands,
    mut events: MessageReader<ResolveIssueRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
    mut pending: ResMut<PendingActions>,
) {
    for event in events.read() {
        dispatch_action(
            &mut commands,
            &config,
            &frame_ctx,
            &mut pending,
            event.issue_id,
            IssueAction::Resolve,
            None,
        );
    }
}

pub fn handle_reopen_requests(
    mut commands: Commands,
    mut events: MessageReader<ReopenIssueRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
    mut pending: ResMut<PendingActions>,
) {
    for event in events.read() {
        dispatch_action(
            &mut commands,
            &config,
            &frame_ctx,
            &mut pending,
            event.issue_id,
            IssueAction::Reopen,
            None,
        );
    }
}

pub fn handle_comment_requests(
    mut commands: Commands,
    mut events: MessageReader<CommentIssueRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
    mut pending: ResMut<PendingActions>,
) {
    for event in events.read() {
        dispatch_action(
            &mut commands,
            &config,
            &frame_ctx,
            &mut pending,
            event.issue_id,
            IssueAction::Comment,
            Some(event.message.clone()),
        );
    }
}

pub fn handle_delete_requests(
    mut commands: Commands,
    mut events: MessageReader<DeleteIssueRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
    mut pending: ResMut<PendingActions>,
) {
    for event in events.read() {
        dispatch_action(
            &mut commands,
            &config,
            &frame_ctx,
            &mut pending,
            event.issue_id,
            IssueAction::Delete,
            None,
        );
    }
}

pub fn handle_create_requests(
    mut commands: Commands,
    mut events: MessageReader<CreateIssueRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
) {
    for event in events.read() {
        let client = ReviewClient::new(&config.data.server_url);
        let frame = frame_ctx.frame;
        let generation = frame_ctx.generation;
        let position = event.position.clone();
        let message = event.message.clone();

        let task_pool = AsyncComputeTaskPool::get();
        let task = task_pool.spawn(async move {
            match client.create_issue(frame, &position, &message) {
                Ok(issue) => CreateOutcome {
                    generation,
                    issue: Some(issue),
                    error: None,
                },
                Err(e) => CreateOutcome {
                    generation,
                    issue: None,
                    error: Some(e.to_string()),
                },
            }
        });

        commands.spawn(CreateIssueTask(task));
    }
}

pub fn handle_refresh_requests(
    mut commands: Commands,
    mut events: MessageReader<RefreshIssuesRequest>,
    config: Res<AppConfig>,
    frame_ctx: Res<FrameContext>,
    mut sync: ResMut<SnapshotSync>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    if sync.is_fetching {
        // A fetch is already running; remember to go again when it lands
        sync.queued = true;
        return;
    }
    sync.is_fetching = true;

    let client = ReviewClient::new(&config.data.server_url);
    let frame = frame_ctx.frame;
    let generation = frame_ctx.generation;

    let task_pool = AsyncComputeTaskPool::get();
    let task = task_pool.spawn(async move {
        match client.fetch_issues(frame) {
            Ok(issues) => FetchOutcome {
                frame,
                generation,
                issues: Some(issues),
                error: None,
            },
            Err(e) => FetchOutcome {
                frame,
                generation,
                issues: None,
                error: Some(e.to_string()),
            },
        }
    });

    commands.spawn(FetchIssuesTask(task));
}

/// Applies one settled action result. Returns true when the snapshot should
/// be refreshed. Pure over its arguments so the error-path behavior is
/// testable without a running app.
pub fn apply_action_outcome(
    outcome: &ActionOutcome,
    current_generation: u64,
    issue_in_snapshot: bool,
    dialog: &mut DialogState,
    pending: &mut PendingActions,
    notifications: &mut Notifications,
) -> bool {
    if outcome.generation != current_generation {
        debug!(
            "Discarding stale {} result for issue {}",
            outcome.action.verb(),
            outcome.issue_id
        );
        return false;
    }

    pending.finish(outcome.issue_id);

    // The subject issue may have vanished from the snapshot while the
    // request was in flight; only a delete result is still meaningful then
    if !issue_in_snapshot && outcome.action != IssueAction::Delete {
        debug!(
            "Issue {} no longer in snapshot; dropping {} result",
            outcome.issue_id,
            outcome.action.verb()
        );
        return false;
    }

    match &outcome.error {
        None => {
            // Resolving auto-collapses, but only once the server confirms;
            // a failed resolve leaves the dialog expanded
            if outcome.action == IssueAction::Resolve
                && *dialog == DialogState::Expanded(outcome.issue_id)
            {
                *dialog = DialogState::Collapsed;
            }
            true
        }
        Some(error) => {
            warn!(
                "Failed to {} issue {}: {}",
                outcome.action.verb(),
                outcome.issue_id,
                error
            );
            notifications.error(format!(
                "Failed to {} issue #{}: {}",
                outcome.action.verb(),
                outcome.issue_id,
                error
            ));
            false
        }
    }
}

/// Applies one settled create result. Returns true when the snapshot should
/// be refreshed.
pub fn apply_create_outcome(
    outcome: &CreateOutcome,
    current_generation: u64,
    draft: &mut DraftState,
    notifications: &mut Notifications,
) -> bool {
    if outcome.generation != current_generation {
        debug!("Discarding stale create-issue result");
        return false;
    }

    if let Some(ref issue) = outcome.issue {
        info!("Created issue #{}", issue.id);
        // The new issue becomes visible through the snapshot refresh; the
        // draft is simply discarded
        *draft = DraftState::Inactive;
        return true;
    }

    let message = outcome
        .error
        .clone()
        .unwrap_or_else(|| "unknown error".to_string());
    warn!("Failed to create issue: {}", message);
    notifications.error(format!("Failed to create issue: {}", message));

    // Back to pending with the drawn region intact so the reviewer can retry
    if let DraftState::Submitting { region } = draft {
        let region = region.clone();
        *draft = DraftState::Pending { region };
    }
    false
}

pub fn poll_action_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut IssueActionTask)>,
    frame_ctx: Res<FrameContext>,
    snapshot: Res<IssueSnapshot>,
    mut dialog: ResMut<DialogState>,
    mut pending: ResMut<PendingActions>,
    mut notifications: ResMut<Notifications>,
    mut refresh: MessageWriter<RefreshIssuesRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) {
            commands.entity(entity).despawn();

            let refresh_needed = apply_action_outcome(
                &outcome,
                frame_ctx.generation,
                snapshot.contains(outcome.issue_id),
                &mut dialog,
                &mut pending,
                &mut notifications,
            );
            if refresh_needed {
                refresh.write(RefreshIssuesRequest);
            }
        }
    }
}

pub fn poll_create_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut CreateIssueTask)>,
    frame_ctx: Res<FrameContext>,
    mut draft: ResMut<DraftState>,
    mut notifications: ResMut<Notifications>,
    mut refresh: MessageWriter<RefreshIssuesRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) {
            commands.entity(entity).despawn();

            let refresh_needed = apply_create_outcome(
                &outcome,
                frame_ctx.generation,
                &mut draft,
                &mut notifications,
            );
            if refresh_needed {
                refresh.write(RefreshIssuesRequest);
            }
        }
    }
}

pub fn poll_fetch_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut FetchIssuesTask)>,
    frame_ctx: Res<FrameContext>,
    mut snapshot: ResMut<IssueSnapshot>,
    mut sync: ResMut<SnapshotSync>,
    mut notifications: ResMut<Notifications>,
    mut refresh: MessageWriter<RefreshIssuesRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) {
            commands.entity(entity).despawn();
            sync.is_fetching = false;

            if outcome.generation != frame_ctx.generation {
                debug!("Discarding stale snapshot for frame {}", outcome.frame);
            } else if let Some(issues) = outcome.issues {
                debug!(
                    "Snapshot refreshed: {} issues on frame {}",
                    issues.len(),
                    outcome.frame
                );
                snapshot.replace(issues);
            } else if let Some(error) = outcome.error {
                warn!("Failed to load issues: {}", error);
                notifications.error(format!("Failed to load issues: {}", error));
            }

            if sync.queued {
                sync.queued = false;
                refresh.write(RefreshIssuesRequest);
            }
        }
    }
}

/// PageUp/PageDown step through the reviewed frames
pub fn frame_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut switch_events: MessageWriter<SwitchFrameRequest>,
) {
    if keyboard.just_pressed(KeyCode::PageUp) {
        switch_events.write(SwitchFrameRequest { delta: -1 });
    }
    if keyboard.just_pressed(KeyCode::PageDown) {
        switch_events.write(SwitchFrameRequest { delta: 1 });
    }
}

/// Switching frames resets all overlay-local state and refreshes the
/// snapshot. In-flight requests are not cancelled; the generation bump makes
/// their results fall on the floor.
pub fn switch_frame_system(
    mut events: MessageReader<SwitchFrameRequest>,
    config: Res<AppConfig>,
    mut frame_ctx: ResMut<FrameContext>,
    mut dialog: ResMut<DialogState>,
    mut draft: ResMut<DraftState>,
    mut pending: ResMut<PendingActions>,
    mut refresh: MessageWriter<RefreshIssuesRequest>,
) {
    for event in events.read() {
        let last_frame = config.data.frame_count.saturating_sub(1);
        let target = frame_ctx
            .frame
            .saturating_add_signed(event.delta)
            .min(last_frame);

        if target == frame_ctx.frame {
            continue;
        }

        frame_ctx.frame = target;
        frame_ctx.bump();
        *dialog = DialogState::Collapsed;
        *draft = DraftState::Inactive;
        pending.clear();
        refresh.write(RefreshIssuesRequest);
        info!("Switched to frame {}", target);
    }
}

/// Startup system requesting the initial snapshot
pub fn request_initial_snapshot(mut refresh: MessageWriter<RefreshIssuesRequest>) {
    refresh.write(RefreshIssuesRequest);
}

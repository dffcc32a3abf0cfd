//! Read-only snapshot of the persisted issues for the reviewed frame.
//!
//! The snapshot is owned by the review server; the overlay never patches it
//! locally. After any successful mutation the engine requests a fresh copy
//! and replaces the whole map.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap};

use super::model::Issue;
use super::requests::IssueAction;

/// Issues of the current frame, keyed by id. A BTreeMap keeps iteration
/// order deterministic, which the collision layout relies on.
#[derive(Resource, Default)]
pub struct IssueSnapshot {
    pub issues: BTreeMap<i64, Issue>,
}

impl IssueSnapshot {
    /// Replace the snapshot wholesale with a fresh server copy
    pub fn replace(&mut self, issues: Vec<Issue>) {
        self.issues = issues.into_iter().map(|issue| (issue.id, issue)).collect();
    }

    pub fn get(&self, id: i64) -> Option<&Issue> {
        self.issues.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.issues.contains_key(&id)
    }
}

/// Which frame is being reviewed, plus a liveness generation.
///
/// Every async result carries the generation current at dispatch time;
/// results whose generation no longer matches are discarded without touching
/// any state. Switching frames bumps the generation.
#[derive(Resource, Default)]
pub struct FrameContext {
    pub frame: u64,
    pub generation: u64,
}

impl FrameContext {
    pub fn bump(&mut self) {
        self.generation += 1;
    }
}

/// In-flight action per issue id; drives the per-issue busy spinner without
/// blocking actions on other issues.
#[derive(Resource, Default)]
pub struct PendingActions {
    by_issue: HashMap<i64, IssueAction>,
}

impl PendingActions {
    pub fn begin(&mut self, issue_id: i64, action: IssueAction) {
        self.by_issue.insert(issue_id, action);
    }

    pub fn finish(&mut self, issue_id: i64) {
        self.by_issue.remove(&issue_id);
    }

    pub fn is_busy(&self, issue_id: i64) -> bool {
        self.by_issue.contains_key(&issue_id)
    }

    pub fn any_busy(&self) -> bool {
        !self.by_issue.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_issue.clear();
    }
}

/// Snapshot refresh bookkeeping: one fetch at a time, with a queued re-fetch
/// if another refresh was requested mid-flight.
#[derive(Resource, Default)]
pub struct SnapshotSync {
    pub is_fetching: bool,
    pub queued: bool,
}

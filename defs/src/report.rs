use serde::{Deserialize, Serialize};

use crate::{FieldChange, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncVerb {
    Create,
    Update,
    Unchanged,
    Delete,
}

impl SyncVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncVerb::Create => "create",
            SyncVerb::Update => "update",
            SyncVerb::Unchanged => "unchanged",
            SyncVerb::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum ActionStatus {
    /// Dry run, nothing was sent.
    Planned,
    Applied,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub kind: ResourceKind,
    pub name: String,
    pub verb: SyncVerb,
    pub status: ActionStatus,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub kind: ResourceKind,
    pub dry_run: bool,
    pub results: Vec<ActionResult>,
}

impl SyncReport {
    pub fn new(kind: ResourceKind, dry_run: bool) -> Self {
        SyncReport {
            kind,
            dry_run,
            results: vec![],
        }
    }

    pub fn count(&self, kind: ResourceKind, verb: SyncVerb) -> usize {
        self.results
            .iter()
            .filter(|r| r.kind == kind && r.verb == verb)
            .count()
    }

    pub fn failures(&self) -> Vec<&ActionResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ActionStatus::Failed(_) | ActionStatus::Skipped(_)))
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures().is_empty()
    }

    /// Results that change (or would change) server state.
    pub fn changes(&self) -> Vec<&ActionResult> {
        self.results
            .iter()
            .filter(|r| r.verb != SyncVerb::Unchanged)
            .collect()
    }
}

mod apply;
mod plan;
mod reader;

use std::path::Path;

pub use apply::apply_plan;
pub use plan::{plan_changes, Plan, PlannedAction};
pub use reader::{read_resources, read_server_state, ServerState};

use flowsync_defs::{NormalizeDefaults, OrchestratorApi, ResourceKind, SyncError, SyncReport};
use flowsync_utils::load_desired_state;
use log::info;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Report the planned calls without sending any write.
    pub dry_run: bool,
    /// Delete server resources that are absent from the desired state.
    pub prune: bool,
    pub defaults: NormalizeDefaults,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            dry_run: false,
            prune: true,
            defaults: NormalizeDefaults::default(),
        }
    }
}

/// Reads the server state of `kind` and plans the calls that converge it to `desired`.
pub async fn plan_sync(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
    desired: &[Value],
    options: &SyncOptions,
) -> Result<Plan, SyncError> {
    let server = read_server_state(api, kind).await?;
    info!(
        "{} {}(s) desired, {} on the server",
        desired.len(),
        kind,
        server.resources.len()
    );
    Ok(plan_changes(kind, desired, &server, options))
}

/// One full pass: read, compare, write. Failing to read the server state
/// aborts the pass, failures of single writes are part of the report.
pub async fn reconcile(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
    desired: &[Value],
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let plan = plan_sync(api, kind, desired, options).await?;
    let report = apply_plan(api, &plan, options.dry_run).await;
    info!(
        "Finished reconciling {}s: {} change(s), {} failure(s)",
        kind,
        report.changes().len(),
        report.failures().len()
    );
    Ok(report)
}

pub async fn reconcile_file(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
    path: &Path,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let desired = load_desired_state(path, kind)?;
    reconcile(api, kind, &desired, options).await
}

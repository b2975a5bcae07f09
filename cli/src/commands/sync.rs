use std::path::Path;

use anyhow::Context;
use flowsync_defs::ResourceKind;
use reconciler::{reconcile_file, SyncOptions};

use super::connect;
use crate::print_report;

/// Reconciles every resource of `kind` in `file`. Returns false when any
/// single action failed or was skipped.
pub async fn handle_sync(
    kind: ResourceKind,
    file: &Path,
    dry_run: bool,
    prune: bool,
) -> anyhow::Result<bool> {
    let (client, defaults) = connect()?;
    let options = SyncOptions {
        dry_run,
        prune,
        defaults,
    };

    let report = reconcile_file(&client, kind, file, &options)
        .await
        .with_context(|| format!("Failed to reconcile {}s from {}", kind, file.display()))?;

    print_report(&report);
    Ok(!report.has_failures())
}

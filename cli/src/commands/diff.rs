use std::path::Path;

use anyhow::Context;
use flowsync_defs::ResourceKind;
use flowsync_utils::load_desired_state;
use reconciler::{plan_sync, SyncOptions};

use super::connect;
use crate::print_plan;

pub async fn handle_diff(kind: ResourceKind, file: &Path) -> anyhow::Result<bool> {
    let desired = load_desired_state(file, kind)?;
    let (client, defaults) = connect()?;
    let options = SyncOptions {
        dry_run: true,
        defaults,
        ..SyncOptions::default()
    };

    let plan = plan_sync(&client, kind, &desired, &options)
        .await
        .with_context(|| format!("Failed to compare {}s with the server", kind))?;

    print_plan(&plan);
    Ok(true)
}

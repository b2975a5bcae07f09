use std::collections::{HashMap, HashSet};

use flowsync_defs::{
    resource_id, ActionResult, ActionStatus, DeleteOutcome, FieldChange, OrchestratorApi,
    ResourceKind, SyncError, SyncReport, SyncVerb,
};
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::{Plan, PlannedAction};

/// Runs the planned calls in order. A failure is recorded against its resource
/// and the remaining actions still run. In a dry run nothing is sent.
pub async fn apply_plan(api: &dyn OrchestratorApi, plan: &Plan, dry_run: bool) -> SyncReport {
    let mut report = SyncReport::new(plan.kind, dry_run);
    let mut parents = ParentIds::default();

    for action in plan.actions.iter() {
        let result = if dry_run {
            preview(action)
        } else {
            apply_action(api, action, &mut parents).await
        };
        report.results.push(result);
    }

    report
}

/// Parent identifiers resolved so far, and the reason for those that could not be.
/// `retained` holds parents that keep a child whose move did not happen, those
/// are never deleted in the same run.
#[derive(Default)]
struct ParentIds {
    ids: HashMap<String, String>,
    unresolved: HashMap<String, String>,
    retained: HashSet<(ResourceKind, String)>,
}

impl ParentIds {
    fn retain_parent_of(&mut self, kind: ResourceKind, parent: &str) {
        if let Some(parent_kind) = kind.parent() {
            self.retained.insert((parent_kind, parent.to_string()));
        }
    }

    fn is_retained(&self, kind: ResourceKind, name: &str) -> bool {
        self.retained.contains(&(kind, name.to_string()))
    }

    fn lookup(&self, name: &str) -> Result<&str, String> {
        if let Some(id) = self.ids.get(name) {
            return Ok(id.as_str());
        }
        match self.unresolved.get(name) {
            Some(reason) => Err(format!("flow '{}' could not be resolved: {}", name, reason)),
            None => Err(format!("flow '{}' was never resolved", name)),
        }
    }
}

fn preview(action: &PlannedAction) -> ActionResult {
    let (kind, name, verb, changes) = describe(action);
    let status = match action {
        PlannedAction::Skip { reason, .. } => skipped(kind, name, reason.clone()),
        // Not in the listing, the real run still looks it up by name first
        PlannedAction::EnsureParent { id: None, .. } => {
            info!("[dry-run] Would look up or create {} '{}'", kind, name);
            ActionStatus::Planned
        }
        _ => {
            match verb {
                SyncVerb::Unchanged => debug!("{} '{}' is up-to-date.", kind, name),
                _ => info!("[dry-run] Would {} {} '{}'", verb.as_str(), kind, name),
            }
            ActionStatus::Planned
        }
    };
    ActionResult {
        kind,
        name: name.to_string(),
        verb,
        status,
        changes,
    }
}

fn describe(action: &PlannedAction) -> (ResourceKind, &str, SyncVerb, Vec<FieldChange>) {
    match action {
        PlannedAction::EnsureParent { kind, name, id } => {
            let verb = if id.is_some() {
                SyncVerb::Unchanged
            } else {
                SyncVerb::Create
            };
            (*kind, name.as_str(), verb, vec![])
        }
        PlannedAction::Create { kind, name, .. } => (*kind, name.as_str(), SyncVerb::Create, vec![]),
        PlannedAction::Update {
            kind,
            name,
            changes,
            ..
        }
        | PlannedAction::Replace {
            kind,
            name,
            changes,
            ..
        } => (*kind, name.as_str(), SyncVerb::Update, changes.clone()),
        PlannedAction::Unchanged { kind, name } | PlannedAction::Skip { kind, name, .. } => {
            (*kind, name.as_str(), SyncVerb::Unchanged, vec![])
        }
        PlannedAction::Delete { kind, name, .. } => (*kind, name.as_str(), SyncVerb::Delete, vec![]),
    }
}

async fn apply_action(
    api: &dyn OrchestratorApi,
    action: &PlannedAction,
    parents: &mut ParentIds,
) -> ActionResult {
    let (kind, name, verb, changes) = describe(action);
    let status = match action {
        PlannedAction::EnsureParent { name, id, .. } => {
            match ensure_parent(api, name, id.as_deref()).await {
                Ok((parent_id, created)) => {
                    parents.ids.insert(name.clone(), parent_id);
                    return ActionResult {
                        kind,
                        name: name.clone(),
                        verb: if created {
                            SyncVerb::Create
                        } else {
                            SyncVerb::Unchanged
                        },
                        status: ActionStatus::Applied,
                        changes,
                    };
                }
                Err(e) => {
                    error!("Failed to find or create flow '{}': {}", name, e);
                    parents.unresolved.insert(name.clone(), e.to_string());
                    ActionStatus::Failed(e.to_string())
                }
            }
        }
        PlannedAction::Create {
            kind,
            name,
            parent,
            payload,
        } => match with_parent_id(*kind, payload, parent.as_deref(), parents) {
            Err(reason) => skipped(*kind, name, reason),
            Ok(body) => {
                match parent {
                    Some(parent) => info!("Creating {} '{}' for flow '{}'...", kind, name, parent),
                    None => info!("Creating {} '{}'...", kind, name),
                }
                outcome(kind, name, api.create(*kind, &body).await.map(|created| {
                    debug!("{} '{}' created: {}", kind, name, created);
                }))
            }
        },
        PlannedAction::Update {
            kind,
            name,
            id,
            parent,
            payload,
            changes,
        } => match with_parent_id(*kind, payload, parent.as_deref(), parents) {
            Err(reason) => skipped(*kind, name, reason),
            Ok(body) => {
                info!(
                    "Updating {} '{}' with changes: {}",
                    kind,
                    name,
                    changed_fields(changes)
                );
                for change in changes.iter() {
                    debug!("  {}: {} -> {}", change.field, change.existing, change.new);
                }
                outcome(kind, name, api.update(*kind, id, &body).await)
            }
        },
        PlannedAction::Replace {
            kind,
            name,
            old_id,
            old_parent,
            parent,
            payload,
            ..
        } => match with_parent_id(*kind, payload, parent.as_deref(), parents) {
            Err(reason) => {
                parents.retain_parent_of(*kind, old_parent);
                skipped(*kind, name, reason)
            }
            Ok(body) => {
                info!(
                    "Moving {} '{}' from flow '{}' to '{}'...",
                    kind,
                    name,
                    old_parent,
                    parent.as_deref().unwrap_or_default()
                );
                match api.create(*kind, &body).await {
                    Err(e) => {
                        parents.retain_parent_of(*kind, old_parent);
                        outcome(kind, name, Err(e))
                    }
                    Ok(created) => {
                        debug!("{} '{}' created: {}", kind, name, created);
                        match old_id {
                            Some(old_id) => delete_resource(api, *kind, name, old_id).await,
                            None => {
                                warn!(
                                    "Keeping the copy of {} '{}' under flow '{}'",
                                    kind, name, old_parent
                                );
                                ActionStatus::Applied
                            }
                        }
                    }
                }
            }
        },
        PlannedAction::Unchanged { kind, name } => {
            info!("{} '{}' is up-to-date.", kind, name);
            ActionStatus::Applied
        }
        PlannedAction::Skip { kind, name, reason } => skipped(*kind, name, reason.clone()),
        PlannedAction::Delete { kind, name, .. } if parents.is_retained(*kind, name) => skipped(
            *kind,
            name,
            "it still holds a resource that could not be moved".to_string(),
        ),
        PlannedAction::Delete { kind, name, id } => delete_resource(api, *kind, name, id).await,
    };

    ActionResult {
        kind,
        name: name.to_string(),
        verb,
        status,
        changes,
    }
}

async fn delete_resource(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
    name: &str,
    id: &str,
) -> ActionStatus {
    info!("Deleting {} '{}' with ID: {}", kind, name, id);
    match api.delete(kind, id).await {
        Ok(DeleteOutcome::Deleted) => {
            debug!("{} '{}' deleted successfully.", kind, name);
            ActionStatus::Applied
        }
        Ok(DeleteOutcome::AlreadyGone) => {
            warn!(
                "{} '{}' with ID {} was not found on the server, it may already be deleted.",
                kind, name, id
            );
            ActionStatus::Applied
        }
        Err(e) => {
            error!("Failed to delete {} '{}': {}", kind, name, e);
            ActionStatus::Failed(e.to_string())
        }
    }
}

/// Returns the parent id and whether it had to be created.
async fn ensure_parent(
    api: &dyn OrchestratorApi,
    name: &str,
    known_id: Option<&str>,
) -> Result<(String, bool), SyncError> {
    if let Some(id) = known_id {
        info!("Flow '{}' exists. Using it...", name);
        return Ok((id.to_string(), false));
    }

    if let Some(existing) = api.read_flow_by_name(name).await? {
        if let Some(id) = resource_id(&existing) {
            info!("Flow '{}' exists. Using it...", name);
            return Ok((id, false));
        }
    }

    info!("Flow '{}' not found. Creating it...", name);
    let id = api.create_flow(name).await?;
    debug!("Flow '{}' created or retrieved with ID: {}", name, id);
    Ok((id, true))
}

fn with_parent_id(
    kind: ResourceKind,
    payload: &Value,
    parent: Option<&str>,
    parents: &ParentIds,
) -> Result<Value, String> {
    let mut body = payload.clone();
    if let (Some(parent), Some(id_field)) = (parent, kind.parent_id_field()) {
        let parent_id = parents.lookup(parent)?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert(id_field.to_string(), Value::String(parent_id.to_string()));
        }
    }
    Ok(body)
}

fn skipped(kind: ResourceKind, name: &str, reason: String) -> ActionStatus {
    warn!("Skipping {} '{}': {}", kind, name, reason);
    ActionStatus::Skipped(reason)
}

fn outcome(kind: &ResourceKind, name: &str, result: Result<(), SyncError>) -> ActionStatus {
    match result {
        Ok(()) => {
            info!("{} '{}' created or updated.", kind, name);
            ActionStatus::Applied
        }
        Err(SyncError::Validation { url, body }) => {
            error!("Validation error when writing {} '{}' to {}", kind, name, url);
            error!("Error details: {}", body);
            ActionStatus::Failed(format!("rejected by server validation: {}", body))
        }
        Err(e) => {
            error!("Failed to write {} '{}': {}", kind, name, e);
            ActionStatus::Failed(e.to_string())
        }
    }
}

fn changed_fields(changes: &[FieldChange]) -> String {
    changes
        .iter()
        .map(|change| change.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

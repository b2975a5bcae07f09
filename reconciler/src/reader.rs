use std::collections::{BTreeMap, HashMap, HashSet};

use flowsync_defs::{resource_id, resource_name, OrchestratorApi, ResourceKind, SyncError};
use log::{debug, error, warn};
use serde_json::Value;

/// Server copies of one kind, and of its parent kind, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerState {
    pub resources: BTreeMap<String, Value>,
    pub parents: BTreeMap<String, Value>,
}

pub async fn read_resources(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
) -> Result<BTreeMap<String, Value>, SyncError> {
    let mut by_name = BTreeMap::new();
    for resource in api.list(kind).await? {
        let name = match resource_name(&resource) {
            Some(name) => name.to_string(),
            None => {
                warn!("Ignoring {} without a name: {}", kind, resource);
                continue;
            }
        };
        if by_name.insert(name.clone(), resource).is_some() {
            warn!(
                "Server returned more than one {} named '{}', keeping the last one",
                kind, name
            );
        }
    }
    debug!("Found {} {}s on the server", by_name.len(), kind);
    Ok(by_name)
}

/// Reads everything needed to reconcile `kind`. Server copies of a kind with a
/// parent get the parent's name filled in from its identifier.
pub async fn read_server_state(
    api: &dyn OrchestratorApi,
    kind: ResourceKind,
) -> Result<ServerState, SyncError> {
    let parents = match kind.parent() {
        Some(parent_kind) => read_resources(api, parent_kind).await?,
        None => BTreeMap::new(),
    };
    let mut resources = read_resources(api, kind).await?;

    if let (Some(id_field), Some(name_field)) = (kind.parent_id_field(), kind.parent_field()) {
        resolve_parent_names(api, &parents, &mut resources, id_field, name_field).await;
    }

    Ok(ServerState { resources, parents })
}

// Parents missing from the listing are looked up by id, once per id whether
// or not the lookup succeeds.
async fn resolve_parent_names(
    api: &dyn OrchestratorApi,
    parents: &BTreeMap<String, Value>,
    resources: &mut BTreeMap<String, Value>,
    id_field: &str,
    name_field: &str,
) {
    let mut names_by_id: HashMap<String, String> = parents
        .iter()
        .filter_map(|(name, parent)| Some((resource_id(parent)?, name.clone())))
        .collect();
    let mut failed_ids: HashSet<String> = HashSet::new();

    for (name, resource) in resources.iter_mut() {
        let parent_id = match resource.get(id_field).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                warn!("'{}' has no {}, cannot resolve its {}", name, id_field, name_field);
                continue;
            }
        };

        if failed_ids.contains(&parent_id) {
            continue;
        }
        if !names_by_id.contains_key(&parent_id) {
            match api.read_flow_by_id(&parent_id).await {
                Ok(parent) => {
                    if let Some(parent_name) = resource_name(&parent) {
                        names_by_id.insert(parent_id.clone(), parent_name.to_string());
                    }
                }
                Err(e) => {
                    error!(
                        "Failed to resolve {} '{}' of '{}': {}",
                        id_field, parent_id, name, e
                    );
                    failed_ids.insert(parent_id);
                    continue;
                }
            }
        }

        if let (Some(parent_name), Some(fields)) =
            (names_by_id.get(&parent_id), resource.as_object_mut())
        {
            fields.insert(name_field.to_string(), Value::String(parent_name.clone()));
        }
    }
}

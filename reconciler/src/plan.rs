use std::collections::HashSet;

use flowsync_defs::{resource_id, FieldChange, NormalizedResource, ResourceKind};
use flowsync_utils::{diff_resources, generate_parameter_schema, normalize};
use log::warn;
use serde_json::{Map, Value};

use crate::{ServerState, SyncOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    /// Make sure a parent exists before its children are written. `id` is
    /// known when the parent was already listed on the server.
    EnsureParent {
        kind: ResourceKind,
        name: String,
        id: Option<String>,
    },
    Create {
        kind: ResourceKind,
        name: String,
        parent: Option<String>,
        payload: Value,
    },
    Update {
        kind: ResourceKind,
        name: String,
        id: String,
        parent: Option<String>,
        payload: Value,
        changes: Vec<FieldChange>,
    },
    /// The parent of an existing resource changed. The server keys the
    /// resource on its parent, so a copy is created under the new parent and
    /// the old copy is deleted only once that create succeeded. `old_id` is
    /// None when pruning is off and the old copy stays.
    Replace {
        kind: ResourceKind,
        name: String,
        old_id: Option<String>,
        old_parent: String,
        parent: Option<String>,
        payload: Value,
        changes: Vec<FieldChange>,
    },
    Unchanged {
        kind: ResourceKind,
        name: String,
    },
    /// The server copy cannot be compared, nothing is sent for it.
    Skip {
        kind: ResourceKind,
        name: String,
        reason: String,
    },
    Delete {
        kind: ResourceKind,
        name: String,
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub kind: ResourceKind,
    pub actions: Vec<PlannedAction>,
}

/// Compares desired definitions with the server state and lists the calls
/// that converge the server. Parents come first, deletes of children precede
/// deletes of parents.
pub fn plan_changes(
    kind: ResourceKind,
    desired: &[Value],
    server: &ServerState,
    options: &SyncOptions,
) -> Plan {
    let mut actions = vec![];

    let parent_names = referenced_parents(kind, desired);
    if let Some(parent_kind) = kind.parent() {
        for name in parent_names.iter() {
            actions.push(PlannedAction::EnsureParent {
                kind: parent_kind,
                name: name.clone(),
                id: server.parents.get(name).and_then(resource_id),
            });
        }
    }

    let mut desired_names = HashSet::new();
    for raw in desired {
        let normalized = normalize(kind, raw, &options.defaults);
        desired_names.insert(normalized.name.clone());
        let parent = parent_name(kind, raw);
        let payload = write_payload(kind, &normalized, raw);

        let server_copy = match server.resources.get(&normalized.name) {
            Some(server_copy) => server_copy,
            None => {
                actions.push(PlannedAction::Create {
                    kind,
                    name: normalized.name,
                    parent,
                    payload,
                });
                continue;
            }
        };

        let existing = normalize(kind, server_copy, &options.defaults);
        let old_parent = kind
            .parent_field()
            .map(|field| existing.get(field).and_then(Value::as_str));
        if let Some(None) = old_parent {
            // Comparing would report a parent change on every run
            actions.push(PlannedAction::Skip {
                kind,
                name: normalized.name,
                reason: "the flow of the server copy could not be resolved".to_string(),
            });
            continue;
        }

        let changes = diff_resources(&existing, &normalized);
        if changes.is_empty() {
            actions.push(PlannedAction::Unchanged {
                kind,
                name: normalized.name,
            });
            continue;
        }

        let id = match resource_id(server_copy) {
            Some(id) => id,
            None => {
                warn!(
                    "{} '{}' on the server has no id, it will be created again",
                    kind, normalized.name
                );
                actions.push(PlannedAction::Create {
                    kind,
                    name: normalized.name,
                    parent,
                    payload,
                });
                continue;
            }
        };

        match (kind.parent_field(), old_parent.flatten()) {
            (Some(field), Some(old_parent)) if changes.iter().any(|c| c.field == field) => {
                actions.push(PlannedAction::Replace {
                    kind,
                    name: normalized.name,
                    old_id: if options.prune { Some(id) } else { None },
                    old_parent: old_parent.to_string(),
                    parent,
                    payload,
                    changes,
                });
            }
            _ => actions.push(PlannedAction::Update {
                kind,
                name: normalized.name,
                id,
                parent,
                payload,
                changes,
            }),
        }
    }

    if options.prune {
        for (name, server_copy) in server.resources.iter() {
            if desired_names.contains(name) {
                continue;
            }
            match resource_id(server_copy) {
                Some(id) => actions.push(PlannedAction::Delete {
                    kind,
                    name: name.clone(),
                    id,
                }),
                None => warn!("Cannot delete {} '{}', it has no id", kind, name),
            }
        }

        if let Some(parent_kind) = kind.parent() {
            for (name, parent) in server.parents.iter() {
                if parent_names.contains(name) {
                    continue;
                }
                match resource_id(parent) {
                    Some(id) => actions.push(PlannedAction::Delete {
                        kind: parent_kind,
                        name: name.clone(),
                        id,
                    }),
                    None => warn!("Cannot delete {} '{}', it has no id", parent_kind, name),
                }
            }
        }
    }

    Plan { kind, actions }
}

/// Distinct parent names in document order.
fn referenced_parents(kind: ResourceKind, desired: &[Value]) -> Vec<String> {
    let mut names: Vec<String> = vec![];
    for raw in desired {
        if let Some(name) = parent_name(kind, raw) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn parent_name(kind: ResourceKind, raw: &Value) -> Option<String> {
    let field = kind.parent_field()?;
    raw.get(field).and_then(Value::as_str).map(|s| s.to_string())
}

/// Body sent on create and update. The parent is referenced by id, which is
/// only known once the parent is resolved, so it is added when applying.
fn write_payload(kind: ResourceKind, normalized: &NormalizedResource, raw: &Value) -> Value {
    let mut fields: Map<String, Value> = normalized.fields.clone();
    if let Some(parent_field) = kind.parent_field() {
        fields.remove(parent_field);
    }

    if kind == ResourceKind::Deployment {
        let schema = match raw.get("parameter_openapi_schema") {
            Some(schema) if !schema.is_null() => Some(schema.clone()),
            _ => match fields.get("parameters") {
                Some(Value::Object(parameters)) if !parameters.is_empty() => {
                    Some(generate_parameter_schema(parameters))
                }
                _ => None,
            },
        };
        if let Some(schema) = schema {
            fields.insert("parameter_openapi_schema".to_string(), schema);
        }
    }

    Value::Object(fields)
}

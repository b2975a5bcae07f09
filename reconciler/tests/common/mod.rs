#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use flowsync_defs::{
    resource_id, resource_name, DeleteOutcome, OrchestratorApi, ResourceKind, SyncError,
    UpdateStyle,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteCall {
    CreateFlow(String),
    Create(ResourceKind, String),
    Update(ResourceKind, String),
    Delete(ResourceKind, String),
}

#[derive(Default)]
struct State {
    flows: Vec<Value>,
    deployments: Vec<Value>,
    automations: Vec<Value>,
    writes: Vec<WriteCall>,
    next_id: usize,
    failing_writes: HashSet<String>,
    failing_flow_lookups: HashSet<String>,
    failing_lists: bool,
}

impl State {
    fn collection(&mut self, kind: ResourceKind) -> &mut Vec<Value> {
        match kind {
            ResourceKind::Flow => &mut self.flows,
            ResourceKind::Deployment => &mut self.deployments,
            ResourceKind::Automation => &mut self.automations,
        }
    }

    fn new_id(&mut self, kind: ResourceKind) -> String {
        self.next_id += 1;
        format!("{}-{}", kind, self.next_id)
    }

    // Deployments are unique per flow and name, like on the real server
    fn upsert_deployment(&mut self, body: &Value) -> Value {
        let key = (body.get("flow_id").cloned(), body.get("name").cloned());
        let position = self
            .deployments
            .iter()
            .position(|d| (d.get("flow_id").cloned(), d.get("name").cloned()) == key);
        let id = match position {
            Some(i) => resource_id(&self.deployments[i]).unwrap_or_default(),
            None => self.new_id(ResourceKind::Deployment),
        };
        let mut stored = body.clone();
        stored["id"] = json!(id);
        match position {
            Some(i) => self.deployments[i] = stored.clone(),
            None => self.deployments.push(stored.clone()),
        }
        stored
    }
}

/// In-memory orchestration server recording every write it receives.
#[derive(Default)]
pub struct FakeOrchestrator {
    state: Mutex<State>,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flow(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.new_id(ResourceKind::Flow);
        state.flows.push(json!({"id": id, "name": name}));
        id
    }

    /// Stores a server copy as given, `flow_id` included.
    pub fn add_deployment(&self, deployment: Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.upsert_deployment(&deployment)["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn add_automation(&self, automation: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.new_id(ResourceKind::Automation);
        let mut stored = automation;
        stored["id"] = json!(id);
        state.automations.push(stored);
        id
    }

    pub fn fail_writes_for(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_writes
            .insert(name.to_string());
    }

    pub fn fail_flow_lookup(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_flow_lookups
            .insert(name.to_string());
    }

    pub fn fail_lists(&self) {
        self.state.lock().unwrap().failing_lists = true;
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    pub fn stored(&self, kind: ResourceKind) -> Vec<Value> {
        self.state.lock().unwrap().collection(kind).clone()
    }

    pub fn stored_named(&self, kind: ResourceKind, name: &str) -> Option<Value> {
        self.stored(kind)
            .into_iter()
            .find(|resource| resource_name(resource) == Some(name))
    }

    pub fn flow_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .stored(ResourceKind::Flow)
            .iter()
            .filter_map(|flow| resource_name(flow).map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

fn server_error(url: String) -> SyncError {
    SyncError::Transport {
        url,
        status: Some(500),
        message: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl OrchestratorApi for FakeOrchestrator {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, SyncError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_lists {
            return Err(server_error(format!("/{}/filter", kind.collection())));
        }
        Ok(state.collection(kind).clone())
    }

    async fn read_flow_by_name(&self, name: &str) -> Result<Option<Value>, SyncError> {
        let state = self.state.lock().unwrap();
        if state.failing_flow_lookups.contains(name) {
            return Err(server_error(format!("/flows/name/{}", name)));
        }
        Ok(state
            .flows
            .iter()
            .find(|flow| resource_name(flow) == Some(name))
            .cloned())
    }

    async fn read_flow_by_id(&self, id: &str) -> Result<Value, SyncError> {
        let state = self.state.lock().unwrap();
        state
            .flows
            .iter()
            .find(|flow| resource_id(flow).as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| SyncError::Transport {
                url: format!("/flows/{}", id),
                status: Some(404),
                message: "Not Found".to_string(),
            })
    }

    async fn create_flow(&self, name: &str) -> Result<String, SyncError> {
        let mut state = self.state.lock().unwrap();
        state.writes.push(WriteCall::CreateFlow(name.to_string()));
        if state.failing_writes.contains(name) {
            return Err(server_error("/flows/".to_string()));
        }
        if let Some(existing) = state.flows.iter().find(|f| resource_name(f) == Some(name)) {
            return Ok(resource_id(existing).unwrap_or_default());
        }
        let id = state.new_id(ResourceKind::Flow);
        state.flows.push(json!({"id": id, "name": name}));
        Ok(id)
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Value, SyncError> {
        let mut state = self.state.lock().unwrap();
        let name = resource_name(body).unwrap_or_default().to_string();
        state.writes.push(WriteCall::Create(kind, name.clone()));
        if state.failing_writes.contains(&name) {
            return Err(SyncError::Validation {
                url: format!("/{}/", kind.collection()),
                body: "{\"detail\": \"rejected\"}".to_string(),
            });
        }
        match kind {
            ResourceKind::Deployment => Ok(state.upsert_deployment(body)),
            _ => {
                let mut stored = body.clone();
                stored["id"] = json!(state.new_id(kind));
                state.collection(kind).push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<(), SyncError> {
        let mut state = self.state.lock().unwrap();
        let name = resource_name(body).unwrap_or_default().to_string();
        state.writes.push(WriteCall::Update(kind, name.clone()));
        if state.failing_writes.contains(&name) {
            return Err(server_error(format!("/{}/{}", kind.collection(), id)));
        }
        match kind.update_style() {
            UpdateStyle::Upsert => {
                state.upsert_deployment(body);
                Ok(())
            }
            UpdateStyle::ReplaceById => {
                let collection = state.collection(kind);
                match collection
                    .iter_mut()
                    .find(|r| resource_id(r).as_deref() == Some(id))
                {
                    Some(existing) => {
                        let mut replaced = body.clone();
                        replaced["id"] = json!(id);
                        *existing = replaced;
                        Ok(())
                    }
                    None => Err(SyncError::Transport {
                        url: format!("/{}/{}", kind.collection(), id),
                        status: Some(404),
                        message: "Not Found".to_string(),
                    }),
                }
            }
        }
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome, SyncError> {
        let mut state = self.state.lock().unwrap();
        let collection = state.collection(kind);
        let position = collection
            .iter()
            .position(|r| resource_id(r).as_deref() == Some(id));
        let removed = match position {
            Some(i) => collection.remove(i),
            None => {
                state.writes.push(WriteCall::Delete(kind, id.to_string()));
                return Ok(DeleteOutcome::AlreadyGone);
            }
        };
        let name = resource_name(&removed).unwrap_or_default().to_string();
        state.writes.push(WriteCall::Delete(kind, name));
        if kind == ResourceKind::Flow {
            state
                .deployments
                .retain(|d| d.get("flow_id").and_then(Value::as_str) != Some(id));
        }
        Ok(DeleteOutcome::Deleted)
    }
}

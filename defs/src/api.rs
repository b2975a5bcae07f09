use async_trait::async_trait;
use serde_json::Value;

use crate::{ResourceKind, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The server answered 404, the resource was already gone.
    AlreadyGone,
}

/// Resource-oriented operations of the orchestration server used by the reconciler.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// Every resource of `kind`, across all pages.
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, SyncError>;

    async fn read_flow_by_name(&self, name: &str) -> Result<Option<Value>, SyncError>;

    async fn read_flow_by_id(&self, id: &str) -> Result<Value, SyncError>;

    /// Creates the flow if missing and returns its identifier.
    async fn create_flow(&self, name: &str) -> Result<String, SyncError>;

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Value, SyncError>;

    /// Overwrites an existing resource following the kind's update style.
    async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<(), SyncError>;

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome, SyncError>;
}

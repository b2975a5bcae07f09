mod api;
mod errors;
mod kind;
mod parameter;
mod report;
mod resource;
mod schedule;

pub use api::{DeleteOutcome, OrchestratorApi};
pub use errors::SyncError;
pub use kind::{ResourceKind, UpdateStyle, AUTOMATION_FIELDS, DEPLOYMENT_FIELDS, FLOW_FIELDS};
pub use parameter::ParameterType;
pub use report::{ActionResult, ActionStatus, SyncReport, SyncVerb};
pub use resource::{
    resource_id, resource_name, FieldChange, NormalizeDefaults, NormalizedResource,
    DEFAULT_TIMEZONE, DEFAULT_WORK_POOL_NAME, DEFAULT_WORK_QUEUE_NAME,
};
pub use schedule::{ScheduleSpec, Timing};

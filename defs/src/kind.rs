use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SyncError;

pub const FLOW_FIELDS: &[&str] = &["name"];

pub const DEPLOYMENT_FIELDS: &[&str] = &[
    "name",
    "flow_name",
    "description",
    "version",
    "entrypoint",
    "parameters",
    "tags",
    "work_pool_name",
    "work_queue_name",
    "job_variables",
    "pull_steps",
    "schedules",
    "paused",
];

pub const AUTOMATION_FIELDS: &[&str] = &[
    "name",
    "description",
    "enabled",
    "trigger",
    "actions",
    "actions_on_trigger",
    "actions_on_resolve",
];

/// The resource kinds the server exposes and that can be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Flow,
    Deployment,
    Automation,
}

/// How the server expects an existing resource to be overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStyle {
    /// The create endpoint upserts on the natural key, so an update is a full re-post.
    Upsert,
    /// The resource is replaced through a call addressed by its identifier.
    ReplaceById,
}

impl ResourceKind {
    /// Path segment of the resource collection on the server.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Flow => "flows",
            ResourceKind::Deployment => "deployments",
            ResourceKind::Automation => "automations",
        }
    }

    /// Top-level key of the desired-state document listing this kind.
    /// Flows are never listed explicitly, they are implied by deployments.
    pub fn section_key(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Flow => None,
            ResourceKind::Deployment => Some("deployments"),
            ResourceKind::Automation => Some("automations"),
        }
    }

    pub fn parent(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Deployment => Some(ResourceKind::Flow),
            _ => None,
        }
    }

    /// Field of a desired definition naming its parent resource.
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Deployment => Some("flow_name"),
            _ => None,
        }
    }

    /// Field of a server copy holding its parent's identifier.
    pub fn parent_id_field(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Deployment => Some("flow_id"),
            _ => None,
        }
    }

    pub fn compared_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Flow => FLOW_FIELDS,
            ResourceKind::Deployment => DEPLOYMENT_FIELDS,
            ResourceKind::Automation => AUTOMATION_FIELDS,
        }
    }

    pub fn update_style(&self) -> UpdateStyle {
        match self {
            ResourceKind::Flow | ResourceKind::Deployment => UpdateStyle::Upsert,
            ResourceKind::Automation => UpdateStyle::ReplaceById,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Flow => "flow",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Automation => "automation",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResourceKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flow" | "flows" => Ok(ResourceKind::Flow),
            "deployment" | "deployments" => Ok(ResourceKind::Deployment),
            "automation" | "automations" => Ok(ResourceKind::Automation),
            other => Err(SyncError::Config(format!(
                "Unknown resource kind '{}', expected one of: deployments, automations",
                other
            ))),
        }
    }
}

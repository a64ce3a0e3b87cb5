//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status strings reported by the remote platform.
///
/// Status is free-form; only these values carry meaning for reconciliation.
pub mod status {
    /// Pipeline finished deploying
    pub const DEPLOYED: &str = "deployed";
    /// Pipeline or deployment failed
    pub const ERROR: &str = "error";
    /// Deployment workload is up
    pub const RUNNING: &str = "running";
    /// Pipeline teardown finished
    pub const DESTROYED: &str = "destroyed";
    /// Pipeline teardown failed
    pub const DESTROY_ERROR: &str = "destroy-error";
    /// Placeholder recorded between acceptance and the first observation
    pub const UNKNOWN: &str = "Unknown";
}

/// Identity of a pipeline on the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRef {
    pub namespace: String,
    pub name: String,
}

impl PipelineRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for PipelineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Point-in-time view of a pipeline
///
/// Replaced wholesale on every fetch; deployments are not tracked individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub namespace: String,
    pub name: String,
    pub status: String,
    pub deployments: Vec<Deployment>,
}

impl PipelineSnapshot {
    /// Snapshot for a pipeline that has been accepted but not yet observed
    pub fn unobserved(pipeline: &PipelineRef) -> Self {
        Self {
            namespace: pipeline.namespace.clone(),
            name: pipeline.name.clone(),
            status: String::new(),
            deployments: Vec::new(),
        }
    }

    pub fn pipeline_ref(&self) -> PipelineRef {
        PipelineRef::new(&self.namespace, &self.name)
    }
}

/// A workload deployed by a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub status: String,
    /// Public endpoint URLs
    pub endpoints: BTreeSet<String>,
}

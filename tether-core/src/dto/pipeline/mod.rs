//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::PipelineRef;

/// Request to deploy a pipeline from a git repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub namespace: String,
    pub name: String,
    pub repo_url: String,
    pub branch: String,
}

impl CreatePipeline {
    pub fn pipeline_ref(&self) -> PipelineRef {
        PipelineRef::new(&self.namespace, &self.name)
    }
}

/// Request to tear a pipeline down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyPipeline {
    pub namespace: String,
    pub name: String,
    /// Skip graceful teardown ordering and remove volumes
    pub force: bool,
}

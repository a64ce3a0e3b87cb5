//! Remote resource gateway contract

use async_trait::async_trait;
use tether_core::domain::pipeline::{PipelineRef, PipelineSnapshot};
use tether_core::dto::pipeline::{CreatePipeline, DestroyPipeline};

use crate::error::Result;

/// Operations the reconciler needs from the remote platform
///
/// Mutations are fire-and-forget: `Ok` means the platform accepted the
/// request, not that the work finished. Implementations hold no state
/// between calls.
#[async_trait]
pub trait PipelineGateway: Send + Sync {
    /// Ask the platform to deploy a pipeline from a git branch
    async fn issue_create(&self, req: &CreatePipeline) -> Result<()>;

    /// Ask the platform to tear a pipeline down
    async fn issue_destroy(&self, req: &DestroyPipeline) -> Result<()>;

    /// Fetch the full current state of a pipeline
    ///
    /// Returns `Ok(None)` when the platform has no record of it.
    async fn fetch_pipeline(&self, pipeline: &PipelineRef) -> Result<Option<PipelineSnapshot>>;

    /// Fetch only the pipeline status
    async fn fetch_status(&self, pipeline: &PipelineRef) -> Result<Option<String>> {
        Ok(self
            .fetch_pipeline(pipeline)
            .await?
            .map(|snapshot| snapshot.status))
    }
}

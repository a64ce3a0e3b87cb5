//! Lifecycle reconciler
//!
//! Drives a pipeline from "requested" to an observed terminal state.
//!
//! Create: issue the deploy, wait for the pipeline status, then wait for all
//! of its deployments to be running in a single observation. Nothing is
//! rolled back on failure.
//!
//! Delete: a two-phase state machine. A graceful destroy is tried first; if
//! it fails for any reason, a forced destroy is issued exactly once. If that
//! fails too the delete fails and the pipeline must still be considered
//! present.
//!
//! Only post-issue polling retries. A rejected mutation fails immediately.
//! Invocations share no state; concurrent calls for the same pipeline are not
//! serialized here.

use std::sync::Arc;
use std::time::Duration;
use tether_client::PipelineGateway;
use tether_core::domain::pipeline::{PipelineRef, PipelineSnapshot};
use tether_core::dto::pipeline::{CreatePipeline, DestroyPipeline};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::{Readiness, classify_deployments};
use crate::config::ReconcilerConfig;
use crate::error::{ReconcileError, Stage};
use crate::poller::{PollOutcome, Poller, deadline_after};

/// How a successful delete got there
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Graceful destroy finished
    Graceful,
    /// Graceful destroy failed and forced destroy finished
    Forced,
}

/// Orchestrates create, read and delete against a gateway
#[derive(Clone)]
pub struct LifecycleReconciler {
    gateway: Arc<dyn PipelineGateway>,
    poller: Poller,
}

impl LifecycleReconciler {
    pub fn new(gateway: Arc<dyn PipelineGateway>, config: &ReconcilerConfig) -> Self {
        Self::with_poller(gateway, Poller::from_config(config))
    }

    pub fn with_poller(gateway: Arc<dyn PipelineGateway>, poller: Poller) -> Self {
        Self { gateway, poller }
    }

    /// Deploys a pipeline and waits until it and all its deployments are up
    ///
    /// `timeout` bounds both waits together.
    ///
    /// # Returns
    /// The snapshot observed after both waits. If the platform has no record
    /// of the pipeline at that point, an unobserved (empty) snapshot.
    ///
    /// # Errors
    /// - [`ReconcileError::Issue`] if the platform rejects the deploy
    /// - [`ReconcileError::Wait`] for [`Stage::Deploy`] or [`Stage::Rollout`]
    /// - [`ReconcileError::Fetch`] if the final read fails
    pub async fn create(
        &self,
        req: &CreatePipeline,
        timeout: Duration,
    ) -> Result<PipelineSnapshot, ReconcileError> {
        let pipeline = req.pipeline_ref();
        let deadline = deadline_after(timeout);

        info!(
            "Creating pipeline {} from {} (branch {})",
            pipeline, req.repo_url, req.branch
        );
        self.gateway
            .issue_create(req)
            .await
            .map_err(|source| ReconcileError::Issue {
                pipeline: pipeline.clone(),
                stage: Stage::Deploy,
                source,
            })?;

        info!("Waiting for pipeline {} to deploy", pipeline);
        self.wait_for_status(&pipeline, Readiness::PIPELINE_CREATE, Stage::Deploy, deadline)
            .await?;

        info!("Waiting for deployments of pipeline {} to run", pipeline);
        self.wait_for_deployments(&pipeline, deadline).await?;

        let snapshot = self
            .read(&pipeline)
            .await?
            .unwrap_or_else(|| PipelineSnapshot::unobserved(&pipeline));

        info!(
            "Pipeline {} created (status '{}', {} deployment(s))",
            pipeline,
            snapshot.status,
            snapshot.deployments.len()
        );
        Ok(snapshot)
    }

    /// Reads the current state of a pipeline
    ///
    /// `Ok(None)` means the platform has no record of it, e.g. it was
    /// deleted outside of this tool.
    pub async fn read(
        &self,
        pipeline: &PipelineRef,
    ) -> Result<Option<PipelineSnapshot>, ReconcileError> {
        self.gateway
            .fetch_pipeline(pipeline)
            .await
            .map_err(|source| ReconcileError::Fetch {
                pipeline: pipeline.clone(),
                source,
            })
    }

    /// Destroys a pipeline, escalating to a forced destroy once if needed
    ///
    /// Each phase gets its own `timeout` budget.
    ///
    /// # Errors
    /// [`ReconcileError::Escalation`] carrying both phase errors when the
    /// forced destroy fails as well.
    pub async fn delete(
        &self,
        pipeline: &PipelineRef,
        timeout: Duration,
    ) -> Result<DeleteOutcome, ReconcileError> {
        info!("Destroying pipeline {}", pipeline);
        let graceful = match self.destroy(pipeline, false, timeout).await {
            Ok(()) => {
                info!("Pipeline {} destroyed", pipeline);
                return Ok(DeleteOutcome::Graceful);
            }
            Err(e) => e,
        };

        warn!("Unable to destroy pipeline {}: {}", pipeline, graceful);
        warn!("Destroying pipeline {} with force", pipeline);

        match self.destroy(pipeline, true, timeout).await {
            Ok(()) => {
                info!("Pipeline {} destroyed with force", pipeline);
                Ok(DeleteOutcome::Forced)
            }
            Err(forced) => Err(ReconcileError::Escalation {
                pipeline: pipeline.clone(),
                graceful: Box::new(graceful),
                forced: Box::new(forced),
            }),
        }
    }

    /// One destroy phase: issue, then wait for teardown
    async fn destroy(
        &self,
        pipeline: &PipelineRef,
        force: bool,
        timeout: Duration,
    ) -> Result<(), ReconcileError> {
        let stage = if force {
            Stage::ForcedDestroy
        } else {
            Stage::GracefulDestroy
        };
        let deadline = deadline_after(timeout);

        self.gateway
            .issue_destroy(&DestroyPipeline {
                namespace: pipeline.namespace.clone(),
                name: pipeline.name.clone(),
                force,
            })
            .await
            .map_err(|source| ReconcileError::Issue {
                pipeline: pipeline.clone(),
                stage,
                source,
            })?;

        info!("Waiting for pipeline {} to be destroyed ({})", pipeline, stage);
        self.wait_for_status(pipeline, Readiness::PIPELINE_DESTROY, stage, deadline)
            .await
    }

    async fn wait_for_status(
        &self,
        pipeline: &PipelineRef,
        readiness: Readiness,
        stage: Stage,
        deadline: Instant,
    ) -> Result<(), ReconcileError> {
        let gateway = &self.gateway;

        self.poller
            .poll(deadline, || async move {
                match gateway.fetch_status(pipeline).await {
                    Ok(status) => {
                        debug!("Pipeline {} status: {:?}", pipeline, status);
                        readiness.classify(status.as_deref())
                    }
                    Err(e) => PollOutcome::ProbeError(e),
                }
            })
            .await
            .map_err(|source| ReconcileError::Wait {
                pipeline: pipeline.clone(),
                stage,
                source,
            })
    }

    async fn wait_for_deployments(
        &self,
        pipeline: &PipelineRef,
        deadline: Instant,
    ) -> Result<(), ReconcileError> {
        let gateway = &self.gateway;

        self.poller
            .poll(deadline, || async move {
                match gateway.fetch_pipeline(pipeline).await {
                    Ok(Some(snapshot)) => {
                        for deployment in &snapshot.deployments {
                            debug!(
                                "Pipeline {}: deployment {} status: {}",
                                pipeline, deployment.name, deployment.status
                            );
                        }
                        classify_deployments(&snapshot.deployments)
                    }
                    // Nothing deployed means nothing to wait for
                    Ok(None) => PollOutcome::TerminalSuccess,
                    Err(e) => PollOutcome::ProbeError(e),
                }
            })
            .await
            .map_err(|source| ReconcileError::Wait {
                pipeline: pipeline.clone(),
                stage: Stage::Rollout,
                source,
            })
    }
}

//! Reconciliation errors

use std::fmt;
use tether_client::ClientError;
use tether_core::domain::pipeline::PipelineRef;
use thiserror::Error;

use crate::poller::PollError;

/// Step of a workflow at which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Deploy,
    Rollout,
    GracefulDestroy,
    ForcedDestroy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Deploy => "deploy",
            Stage::Rollout => "deployment rollout",
            Stage::GracefulDestroy => "graceful destroy",
            Stage::ForcedDestroy => "forced destroy",
        };
        f.write_str(name)
    }
}

/// Coarse failure taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Platform did not accept a mutation
    Issue,
    /// Platform reported an error state
    TerminalFailure,
    /// State never settled within the budget
    DeadlineExceeded,
    /// Reading remote state failed
    Probe,
}

/// Errors returned by the lifecycle reconciler
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("unable to issue {stage} for pipeline {pipeline}: {source}")]
    Issue {
        pipeline: PipelineRef,
        stage: Stage,
        source: ClientError,
    },

    #[error("pipeline {pipeline} did not settle during {stage}: {source}")]
    Wait {
        pipeline: PipelineRef,
        stage: Stage,
        source: PollError,
    },

    #[error("unable to read pipeline {pipeline}: {source}")]
    Fetch {
        pipeline: PipelineRef,
        source: ClientError,
    },

    #[error("unable to destroy pipeline {pipeline}; graceful attempt: {graceful}; forced attempt: {forced}")]
    Escalation {
        pipeline: PipelineRef,
        graceful: Box<ReconcileError>,
        #[source]
        forced: Box<ReconcileError>,
    },
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Issue { .. } => ErrorKind::Issue,
            ReconcileError::Wait { source, .. } => match source {
                PollError::TerminalFailure(_) => ErrorKind::TerminalFailure,
                PollError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
                PollError::Probe(_) => ErrorKind::Probe,
            },
            ReconcileError::Fetch { .. } => ErrorKind::Probe,
            ReconcileError::Escalation { forced, .. } => forced.kind(),
        }
    }

    /// Workflow step that failed; the forced step for a failed escalation
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ReconcileError::Issue { stage, .. } | ReconcileError::Wait { stage, .. } => {
                Some(*stage)
            }
            ReconcileError::Fetch { .. } => None,
            ReconcileError::Escalation { forced, .. } => forced.stage(),
        }
    }

    pub fn pipeline(&self) -> &PipelineRef {
        match self {
            ReconcileError::Issue { pipeline, .. }
            | ReconcileError::Wait { pipeline, .. }
            | ReconcileError::Fetch { pipeline, .. }
            | ReconcileError::Escalation { pipeline, .. } => pipeline,
        }
    }
}

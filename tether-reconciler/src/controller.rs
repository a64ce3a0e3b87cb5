//! Pipeline resource controller
//!
//! Adapts the lifecycle reconciler to a declarative resource model: callers
//! hand in a planned or prior [`PipelineModel`] and get back the new tracked
//! state plus diagnostics. Failures never panic or bubble up as `Err`; they
//! are reported as error diagnostics alongside whatever state is still true.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tether_core::domain::pipeline::{PipelineRef, PipelineSnapshot, status};
use tether_core::dto::pipeline::CreatePipeline;
use tracing::{info, warn};

use crate::error::{ErrorKind, ReconcileError};
use crate::reconciler::{DeleteOutcome, LifecycleReconciler};

/// Per-operation timeout overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    pub create: Option<Duration>,
    pub delete: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentModel {
    pub name: String,
    pub status: String,
    pub endpoints: BTreeSet<String>,
}

/// Tracked state of one pipeline resource
///
/// `name`, `repo_url` and `branch` are user attributes; changing any of them
/// replaces the resource. `id`, `status` and `deployments` are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineModel {
    pub id: Option<String>,
    pub name: String,
    pub repo_url: String,
    pub branch: String,
    pub status: Option<String>,
    #[serde(default)]
    pub deployments: Vec<DeploymentModel>,
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl PipelineModel {
    pub fn new(
        name: impl Into<String>,
        repo_url: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            repo_url: repo_url.into(),
            branch: branch.into(),
            status: None,
            deployments: Vec::new(),
            timeouts: Timeouts::default(),
        }
    }

    /// Overwrites the computed attributes from an observation
    fn refresh(&mut self, snapshot: &PipelineSnapshot) {
        self.id = Some(snapshot.name.clone());
        self.status = Some(snapshot.status.clone());
        self.deployments = snapshot
            .deployments
            .iter()
            .map(|d| DeploymentModel {
                name: d.name.clone(),
                status: d.status.clone(),
                endpoints: d.endpoints.clone(),
            })
            .collect();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

/// Ordered diagnostics produced by one controller call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Error, summary.into(), detail.into());
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Warning, summary.into(), detail.into());
    }

    fn push(&mut self, severity: Severity, summary: String, detail: String) {
        self.0.push(Diagnostic {
            severity,
            summary,
            detail,
        });
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

/// New tracked state plus diagnostics
///
/// `state: None` means the resource does not exist (anymore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub state: Option<PipelineModel>,
    pub diagnostics: Diagnostics,
}

impl Response {
    fn ok(state: Option<PipelineModel>) -> Self {
        Self {
            state,
            diagnostics: Diagnostics::default(),
        }
    }

    fn failed(state: Option<PipelineModel>, summary: &str, err: &ReconcileError) -> Self {
        let mut diagnostics = Diagnostics::default();
        diagnostics.add_error(summary, err.to_string());
        Self { state, diagnostics }
    }
}

/// Pipeline resources of one platform namespace
#[derive(Clone)]
pub struct PipelineResource {
    reconciler: LifecycleReconciler,
    namespace: String,
    default_timeout: Duration,
}

impl PipelineResource {
    pub fn new(
        reconciler: LifecycleReconciler,
        namespace: impl Into<String>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            reconciler,
            namespace: namespace.into(),
            default_timeout,
        }
    }

    fn pipeline_ref(&self, name: &str) -> PipelineRef {
        PipelineRef::new(self.namespace.clone(), name)
    }

    /// Creates the planned pipeline and waits for it to run
    ///
    /// Once the platform accepts the deploy, the returned state carries the
    /// pipeline identity even when a later wait fails, so the partially
    /// created pipeline stays tracked.
    pub async fn create(&self, plan: PipelineModel) -> Response {
        let timeout = plan.timeouts.create.unwrap_or(self.default_timeout);
        let req = CreatePipeline {
            namespace: self.namespace.clone(),
            name: plan.name.clone(),
            repo_url: plan.repo_url.clone(),
            branch: plan.branch.clone(),
        };

        match self.reconciler.create(&req, timeout).await {
            Ok(snapshot) => {
                let mut state = plan;
                state.refresh(&snapshot);
                Response::ok(Some(state))
            }
            Err(e) if e.kind() == ErrorKind::Issue => {
                Response::failed(None, "Unable to create pipeline", &e)
            }
            Err(e) => {
                warn!("Pipeline {} created but did not settle: {}", req.pipeline_ref(), e);
                let mut state = plan;
                state.id = Some(state.name.clone());
                state.status = Some(status::UNKNOWN.to_string());
                Response::failed(Some(state), "Unable to create pipeline", &e)
            }
        }
    }

    /// Refreshes tracked state from the platform
    ///
    /// A pipeline the platform no longer knows is dropped from state.
    pub async fn read(&self, state: PipelineModel) -> Response {
        let pipeline = self.pipeline_ref(&state.name);

        match self.reconciler.read(&pipeline).await {
            Ok(Some(snapshot)) => {
                let mut state = state;
                state.refresh(&snapshot);
                Response::ok(Some(state))
            }
            Ok(None) => {
                info!("Pipeline {} no longer exists", pipeline);
                Response::ok(None)
            }
            Err(e) => Response::failed(Some(state), "Unable to read pipeline", &e),
        }
    }

    /// Applies an in-place change without touching the platform
    ///
    /// Every user attribute forces replacement, so only `timeouts` can differ
    /// here. Computed attributes carry over from `prior`.
    pub fn update(&self, prior: &PipelineModel, plan: PipelineModel) -> Response {
        Response::ok(Some(PipelineModel {
            id: prior.id.clone(),
            status: prior.status.clone(),
            deployments: prior.deployments.clone(),
            ..plan
        }))
    }

    /// Destroys the pipeline, escalating to a forced destroy if needed
    ///
    /// On failure the prior state is kept; the pipeline must still be
    /// considered present.
    pub async fn delete(&self, state: PipelineModel) -> Response {
        let pipeline = self.pipeline_ref(&state.name);
        let timeout = state.timeouts.delete.unwrap_or(self.default_timeout);

        match self.reconciler.delete(&pipeline, timeout).await {
            Ok(DeleteOutcome::Graceful) => Response::ok(None),
            Ok(DeleteOutcome::Forced) => {
                let mut response = Response::ok(None);
                response.diagnostics.add_warning(
                    "Pipeline destroyed with force",
                    format!(
                        "Graceful destroy of pipeline {} failed; volumes may have been removed",
                        pipeline
                    ),
                );
                response
            }
            Err(e) => Response::failed(Some(state), "Unable to destroy pipeline", &e),
        }
    }

    /// Starts tracking an existing pipeline by name
    pub async fn import(&self, id: &str) -> Response {
        let mut state = PipelineModel::new(id, "", "");
        state.id = Some(id.to_string());

        let response = self.read(state).await;
        if response.state.is_none() && !response.diagnostics.has_error() {
            let mut diagnostics = response.diagnostics;
            diagnostics.add_error(
                "Unable to import pipeline",
                format!("pipeline {} not found", self.pipeline_ref(id)),
            );
            return Response {
                state: None,
                diagnostics,
            };
        }
        response
    }

    /// Whether moving from `prior` to `plan` needs destroy-then-create
    pub fn requires_replacement(prior: &PipelineModel, plan: &PipelineModel) -> bool {
        prior.name != plan.name || prior.repo_url != plan.repo_url || prior.branch != plan.branch
    }
}

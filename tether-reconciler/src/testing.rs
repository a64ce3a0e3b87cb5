//! Scripted in-memory gateway for tests
//!
//! Fetches replay a queue of replies; the last reply repeats once the queue
//! is down to one entry. Issuing a mutation can swap in a new queue, which is
//! how status sequences that follow a create or destroy are modelled.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use tether_client::{ClientError, PipelineGateway, Result};
use tether_core::domain::pipeline::{Deployment, PipelineRef, PipelineSnapshot};
use tether_core::dto::pipeline::{CreatePipeline, DestroyPipeline};

/// What a fetch returns
#[derive(Debug, Clone)]
pub enum FetchReply {
    Present {
        status: String,
        deployments: Vec<(String, String)>,
    },
    Absent,
    Fail {
        status: u16,
        message: String,
    },
}

pub fn status(status: &str) -> FetchReply {
    FetchReply::Present {
        status: status.to_string(),
        deployments: Vec::new(),
    }
}

pub fn with_deployments(status: &str, deployments: &[(&str, &str)]) -> FetchReply {
    FetchReply::Present {
        status: status.to_string(),
        deployments: deployments
            .iter()
            .map(|(name, status)| (name.to_string(), status.to_string()))
            .collect(),
    }
}

pub fn absent() -> FetchReply {
    FetchReply::Absent
}

pub fn failing(status: u16, message: &str) -> FetchReply {
    FetchReply::Fail {
        status,
        message: message.to_string(),
    }
}

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(CreatePipeline),
    Destroy { force: bool },
    Fetch,
}

#[derive(Default)]
struct Script {
    fetches: VecDeque<FetchReply>,
    after_create: Option<Vec<FetchReply>>,
    after_destroy: HashMap<bool, Vec<FetchReply>>,
    reject_create: Option<(u16, String)>,
    reject_destroy: HashMap<bool, (u16, String)>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies served before any mutation is issued
    pub fn fetches(self, replies: Vec<FetchReply>) -> Self {
        self.script.lock().unwrap().fetches = replies.into();
        self
    }

    /// Replies served once a create has been accepted
    pub fn after_create(self, replies: Vec<FetchReply>) -> Self {
        self.script.lock().unwrap().after_create = Some(replies);
        self
    }

    /// Replies served once a destroy with the given `force` flag has been accepted
    pub fn after_destroy(self, force: bool, replies: Vec<FetchReply>) -> Self {
        self.script
            .lock()
            .unwrap()
            .after_destroy
            .insert(force, replies);
        self
    }

    pub fn reject_create(self, status: u16, message: &str) -> Self {
        self.script.lock().unwrap().reject_create = Some((status, message.to_string()));
        self
    }

    pub fn reject_destroy(self, force: bool, status: u16, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .reject_destroy
            .insert(force, (status, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    /// `force` flags of every destroy issued, in order
    pub fn destroys(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Destroy { force } => Some(force),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == Call::Fetch)
            .count()
    }
}

#[async_trait]
impl PipelineGateway for ScriptedGateway {
    async fn issue_create(&self, req: &CreatePipeline) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Create(req.clone()));

        if let Some((status, message)) = script.reject_create.clone() {
            return Err(ClientError::api_error(status, message));
        }
        if let Some(replies) = script.after_create.clone() {
            script.fetches = replies.into();
        }
        Ok(())
    }

    async fn issue_destroy(&self, req: &DestroyPipeline) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Destroy { force: req.force });

        if let Some((status, message)) = script.reject_destroy.get(&req.force).cloned() {
            return Err(ClientError::api_error(status, message));
        }
        if let Some(replies) = script.after_destroy.get(&req.force).cloned() {
            script.fetches = replies.into();
        }
        Ok(())
    }

    async fn fetch_pipeline(&self, pipeline: &PipelineRef) -> Result<Option<PipelineSnapshot>> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Fetch);

        let reply = if script.fetches.len() > 1 {
            script.fetches.pop_front()
        } else {
            script.fetches.front().cloned()
        };

        match reply.unwrap_or(FetchReply::Absent) {
            FetchReply::Present {
                status,
                deployments,
            } => Ok(Some(PipelineSnapshot {
                namespace: pipeline.namespace.clone(),
                name: pipeline.name.clone(),
                status,
                deployments: deployments
                    .into_iter()
                    .map(|(name, status)| Deployment {
                        endpoints: BTreeSet::from([format!("https://{}.example.dev", name)]),
                        name,
                        status,
                    })
                    .collect(),
            })),
            FetchReply::Absent => Ok(None),
            FetchReply::Fail { status, message } => Err(ClientError::api_error(status, message)),
        }
    }
}

//! Tether Reconciler
//!
//! Turns the platform's asynchronous, eventually-consistent pipeline API into
//! blocking create / read / delete operations.
//!
//! Architecture:
//! - Poller: deadline-bounded retry loop with exponential backoff
//! - Classification: maps observed status strings onto poll outcomes
//! - Reconciler: create and delete workflows, including graceful-then-forced
//!   destroy escalation
//! - Controller: declarative resource adapter reporting state and diagnostics
//!
//! Remote access goes through [`tether_client::PipelineGateway`], so any
//! implementation of that trait can be driven.

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod poller;
pub mod reconciler;

#[cfg(test)]
mod testing;

pub use config::ReconcilerConfig;
pub use controller::{Diagnostics, PipelineModel, PipelineResource, Response};
pub use error::{ErrorKind, ReconcileError, Stage};
pub use poller::{PollError, PollOutcome, Poller};
pub use reconciler::{DeleteOutcome, LifecycleReconciler};

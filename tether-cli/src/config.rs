//! Configuration module
//!
//! Handles CLI configuration: where the platform lives, how to authenticate
//! and how long to wait for it.

use std::sync::Arc;
use tether_client::PlatformClient;
use tether_reconciler::{LifecycleReconciler, PipelineResource, ReconcilerConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform API
    pub api_url: String,
    /// Bearer token, if the platform requires one
    pub token: Option<String>,
    /// Namespace (space) that owns the pipelines
    pub namespace: String,
    /// Timeouts and polling behaviour
    pub reconciler: ReconcilerConfig,
}

impl Config {
    pub fn client(&self) -> PlatformClient {
        let client = PlatformClient::new(self.api_url.clone());
        match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        }
    }

    pub fn reconciler(&self) -> LifecycleReconciler {
        LifecycleReconciler::new(Arc::new(self.client()), &self.reconciler)
    }

    pub fn resource(&self) -> PipelineResource {
        PipelineResource::new(
            self.reconciler(),
            self.namespace.clone(),
            self.reconciler.default_timeout,
        )
    }
}

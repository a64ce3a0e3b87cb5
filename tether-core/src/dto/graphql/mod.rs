//! GraphQL wire schema
//!
//! Typed envelopes and records for the platform's GraphQL endpoint.
//! Field names follow the remote schema (camelCase) and are renamed here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::pipeline::{Deployment, PipelineSnapshot};

/// A GraphQL request body
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<V> {
    pub query: &'static str,
    pub variables: V,
}

/// A GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DeployVariables {
    pub name: String,
    pub repository: String,
    pub branch: String,
    pub space: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyVariables {
    pub name: String,
    pub space: String,
    pub destroy_volumes: bool,
    pub force_destroy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpaceVariables {
    pub space: String,
}

// =============================================================================
// Response data
// =============================================================================

/// `data` of the deploy mutation
#[derive(Debug, Clone, Deserialize)]
pub struct DeployData {
    #[serde(rename = "deployGitRepository")]
    pub deploy: Option<GitDeployRef>,
}

/// `data` of the destroy mutation
#[derive(Debug, Clone, Deserialize)]
pub struct DestroyData {
    #[serde(rename = "destroyGitRepository")]
    pub destroy: Option<GitDeployRef>,
}

/// Minimal record returned by mutations
#[derive(Debug, Clone, Deserialize)]
pub struct GitDeployRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// `data` of the space query
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceData {
    pub space: Option<SpaceRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceRecord {
    #[serde(rename = "gitDeploys", default)]
    pub git_deploys: Vec<PipelineRecord>,
}

/// A pipeline as listed in a space
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRecord {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub deployments: Vec<DeploymentRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub endpoints: Vec<EndpointRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointRecord {
    pub url: String,
}

impl PipelineRecord {
    /// Convert the wire record into a domain snapshot
    pub fn into_snapshot(self, namespace: &str) -> PipelineSnapshot {
        PipelineSnapshot {
            namespace: namespace.to_string(),
            name: self.name,
            status: self.status,
            deployments: self
                .deployments
                .into_iter()
                .map(DeploymentRecord::into_deployment)
                .collect(),
        }
    }
}

impl DeploymentRecord {
    fn into_deployment(self) -> Deployment {
        Deployment {
            name: self.name,
            status: self.status,
            endpoints: self
                .endpoints
                .into_iter()
                .map(|e| e.url)
                .collect::<BTreeSet<_>>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_response_decodes_into_snapshot() {
        let body = serde_json::json!({
            "data": {
                "space": {
                    "gitDeploys": [{
                        "id": "abc",
                        "name": "web",
                        "status": "deployed",
                        "deployments": [{
                            "name": "api",
                            "status": "running",
                            "endpoints": [
                                {"url": "https://api.example.dev"},
                                {"url": "https://api.example.dev"}
                            ]
                        }]
                    }]
                }
            }
        });

        let response: GraphQlResponse<SpaceData> = serde_json::from_value(body).unwrap();
        assert!(response.errors.is_empty());

        let mut space = response.data.unwrap().space.unwrap();
        let record = space.git_deploys.remove(0);
        let snapshot = record.into_snapshot("team");
        assert_eq!(snapshot.namespace, "team");
        assert_eq!(snapshot.status, "deployed");
        assert_eq!(snapshot.deployments.len(), 1);
        // Endpoints form a set
        assert_eq!(snapshot.deployments[0].endpoints.len(), 1);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let body = serde_json::json!({
            "data": { "space": { "gitDeploys": [{ "name": "web" }] } }
        });

        let response: GraphQlResponse<SpaceData> = serde_json::from_value(body).unwrap();
        let space = response.data.unwrap().space.unwrap();
        let record = &space.git_deploys[0];
        assert_eq!(record.status, "");
        assert!(record.deployments.is_empty());
    }

    #[test]
    fn test_errors_without_data() {
        let body = serde_json::json!({
            "errors": [{ "message": "space not found", "path": ["space"] }]
        });

        let response: GraphQlResponse<SpaceData> = serde_json::from_value(body).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "space not found");
    }

    #[test]
    fn test_destroy_variables_use_camel_case() {
        let vars = DestroyVariables {
            name: "web".to_string(),
            space: "team".to_string(),
            destroy_volumes: true,
            force_destroy: true,
        };
        let value = serde_json::to_value(vars).unwrap();
        assert_eq!(value["destroyVolumes"], true);
        assert_eq!(value["forceDestroy"], true);
    }
}

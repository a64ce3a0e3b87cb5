//! Pipeline-related API operations

use async_trait::async_trait;
use tether_core::domain::pipeline::{PipelineRef, PipelineSnapshot};
use tether_core::dto::graphql::{
    DeployData, DeployVariables, DestroyData, DestroyVariables, SpaceData, SpaceVariables,
};
use tether_core::dto::pipeline::{CreatePipeline, DestroyPipeline};
use tracing::debug;

use crate::PlatformClient;
use crate::error::{ClientError, Result};
use crate::gateway::PipelineGateway;

const DEPLOY_MUTATION: &str = r#"
mutation deployGitRepository($name: String!, $repository: String!, $branch: String!, $space: String!) {
  deployGitRepository(name: $name, repository: $repository, branch: $branch, space: $space) {
    id
    status
  }
}"#;

const DESTROY_MUTATION: &str = r#"
mutation destroyGitRepository($name: String!, $space: String!, $destroyVolumes: Boolean!, $forceDestroy: Boolean!) {
  destroyGitRepository(name: $name, space: $space, destroyVolumes: $destroyVolumes, forceDestroy: $forceDestroy) {
    id
    status
  }
}"#;

const SPACE_QUERY: &str = r#"
query getPipelines($space: String!) {
  space(id: $space) {
    gitDeploys {
      id
      name
      status
      deployments {
        name
        status
        endpoints {
          url
        }
      }
    }
  }
}"#;

impl PlatformClient {
    // =============================================================================
    // Pipeline Query
    // =============================================================================

    /// List every pipeline in a namespace
    ///
    /// # Arguments
    /// * `namespace` - The namespace (space) to list
    ///
    /// # Returns
    /// Snapshots in the order the platform reports them
    pub async fn list_pipelines(&self, namespace: &str) -> Result<Vec<PipelineSnapshot>> {
        let data: SpaceData = self
            .graphql(
                SPACE_QUERY,
                SpaceVariables {
                    space: namespace.to_string(),
                },
            )
            .await?;

        let space = data
            .space
            .ok_or_else(|| ClientError::NotFound(format!("namespace {}", namespace)))?;

        Ok(space
            .git_deploys
            .into_iter()
            .map(|record| record.into_snapshot(namespace))
            .collect())
    }
}

#[async_trait]
impl PipelineGateway for PlatformClient {
    async fn issue_create(&self, req: &CreatePipeline) -> Result<()> {
        if req.name.is_empty() {
            return Err(ClientError::InvalidRequest(
                "pipeline name cannot be empty".to_string(),
            ));
        }

        let data: DeployData = self
            .graphql(
                DEPLOY_MUTATION,
                DeployVariables {
                    name: req.name.clone(),
                    repository: req.repo_url.clone(),
                    branch: req.branch.clone(),
                    space: req.namespace.clone(),
                },
            )
            .await?;

        if let Some(deploy) = data.deploy {
            debug!(
                "Platform accepted pipeline {} (id {:?}, status '{}')",
                req.name, deploy.id, deploy.status
            );
        }
        Ok(())
    }

    async fn issue_destroy(&self, req: &DestroyPipeline) -> Result<()> {
        let data: DestroyData = self
            .graphql(
                DESTROY_MUTATION,
                DestroyVariables {
                    name: req.name.clone(),
                    space: req.namespace.clone(),
                    destroy_volumes: req.force,
                    force_destroy: req.force,
                },
            )
            .await?;

        if let Some(destroy) = data.destroy {
            debug!(
                "Platform accepted destroy of {} (force: {}, status '{}')",
                req.name, req.force, destroy.status
            );
        }
        Ok(())
    }

    async fn fetch_pipeline(&self, pipeline: &PipelineRef) -> Result<Option<PipelineSnapshot>> {
        let pipelines = match self.list_pipelines(&pipeline.namespace).await {
            Ok(pipelines) => pipelines,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        Ok(pipelines.into_iter().find(|p| p.name == pipeline.name))
    }
}

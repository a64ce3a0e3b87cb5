//! Secret-related API endpoints

use reqwest::StatusCode;
use std::collections::BTreeMap;
use tether_core::domain::secret::Secret;
use tether_core::dto::secret::SecretCreated;

use crate::PlatformClient;
use crate::error::{ClientError, Result};

impl PlatformClient {
    /// Store a secret in a namespace
    ///
    /// # Arguments
    /// * `namespace` - The namespace that owns the secret
    /// * `name` - Secret name
    /// * `value` - Key/value pairs stored under the secret
    ///
    /// # Returns
    /// The identifier assigned by the platform
    pub async fn create_secret(
        &self,
        namespace: &str,
        name: &str,
        value: BTreeMap<String, String>,
    ) -> Result<String> {
        let url = format!("{}/api/namespaces/{}/secrets", self.base_url, namespace);
        let secret = Secret {
            name: name.to_string(),
            value,
        };

        let response = self
            .authorize(self.client.post(&url))
            .json(&secret)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() && status != StatusCode::CREATED {
            return Err(ClientError::api_error(
                status.as_u16(),
                format!("expected 201 Created when adding secret {}", name),
            ));
        }

        let created: SecretCreated = self.handle_response(response).await?;
        Ok(created.id)
    }
}

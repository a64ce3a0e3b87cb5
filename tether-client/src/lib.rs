//! Tether HTTP Client
//!
//! The remote resource gateway: a typed client for the development platform
//! that hosts pipelines. Mutations and queries go through the platform's
//! GraphQL endpoint; secrets use its REST API.
//!
//! The reconciler depends only on the [`PipelineGateway`] trait, which
//! [`PlatformClient`] implements.
//!
//! # Example
//!
//! ```no_run
//! use tether_client::{PipelineGateway, PlatformClient};
//! use tether_core::domain::pipeline::PipelineRef;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PlatformClient::new("http://localhost:8080").with_token("secret");
//!
//!     match client.fetch_pipeline(&PipelineRef::new("team", "web")).await? {
//!         Some(pipeline) => println!("{} is {}", pipeline.name, pipeline.status),
//!         None => println!("not deployed"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod gateway;
mod pipelines;
mod secrets;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use gateway::PipelineGateway;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tether_core::dto::graphql::{GraphQlRequest, GraphQlResponse};
use tracing::{debug, warn};

/// Default per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the platform API
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    /// Base URL of the platform (e.g., "https://platform.example.com")
    base_url: String,
    /// Bearer token attached to every request
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl PlatformClient {
    /// Create a new platform client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the platform (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use tether_client::PlatformClient;
    ///
    /// let client = PlatformClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = match Client::builder().timeout(REQUEST_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    "Unable to build HTTP client, using defaults without a request timeout: {}",
                    e
                );
                Client::default()
            }
        };
        Self::with_client(base_url, client)
    }

    /// Create a new platform client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Attach an API token sent as `Authorization: Bearer <token>`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the platform
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // =============================================================================
    // Transport
    // =============================================================================

    /// Execute a GraphQL operation and decode its `data`
    ///
    /// An `errors` array takes precedence over `data`. When every reported
    /// error is a "not found" message the result is [`ClientError::NotFound`].
    async fn graphql<V, T>(&self, query: &'static str, variables: V) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let url = format!("{}/graphql", self.base_url);
        debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let envelope: GraphQlResponse<T> = self.handle_response(response).await?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            if messages
                .iter()
                .all(|m| m.to_ascii_lowercase().contains("not found"))
            {
                return Err(ClientError::NotFound(messages.join("; ")));
            }
            return Err(ClientError::GraphQl(messages));
        }

        envelope.data.ok_or_else(|| {
            ClientError::ParseError("GraphQL response carried neither data nor errors".to_string())
        })
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PlatformClient::new("http://localhost:8080");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = PlatformClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = PlatformClient::with_client("http://localhost:8080", http_client)
            .with_token("abc");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.token.as_deref(), Some("abc"));
    }
}

//! HTTP client shared by the registry session and publisher.

use std::time::Duration;

use reqwest::Client;

use skillsync_shared::{RegistryConnection, Result, SkillSyncError};

use crate::environment::Endpoints;

/// User-Agent string for registry requests.
const USER_AGENT: &str = concat!("SkillSync/", env!("CARGO_PKG_VERSION"));

/// Client for one registry environment and organization.
///
/// Holds the immutable connection for the run; the API key is only ever
/// read when building the assistant `Authorization` header.
pub struct RegistryClient {
    pub(crate) http: Client,
    pub(crate) endpoints: Endpoints,
    pub(crate) connection: RegistryConnection,
}

impl RegistryClient {
    /// Create a client for the connection's environment.
    pub fn new(connection: RegistryConnection) -> Result<Self> {
        let endpoints = Endpoints::for_environment(connection.environment);
        Self::with_endpoints(connection, endpoints)
    }

    /// Create a client against explicit endpoints (local mock servers).
    pub fn with_endpoints(connection: RegistryConnection, endpoints: Endpoints) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SkillSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            connection,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn organization_id(&self) -> &str {
        &self.connection.organization_id
    }

    /// `Authorization` header value for assistant calls.
    pub(crate) fn auth_header(&self) -> String {
        format!("ApiToken {}", self.connection.api_key)
    }
}

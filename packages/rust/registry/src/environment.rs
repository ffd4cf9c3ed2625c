//! Credential Registry environment endpoints.
//!
//! Each environment exposes two distinct services: the registry
//! resource/graph service and the assistant (search + publish) service.

use skillsync_shared::RegistryEnvironment;

/// Resolved base URLs for one registry environment.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Registry resource/graph service base URL.
    pub registry: String,
    /// Assistant (search/publish) service base URL.
    pub assistant: String,
}

impl Endpoints {
    /// Resolve the well-known base URLs for an environment.
    pub fn for_environment(environment: RegistryEnvironment) -> Self {
        match environment {
            RegistryEnvironment::Production => Self {
                registry: "https://credentialengineregistry.org".into(),
                assistant: "https://credentialengine.org/assistant".into(),
            },
            RegistryEnvironment::Sandbox => Self {
                registry: "https://sandbox.credentialengineregistry.org".into(),
                assistant: "https://sandbox.credentialengine.org/assistant".into(),
            },
        }
    }

    /// Explicit base URLs (local mock servers, proxies).
    pub fn custom(registry: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            registry: registry.into().trim_end_matches('/').to_string(),
            assistant: assistant.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resource URL for a CTID, `{registry}/resources/{ctid}`.
    pub fn resource_url(&self, ctid: &str) -> String {
        format!("{}/resources/{ctid}", self.registry)
    }

    /// Graph URL for a CTID, `{registry}/graph/{ctid}`.
    pub fn graph_url(&self, ctid: &str) -> String {
        format!("{}/graph/{ctid}", self.registry)
    }

    /// Assistant CTDL search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}/search/ctdl", self.assistant)
    }

    /// Assistant framework-graph publish endpoint.
    pub fn publish_url(&self) -> String {
        format!("{}/competencyframework/publishgraph", self.assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_and_production_resolve_distinct_hosts() {
        let sandbox = Endpoints::for_environment(RegistryEnvironment::Sandbox);
        let production = Endpoints::for_environment(RegistryEnvironment::Production);

        assert!(sandbox.registry.contains("sandbox."));
        assert!(!production.registry.contains("sandbox."));
        assert_ne!(sandbox.assistant, production.assistant);
    }

    #[test]
    fn url_helpers() {
        let endpoints = Endpoints::custom("https://registry.test", "https://assistant.test/assistant");
        assert_eq!(
            endpoints.resource_url("ce-1111"),
            "https://registry.test/resources/ce-1111"
        );
        assert_eq!(endpoints.graph_url("ce-1111"), "https://registry.test/graph/ce-1111");
        assert_eq!(
            endpoints.search_url(),
            "https://assistant.test/assistant/search/ctdl"
        );
        assert_eq!(
            endpoints.publish_url(),
            "https://assistant.test/assistant/competencyframework/publishgraph"
        );
    }
}

//! Registry session resolution: organization lookup, existing-framework
//! search, and loading of already-published competencies.
//!
//! A read-then-decide step. Its outcome (existing vs fresh framework
//! CTID, the existing competency set) gates which identities the
//! reconciler may reuse.

use reqwest::header::ACCEPT;
use tracing::{info, instrument};

use skillsync_shared::{
    Competency, CompetencyFramework, FRAMEWORK_NAME, Result, SkillSyncError, new_ctid,
};
use skillsync_store::CompetencyLibrary;

use crate::client::RegistryClient;
use crate::protocol::{CtdlFrameworkQuery, CtdlSearchRequest, CtdlSearchResponse, GraphDocument};

/// What session resolution decided, for logging and run summaries.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// The CTID this run will publish the framework under.
    pub framework_ctid: String,
    /// True when a previously published framework was found and reused.
    pub framework_reused: bool,
    /// Number of competencies already published under that framework.
    pub existing_competencies: usize,
    /// Organization display name, when the resource carries one.
    pub organization_name: Option<String>,
}

impl RegistryClient {
    /// Resolve the session against the registry and record the outcome
    /// in the library's existing side.
    ///
    /// Fetches the organization resource, searches the assistant for a
    /// framework published by that organization under the fixed library
    /// name (first 100 results, no further pagination), and on a hit
    /// loads the full framework graph. Any non-2xx response is fatal.
    #[instrument(skip_all, fields(organization = %self.connection.organization_id))]
    pub async fn resolve_session(&self, library: &mut CompetencyLibrary) -> Result<SessionSummary> {
        let org_url = self.endpoints.resource_url(&self.connection.organization_id);
        let response = self
            .http
            .get(&org_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SkillSyncError::Network(format!("{org_url}: {e}")))?;

        if !response.status().is_success() {
            return Err(SkillSyncError::Network(format!(
                "failed to fetch organization data from {org_url}: HTTP {}",
                response.status()
            )));
        }

        let organization: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SkillSyncError::parse(format!("{org_url}: {e}")))?;
        let organization_name = display_name(&organization);

        info!(
            name = organization_name.as_deref().unwrap_or("<unnamed>"),
            "organization data loaded from registry"
        );

        let search_url = self.endpoints.search_url();
        let search_request = CtdlSearchRequest {
            query: CtdlFrameworkQuery {
                kind: vec!["ceasn:CompetencyFramework".into()],
                publisher: org_url.clone(),
                name: FRAMEWORK_NAME.into(),
            },
            take: 100,
            skip: 0,
        };

        let response = self
            .http
            .post(&search_url)
            .header(ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&search_request)
            .send()
            .await
            .map_err(|e| SkillSyncError::Network(format!("{search_url}: {e}")))?;

        if !response.status().is_success() {
            return Err(SkillSyncError::Network(format!(
                "failed to search for an existing framework at {search_url}: HTTP {}",
                response.status()
            )));
        }

        let results: CtdlSearchResponse = response
            .json()
            .await
            .map_err(|e| SkillSyncError::parse(format!("{search_url}: {e}")))?;

        let existing_ctid = results
            .data
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|hit| hit.ctid);

        match existing_ctid {
            Some(ctid) => {
                info!(%ctid, "a previously created framework was found and will be updated");
                library.set_framework_ctid(&ctid);

                let existing = self.load_existing_graph(&ctid, library).await?;
                Ok(SessionSummary {
                    framework_ctid: ctid,
                    framework_reused: true,
                    existing_competencies: existing,
                    organization_name,
                })
            }
            None => {
                info!("no existing framework found on the registry, a new one will be created");
                let ctid = new_ctid();
                library.set_framework_ctid(&ctid);
                Ok(SessionSummary {
                    framework_ctid: ctid,
                    framework_reused: false,
                    existing_competencies: 0,
                    organization_name,
                })
            }
        }
    }

    /// Fetch the framework's linked-data graph and partition its nodes
    /// by `@type` into the framework itself and its member competencies.
    async fn load_existing_graph(
        &self,
        ctid: &str,
        library: &mut CompetencyLibrary,
    ) -> Result<usize> {
        let graph_url = self.endpoints.graph_url(ctid);
        let response = self
            .http
            .get(&graph_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SkillSyncError::Network(format!("{graph_url}: {e}")))?;

        if !response.status().is_success() {
            return Err(SkillSyncError::Network(format!(
                "failed to fetch framework and competency data from {graph_url}: HTTP {}",
                response.status()
            )));
        }

        let document: GraphDocument = response
            .json()
            .await
            .map_err(|e| SkillSyncError::parse(format!("{graph_url}: {e}")))?;

        let mut framework: Option<CompetencyFramework> = None;
        let mut competencies: Vec<Competency> = Vec::new();

        for node in document.graph {
            match node.get("@type").and_then(|t| t.as_str()) {
                Some("ceasn:CompetencyFramework") if framework.is_none() => {
                    framework = Some(serde_json::from_value(node).map_err(|e| {
                        SkillSyncError::parse(format!("{graph_url}: framework node: {e}"))
                    })?);
                }
                Some("ceasn:Competency") => {
                    competencies.push(serde_json::from_value(node).map_err(|e| {
                        SkillSyncError::parse(format!("{graph_url}: competency node: {e}"))
                    })?);
                }
                _ => {}
            }
        }

        let count = competencies.len();
        info!(competencies = count, "existing framework graph loaded");

        if let Some(framework) = framework {
            library.record_existing_framework(framework);
        }
        library.replace_existing(competencies);

        Ok(count)
    }
}

/// Pull a display name out of an organization resource; `ceterms:name`
/// may be a bare string or a language map.
fn display_name(organization: &serde_json::Value) -> Option<String> {
    match organization.get("ceterms:name")? {
        serde_json::Value::String(name) => Some(name.clone()),
        serde_json::Value::Object(map) => {
            map.values().find_map(|v| v.as_str()).map(str::to_string)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillsync_shared::{RegistryConnection, RegistryEnvironment};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::environment::Endpoints;

    const ORG_CTID: &str = "ce-9d30f846-dfa4-4b1c-90fa-9d01238a86ac";
    const FRAMEWORK_CTID: &str = "ce-3e7df7ec-1a9b-4503-9ff3-21256022b515";

    fn connection() -> RegistryConnection {
        RegistryConnection {
            environment: RegistryEnvironment::Sandbox,
            organization_id: ORG_CTID.into(),
            api_key: "11111111-aaaa-bbbb-cccc-000000000000".into(),
        }
    }

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::with_endpoints(
            connection(),
            Endpoints::custom(server.uri(), format!("{}/assistant", server.uri())),
        )
        .unwrap()
    }

    async fn mock_org(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(format!("/resources/{ORG_CTID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ceterms:ctid": ORG_CTID,
                "ceterms:name": {"en-us": "Western Governors University"},
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn session_reuses_existing_framework_and_loads_competencies() {
        let server = MockServer::start().await;
        mock_org(&server).await;

        Mock::given(method("POST"))
            .and(path("/assistant/search/ctdl"))
            .and(header("Authorization", "ApiToken 11111111-aaaa-bbbb-cccc-000000000000"))
            .and(body_partial_json(json!({
                "Query": {"ceasn:name": "OSMT Open Skills Library"},
                "Take": 100,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"@id": format!("https://registry.test/resources/{FRAMEWORK_CTID}"), "ceterms:ctid": FRAMEWORK_CTID}],
                "valid": true,
                "status": "OK",
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/graph/{FRAMEWORK_CTID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "@context": "https://credreg.net/ctdlasn/schema/context/json",
                "@id": format!("https://registry.test/graph/{FRAMEWORK_CTID}"),
                "@graph": [
                    {
                        "@id": format!("https://registry.test/resources/{FRAMEWORK_CTID}"),
                        "@type": "ceasn:CompetencyFramework",
                        "ceterms:ctid": FRAMEWORK_CTID,
                        "ceasn:name": {"en-us": "OSMT Open Skills Library"},
                    },
                    {
                        "@id": "https://registry.test/resources/ce-11111111-aaaa-bbbb-cccc-000000000000",
                        "@type": "ceasn:Competency",
                        "ceterms:ctid": "ce-11111111-aaaa-bbbb-cccc-000000000000",
                        "ceasn:competencyLabel": {"en-us": "Existing"},
                        "ceasn:competencyText": {"en-us": "Existing text"},
                        "ceasn:isPartOf": format!("https://registry.test/resources/{FRAMEWORK_CTID}"),
                        "ceasn:skillEmbodied": ["http://osmt.test/api/skills/uuid-1"],
                    },
                ],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut library = CompetencyLibrary::new();
        let summary = client.resolve_session(&mut library).await.unwrap();

        assert!(summary.framework_reused);
        assert_eq!(summary.framework_ctid, FRAMEWORK_CTID);
        assert_eq!(summary.existing_competencies, 1);
        assert_eq!(summary.organization_name.as_deref(), Some("Western Governors University"));

        assert_eq!(library.framework_ctid(), Some(FRAMEWORK_CTID));
        assert!(library.existing_framework().is_some());
        assert!(
            library
                .find_existing_by_skill_id("http://osmt.test/api/skills/uuid-1")
                .is_some()
        );
    }

    #[tokio::test]
    async fn session_mints_fresh_ctid_when_no_framework_exists() {
        let server = MockServer::start().await;
        mock_org(&server).await;

        Mock::given(method("POST"))
            .and(path("/assistant/search/ctdl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [],
                "valid": true,
                "status": "OK",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut library = CompetencyLibrary::new();
        let summary = client.resolve_session(&mut library).await.unwrap();

        assert!(!summary.framework_reused);
        assert!(skillsync_shared::is_ctid(&summary.framework_ctid));
        assert_eq!(summary.existing_competencies, 0);
        assert_eq!(library.existing_len(), 0);
        assert_eq!(library.framework_ctid(), Some(summary.framework_ctid.as_str()));
    }

    #[tokio::test]
    async fn org_fetch_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/resources/{ORG_CTID}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut library = CompetencyLibrary::new();
        let err = client.resolve_session(&mut library).await.unwrap_err();

        assert!(err.to_string().contains("failed to fetch organization data"));
        assert!(err.to_string().contains(ORG_CTID));
    }
}

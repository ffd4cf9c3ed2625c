//! Framework graph assembly and publication.
//!
//! Builds the framework document plus every reconciled competency into
//! one linked-data graph and submits it to the assistant's publish
//! endpoint. Transport failures are fatal; a registry-side
//! `Successful: false` is reported, not raised.

use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::{info, instrument, warn};

use skillsync_shared::{
    CompetencyFramework, FRAMEWORK_NAME, Result, SkillSyncError, lang_map,
};
use skillsync_store::CompetencyLibrary;

use crate::client::RegistryClient;
use crate::environment::Endpoints;
use crate::protocol::{FrameworkGraph, GRAPH_CONTEXT, PublishRequest, PublishResponse};

/// Outcome of a publish call that reached the registry.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    /// Whether the registry accepted the graph.
    pub successful: bool,
    /// Published graph URL, when the registry returned one.
    pub graph_url: Option<String>,
    /// Registry validation messages, verbatim.
    pub messages: Vec<String>,
}

/// Build the top-level framework document for this run.
///
/// `has_top_child` lists every reconciled competency in insertion order.
/// Name and description are published under `en-us`; `inLanguage`
/// reflects the configured default language.
pub fn build_framework_document(
    endpoints: &Endpoints,
    organization_id: &str,
    framework_ctid: &str,
    source_domain: &str,
    language: &str,
    library: &CompetencyLibrary,
) -> CompetencyFramework {
    CompetencyFramework {
        id: endpoints.resource_url(framework_ctid),
        kind: "ceasn:CompetencyFramework".into(),
        ctid: framework_ctid.into(),
        name: lang_map("en-us", FRAMEWORK_NAME),
        description: lang_map(
            "en-us",
            format!(
                "Open Skills published via the Open Skills Management Toolset at {source_domain}."
            ),
        ),
        in_language: vec![language.to_string()],
        publisher: vec![endpoints.resource_url(organization_id)],
        has_top_child: library.competencies().iter().map(|c| c.id.clone()).collect(),
        extra: serde_json::Map::new(),
    }
}

impl RegistryClient {
    /// Assemble and publish the framework graph.
    ///
    /// Returns `Ok` for any response the registry actually produced --
    /// including `Successful: false`, which is logged verbatim for the
    /// operator and surfaced in the receipt. Only transport-level
    /// failures (non-2xx, unreachable host) are errors.
    #[instrument(skip_all, fields(competencies = library.len()))]
    pub async fn publish_framework(
        &self,
        source_domain: &str,
        language: &str,
        library: &CompetencyLibrary,
    ) -> Result<PublishReceipt> {
        let framework_ctid = library.framework_ctid().ok_or_else(|| {
            SkillSyncError::validation("no framework CTID resolved for this run")
        })?;

        let framework = build_framework_document(
            &self.endpoints,
            &self.connection.organization_id,
            framework_ctid,
            source_domain,
            language,
            library,
        );

        let graph_url = self.endpoints.graph_url(framework_ctid);
        let mut graph: Vec<serde_json::Value> = Vec::with_capacity(1 + library.len());
        graph.push(
            serde_json::to_value(&framework)
                .map_err(|e| SkillSyncError::parse(format!("framework document: {e}")))?,
        );
        for competency in library.competencies() {
            graph.push(
                serde_json::to_value(competency)
                    .map_err(|e| SkillSyncError::parse(format!("competency {}: {e}", competency.ctid)))?,
            );
        }

        let request = PublishRequest {
            ctid: framework_ctid.to_string(),
            organization_id: self.connection.organization_id.clone(),
            graph: FrameworkGraph {
                context: GRAPH_CONTEXT.into(),
                id: graph_url.clone(),
                graph,
            },
        };

        info!(%graph_url, "publishing competency framework");

        let publish_url = self.endpoints.publish_url();
        let response = self
            .http
            .post(&publish_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(|e| SkillSyncError::Network(format!("{publish_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillSyncError::Network(format!(
                "failed to publish framework to {publish_url}: HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SkillSyncError::Network(format!("{publish_url}: {e}")))?;

        let receipt = match serde_json::from_str::<PublishResponse>(&body) {
            Ok(parsed) if parsed.successful => {
                info!(
                    graph_url = parsed.graph_url.as_deref().unwrap_or("<none>"),
                    "framework publish request successful"
                );
                PublishReceipt {
                    successful: true,
                    graph_url: parsed.graph_url,
                    messages: parsed.messages,
                }
            }
            Ok(parsed) => {
                warn!(response = %body, "registry reported an unsuccessful publish");
                PublishReceipt {
                    successful: false,
                    graph_url: parsed.graph_url,
                    messages: parsed.messages,
                }
            }
            Err(_) => {
                warn!(response = %body, "unrecognized publish response");
                PublishReceipt {
                    successful: false,
                    graph_url: None,
                    messages: vec![body],
                }
            }
        };

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skillsync_shared::{Competency, RegistryConnection, RegistryEnvironment};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORG_CTID: &str = "ce-9d30f846-dfa4-4b1c-90fa-9d01238a86ac";
    const FRAMEWORK_CTID: &str = "ce-3e7df7ec-1a9b-4503-9ff3-21256022b515";

    fn competency(ctid: &str, endpoints: &Endpoints) -> Competency {
        Competency {
            id: endpoints.resource_url(ctid),
            kind: "ceasn:Competency".into(),
            ctid: ctid.into(),
            label: lang_map("en-us", "Label"),
            text: lang_map("en-us", "Text"),
            keywords: None,
            category: None,
            in_language: Some(vec!["en-us".into()]),
            is_part_of: endpoints.resource_url(FRAMEWORK_CTID),
            is_top_child_of: None,
            skill_embodied: None,
            exact_alignment: None,
            major_alignment: None,
            extra: serde_json::Map::new(),
        }
    }

    fn library_with(endpoints: &Endpoints, ctids: &[&str]) -> CompetencyLibrary {
        let mut library = CompetencyLibrary::new();
        library.set_framework_ctid(FRAMEWORK_CTID);
        for ctid in ctids {
            library.insert_competency(competency(ctid, endpoints));
        }
        library
    }

    fn client_for(server: &MockServer) -> RegistryClient {
        RegistryClient::with_endpoints(
            RegistryConnection {
                environment: RegistryEnvironment::Sandbox,
                organization_id: ORG_CTID.into(),
                api_key: "11111111-aaaa-bbbb-cccc-000000000000".into(),
            },
            Endpoints::custom(server.uri(), format!("{}/assistant", server.uri())),
        )
        .unwrap()
    }

    #[test]
    fn framework_document_lists_children_in_insertion_order() {
        let endpoints = Endpoints::custom("https://registry.test", "https://registry.test/assistant");
        let library = library_with(
            &endpoints,
            &[
                "ce-22222222-aaaa-bbbb-cccc-000000000000",
                "ce-11111111-aaaa-bbbb-cccc-000000000000",
            ],
        );

        let framework = build_framework_document(
            &endpoints,
            ORG_CTID,
            FRAMEWORK_CTID,
            "osmt.example.com",
            "en-us",
            &library,
        );

        assert_eq!(framework.ctid, FRAMEWORK_CTID);
        assert_eq!(framework.name["en-us"], "OSMT Open Skills Library");
        assert!(framework.description["en-us"].contains("osmt.example.com"));
        assert_eq!(framework.publisher, vec![endpoints.resource_url(ORG_CTID)]);
        assert_eq!(
            framework.has_top_child,
            vec![
                endpoints.resource_url("ce-22222222-aaaa-bbbb-cccc-000000000000"),
                endpoints.resource_url("ce-11111111-aaaa-bbbb-cccc-000000000000"),
            ]
        );
    }

    #[tokio::test]
    async fn successful_publish_returns_graph_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant/competencyframework/publishgraph"))
            .and(header("Authorization", "ApiToken 11111111-aaaa-bbbb-cccc-000000000000"))
            .and(body_partial_json(json!({
                "CTID": FRAMEWORK_CTID,
                "PublishForOrganizationIdentifier": ORG_CTID,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Successful": true,
                "Messages": [],
                "GraphUrl": format!("https://registry.test/graph/{FRAMEWORK_CTID}"),
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let library = library_with(client.endpoints(), &["ce-11111111-aaaa-bbbb-cccc-000000000000"]);
        let receipt = client
            .publish_framework("osmt.example.com", "en-us", &library)
            .await
            .unwrap();

        assert!(receipt.successful);
        assert!(receipt.graph_url.unwrap().contains("/graph/"));
    }

    #[tokio::test]
    async fn registry_rejection_is_a_soft_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant/competencyframework/publishgraph"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Successful": false,
                "Messages": ["ceasn:description is required"],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let library = library_with(client.endpoints(), &[]);
        let receipt = client
            .publish_framework("osmt.example.com", "en-us", &library)
            .await
            .unwrap();

        assert!(!receipt.successful);
        assert_eq!(receipt.messages, vec!["ceasn:description is required"]);
    }

    #[tokio::test]
    async fn malformed_publish_response_is_a_soft_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant/competencyframework/publishgraph"))
            .respond_with(ResponseTemplate::new(200).set_body_string("gateway says hi"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let library = library_with(client.endpoints(), &[]);
        let receipt = client
            .publish_framework("osmt.example.com", "en-us", &library)
            .await
            .unwrap();

        assert!(!receipt.successful);
        assert_eq!(receipt.messages, vec!["gateway says hi"]);
    }

    #[tokio::test]
    async fn transport_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant/competencyframework/publishgraph"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let library = library_with(client.endpoints(), &[]);
        let err = client
            .publish_framework("osmt.example.com", "en-us", &library)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to publish framework"));
        assert!(err.to_string().contains("HTTP 500"));
    }
}

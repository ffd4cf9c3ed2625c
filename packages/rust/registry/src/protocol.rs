//! Registry assistant wire types.
//!
//! These are the assistant API's request/response structures as sent over
//! HTTP. They are NOT the domain types from skillsync-shared -- those are
//! environment-agnostic CTDL records; these carry the assistant's own
//! PascalCase envelope fields.

use serde::{Deserialize, Serialize};

/// JSON-LD context URL attached to every published framework graph.
pub const GRAPH_CONTEXT: &str = "https://credreg.net/ctdlasn/schema/context/json";

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Body for `POST /search/ctdl`.
#[derive(Debug, Clone, Serialize)]
pub struct CtdlSearchRequest {
    #[serde(rename = "Query")]
    pub query: CtdlFrameworkQuery,
    #[serde(rename = "Take")]
    pub take: u32,
    #[serde(rename = "Skip")]
    pub skip: u32,
}

/// CTDL query matching a framework by type, publisher, and name.
#[derive(Debug, Clone, Serialize)]
pub struct CtdlFrameworkQuery {
    #[serde(rename = "@type")]
    pub kind: Vec<String>,
    /// Publishing organization's resource URL.
    #[serde(rename = "ceasn:publisher")]
    pub publisher: String,
    #[serde(rename = "ceasn:name")]
    pub name: String,
}

/// Response from `POST /search/ctdl`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtdlSearchResponse {
    #[serde(default)]
    pub data: Option<Vec<CtdlSearchHit>>,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub status: Option<String>,
}

/// One search result row.
#[derive(Debug, Clone, Deserialize)]
pub struct CtdlSearchHit {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "ceterms:ctid", default)]
    pub ctid: Option<String>,
}

// ---------------------------------------------------------------------------
// Graph fetch
// ---------------------------------------------------------------------------

/// Linked-data document returned by `GET /graph/{ctid}`.
///
/// Nodes are kept as raw JSON values; the session partitions them by
/// `@type` before deserializing into typed records.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocument {
    #[serde(rename = "@context", default)]
    pub context: Option<String>,
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(rename = "@graph", default)]
    pub graph: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

/// Body for `POST /competencyframework/publishgraph`.
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    #[serde(rename = "CTID")]
    pub ctid: String,
    #[serde(rename = "PublishForOrganizationIdentifier")]
    pub organization_id: String,
    #[serde(rename = "CompetencyFrameworkGraph")]
    pub graph: FrameworkGraph,
}

/// The framework graph payload: one framework node plus its members.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkGraph {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@graph")]
    pub graph: Vec<serde_json::Value>,
}

/// Response from the publish endpoint.
///
/// Every field defaults so that a sparse or unexpected body still
/// deserializes; `successful` then reads false and the run reports a
/// soft failure instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishResponse {
    #[serde(rename = "Successful", default)]
    pub successful: bool,
    #[serde(rename = "Messages", default)]
    pub messages: Vec<String>,
    #[serde(rename = "CTID", default)]
    pub ctid: Option<String>,
    #[serde(rename = "GraphUrl", default)]
    pub graph_url: Option<String>,
    #[serde(rename = "EnvelopeUrl", default)]
    pub envelope_url: Option<String>,
    #[serde(rename = "CredentialFinderUrl", default)]
    pub credential_finder_url: Option<String>,
    #[serde(rename = "RegistryEnvelopeIdentifier", default)]
    pub registry_envelope_identifier: Option<String>,
    #[serde(rename = "ResponseDate", default)]
    pub response_date: Option<String>,
}

//! Core domain types for SkillSync catalog reconciliation.
//!
//! Two independent ID spaces meet here: OSMT skill ids (URL-shaped,
//! scoped to the source domain) and registry CTIDs (`ce-<uuid>`).
//! Source-side types mirror the OSMT REST payloads; registry-side types
//! mirror the CTDL ASN JSON-LD vocabulary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed name of the published framework, used both to find an existing
/// framework on the registry and to name a freshly created one.
pub const FRAMEWORK_NAME: &str = "OSMT Open Skills Library";

// ---------------------------------------------------------------------------
// Skill id normalization
// ---------------------------------------------------------------------------

/// Normalize an OSMT skill id for use as a catalog key.
///
/// Some OSMT environments prefix the id with a stray dash; strip it.
pub fn normalize_skill_id(id: &str) -> String {
    id.strip_prefix('-').unwrap_or(id).to_string()
}

// ---------------------------------------------------------------------------
// CTID
// ---------------------------------------------------------------------------

/// Length of a well-formed CTID: `ce-` plus a hyphenated UUID.
pub const CTID_LEN: usize = 39;

/// Mint a fresh registry CTID (`ce-<random uuid>`).
pub fn new_ctid() -> String {
    format!("ce-{}", Uuid::new_v4())
}

/// Check whether a string has the shape of a registry CTID.
pub fn is_ctid(value: &str) -> bool {
    value.len() == CTID_LEN
        && value.starts_with("ce-")
        && Uuid::parse_str(&value[3..]).is_ok()
}

// ---------------------------------------------------------------------------
// Source skill types (OSMT REST payloads)
// ---------------------------------------------------------------------------

/// Minimal catalog entry returned by `GET /api/skills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSkill {
    /// URL-shaped identifier scoped to the source domain, e.g.
    /// `http://osmt.example.com/api/skills/60f17310-...`.
    pub id: String,
    /// Bare UUID used for the per-skill detail endpoint.
    pub uuid: String,
    pub skill_name: String,
    pub skill_statement: String,
    #[serde(default)]
    pub authors: Vec<String>,
    /// Always "published" for skills visible through the public API.
    pub status: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
}

/// Reference to a collection a skill belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRef {
    pub uuid: String,
    pub name: String,
}

/// A named entity attached to a skill (certification, employer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// A standard attached to a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRef {
    pub skill_name: String,
}

/// An external alignment attached to a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAlignment {
    /// Alignment target URL, e.g. a Wikipedia article.
    pub id: String,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub is_part_of: Option<NamedRef>,
}

/// Full skill record returned by `GET /api/skills/{uuid}`.
///
/// Extends [`SourceSkill`] with collection membership, categories,
/// alignments, and lifecycle timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSkillDetail {
    #[serde(flatten)]
    pub skill: SourceSkill,
    /// Always "RichSkillDescriptor".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub collections: Vec<CollectionRef>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<NamedRef>,
    #[serde(default)]
    pub standards: Vec<StandardRef>,
    #[serde(default)]
    pub alignments: Vec<SkillAlignment>,
    #[serde(default)]
    pub employers: Vec<NamedRef>,
    #[serde(default)]
    pub creator: Option<String>,
}

/// A catalog entry: either the paginated summary or the enriched detail.
///
/// A summary is replaced by its detail when the per-skill fetch lands;
/// a record may remain a summary for the whole run if enrichment keys
/// the detail elsewhere (the server's own id wins).
#[derive(Debug, Clone)]
pub enum SkillRecord {
    Detail(SourceSkillDetail),
    Summary(SourceSkill),
}

impl SkillRecord {
    /// The record's catalog id.
    pub fn id(&self) -> &str {
        &self.summary().id
    }

    /// The bare UUID used for detail lookups.
    pub fn uuid(&self) -> &str {
        &self.summary().uuid
    }

    /// The summary fields, available on both variants.
    pub fn summary(&self) -> &SourceSkill {
        match self {
            SkillRecord::Summary(s) => s,
            SkillRecord::Detail(d) => &d.skill,
        }
    }

    /// The detail fields, if this record has been enriched.
    pub fn detail(&self) -> Option<&SourceSkillDetail> {
        match self {
            SkillRecord::Summary(_) => None,
            SkillRecord::Detail(d) => Some(d),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry connection
// ---------------------------------------------------------------------------

/// Which Credential Registry deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryEnvironment {
    Sandbox,
    Production,
}

impl std::fmt::Display for RegistryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEnvironment::Sandbox => write!(f, "sandbox"),
            RegistryEnvironment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for RegistryEnvironment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(RegistryEnvironment::Sandbox),
            "production" => Ok(RegistryEnvironment::Production),
            other => Err(format!(
                "unknown registry environment '{other}': expected 'sandbox' or 'production'"
            )),
        }
    }
}

/// Credentials and target environment for one sync run. Immutable once
/// configured.
#[derive(Debug, Clone)]
pub struct RegistryConnection {
    pub environment: RegistryEnvironment,
    /// CTID of the publishing organization.
    pub organization_id: String,
    /// Registry assistant API key, sent as `Authorization: ApiToken <key>`.
    pub api_key: String,
}

// ---------------------------------------------------------------------------
// CTDL language maps
// ---------------------------------------------------------------------------

/// A property keyed by language tag, e.g. `{"en-us": "Access Creation"}`.
pub type LanguageMap = HashMap<String, String>;

/// A plural property keyed by language tag, e.g.
/// `{"en-us": ["Authentication", "SafeNet"]}`.
pub type LanguageMapPlural = HashMap<String, Vec<String>>;

/// Build a single-language [`LanguageMap`].
pub fn lang_map(language: &str, value: impl Into<String>) -> LanguageMap {
    HashMap::from([(language.to_string(), value.into())])
}

/// Build a single-language [`LanguageMapPlural`].
pub fn lang_map_plural(language: &str, values: Vec<String>) -> LanguageMapPlural {
    HashMap::from([(language.to_string(), values)])
}

// ---------------------------------------------------------------------------
// CTDL records (registry schema)
// ---------------------------------------------------------------------------

/// A `ceasn:Competency` node as published to (and read back from) the
/// registry graph.
///
/// Registry-managed properties we do not map explicitly (dates, envelope
/// metadata) are carried in `extra` so that updating an existing
/// competency preserves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    /// Resource URL, `{registry}/resources/{ctid}`.
    #[serde(rename = "@id")]
    pub id: String,
    /// Always "ceasn:Competency".
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "ceterms:ctid")]
    pub ctid: String,
    #[serde(rename = "ceasn:competencyLabel", default)]
    pub label: LanguageMap,
    #[serde(rename = "ceasn:competencyText", default)]
    pub text: LanguageMap,
    #[serde(
        rename = "ceasn:conceptKeyword",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub keywords: Option<LanguageMapPlural>,
    #[serde(
        rename = "ceasn:competencyCategory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<LanguageMap>,
    #[serde(
        rename = "ceterms:inLanguage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub in_language: Option<Vec<String>>,
    /// Framework resource URL this competency belongs to.
    #[serde(rename = "ceasn:isPartOf", default)]
    pub is_part_of: String,
    #[serde(
        rename = "ceasn:isTopChildOf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_top_child_of: Option<String>,
    /// Source skill URL(s) this competency embodies. The reconciliation
    /// key between the two ID spaces.
    #[serde(
        rename = "ceasn:skillEmbodied",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub skill_embodied: Option<Vec<String>>,
    #[serde(
        rename = "ceasn:exactAlignment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exact_alignment: Option<Vec<String>>,
    #[serde(
        rename = "ceasn:majorAlignment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub major_alignment: Option<Vec<String>>,
    /// Registry-managed properties preserved verbatim across updates.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A `ceasn:CompetencyFramework` node: the organization-published
/// collection the competencies hang off of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyFramework {
    #[serde(rename = "@id")]
    pub id: String,
    /// Always "ceasn:CompetencyFramework".
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(rename = "ceterms:ctid")]
    pub ctid: String,
    #[serde(rename = "ceasn:name", default)]
    pub name: LanguageMap,
    #[serde(rename = "ceasn:description", default)]
    pub description: LanguageMap,
    #[serde(rename = "ceasn:inLanguage", default)]
    pub in_language: Vec<String>,
    /// Organization resource URL(s).
    #[serde(rename = "ceasn:publisher", default)]
    pub publisher: Vec<String>,
    /// Resource URLs of the framework's top-level competencies.
    #[serde(rename = "ceasn:hasTopChild", default)]
    pub has_top_child: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

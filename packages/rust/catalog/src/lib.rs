//! Source catalog ingestion and per-skill detail enrichment.
//!
//! Ingestion walks `GET /api/skills` page by page via `Link` headers and
//! replaces the working catalog wholesale. Enrichment fetches one skill's
//! full record at a time; its start is staggered by a caller-chosen delay
//! so a large fan-out approximates the source's external rate ceiling.

pub mod pagination;

use std::time::Duration;

use reqwest::header::{ACCEPT, LINK};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use skillsync_shared::{CatalogConfig, Result, SkillSyncError, SourceSkill, SourceSkillDetail};
use skillsync_store::WorkingCatalog;

/// User-Agent string for catalog requests.
const USER_AGENT: &str = concat!("SkillSync/", env!("CARGO_PKG_VERSION"));

/// The one non-hostname domain value accepted for local development.
const LOCAL_DEV_HOST: &str = "localhost:8080";

// ---------------------------------------------------------------------------
// Domain validation
// ---------------------------------------------------------------------------

/// Validate that `domain` is a plausible public hostname, with a
/// carve-out for the fixed local-development host.
///
/// The failure message is shown to the operator verbatim, so it names
/// the URL they should double-check.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain == LOCAL_DEV_HOST {
        return Ok(());
    }

    let hostname =
        regex::Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
            .expect("hostname pattern is valid");

    if !hostname.is_match(domain) {
        return Err(SkillSyncError::validation(format!(
            "This domain appears to be invalid. Double-check that \
             https://{domain}/api/skills is a valid URL."
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// HTTP client for one OSMT instance.
pub struct CatalogClient {
    client: Client,
    base_url: String,
    max_pages: u32,
}

impl CatalogClient {
    /// Create a client against an explicit base URL (local dev, tests).
    pub fn new(base_url: impl Into<String>, config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SkillSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_pages: config.max_pages,
        })
    }

    /// Validate `domain` and create a client for `http://{domain}`.
    pub fn for_domain(domain: &str, config: &CatalogConfig) -> Result<Self> {
        validate_domain(domain)?;
        Self::new(format!("http://{domain}"), config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the complete skill catalog, following `Link: rel="next"`
    /// headers until the last page.
    ///
    /// Every page must answer 200 exactly; anything else aborts the whole
    /// ingestion with an error citing the URL. Records come back in page
    /// order. The page ceiling guards against an upstream that links in a
    /// cycle.
    #[instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn fetch_all_skills(&self) -> Result<Vec<SourceSkill>> {
        let mut url = format!("{}/api/skills", self.base_url);
        let mut fetched: Vec<SourceSkill> = Vec::new();
        let mut pages: u32 = 0;

        loop {
            pages += 1;
            if pages > self.max_pages {
                return Err(SkillSyncError::Network(format!(
                    "{url}: pagination exceeded {} pages, refusing to follow further Link headers",
                    self.max_pages
                )));
            }

            debug!(%url, page = pages, "fetching catalog page");

            let response = self
                .client
                .get(&url)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| SkillSyncError::Network(format!("{url}: {e}")))?;

            if response.status() != StatusCode::OK {
                return Err(SkillSyncError::Network(format!(
                    "Did not get expected response from {url}. Double-check that this is \
                     the right URL and it is correctly returning skills data."
                )));
            }

            let link_header = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let page: Vec<SourceSkill> = response
                .json()
                .await
                .map_err(|e| SkillSyncError::parse(format!("{url}: {e}")))?;

            debug!(page = pages, count = page.len(), "catalog page fetched");
            fetched.extend(page);

            match link_header.as_deref().and_then(pagination::next_link) {
                Some(next) => url = next,
                None => break,
            }
        }

        info!(skills = fetched.len(), pages, "catalog ingestion complete");
        Ok(fetched)
    }

    /// Fetch one skill's full record, after suspending for `delay`.
    ///
    /// Looked up by the skill's bare `uuid`, not its catalog id. Any
    /// non-2xx response is an error naming the skill and URL; the caller
    /// treats it as fatal to the whole enrichment batch.
    #[instrument(skip_all, fields(skill_id = %skill.id))]
    pub async fn fetch_skill_detail(
        &self,
        skill: &SourceSkill,
        delay: Duration,
    ) -> Result<SourceSkillDetail> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = format!("{}/api/skills/{}", self.base_url, skill.uuid);
        debug!(%url, "fetching skill detail");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                SkillSyncError::Network(format!("failed to fetch skill {} from {url}: {e}", skill.id))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkillSyncError::Network(format!(
                "failed to fetch skill {} from {url}: HTTP {status}",
                skill.id
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SkillSyncError::parse(format!("skill {} from {url}: {e}", skill.id)))
    }
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Ingest the full catalog from `domain` into the working set.
///
/// Validates the domain before any network call. On success the
/// catalog's skill map is replaced atomically (ids normalized) and the
/// validated domain recorded; on any fetch error the working set is left
/// untouched and the error is handed back for the caller to decide.
pub async fn ingest(
    domain: &str,
    config: &CatalogConfig,
    catalog: &mut WorkingCatalog,
) -> Result<usize> {
    let client = CatalogClient::for_domain(domain, config)?;
    ingest_with(&client, domain, catalog).await
}

/// Ingest using an already-built client (endpoint overrides, tests).
pub async fn ingest_with(
    client: &CatalogClient,
    domain: &str,
    catalog: &mut WorkingCatalog,
) -> Result<usize> {
    let skills = client.fetch_all_skills().await?;
    catalog.set_domain(domain);
    catalog.replace_skills(skills);
    Ok(catalog.len())
}

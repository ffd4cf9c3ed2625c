//! End-to-end sync pipeline: ingest → session → enrich → reconcile → publish.
//!
//! One logical control flow with concurrent outstanding requests only
//! during enrichment. Two barriers order the run: all details are
//! fetched before reconciliation starts, and reconciliation finishes
//! before publication. A single failed detail fetch fails the whole
//! batch and nothing downstream runs.

use std::time::{Duration, Instant};

use futures_util::stream::{FuturesUnordered, TryStreamExt};
use rand::Rng;
use tracing::{info, instrument, warn};

use skillsync_catalog::CatalogClient;
use skillsync_registry::{Endpoints, MappingContext, PublishReceipt, RegistryClient, reconcile};
use skillsync_shared::{
    CatalogConfig, RegistryConnection, Result, SourceSkill, SourceSkillDetail,
};
use skillsync_store::{CompetencyLibrary, WorkingCatalog};

/// Configuration for one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// OSMT instance to pull the catalog from.
    pub source_domain: String,
    /// Registry environment, organization, and credentials.
    pub connection: RegistryConnection,
    /// Default language tag for CTDL language maps.
    pub language: String,
    /// Catalog fetch limits and rate shaping.
    pub catalog: CatalogConfig,
    /// Explicit catalog base URL (local mock/dev instances). Skips
    /// domain validation when set.
    pub source_base_url: Option<String>,
    /// Explicit registry endpoints (local mock servers).
    pub registry_endpoints: Option<Endpoints>,
}

/// Result of a completed sync run.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Skills ingested from the source catalog.
    pub skills_ingested: usize,
    /// Detail records fetched during enrichment.
    pub details_fetched: usize,
    /// Competencies included in the published graph.
    pub competencies_published: usize,
    /// CTID the framework was published under.
    pub framework_ctid: String,
    /// Whether an existing registry framework was reused.
    pub framework_reused: bool,
    /// Competencies already present on the registry before the run.
    pub existing_competencies: usize,
    /// What the registry said about the publish.
    pub publish: PublishReceipt,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a skill's detail record lands during enrichment.
    fn skill_fetched(&self, skill_id: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &SyncOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn skill_fetched(&self, _skill_id: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &SyncOutcome) {}
}

/// Run the full sync.
///
/// 1. Ingest the source catalog (paginated, domain-validated)
/// 2. Resolve the registry session (org, existing framework, graph)
/// 3. Enrich every skill with its detail record (concurrent, fail-fast)
/// 4. Reconcile identities into the competency library
/// 5. Publish the framework graph
#[instrument(skip_all, fields(domain = %config.source_domain, environment = %config.connection.environment))]
pub async fn run_sync(
    config: &SyncConfig,
    progress: &dyn ProgressReporter,
) -> Result<SyncOutcome> {
    let start = Instant::now();

    let mut catalog = WorkingCatalog::new();
    let mut library = CompetencyLibrary::new();

    // --- Phase 1: Catalog ingestion ---
    progress.phase("Fetching skill catalog");
    let catalog_client = match &config.source_base_url {
        Some(base) => CatalogClient::new(base.clone(), &config.catalog)?,
        None => CatalogClient::for_domain(&config.source_domain, &config.catalog)?,
    };
    let skills_ingested =
        skillsync_catalog::ingest_with(&catalog_client, &config.source_domain, &mut catalog)
            .await?;
    info!(skills = skills_ingested, "catalog ingested");

    if catalog.is_empty() {
        warn!("source catalog is empty; an empty framework will be published");
    }

    // --- Phase 2: Registry session ---
    progress.phase("Resolving registry session");
    let registry = match config.registry_endpoints.clone() {
        Some(endpoints) => RegistryClient::with_endpoints(config.connection.clone(), endpoints)?,
        None => RegistryClient::new(config.connection.clone())?,
    };
    let session = registry.resolve_session(&mut library).await?;

    // --- Phase 3: Detail enrichment ---
    progress.phase("Fetching skill details");
    let details = fetch_all_details(
        &catalog_client,
        catalog.summaries(),
        config.catalog.requests_per_second,
        progress,
    )
    .await?;

    // Upserts happen after the join barrier, from the single control
    // flow, so the store needs no locking.
    let details_fetched = details.len();
    for detail in details {
        catalog.upsert_detail(detail);
    }
    info!(details = details_fetched, "skill details fetched");

    // --- Phase 4: Identity reconciliation ---
    progress.phase("Reconciling identities");
    let ctx = MappingContext {
        registry_base: &registry.endpoints().registry,
        framework_ctid: &session.framework_ctid,
        language: &config.language,
    };
    for detail in catalog.details() {
        let existing = library.find_existing_by_skill_id(&detail.skill.id).cloned();
        let competency = reconcile(detail, existing.as_ref(), &ctx);
        library.insert_competency(competency);
    }
    info!(
        competencies = library.len(),
        existing = session.existing_competencies,
        "reconciliation complete"
    );

    // --- Phase 5: Publish ---
    progress.phase("Publishing framework graph");
    let source_domain = catalog.domain().unwrap_or(&config.source_domain).to_string();
    let publish = registry
        .publish_framework(&source_domain, &config.language, &library)
        .await?;

    let outcome = SyncOutcome {
        skills_ingested,
        details_fetched,
        competencies_published: library.len(),
        framework_ctid: session.framework_ctid,
        framework_reused: session.framework_reused,
        existing_competencies: session.existing_competencies,
        publish,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);

    info!(
        skills = outcome.skills_ingested,
        competencies = outcome.competencies_published,
        framework_ctid = %outcome.framework_ctid,
        publish_successful = outcome.publish.successful,
        elapsed_ms = outcome.elapsed.as_millis(),
        "sync complete"
    );

    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Enrichment fan-out
// ---------------------------------------------------------------------------

/// Launch every detail fetch concurrently, each after its own random
/// stagger, and await the whole batch.
///
/// The first failure fails the batch; outstanding requests are dropped
/// with it. No ordering is guaranteed among individual fetches.
async fn fetch_all_details(
    client: &CatalogClient,
    summaries: Vec<SourceSkill>,
    requests_per_second: u32,
    progress: &dyn ProgressReporter,
) -> Result<Vec<SourceSkillDetail>> {
    let total = summaries.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let delays = stagger_delays(total, requests_per_second);
    let mut in_flight: FuturesUnordered<_> = summaries
        .iter()
        .zip(delays)
        .map(|(skill, delay)| client.fetch_skill_detail(skill, delay))
        .collect();

    let mut details = Vec::with_capacity(total);
    while let Some(detail) = in_flight.try_next().await? {
        progress.skill_fetched(&detail.skill.id, details.len() + 1, total);
        details.push(detail);
    }
    Ok(details)
}

/// One random start delay per record, uniform over the window that makes
/// the batch average out to `requests_per_second`.
///
/// Advisory shaping only: starts are staggered, concurrency is not
/// otherwise bounded, and nothing reacts to throttling responses.
fn stagger_delays(count: usize, requests_per_second: u32) -> Vec<Duration> {
    let rps = u64::from(requests_per_second.max(1));
    let window_ms = (count as u64).saturating_mul(1000) / rps;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| Duration::from_millis(rng.gen_range(0..=window_ms)))
        .collect()
}

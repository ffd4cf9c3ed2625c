//! In-process working set for one sync run.
//!
//! Holds the source-side catalog ([`WorkingCatalog`]) and the
//! registry-side state ([`CompetencyLibrary`]). Both are plain value
//! structures passed by reference into the pipeline components; every
//! mutation goes through a named operation here, never through ad hoc
//! field access. Nothing is persisted beyond the run.

use std::collections::HashMap;

use skillsync_shared::{
    Competency, CompetencyFramework, SkillRecord, SourceSkill, SourceSkillDetail,
    normalize_skill_id,
};
use tracing::debug;

// ---------------------------------------------------------------------------
// WorkingCatalog
// ---------------------------------------------------------------------------

/// The source-side working set: the validated domain plus all skills
/// fetched from it, keyed by normalized skill id.
///
/// Iteration order is insertion order, so a run's downstream output is
/// stable with respect to the catalog page order.
#[derive(Debug, Default)]
pub struct WorkingCatalog {
    domain: Option<String>,
    order: Vec<String>,
    skills: HashMap<String, SkillRecord>,
}

impl WorkingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the validated source domain.
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = Some(domain.into());
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Replace the entire skill map with a freshly ingested catalog.
    ///
    /// Ids are normalized on the way in; a later page wins if the source
    /// ever repeats an id. Full replace, never a merge.
    pub fn replace_skills(&mut self, skills: Vec<SourceSkill>) {
        self.order.clear();
        self.skills.clear();
        for mut skill in skills {
            skill.id = normalize_skill_id(&skill.id);
            let key = skill.id.clone();
            if self.skills.insert(key.clone(), SkillRecord::Summary(skill)).is_none() {
                self.order.push(key);
            }
        }
        debug!(count = self.skills.len(), "catalog replaced");
    }

    /// Upsert an enriched detail record, keyed by the payload's own id.
    ///
    /// The server's id may differ from the key the summary was filed
    /// under; the payload id wins and the summary entry is left alone in
    /// that case.
    pub fn upsert_detail(&mut self, detail: SourceSkillDetail) {
        let key = detail.skill.id.clone();
        if self.skills.insert(key.clone(), SkillRecord::Detail(detail)).is_none() {
            self.order.push(key);
        }
    }

    /// Remove a skill from the working set. Returns the removed record.
    pub fn remove_skill(&mut self, id: &str) -> Option<SkillRecord> {
        let removed = self.skills.remove(id);
        if removed.is_some() {
            self.order.retain(|k| k != id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&SkillRecord> {
        self.skills.get(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// All records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &SkillRecord> {
        self.order.iter().filter_map(|k| self.skills.get(k))
    }

    /// Cloned summary views of every record, in insertion order. Used to
    /// drive the enrichment fan-out without holding a borrow across
    /// suspension points.
    pub fn summaries(&self) -> Vec<SourceSkill> {
        self.records().map(|r| r.summary().clone()).collect()
    }

    /// All enriched records in insertion order.
    pub fn details(&self) -> impl Iterator<Item = &SourceSkillDetail> {
        self.records().filter_map(|r| r.detail())
    }
}

// ---------------------------------------------------------------------------
// CompetencyLibrary
// ---------------------------------------------------------------------------

/// The registry-side working set: the framework identity for this run,
/// whatever the registry already holds, and the competencies mapped
/// during reconciliation.
///
/// The existing side is populated once by the registry session; the new
/// side is filled by reconciliation and consumed once by publication.
#[derive(Debug, Default)]
pub struct CompetencyLibrary {
    framework_ctid: Option<String>,
    existing_framework: Option<CompetencyFramework>,
    existing: Vec<Competency>,
    fresh: Vec<Competency>,
}

impl CompetencyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the framework CTID this run will publish under, either
    /// reused from the registry or freshly minted.
    pub fn set_framework_ctid(&mut self, ctid: impl Into<String>) {
        self.framework_ctid = Some(ctid.into());
    }

    pub fn framework_ctid(&self) -> Option<&str> {
        self.framework_ctid.as_deref()
    }

    /// Store the framework node loaded from the registry graph.
    pub fn record_existing_framework(&mut self, framework: CompetencyFramework) {
        self.existing_framework = Some(framework);
    }

    pub fn existing_framework(&self) -> Option<&CompetencyFramework> {
        self.existing_framework.as_ref()
    }

    /// Replace the set of competencies already published on the registry.
    pub fn replace_existing(&mut self, competencies: Vec<Competency>) {
        self.existing = competencies;
    }

    pub fn existing_len(&self) -> usize {
        self.existing.len()
    }

    /// Find the already-published competency linked to a source skill,
    /// by `ceasn:skillEmbodied` membership. Linear scan, first match.
    pub fn find_existing_by_skill_id(&self, skill_id: &str) -> Option<&Competency> {
        self.existing.iter().find(|c| {
            c.skill_embodied
                .as_ref()
                .is_some_and(|ids| ids.iter().any(|id| id == skill_id))
        })
    }

    /// Insert a reconciled competency into the new side.
    ///
    /// Upsert by CTID: a repeat insert replaces the earlier record in
    /// place, so insertion order is preserved and at most one competency
    /// exists per CTID.
    pub fn insert_competency(&mut self, competency: Competency) {
        match self.fresh.iter_mut().find(|c| c.ctid == competency.ctid) {
            Some(slot) => *slot = competency,
            None => self.fresh.push(competency),
        }
    }

    /// The reconciled competencies, in insertion order.
    pub fn competencies(&self) -> &[Competency] {
        &self.fresh
    }

    pub fn len(&self) -> usize {
        self.fresh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty()
    }
}

//! Identity reconciliation between source skill ids and registry CTIDs.
//!
//! Pure mapping, no I/O. A skill already linked to a published
//! competency keeps that competency's CTID (and every registry-managed
//! field we do not overwrite); any other skill gets a freshly minted
//! CTID.

use skillsync_shared::{
    Competency, SourceSkillDetail, lang_map, lang_map_plural, new_ctid,
};

/// Everything the mapping needs beyond the skill itself.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    /// Registry resource-service base URL.
    pub registry_base: &'a str,
    /// CTID of the framework this run publishes under.
    pub framework_ctid: &'a str,
    /// Default language tag for CTDL language maps.
    pub language: &'a str,
}

/// Map a source skill detail into a registry competency, reusing the
/// identity of `existing` when present.
///
/// Content fields are overwritten wholesale; fields carried on the
/// existing record that we do not map (dates, envelope metadata) persist
/// untouched.
pub fn reconcile(
    detail: &SourceSkillDetail,
    existing: Option<&Competency>,
    ctx: &MappingContext<'_>,
) -> Competency {
    let ctid = existing
        .map(|c| c.ctid.clone())
        .unwrap_or_else(new_ctid);

    let mut competency = existing.cloned().unwrap_or_else(|| Competency {
        id: String::new(),
        kind: "ceasn:Competency".into(),
        ctid: ctid.clone(),
        label: Default::default(),
        text: Default::default(),
        keywords: None,
        category: None,
        in_language: None,
        is_part_of: String::new(),
        is_top_child_of: None,
        skill_embodied: None,
        exact_alignment: None,
        major_alignment: None,
        extra: serde_json::Map::new(),
    });

    competency.id = format!("{}/resources/{ctid}", ctx.registry_base);
    competency.ctid = ctid;
    competency.label = lang_map(ctx.language, detail.skill.skill_name.clone());
    competency.text = lang_map(ctx.language, detail.skill.skill_statement.clone());
    competency.keywords = Some(lang_map_plural(ctx.language, detail.skill.keywords.clone()));
    competency.category = Some(lang_map(ctx.language, detail.categories.join(", ")));
    competency.in_language = Some(vec![ctx.language.to_string()]);
    competency.is_part_of = format!("{}/resources/{}", ctx.registry_base, ctx.framework_ctid);
    // The source skill URL serves as both the embodied skill and the
    // exact alignment; the registry's own sample frameworks reference
    // OSMT skills this way.
    competency.skill_embodied = Some(vec![detail.skill.id.clone()]);
    competency.exact_alignment = Some(vec![detail.skill.id.clone()]);
    competency.major_alignment = Some(detail.alignments.iter().map(|a| a.id.clone()).collect());

    competency
}

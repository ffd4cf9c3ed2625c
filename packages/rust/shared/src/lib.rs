//! Shared types, error model, and configuration for SkillSync.
//!
//! This crate is the foundation depended on by all other SkillSync crates.
//! It provides:
//! - [`SkillSyncError`] — the unified error type
//! - Domain types ([`SourceSkill`], [`SourceSkillDetail`], [`Competency`],
//!   [`CompetencyFramework`], [`RegistryConnection`])
//! - Configuration ([`AppConfig`], [`CatalogConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, DefaultsConfig, RegistryConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_key, validate_org_ctid,
};
pub use error::{Result, SkillSyncError};
pub use types::{
    CTID_LEN, CollectionRef, Competency, CompetencyFramework, FRAMEWORK_NAME, LanguageMap,
    LanguageMapPlural, NamedRef, RegistryConnection, RegistryEnvironment, SkillAlignment,
    SkillRecord, SourceSkill, SourceSkillDetail, StandardRef, is_ctid, lang_map, lang_map_plural,
    new_ctid, normalize_skill_id,
};

//! Core pipeline orchestration for SkillSync.
//!
//! Ties together catalog ingestion, registry session resolution, detail
//! enrichment, identity reconciliation, and framework publication into
//! the end-to-end `run_sync` flow.

pub mod pipeline;

pub use pipeline::{
    ProgressReporter, SilentProgress, SyncConfig, SyncOutcome, run_sync,
};

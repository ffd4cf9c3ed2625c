//! Credential Registry integration.
//!
//! Three concerns live here, mirroring the run's registry-side phases:
//! - session resolution (organization lookup, existing-framework search,
//!   graph loading) in [`session`]
//! - identity reconciliation (pure source-skill → competency mapping)
//!   in [`reconcile`]
//! - framework graph assembly and publication in [`publish`]

mod client;
mod environment;
pub mod protocol;
mod publish;
mod reconcile;
mod session;

pub use client::RegistryClient;
pub use environment::Endpoints;
pub use publish::{PublishReceipt, build_framework_document};
pub use reconcile::{MappingContext, reconcile};
pub use session::SessionSummary;

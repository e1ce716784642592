//! Reconciliation engine between a declared graph and Ardoq workspaces.
//!
//! This crate owns the plan/apply cycle for the aqsync workspace:
//!
//! - **[`Syncer`]**: Facade over one workspace table.
//!   [`fetch()`](Syncer::fetch) reads the remote snapshot,
//!   [`plan()`](Syncer::plan) computes a [`Diff`], and
//!   [`apply()`](Syncer::apply) executes it.
//!
//! - **Normalizer** ([`normalize`]): Partitions the flat declared graph and
//!   the fetched workspaces into `customId`-indexed maps per workspace.
//!
//! - **Identifier resolver** ([`IdMap`]): Maps `customId`s and type names to
//!   remote ids, with placeholders for components the batch create has not
//!   minted yet.
//!
//! - **Diff engine** ([`diff`]): Classifies types, fields, components and
//!   references per workspace into new / updated / deleted.
//!
//! - **Apply engine** ([`Consolidator`]): Executes a diff in dependency
//!   order against any [`RemoteService`], the production one being
//!   [`aqsync_api::ArdoqClient`].

pub mod apply;
pub mod config;
pub mod diff;
pub mod error;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod remote;
pub mod syncer;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use apply::{ApplyReport, Consolidator};
pub use config::{SyncConfig, TlsVerification};
pub use diff::{ChangeCounts, Diff, DiffSummary};
pub use error::CoreError;
pub use ids::{IdKind, IdMap};
pub use remote::RemoteService;
pub use syncer::{Plan, Snapshot, Syncer};

pub use model::{
    CustomFields, DeclaredComponent, DeclaredReference, EntityKind, FieldDefinition, Graph,
    custom_fields,
};

// Re-export the client so callers can name `Syncer<ArdoqClient>`
pub use aqsync_api::{ArdoqClient, RateLimit};

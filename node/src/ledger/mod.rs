// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The infraction ledger as seen by the reconciler.
//!
//! The ledger owns persistence; this side only asks whether matching records
//! exist and requests new ones. Two implementations:
//!
//! - [`InMemoryLedger`]: hosted in-process, enforces one active ban per
//!   (community, subject).
//! - [`LedgerClient`]: talks to a remote node serving the ledger routes.

pub mod client;
pub mod memory;

use async_trait::async_trait;

use infraction_sync::{InfractionRecord, InfractionSearchCriteria, NewInfraction};

use crate::errors::SyncError;

pub use client::LedgerClient;
pub use memory::InMemoryLedger;

#[async_trait]
pub trait InfractionLedger: Send + Sync {
    /// `AnyMatching(criteria) -> bool`.
    async fn any_matching(&self, criteria: &InfractionSearchCriteria) -> Result<bool, SyncError>;

    /// `CreateInfraction(...)`. Ledgers with a uniqueness constraint reject a
    /// second active ban with [`SyncError::Conflict`].
    async fn create_infraction(&self, request: NewInfraction) -> Result<InfractionRecord, SyncError>;
}

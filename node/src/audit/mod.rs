// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Read access to the platform's administrative audit trail.

pub mod client;

use async_trait::async_trait;

use infraction_sync::{AuditEntry, CommunityId};

use crate::errors::SyncError;

pub use client::PlatformAuditClient;

#[async_trait]
pub trait AuditTrail: Send + Sync {
    /// `RecentAdminActions(communityId, limit)`: newest first, at most `limit`
    /// entries. Best-effort; may not yet contain the action being looked up.
    async fn recent_admin_actions(
        &self,
        community: CommunityId,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, SyncError>;
}

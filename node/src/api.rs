// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

use infraction_sync::{Community, CommunityId, InfractionRecord, PlatformUser, UserId};

/// Pushed by the gateway bridge when the platform reports a ban.
/// Community and user arrive already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBannedNotification {
    pub community: Community,
    pub user: PlatformUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
    /// Subscribers that received the event. Zero means nobody is listening.
    pub receivers: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnyMatchingResponse {
    pub any: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInfractionsQuery {
    pub community_id: Option<CommunityId>,
    pub subject_id: Option<UserId>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListInfractionsResponse {
    pub infractions: Vec<InfractionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ledger: String,
}

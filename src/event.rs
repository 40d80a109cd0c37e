// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Platform-side entities and the moderation events observed on the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{CommunityId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: UserId,
    pub username: String,
    /// Legacy four-digit tag. "0" (or absent) for accounts on unique usernames.
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl PlatformUser {
    /// `name#1234` for legacy accounts, otherwise the display name.
    pub fn display_name_with_discriminator(&self) -> String {
        match self.discriminator.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() && d.chars().any(|c| c != '0') => {
                format!("{}#{}", self.username, d)
            }
            _ => self
                .global_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(&self.username)
                .to_string(),
        }
    }
}

/// A ban (or other moderation action) observed on the real-time stream.
/// Consumed once by the reconciler; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub community_id: CommunityId,
    pub target_user_id: UserId,
    pub observed_at: DateTime<Utc>,
}

impl ModerationEvent {
    pub fn user_banned(community: &Community, user: &PlatformUser, observed_at: DateTime<Utc>) -> Self {
        Self {
            community_id: community.id,
            target_user_id: user.id,
            observed_at,
        }
    }
}

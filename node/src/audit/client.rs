// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use infraction_sync::{AuditActionType, AuditEntry, AuditEntryId, CommunityId, PlatformUser, UserId};

use super::AuditTrail;
use crate::errors::SyncError;

/// Platform REST client for `GET /guilds/{id}/audit-logs`.
#[derive(Debug, Clone)]
pub struct PlatformAuditClient {
    base_url: String,
    bot_token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct AuditLogPage {
    #[serde(default)]
    audit_log_entries: Vec<RawAuditEntry>,
    #[serde(default)]
    users: Vec<PlatformUser>,
}

#[derive(Debug, Deserialize)]
struct RawAuditEntry {
    id: AuditEntryId,
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    target_id: Option<UserId>,
    action_type: u8,
    #[serde(default)]
    reason: Option<String>,
}

impl PlatformAuditClient {
    pub fn new(url: String, bot_token: Option<String>) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            bot_token,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Resolves actor names against the page's user table. Entries without an
/// actor cannot be attributed and are dropped.
fn into_entries(page: AuditLogPage) -> Vec<AuditEntry> {
    let users: HashMap<UserId, PlatformUser> = page.users.into_iter().map(|u| (u.id, u)).collect();

    page.audit_log_entries
        .into_iter()
        .filter_map(|raw| {
            let actor = raw.user_id?;
            let actor_display_name = users
                .get(&actor)
                .map(PlatformUser::display_name_with_discriminator)
                .unwrap_or_else(|| actor.to_string());
            Some(AuditEntry {
                action_type: AuditActionType::from_code(raw.action_type),
                actor_user_id: actor,
                actor_display_name,
                target_user_id: raw.target_id,
                reason: raw.reason,
                occurred_at: raw.id.snowflake_timestamp(),
            })
        })
        .collect()
}

#[async_trait]
impl AuditTrail for PlatformAuditClient {
    async fn recent_admin_actions(
        &self,
        community: CommunityId,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, SyncError> {
        let url = format!("{}/guilds/{}/audit-logs", self.base_url, community);
        let mut req = self.client.get(&url).query(&[("limit", limit)]);
        if let Some(token) = &self.bot_token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bot {token}"));
        }

        let resp = req.send().await.map_err(SyncError::audit)?;
        if !resp.status().is_success() {
            return Err(SyncError::audit(format!("Audit log request failed: {}", resp.status())));
        }

        let page: AuditLogPage = resp.json().await.map_err(SyncError::audit)?;
        let mut entries = into_entries(page);
        entries.truncate(limit);
        tracing::trace!(community_id = %community, count = entries.len(), "Audit: fetched entries");
        Ok(entries)
    }
}

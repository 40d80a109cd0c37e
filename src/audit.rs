// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Audit trail entries and ban correlation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::enums::AuditActionType;
use crate::types::id::UserId;

/// One administrative action from the platform audit log.
///
/// Delivered newest-first by the source; nothing stronger is guaranteed and
/// the log may lag the gateway event that triggered the lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action_type: AuditActionType,
    pub actor_user_id: UserId,
    pub actor_display_name: String,
    pub target_user_id: Option<UserId>,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn is_ban_of(&self, target: UserId) -> bool {
        self.action_type == AuditActionType::Ban && self.target_user_id == Some(target)
    }

    /// Reason with surrounding whitespace removed, or `None` if nothing is left.
    pub fn trimmed_reason(&self) -> Option<&str> {
        self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

/// Picks the most recent ban entry targeting `target`.
///
/// Relies on the source ordering (newest first). Returns `None` when the window
/// holds no such entry, which callers treat as a normal outcome.
pub fn correlate_ban(entries: &[AuditEntry], target: UserId) -> Option<&AuditEntry> {
    entries.iter().find(|e| e.is_ban_of(target))
}

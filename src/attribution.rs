// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Actor/reason attribution for synthesized ban records.

use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::types::id::UserId;

pub const UNATTRIBUTED_BAN_REASON: &str = "Banned by community staff (unattributed).";

/// Who a ban is attributed to when the audit window has no matching entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackActor {
    pub user_id: UserId,
    pub reason: String,
}

impl FallbackActor {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            reason: UNATTRIBUTED_BAN_REASON.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribution {
    pub actor_user_id: UserId,
    pub reason: String,
    /// False when the fallback actor was used.
    pub correlated: bool,
}

impl Attribution {
    pub fn resolve(entry: Option<&AuditEntry>, fallback: &FallbackActor) -> Self {
        match entry {
            Some(entry) => Self {
                actor_user_id: entry.actor_user_id,
                // Blank check only; a usable reason is kept as written
                reason: match (entry.trimmed_reason(), &entry.reason) {
                    (Some(_), Some(raw)) => raw.clone(),
                    _ => format!("Banned by {}.", entry.actor_display_name),
                },
                correlated: true,
            },
            None => Self {
                actor_user_id: fallback.user_id,
                reason: fallback.reason.clone(),
                correlated: false,
            },
        }
    }
}

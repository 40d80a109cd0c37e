// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Search criteria for querying the ledger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::InfractionRecord;
use crate::types::enums::InfractionType;
use crate::types::id::{CommunityId, UserId};

/// Query descriptor for `AnyMatching`.
///
/// Unset fields do not constrain the match. An empty `types` set matches every
/// type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfractionSearchCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_id: Option<CommunityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_user_id: Option<UserId>,
    #[serde(default)]
    pub types: BTreeSet<InfractionType>,
    #[serde(default)]
    pub exclude_deleted: bool,
    #[serde(default)]
    pub exclude_rescinded: bool,
}

impl InfractionSearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// The idempotency guard: an active, non-deleted ban for `subject` in `community`.
    pub fn ban_guard(community: CommunityId, subject: UserId) -> Self {
        Self::new()
            .community(community)
            .subject(subject)
            .with_type(InfractionType::Ban)
            .exclude_deleted(true)
            .exclude_rescinded(true)
    }

    pub fn community(mut self, id: CommunityId) -> Self {
        self.community_id = Some(id);
        self
    }

    pub fn subject(mut self, id: UserId) -> Self {
        self.subject_user_id = Some(id);
        self
    }

    pub fn with_type(mut self, kind: InfractionType) -> Self {
        self.types.insert(kind);
        self
    }

    pub fn exclude_deleted(mut self, exclude: bool) -> Self {
        self.exclude_deleted = exclude;
        self
    }

    pub fn exclude_rescinded(mut self, exclude: bool) -> Self {
        self.exclude_rescinded = exclude;
        self
    }

    pub fn matches(&self, record: &InfractionRecord) -> bool {
        if self.community_id.is_some_and(|c| c != record.community_id) {
            return false;
        }
        if self.subject_user_id.is_some_and(|s| s != record.subject_user_id) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&record.kind) {
            return false;
        }
        if self.exclude_deleted && record.deleted {
            return false;
        }
        if self.exclude_rescinded && record.rescinded {
            return false;
        }
        true
    }
}

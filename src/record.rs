// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger records and creation requests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::enums::InfractionType;
use crate::types::id::{CommunityId, InfractionId, UserId};

/// A moderation infraction as stored by the ledger.
///
/// The `deleted` and `rescinded` flags belong to the ledger; the reconciler
/// only ever reads them through search criteria.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfractionRecord {
    pub id: InfractionId,
    pub community_id: CommunityId,
    pub actor_user_id: UserId,
    #[serde(rename = "type")]
    pub kind: InfractionType,
    pub subject_user_id: UserId,
    pub reason: String,
    /// `None` means permanent.
    #[serde(default, with = "duration_secs")]
    pub duration: Option<Duration>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub rescinded: bool,
}

impl InfractionRecord {
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.rescinded
    }
}

/// `CreateInfraction(communityId, actorUserId, type, subjectUserId, reason, durationOrNull)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInfraction {
    pub community_id: CommunityId,
    pub actor_user_id: UserId,
    #[serde(rename = "type")]
    pub kind: InfractionType,
    pub subject_user_id: UserId,
    pub reason: String,
    #[serde(default, with = "duration_secs")]
    pub duration: Option<Duration>,
}

impl NewInfraction {
    pub fn permanent_ban(
        community_id: CommunityId,
        actor_user_id: UserId,
        subject_user_id: UserId,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            community_id,
            actor_user_id,
            kind: InfractionType::Ban,
            subject_user_id,
            reason: reason.into(),
            duration: None,
        }
    }

    pub fn into_record(self, id: InfractionId, created_at: DateTime<Utc>) -> InfractionRecord {
        InfractionRecord {
            id,
            community_id: self.community_id,
            actor_user_id: self.actor_user_id,
            kind: self.kind,
            subject_user_id: self.subject_user_id,
            reason: self.reason,
            duration: self.duration,
            created_at,
            deleted: false,
            rescinded: false,
        }
    }
}

/// Durations travel as whole seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

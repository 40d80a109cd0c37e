// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! infraction-sync: data model and correlation rules for reconciling moderation
//! actions taken outside the bot into the infraction ledger.

pub mod error;
pub mod types;
pub mod event;
pub mod criteria;
pub mod record;
pub mod audit;
pub mod attribution;

#[cfg(test)]
pub mod tests;

pub use attribution::{Attribution, FallbackActor};
pub use audit::{correlate_ban, AuditEntry};
pub use criteria::InfractionSearchCriteria;
pub use error::{ModelError, Result};
pub use event::{Community, ModerationEvent, PlatformUser};
pub use record::{InfractionRecord, NewInfraction};
pub use types::enums::{AuditActionType, InfractionType};
pub use types::id::{AuditEntryId, CommunityId, InfractionId, UserId};

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Infraction and audit action enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The ledger's infraction taxonomy. Only `Ban` is reconciled from the audit
/// trail; the rest exist so criteria and records round-trip with the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InfractionType {
    Notice,
    Warning,
    Mute,
    Ban,
}

impl InfractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfractionType::Notice => "Notice",
            InfractionType::Warning => "Warning",
            InfractionType::Mute => "Mute",
            InfractionType::Ban => "Ban",
        }
    }
}

impl fmt::Display for InfractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfractionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notice" => Ok(InfractionType::Notice),
            "warning" => Ok(InfractionType::Warning),
            "mute" => Ok(InfractionType::Mute),
            "ban" => Ok(InfractionType::Ban),
            _ => Err(ModelError::UnknownInfractionType(s.to_string())),
        }
    }
}

/// Administrative action kinds as reported by the platform audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditActionType {
    Kick,
    Ban,
    Unban,
    Other(u8),
}

impl AuditActionType {
    pub const KICK_CODE: u8 = 20;
    pub const BAN_CODE: u8 = 22;
    pub const UNBAN_CODE: u8 = 23;

    pub fn from_code(code: u8) -> Self {
        match code {
            Self::KICK_CODE => AuditActionType::Kick,
            Self::BAN_CODE => AuditActionType::Ban,
            Self::UNBAN_CODE => AuditActionType::Unban,
            other => AuditActionType::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            AuditActionType::Kick => Self::KICK_CODE,
            AuditActionType::Ban => Self::BAN_CODE,
            AuditActionType::Unban => Self::UNBAN_CODE,
            AuditActionType::Other(c) => *c,
        }
    }
}

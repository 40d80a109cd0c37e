// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identity types.
//!
//! Platform identifiers are 64-bit snowflakes. On the wire they travel as
//! decimal strings (JSON numbers lose precision above 2^53), but integer
//! input is accepted too.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Milliseconds between the Unix epoch and the platform epoch (2015-01-01).
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

/// Decodes the creation instant embedded in a snowflake.
pub fn snowflake_timestamp(raw: u64) -> DateTime<Utc> {
    let millis = (raw >> 22) + PLATFORM_EPOCH_MS;
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn snowflake_timestamp(&self) -> DateTime<Utc> {
                snowflake_timestamp(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name)
                    .map_err(|_| ModelError::MalformedId(s.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(SnowflakeVisitor).map($name)
            }
        }
    };
}

struct SnowflakeVisitor;

impl<'de> Visitor<'de> for SnowflakeVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake id as a decimal string or unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative snowflake id: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.trim()
            .parse::<u64>()
            .map_err(|_| E::custom(ModelError::MalformedId(v.to_string())))
    }
}

snowflake_id!(
    /// A community (guild/workspace) the bot moderates.
    CommunityId
);
snowflake_id!(
    /// A platform user; used for both actors and subjects.
    UserId
);
snowflake_id!(
    /// An audit log entry. Minted when the action happened.
    AuditEntryId
);

/// Ledger-assigned infraction id. Not a platform snowflake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfractionId(pub u64);

impl InfractionId {
    pub fn next(&self) -> Self {
        InfractionId(self.0 + 1)
    }
}

impl fmt::Display for InfractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

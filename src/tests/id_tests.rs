// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::event::PlatformUser;
use crate::types::enums::{AuditActionType, InfractionType};
use crate::types::id::{CommunityId, UserId, PLATFORM_EPOCH_MS};

#[test]
fn test_snowflake_accepts_string_and_integer() {
    let from_str: UserId = serde_json::from_str("\"175928847299117063\"").unwrap();
    let from_int: UserId = serde_json::from_str("175928847299117063").unwrap();
    assert_eq!(from_str, from_int);

    // Serialized as string to survive JS number precision
    assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"175928847299117063\"");
}

#[test]
fn test_snowflake_rejects_garbage() {
    assert!(serde_json::from_str::<CommunityId>("\"not-an-id\"").is_err());
    assert!(serde_json::from_str::<CommunityId>("-5").is_err());
    assert!("abc".parse::<UserId>().is_err());
    assert_eq!(" 42 ".parse::<UserId>().unwrap(), UserId(42));
}

#[test]
fn test_snowflake_timestamp() {
    // Snowflake with timestamp bits = 1000ms after platform epoch
    let id = UserId(1000 << 22);
    let ts = id.snowflake_timestamp();
    assert_eq!(ts.timestamp_millis() as u64, PLATFORM_EPOCH_MS + 1000);
}

#[test]
fn test_display_name_with_discriminator() {
    let legacy = PlatformUser {
        id: UserId(1),
        username: "Mod42".into(),
        discriminator: Some("0420".into()),
        global_name: Some("Moderator".into()),
    };
    assert_eq!(legacy.display_name_with_discriminator(), "Mod42#0420");

    let migrated = PlatformUser {
        id: UserId(2),
        username: "mod42".into(),
        discriminator: Some("0".into()),
        global_name: Some("Mod 42".into()),
    };
    assert_eq!(migrated.display_name_with_discriminator(), "Mod 42");

    let bare = PlatformUser {
        id: UserId(3),
        username: "plain".into(),
        discriminator: None,
        global_name: Some("   ".into()),
    };
    assert_eq!(bare.display_name_with_discriminator(), "plain");
}

#[test]
fn test_enum_codes() {
    assert_eq!(AuditActionType::from_code(22), AuditActionType::Ban);
    assert_eq!(AuditActionType::from_code(20), AuditActionType::Kick);
    assert_eq!(AuditActionType::from_code(1), AuditActionType::Other(1));
    assert_eq!(AuditActionType::Unban.code(), 23);

    assert_eq!("BAN".parse::<InfractionType>().unwrap(), InfractionType::Ban);
    assert!("exile".parse::<InfractionType>().is_err());
}

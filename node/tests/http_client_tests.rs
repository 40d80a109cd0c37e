use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use infraction_sync::{AuditActionType, CommunityId, InfractionSearchCriteria, NewInfraction, UserId};
use infraction_sync_node::audit::{AuditTrail, PlatformAuditClient};
use infraction_sync_node::errors::SyncError;
use infraction_sync_node::ledger::{InMemoryLedger, InfractionLedger, LedgerClient};
use infraction_sync_node::server::{build_router, NodeState};

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_ledger_client_against_hosting_node() {
    let ledger = Arc::new(InMemoryLedger::new());
    let (bus, _) = broadcast::channel(4);
    let url = serve(build_router(
        NodeState { bus, hosted_ledger: Some(ledger.clone()) },
        Some("tok".into()),
    ))
    .await;

    let client = LedgerClient::new(format!("{url}/"), Some("tok".into()));
    assert_eq!(client.base_url(), url);

    let guard = InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(3));
    assert!(!client.any_matching(&guard).await.unwrap());

    let record = client
        .create_infraction(NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(3), "spam"))
        .await
        .unwrap();
    assert_eq!(record.actor_user_id, UserId(2));
    assert!(client.any_matching(&guard).await.unwrap());
    assert_eq!(ledger.len().unwrap(), 1);

    let again = client
        .create_infraction(NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(3), "spam"))
        .await;
    assert!(matches!(again, Err(SyncError::Conflict)));
}

#[tokio::test]
async fn test_ledger_client_unreachable_is_transient() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LedgerClient::new(format!("http://{addr}"), None);
    let err = client
        .any_matching(&InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(3)))
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: usize,
}

#[derive(Default)]
struct Seen {
    auth: Option<String>,
    guild: Option<u64>,
    limit: Option<usize>,
}

async fn audit_logs(
    State(seen): State<Arc<Mutex<Seen>>>,
    Path(guild): Path<u64>,
    Query(q): Query<LimitQuery>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    {
        let mut seen = seen.lock().unwrap();
        seen.auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
        seen.guild = Some(guild);
        seen.limit = Some(q.limit);
    }
    Json(json!({
        "audit_log_entries": [
            { "id": "1193046000000000000", "user_id": "42", "target_id": "500", "action_type": 22, "reason": null },
            { "id": "1193045000000000000", "user_id": "43", "target_id": "501", "action_type": 20, "reason": "noise" },
            { "id": "1193044000000000000", "user_id": "43", "target_id": "502", "action_type": 22, "reason": "x" }
        ],
        "users": [
            { "id": "42", "username": "Mod42", "discriminator": "0" , "global_name": "Mod 42" },
            { "id": "43", "username": "helper", "discriminator": "1234" }
        ]
    }))
}

#[tokio::test]
async fn test_platform_audit_client() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let app = Router::new()
        .route("/guilds/:guild/audit-logs", get(audit_logs))
        .with_state(seen.clone());
    let url = serve(app).await;

    let client = PlatformAuditClient::new(url, Some("bot-token".into()));
    let entries = client.recent_admin_actions(CommunityId(777), 2).await.unwrap();

    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.auth.as_deref(), Some("Bot bot-token"));
        assert_eq!(seen.guild, Some(777));
        assert_eq!(seen.limit, Some(2));
    }

    // Server over-delivered; client honours the limit
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action_type, AuditActionType::Ban);
    assert_eq!(entries[0].actor_display_name, "Mod 42");
    assert_eq!(entries[0].reason, None);
    assert_eq!(entries[1].actor_display_name, "helper#1234");
    assert!(entries[0].occurred_at > entries[1].occurred_at);
}

#[tokio::test]
async fn test_platform_audit_client_error_status() {
    let app = Router::new().route(
        "/guilds/:guild/audit-logs",
        get(|| async { (axum::http::StatusCode::FORBIDDEN, "Missing Permissions") }),
    );
    let url = serve(app).await;

    let client = PlatformAuditClient::new(url, None);
    let err = client.recent_admin_actions(CommunityId(1), 10).await.unwrap_err();
    assert!(err.is_transient());
}

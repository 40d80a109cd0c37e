use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tokio::sync::broadcast;
use tower::ServiceExt; // for oneshot

use infraction_sync::{
    Community, CommunityId, InfractionRecord, InfractionSearchCriteria, NewInfraction, PlatformUser, UserId,
};
use infraction_sync_node::api::{
    AcceptedResponse, AnyMatchingResponse, HealthResponse, ListInfractionsResponse, UserBannedNotification,
};
use infraction_sync_node::intake::PlatformEvent;
use infraction_sync_node::ledger::InMemoryLedger;
use infraction_sync_node::server::{build_router, EventBus, NodeState};

fn node(auth: Option<&str>) -> (Router, EventBus, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let (bus, _) = broadcast::channel(8);
    let app = build_router(
        NodeState { bus: bus.clone(), hosted_ledger: Some(ledger.clone()) },
        auth.map(str::to_string),
    );
    (app, bus, ledger)
}

fn json_request(method: &str, uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_user_banned_webhook_publishes_event() {
    let (app, bus, _) = node(None);
    let mut rx = bus.subscribe();

    let notification = UserBannedNotification {
        community: Community { id: CommunityId(10), name: "c".into() },
        user: PlatformUser { id: UserId(20), username: "u".into(), discriminator: None, global_name: None },
    };
    let response = app.oneshot(json_request("POST", "/v1/events/user-banned", &notification)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let accepted: AcceptedResponse = read_json(response).await;
    assert_eq!(accepted.receivers, 1);

    let PlatformEvent::UserBanned { community, user } = rx.recv().await.unwrap() else {
        panic!("expected a ban event");
    };
    assert_eq!(community.id, CommunityId(10));
    assert_eq!(user.id, UserId(20));
}

#[tokio::test]
async fn test_ledger_create_search_and_conflict() {
    let (app, _, _) = node(None);
    let ban = NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(3), "spam");

    let response = app.clone().oneshot(json_request("POST", "/v1/infractions", &ban)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let record: InfractionRecord = read_json(response).await;
    assert_eq!(record.reason, "spam");

    let guard = InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(3));
    let response = app.clone().oneshot(json_request("POST", "/v1/infractions/search/any", &guard)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let found: AnyMatchingResponse = read_json(response).await;
    assert!(found.any);

    let response = app.oneshot(json_request("POST", "/v1/infractions", &ban)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rescind_delete_and_list() {
    let (app, _, ledger) = node(None);
    let first = ledger.create(NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(3), "a")).unwrap();
    ledger.create(NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(4), "b")).unwrap();

    let rescind = Request::builder()
        .method("POST")
        .uri(format!("/v1/infractions/{}/rescind", first.id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(rescind).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rescinded: InfractionRecord = read_json(response).await;
    assert!(rescinded.rescinded);

    let list = Request::builder()
        .uri("/v1/infractions?community_id=1&active_only=true")
        .body(Body::empty())
        .unwrap();
    let listed: ListInfractionsResponse = read_json(app.clone().oneshot(list).await.unwrap()).await;
    assert_eq!(listed.infractions.len(), 1);
    assert_eq!(listed.infractions[0].subject_user_id, UserId(4));

    let delete = Request::builder()
        .method("DELETE")
        .uri("/v1/infractions/99")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.oneshot(delete).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_reason_rejected() {
    let (app, _, ledger) = node(None);
    let ban = NewInfraction::permanent_ban(CommunityId(1), UserId(2), UserId(3), "  ");
    let response = app.oneshot(json_request("POST", "/v1/infractions", &ban)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(ledger.is_empty().unwrap());
}

#[tokio::test]
async fn test_auth_guard_spares_health() {
    let (app, _, _) = node(Some("s3cret"));

    let guard = InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(3));
    let response = app.clone().oneshot(json_request("POST", "/v1/infractions/search/any", &guard)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut authed = json_request("POST", "/v1/infractions/search/any", &guard);
    authed.headers_mut().insert("authorization", "Bearer s3cret".parse().unwrap());
    assert_eq!(app.clone().oneshot(authed).await.unwrap().status(), StatusCode::OK);

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(health).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.ledger, "memory");
}

#[tokio::test]
async fn test_remote_ledger_node_has_no_ledger_routes() {
    let (bus, _) = broadcast::channel(8);
    let app = build_router(NodeState { bus, hosted_ledger: None }, None);

    let guard = InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(3));
    let response = app.oneshot(json_request("POST", "/v1/infractions/search/any", &guard)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

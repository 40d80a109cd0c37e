// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request as AxumRequest, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use infraction_sync::{InfractionId, InfractionRecord, InfractionSearchCriteria, NewInfraction};

use crate::api::*;
use crate::errors::SyncError;
use crate::intake::PlatformEvent;
use crate::ledger::InMemoryLedger;

pub type EventBus = broadcast::Sender<PlatformEvent>;

/// Ledger routes are only served when this node hosts the ledger itself.
#[derive(Clone)]
pub struct NodeState {
    pub bus: EventBus,
    pub hosted_ledger: Option<Arc<InMemoryLedger>>,
}

async fn auth_guard(
    State(token): State<Arc<String>>,
    req: AxumRequest,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "));

    match provided {
        Some(provided) if provided == token.as_str() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

pub fn build_router(state: NodeState, auth_token: Option<String>) -> Router {
    let mut app = Router::new()
        .route("/v1/events/user-banned", post(user_banned))
        .route("/metrics", get(metrics_handler))
        .with_state(state.bus.clone());

    if let Some(ledger) = state.hosted_ledger.clone() {
        app = app.merge(ledger_routes(ledger));
    }

    if let Some(token) = auth_token {
        tracing::info!("Auth Enabled: Bearer token required");
        app = app.layer(from_fn_with_state(Arc::new(token), auth_guard));
    } else {
        tracing::warn!("Auth Disabled: No token configured");
    }

    // Added after the guard so probes stay unauthenticated
    let ledger_kind = if state.hosted_ledger.is_some() { "memory" } else { "remote" };
    app.route("/health", get(move || health(ledger_kind)))
        .layer(TraceLayer::new_for_http())
}

fn ledger_routes(ledger: Arc<InMemoryLedger>) -> Router {
    Router::new()
        .route("/v1/infractions", post(create_infraction).get(list_infractions))
        .route("/v1/infractions/search/any", post(search_any))
        .route("/v1/infractions/:id", axum::routing::delete(delete_infraction))
        .route("/v1/infractions/:id/rescind", post(rescind_infraction))
        .with_state(ledger)
}

async fn user_banned(
    State(bus): State<EventBus>,
    Json(req): Json<UserBannedNotification>,
) -> (StatusCode, Json<AcceptedResponse>) {
    let community_id = req.community.id;
    let user_id = req.user.id;
    let receivers = match bus.send(PlatformEvent::UserBanned { community: req.community, user: req.user }) {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(%community_id, %user_id, "Ban event published with no subscribers");
            0
        }
    };

    (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true, receivers }))
}

async fn search_any(
    State(ledger): State<Arc<InMemoryLedger>>,
    Json(criteria): Json<InfractionSearchCriteria>,
) -> Result<Json<AnyMatchingResponse>, SyncError> {
    let any = ledger.any(&criteria)?;
    Ok(Json(AnyMatchingResponse { any }))
}

async fn create_infraction(
    State(ledger): State<Arc<InMemoryLedger>>,
    Json(req): Json<NewInfraction>,
) -> Result<(StatusCode, Json<InfractionRecord>), SyncError> {
    if req.reason.trim().is_empty() {
        return Err(SyncError::InvalidInput("reason must not be empty".into()));
    }
    let record = ledger.create(req)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_infractions(
    State(ledger): State<Arc<InMemoryLedger>>,
    Query(query): Query<ListInfractionsQuery>,
) -> Result<Json<ListInfractionsResponse>, SyncError> {
    let criteria = InfractionSearchCriteria {
        community_id: query.community_id,
        subject_user_id: query.subject_id,
        exclude_deleted: query.active_only,
        exclude_rescinded: query.active_only,
        ..Default::default()
    };
    let infractions = ledger.search(&criteria)?;
    Ok(Json(ListInfractionsResponse { infractions }))
}

async fn rescind_infraction(
    State(ledger): State<Arc<InMemoryLedger>>,
    Path(id): Path<u64>,
) -> Result<Json<InfractionRecord>, SyncError> {
    Ok(Json(ledger.rescind(InfractionId(id))?))
}

async fn delete_infraction(
    State(ledger): State<Arc<InMemoryLedger>>,
    Path(id): Path<u64>,
) -> Result<Json<InfractionRecord>, SyncError> {
    Ok(Json(ledger.delete(InfractionId(id))?))
}

async fn health(ledger: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        ledger: ledger.to_string(),
    })
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}

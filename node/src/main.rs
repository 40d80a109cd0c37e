// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use infraction_sync_node::audit::{AuditTrail, PlatformAuditClient};
use infraction_sync_node::config::NodeConfig;
use infraction_sync_node::intake::EventIntake;
use infraction_sync_node::ledger::{InMemoryLedger, InfractionLedger, LedgerClient};
use infraction_sync_node::reconcile::{Reconciler, ReconcilerSettings};
use infraction_sync_node::server::{build_router, NodeState};
use infraction_sync_node::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry();

    let cfg = NodeConfig::from_env()?;
    tracing::info!(
        bind_addr = %cfg.bind_addr,
        ledger = cfg.ledger_url.as_deref().unwrap_or("in-memory"),
        platform = %cfg.platform_api_url,
        audit_window = cfg.audit_window,
        "Initializing infraction sync node"
    );
    if cfg.platform_token.is_none() {
        tracing::warn!("No platform token configured; audit log requests will be rejected");
    }

    let (ledger, hosted_ledger): (Arc<dyn InfractionLedger>, Option<Arc<InMemoryLedger>>) = match &cfg.ledger_url {
        Some(url) => (Arc::new(LedgerClient::new(url.clone(), cfg.auth_token.clone())), None),
        None => {
            let memory = Arc::new(InMemoryLedger::new());
            (memory.clone(), Some(memory))
        }
    };
    let audit: Arc<dyn AuditTrail> = Arc::new(PlatformAuditClient::new(
        cfg.platform_api_url.clone(),
        cfg.platform_token.clone(),
    ));

    let reconciler = Arc::new(Reconciler::new(ledger, audit, ReconcilerSettings::from(&cfg)));

    let (bus, _) = broadcast::channel(cfg.event_bus_capacity);
    tokio::spawn(EventIntake::new(reconciler).run(bus.subscribe()));

    let app = build_router(NodeState { bus, hosted_ledger }, cfg.auth_token.clone());

    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

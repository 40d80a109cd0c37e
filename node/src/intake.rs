// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Gateway event intake.
//!
//! Every ban notification becomes one independent reconciliation task. The
//! task boundary swallows errors and panics so a failing reconciliation never
//! reaches the event bus or its other subscribers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::Instrument;

use infraction_sync::{Community, ModerationEvent, PlatformUser};

use crate::reconcile::Reconciler;
use crate::telemetry::{EVENTS_RECEIVED, TASK_PANICS};

/// Notifications published on the node's event bus.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    UserBanned { community: Community, user: PlatformUser },
    /// Gateway notifications with no ledger counterpart; skipped.
    Other { kind: String },
}

#[derive(Clone)]
pub struct EventIntake {
    reconciler: Arc<Reconciler>,
}

impl EventIntake {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self { reconciler }
    }

    /// `OnUserBanned(community, bannedUser)`. Returns at once; the handle may
    /// be dropped.
    pub fn on_user_banned(&self, community: &Community, user: &PlatformUser) -> JoinHandle<()> {
        metrics::counter!(EVENTS_RECEIVED, 1, "kind" => "user_banned");

        let event = ModerationEvent::user_banned(community, user, Utc::now());
        let reconciler = self.reconciler.clone();
        let span = tracing::info_span!(
            "reconcile_ban",
            community_id = %event.community_id,
            user_id = %event.target_user_id,
            user = %user.display_name_with_discriminator(),
        );

        tokio::spawn(
            async move {
                let attempt = AssertUnwindSafe(reconciler.reconcile(&event)).catch_unwind().await;
                match attempt {
                    Ok(Ok(outcome)) => {
                        tracing::debug!(outcome = outcome.label(), "Reconciliation finished");
                    }
                    Ok(Err(e)) if e.is_transient() => {
                        tracing::warn!(error = %e, "Reconciliation abandoned; will re-run on the next ban event");
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Reconciliation failed");
                    }
                    Err(panic) => {
                        metrics::counter!(TASK_PANICS, 1);
                        tracing::error!(panic = %panic_message(panic.as_ref()), "Reconciliation task panicked");
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Spawns a reconciliation for events that need one.
    pub fn dispatch(&self, event: &PlatformEvent) -> Option<JoinHandle<()>> {
        match event {
            PlatformEvent::UserBanned { community, user } => Some(self.on_user_banned(community, user)),
            PlatformEvent::Other { kind } => {
                tracing::trace!(%kind, "Intake: ignoring event");
                None
            }
        }
    }

    /// Consumes the event bus until it closes.
    pub async fn run(self, mut rx: broadcast::Receiver<PlatformEvent>) {
        tracing::info!("Intake: listening for moderation events");
        loop {
            match rx.recv().await {
                Ok(event) => {
                    self.dispatch(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Intake: lagged behind event bus; events dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("Intake: event bus closed");
                    break;
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

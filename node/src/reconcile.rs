// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ban reconciliation.
//!
//! A ban made through the platform UI bypasses the bot, so the ledger never
//! hears about it. For every observed ban the [`Reconciler`]:
//!
//! 1. asks the ledger whether an active ban already exists and stops if so,
//! 2. looks for the matching entry in a bounded window of the audit trail,
//! 3. attributes actor and reason from that entry (or the fallback actor),
//! 4. requests one permanent ban record.
//!
//! Steps are read-then-create with no partial writes. A failed attempt leaves
//! the ledger untouched and the next ban event for the same user re-runs the
//! whole check. Attempts for the same (community, user) are serialized
//! in-process; the ledger's own uniqueness constraint covers other processes.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use infraction_sync::{
    correlate_ban, Attribution, AuditEntry, CommunityId, FallbackActor, InfractionRecord,
    InfractionSearchCriteria, ModerationEvent, NewInfraction, UserId,
};

use crate::audit::AuditTrail;
use crate::config::NodeConfig;
use crate::errors::{Dependency, SyncError};
use crate::ledger::InfractionLedger;
use crate::locks::KeyedLocks;
use crate::telemetry::{RECONCILE_DURATION, RECONCILE_TOTAL};

#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    pub audit_window: usize,
    pub audit_retry_attempts: u32,
    pub audit_retry_delay: Duration,
    pub call_timeout: Duration,
    pub fallback: FallbackActor,
}

impl From<&NodeConfig> for ReconcilerSettings {
    fn from(cfg: &NodeConfig) -> Self {
        Self {
            audit_window: cfg.audit_window,
            audit_retry_attempts: cfg.audit_retry_attempts,
            audit_retry_delay: cfg.audit_retry_delay,
            call_timeout: cfg.call_timeout,
            fallback: FallbackActor::new(cfg.bot_user_id),
        }
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self::from(&NodeConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// An active ban was already on record; nothing written.
    SkippedExisting,
    Created {
        record: InfractionRecord,
        /// False when no audit entry matched and the fallback actor was used.
        correlated: bool,
    },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::SkippedExisting => "skipped_existing",
            ReconcileOutcome::Created { correlated: true, .. } => "created",
            ReconcileOutcome::Created { correlated: false, .. } => "created_unattributed",
        }
    }
}

pub struct Reconciler {
    ledger: Arc<dyn InfractionLedger>,
    audit: Arc<dyn AuditTrail>,
    settings: ReconcilerSettings,
    locks: KeyedLocks<(CommunityId, UserId)>,
}

impl Reconciler {
    pub fn new(
        ledger: Arc<dyn InfractionLedger>,
        audit: Arc<dyn AuditTrail>,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            ledger,
            audit,
            settings,
            locks: KeyedLocks::new(),
        }
    }

    /// Ensures exactly one active ban record exists for the event's subject.
    pub async fn reconcile(&self, event: &ModerationEvent) -> Result<ReconcileOutcome, SyncError> {
        let start = Instant::now();
        let result = self.reconcile_ban(event).await;

        let outcome = match &result {
            Ok(outcome) => outcome.label(),
            Err(e) if e.is_transient() => "failed_transient",
            Err(_) => "failed",
        };
        metrics::counter!(RECONCILE_TOTAL, 1, "outcome" => outcome);
        metrics::histogram!(RECONCILE_DURATION, start.elapsed().as_secs_f64());

        result
    }

    async fn reconcile_ban(&self, event: &ModerationEvent) -> Result<ReconcileOutcome, SyncError> {
        let community = event.community_id;
        let subject = event.target_user_id;

        let _slot = self.locks.lock((community, subject)).await;

        let guard = InfractionSearchCriteria::ban_guard(community, subject);
        if self.call(Dependency::Ledger, self.ledger.any_matching(&guard)).await? {
            tracing::debug!(%community, %subject, "Ban already on record; skipping");
            return Ok(ReconcileOutcome::SkippedExisting);
        }

        let entry = self.correlate(community, subject).await?;
        let attribution = Attribution::resolve(entry.as_ref(), &self.settings.fallback);
        if !attribution.correlated {
            tracing::warn!(
                %community,
                %subject,
                window = self.settings.audit_window,
                "No audit entry for ban; recording with fallback attribution"
            );
        }

        let request = NewInfraction::permanent_ban(
            community,
            attribution.actor_user_id,
            subject,
            attribution.reason,
        );

        match self.call(Dependency::Ledger, self.ledger.create_infraction(request)).await {
            Ok(record) => {
                tracing::info!(
                    %community,
                    %subject,
                    actor = %record.actor_user_id,
                    infraction_id = %record.id,
                    lag_ms = (record.created_at - event.observed_at).num_milliseconds(),
                    "Synchronized ban infraction"
                );
                Ok(ReconcileOutcome::Created { record, correlated: attribution.correlated })
            }
            // Another writer won the race; the ledger already holds the ban.
            Err(SyncError::Conflict) => {
                tracing::debug!(%community, %subject, "Ledger reported existing ban on create");
                Ok(ReconcileOutcome::SkippedExisting)
            }
            Err(e) => Err(e),
        }
    }

    /// Newest matching ban entry, retrying a bounded number of times while the
    /// audit trail catches up with the gateway.
    async fn correlate(&self, community: CommunityId, subject: UserId) -> Result<Option<AuditEntry>, SyncError> {
        let window = self.settings.audit_window;

        for attempt in 0..=self.settings.audit_retry_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.settings.audit_retry_delay).await;
            }

            let entries = self
                .call(Dependency::AuditTrail, self.audit.recent_admin_actions(community, window))
                .await?;

            if let Some(entry) = correlate_ban(&entries, subject) {
                return Ok(Some(entry.clone()));
            }
            tracing::debug!(%community, %subject, attempt, fetched = entries.len(), "Audit window has no matching ban");
        }

        Ok(None)
    }

    async fn call<T, F>(&self, dependency: Dependency, fut: F) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, SyncError>>,
    {
        let after = self.settings.call_timeout;
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout { dependency, after }),
        }
    }
}

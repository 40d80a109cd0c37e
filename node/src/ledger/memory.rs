// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use infraction_sync::{
    InfractionId, InfractionRecord, InfractionSearchCriteria, InfractionType, NewInfraction,
};

use super::InfractionLedger;
use crate::errors::SyncError;

#[derive(Default)]
struct LedgerState {
    last_id: InfractionId,
    records: Vec<InfractionRecord>,
}

/// In-process ledger. Records are never removed; delete and rescind only flip
/// flags, matching how the ledger service treats history.
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

fn poison_err<T>(_: PoisonError<T>) -> SyncError {
    tracing::error!("Ledger lock poisoned");
    SyncError::Internal
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn any(&self, criteria: &InfractionSearchCriteria) -> Result<bool, SyncError> {
        let guard = self.state.read().map_err(poison_err)?;
        Ok(guard.records.iter().any(|r| criteria.matches(r)))
    }

    pub fn search(&self, criteria: &InfractionSearchCriteria) -> Result<Vec<InfractionRecord>, SyncError> {
        let guard = self.state.read().map_err(poison_err)?;
        Ok(guard.records.iter().filter(|r| criteria.matches(r)).cloned().collect())
    }

    pub fn get(&self, id: InfractionId) -> Result<Option<InfractionRecord>, SyncError> {
        let guard = self.state.read().map_err(poison_err)?;
        Ok(guard.records.iter().find(|r| r.id == id).cloned())
    }

    /// Check and insert happen under one write lock, so concurrent creators
    /// of the same ban cannot both succeed.
    pub fn create(&self, request: NewInfraction) -> Result<InfractionRecord, SyncError> {
        let mut guard = self.state.write().map_err(poison_err)?;

        if request.kind == InfractionType::Ban {
            let guard_criteria =
                InfractionSearchCriteria::ban_guard(request.community_id, request.subject_user_id);
            if guard.records.iter().any(|r| guard_criteria.matches(r)) {
                return Err(SyncError::Conflict);
            }
        }

        let id = guard.last_id.next();
        guard.last_id = id;
        let record = request.into_record(id, Utc::now());
        guard.records.push(record.clone());

        tracing::debug!(
            infraction_id = %record.id,
            community_id = %record.community_id,
            subject_user_id = %record.subject_user_id,
            kind = %record.kind,
            "Ledger: infraction created"
        );
        Ok(record)
    }

    pub fn rescind(&self, id: InfractionId) -> Result<InfractionRecord, SyncError> {
        self.update(id, |r| r.rescinded = true)
    }

    pub fn delete(&self, id: InfractionId) -> Result<InfractionRecord, SyncError> {
        self.update(id, |r| r.deleted = true)
    }

    pub fn len(&self) -> Result<usize, SyncError> {
        Ok(self.state.read().map_err(poison_err)?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, SyncError> {
        Ok(self.len()? == 0)
    }

    fn update(&self, id: InfractionId, f: impl FnOnce(&mut InfractionRecord)) -> Result<InfractionRecord, SyncError> {
        let mut guard = self.state.write().map_err(poison_err)?;
        let record = guard
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SyncError::NotFound(id))?;
        f(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl InfractionLedger for InMemoryLedger {
    async fn any_matching(&self, criteria: &InfractionSearchCriteria) -> Result<bool, SyncError> {
        self.any(criteria)
    }

    async fn create_infraction(&self, request: NewInfraction) -> Result<InfractionRecord, SyncError> {
        self.create(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infraction_sync::{CommunityId, UserId};

    fn ban(subject: u64) -> NewInfraction {
        NewInfraction::permanent_ban(CommunityId(1), UserId(99), UserId(subject), "spam")
    }

    #[test]
    fn test_second_active_ban_conflicts() {
        let ledger = InMemoryLedger::new();
        let first = ledger.create(ban(5)).unwrap();
        assert_eq!(first.id, InfractionId(1));

        assert!(matches!(ledger.create(ban(5)), Err(SyncError::Conflict)));
        // Other subjects unaffected
        assert_eq!(ledger.create(ban(6)).unwrap().id, InfractionId(2));
    }

    #[test]
    fn test_rescinded_ban_frees_the_slot() {
        let ledger = InMemoryLedger::new();
        let first = ledger.create(ban(5)).unwrap();
        ledger.rescind(first.id).unwrap();

        let guard = InfractionSearchCriteria::ban_guard(CommunityId(1), UserId(5));
        assert!(!ledger.any(&guard).unwrap());
        assert!(ledger.create(ban(5)).is_ok());
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_non_ban_types_not_unique() {
        let ledger = InMemoryLedger::new();
        let mut warn = ban(5);
        warn.kind = InfractionType::Warning;
        ledger.create(warn.clone()).unwrap();
        ledger.create(warn).unwrap();
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn test_update_unknown_id() {
        let ledger = InMemoryLedger::new();
        assert!(matches!(ledger.delete(InfractionId(7)), Err(SyncError::NotFound(InfractionId(7)))));
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};

use infraction_sync::{InfractionRecord, InfractionSearchCriteria, NewInfraction};

use super::InfractionLedger;
use crate::api::AnyMatchingResponse;
use crate::errors::SyncError;

/// Client for a remote node hosting the ledger routes.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl LedgerClient {
    pub fn new(url: String, auth_token: Option<String>) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            auth_token,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl InfractionLedger for LedgerClient {
    async fn any_matching(&self, criteria: &InfractionSearchCriteria) -> Result<bool, SyncError> {
        let url = format!("{}/v1/infractions/search/any", self.base_url);
        let resp = self.authorized(self.client.post(&url).json(criteria))
            .send()
            .await
            .map_err(SyncError::ledger)?;

        if !resp.status().is_success() {
            return Err(SyncError::ledger(format!("Search request failed: {}", resp.status())));
        }

        let body: AnyMatchingResponse = resp.json().await.map_err(SyncError::ledger)?;
        Ok(body.any)
    }

    async fn create_infraction(&self, request: NewInfraction) -> Result<InfractionRecord, SyncError> {
        let url = format!("{}/v1/infractions", self.base_url);
        let resp = self.authorized(self.client.post(&url).json(&request))
            .send()
            .await
            .map_err(SyncError::ledger)?;

        match resp.status() {
            StatusCode::CONFLICT => Err(SyncError::Conflict),
            status if status.is_client_error() => {
                let body = resp.text().await.unwrap_or_default();
                Err(SyncError::InvalidInput(format!("Ledger rejected infraction ({status}): {body}")))
            }
            status if !status.is_success() => {
                Err(SyncError::ledger(format!("Create request failed: {status}")))
            }
            _ => resp.json().await.map_err(SyncError::ledger),
        }
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use infraction_sync::{InfractionId, ModelError};

/// Which external collaborator a call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Ledger,
    AuditTrail,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::Ledger => f.write_str("ledger"),
            Dependency::AuditTrail => f.write_str("audit trail"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{dependency} unavailable: {message}")]
    Unavailable { dependency: Dependency, message: String },
    #[error("{dependency} call timed out after {after:?}")]
    Timeout { dependency: Dependency, after: Duration },
    #[error("Active ban already recorded")]
    Conflict,
    #[error("Infraction {0} not found")]
    NotFound(InfractionId),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Internal server error")]
    Internal,
}

impl SyncError {
    pub fn ledger(message: impl std::fmt::Display) -> Self {
        SyncError::Unavailable { dependency: Dependency::Ledger, message: message.to_string() }
    }

    pub fn audit(message: impl std::fmt::Display) -> Self {
        SyncError::Unavailable { dependency: Dependency::AuditTrail, message: message.to_string() }
    }

    /// Dependency failures: the attempt is abandoned with no state change.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Unavailable { .. } | SyncError::Timeout { .. })
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::Unavailable { .. } => StatusCode::BAD_GATEWAY,
            SyncError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SyncError::Conflict => StatusCode::CONFLICT,
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::InvalidInput(_) | SyncError::Model(_) => StatusCode::BAD_REQUEST,
            SyncError::InvalidConfig(_) | SyncError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

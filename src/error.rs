// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Malformed snowflake id: {0:?}")]
    MalformedId(String),

    #[error("Unknown infraction type: {0:?}")]
    UnknownInfractionType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

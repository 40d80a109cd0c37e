// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod api;
pub mod audit;
pub mod ledger;
pub mod locks;
pub mod reconcile;
pub mod intake;
pub mod server;
pub mod telemetry;

// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
pub mod adapters;
pub mod api;
pub mod config;
pub mod draws;
pub mod errors;
pub mod ingest;
pub mod oracle;
pub mod reconcile;
pub mod server;
pub mod telemetry;

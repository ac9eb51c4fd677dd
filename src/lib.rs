//! Live, sorted video list fed by a background thumbnail worker.
//!
//! Shared by the command line binary in `src/main.rs` and the integration tests.

pub mod config;
pub mod constants;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workers;

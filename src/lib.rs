//! Client for the PhishGuard risk-analysis service.
//!
//! Keeps the session token, the analysis history, and the aggregate risk
//! statistics in step with the server, and maps results to display state.
//! See [`client::PhishGuardClient`] for the entry point.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod present;
pub mod session;
pub mod state;
pub mod store;
pub mod submit;
pub mod sync;

pub use client::PhishGuardClient;
pub use error::ClientError;

//! Per-step item transfer between patches and their connectors

/// Surface and patch tick passes
pub mod engine;
/// Scanner limits and signal reports
pub mod signals;
/// Loader and chest transfer helpers
pub mod transfer;

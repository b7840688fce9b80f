/// Command-line interface and scenario runner
pub mod cli;
/// Storage constants and runtime settings
pub mod configuration;
/// Patch listings and the tile tag overlay
pub mod diagnostics;
/// Error types and context helpers
pub mod error;
/// PNG export of the patch overlay
pub mod image;
/// JSON snapshots of the whole store
pub mod persistence;
/// Progress display for long runs
pub mod progress;
/// Scripted host events replayed against the sandbox
pub mod scenario;

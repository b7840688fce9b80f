//! Boundary to the host simulation

/// Capability traits the host implements
pub mod interface;
/// Deterministic in-memory host for replay, fuzzing and tests
pub mod sandbox;

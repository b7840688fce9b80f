//! Classification and bookkeeping of entities attached to patches

/// Attaching, detaching and revalidating connectors on a surface
pub mod resolution;
/// Connector kinds, roles and the entity name registry
pub mod role;
/// Role-indexed connector containers
pub mod set;

//! Error types for the engine boundary.
//!
//! Stepping never fails; these cover registration, lookup and snapshot restore.

use thiserror::Error;

use crate::sim::EntityId;

/// Errors that can occur at the collaborator boundary.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// No live entity has this id (never registered, or already removed).
    #[error("unknown entity id: {0}")]
    UnknownId(EntityId),

    /// The id is live but names a different kind of entity.
    #[error("entity {id} is not a {expected}")]
    WrongKind {
        /// Offending id.
        id: EntityId,
        /// Kind the caller asked for.
        expected: &'static str,
    },

    /// A stick endpoint does not resolve to a live body.
    #[error("dangling reference: stick endpoint {0} is not a live body")]
    DanglingReference(EntityId),

    /// A stick needs two distinct endpoints.
    #[error("stick endpoints must differ (both are {0})")]
    SelfConstraint(EntityId),

    /// Body parameters outside their valid range.
    #[error("invalid body: {0}")]
    InvalidBody(&'static str),

    /// Snapshot record refers to an id the snapshot does not contain.
    #[error("snapshot stick refers to unknown body id {0}")]
    SnapshotReference(u32),

    /// JSON encode/decode failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

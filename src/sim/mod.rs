//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (registration order, pairs in discovery order)
//! - No rendering, input or gameplay dependencies

pub mod body;
pub mod collider;
pub mod collision;
pub mod constraint;
pub mod events;
pub mod pairs;
pub mod spatial;
pub mod tick;
pub mod world;

pub use body::{Body, EntityId};
pub use collider::BoxCollider;
pub use collision::{Contact, ShapeMut, circle_box, circle_circle, resolve};
pub use constraint::DistanceConstraint;
pub use events::{ContactEvent, ContactListener, ContactResponse, NoopListener};
pub use pairs::PairSet;
pub use spatial::SpatialHash;
pub use world::{Entity, World};

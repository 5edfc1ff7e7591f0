//! Contact hooks for gameplay collaborators
//!
//! The engine reports every resolved pair and lets a listener react, without
//! knowing anything about damage, health or scoring.

use super::body::EntityId;
use super::collision::Contact;

/// A pair that touched during a step. `a` is always the smaller id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
    /// Normal points from `b` toward `a`
    pub contact: Contact,
}

impl ContactEvent {
    #[inline]
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }

    /// The participant that is not `id`
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Engine-level reaction a listener may request.
///
/// Only bodies can be removed this way; a request naming a box is logged and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactResponse {
    pub remove_a: bool,
    pub remove_b: bool,
}

impl ContactResponse {
    pub const NONE: Self = Self {
        remove_a: false,
        remove_b: false,
    };

    /// Remove whichever participant is `id`
    pub fn remove(event: &ContactEvent, id: EntityId) -> Self {
        Self {
            remove_a: event.a == id,
            remove_b: event.b == id,
        }
    }
}

/// Receives each resolved pair, once per step
pub trait ContactListener {
    fn on_contact(&mut self, event: &ContactEvent) -> ContactResponse;
}

/// Listener that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ContactListener for NoopListener {
    fn on_contact(&mut self, _event: &ContactEvent) -> ContactResponse {
        ContactResponse::NONE
    }
}

impl<F> ContactListener for F
where
    F: FnMut(&ContactEvent) -> ContactResponse,
{
    fn on_contact(&mut self, event: &ContactEvent) -> ContactResponse {
        self(event)
    }
}

//! World registry
//!
//! The world owns every entity in an arena indexed by id. Ids are handed out
//! densely from 0 and never reused: a removed entity leaves an empty slot, so a
//! stale id can never alias a newer entity.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::{Body, EntityId};
use super::collider::BoxCollider;
use super::constraint::DistanceConstraint;
use super::events::ContactEvent;
use super::pairs::PairSet;
use super::spatial::SpatialHash;
use crate::PhysicsError;
use crate::settings::SimSettings;

/// Anything that can be registered
#[derive(Debug, Clone)]
pub enum Entity {
    Body(Body),
    Box(BoxCollider),
    Constraint(DistanceConstraint),
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Body(_) => "body",
            Entity::Box(_) => "box",
            Entity::Constraint(_) => "stick",
        }
    }
}

impl From<Body> for Entity {
    fn from(body: Body) -> Self {
        Entity::Body(body)
    }
}

impl From<BoxCollider> for Entity {
    fn from(bx: BoxCollider) -> Self {
        Entity::Box(bx)
    }
}

impl From<DistanceConstraint> for Entity {
    fn from(stick: DistanceConstraint) -> Self {
        Entity::Constraint(stick)
    }
}

/// The simulation: entities, broad phase state and per-tick scratch
#[derive(Debug, Clone)]
pub struct World {
    pub(super) settings: SimSettings,
    /// Arena indexed by id; `None` once removed
    pub(super) slots: Vec<Option<Entity>>,
    /// Live ids by kind, in registration order
    pub(super) bodies: Vec<EntityId>,
    pub(super) boxes: Vec<EntityId>,
    pub(super) constraints: Vec<EntityId>,
    /// Rebuilt every tick
    pub(super) dynamic_hash: SpatialHash,
    /// Updated only when static bodies are flagged dirty
    pub(super) static_hash: SpatialHash,
    pub(super) pairs: PairSet,
    pub(super) contacts: Vec<ContactEvent>,
    pub(super) removed: Vec<EntityId>,
    pub(super) rng: Pcg32,
    pub(super) time_ticks: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimSettings::default())
    }
}

impl World {
    pub fn new(settings: SimSettings) -> Self {
        Self {
            dynamic_hash: SpatialHash::new(settings.cell_size),
            static_hash: SpatialHash::new(settings.cell_size),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            slots: Vec::new(),
            bodies: Vec::new(),
            boxes: Vec::new(),
            constraints: Vec::new(),
            pairs: PairSet::new(),
            contacts: Vec::new(),
            removed: Vec::new(),
            time_ticks: 0,
        }
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Steps completed so far
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Id the next registration will receive
    pub fn next_id(&self) -> EntityId {
        EntityId(self.slots.len() as u32)
    }

    /// Register any entity, assigning it a fresh id
    pub fn register(&mut self, entity: impl Into<Entity>) -> Result<EntityId, PhysicsError> {
        let mut entity = entity.into();
        let id = self.next_id();

        match &mut entity {
            Entity::Body(body) => {
                body.validate()?;
                body.set_id(Some(id));
                self.bodies.push(id);
            }
            Entity::Box(_) => self.boxes.push(id),
            Entity::Constraint(stick) => {
                if stick.a == stick.b {
                    return Err(PhysicsError::SelfConstraint(stick.a));
                }
                for end in [stick.a, stick.b] {
                    if self.body(end).is_none() {
                        return Err(PhysicsError::DanglingReference(end));
                    }
                }
                self.constraints.push(id);
            }
        }

        log::trace!("Registered {} {}", entity.kind(), id);
        self.slots.push(Some(entity));
        Ok(id)
    }

    pub fn add_body(&mut self, body: Body) -> Result<EntityId, PhysicsError> {
        self.register(body)
    }

    pub fn add_box(&mut self, bx: BoxCollider) -> EntityId {
        let id = self.next_id();
        self.boxes.push(id);
        self.slots.push(Some(Entity::Box(bx)));
        log::trace!("Registered box {}", id);
        id
    }

    pub fn add_constraint(&mut self, stick: DistanceConstraint) -> Result<EntityId, PhysicsError> {
        self.register(stick)
    }

    /// Tie two registered bodies together at their current separation
    pub fn connect(&mut self, a: EntityId, b: EntityId) -> Result<EntityId, PhysicsError> {
        let pa = self.body(a).ok_or(PhysicsError::DanglingReference(a))?.pos;
        let pb = self.body(b).ok_or(PhysicsError::DanglingReference(b))?.pos;
        self.add_constraint(DistanceConstraint::new(a, b, pa.distance(pb)))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        match self.entity(id)? {
            Entity::Body(body) => Some(body),
            _ => None,
        }
    }

    /// Gameplay access for acceleration, teleports and flags
    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        match self.slots.get_mut(id.index())?.as_mut()? {
            Entity::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn collider(&self, id: EntityId) -> Option<&BoxCollider> {
        match self.entity(id)? {
            Entity::Box(bx) => Some(bx),
            _ => None,
        }
    }

    pub fn constraint(&self, id: EntityId) -> Option<&DistanceConstraint> {
        match self.entity(id)? {
            Entity::Constraint(stick) => Some(stick),
            _ => None,
        }
    }

    /// Bodies in registration order
    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies.iter().filter_map(|&id| self.body(id))
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> + '_ {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Some(Entity::Body(body)) => Some(body),
            _ => None,
        })
    }

    pub fn boxes(&self) -> impl Iterator<Item = (EntityId, &BoxCollider)> + '_ {
        self.boxes
            .iter()
            .filter_map(|&id| self.collider(id).map(|bx| (id, bx)))
    }

    pub fn constraints(&self) -> impl Iterator<Item = (EntityId, &DistanceConstraint)> + '_ {
        self.constraints
            .iter()
            .filter_map(|&id| self.constraint(id).map(|stick| (id, stick)))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Live entities of every kind
    pub fn len(&self) -> usize {
        self.bodies.len() + self.boxes.len() + self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contacts resolved during the last step
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    /// Bodies swept out at the start of the last step
    pub fn removed(&self) -> &[EntityId] {
        &self.removed
    }

    /// Flag a body for removal; it leaves the world at the start of the next step
    pub fn mark_for_removal(&mut self, id: EntityId) -> Result<(), PhysicsError> {
        self.body_mut_checked(id)?.marked_for_removal = true;
        Ok(())
    }

    /// Flag a moved static body so the static hash picks up its new cells
    pub fn mark_static_changed(&mut self, id: EntityId) -> Result<(), PhysicsError> {
        self.body_mut_checked(id)?.mark_changed();
        Ok(())
    }

    /// Remove a stick immediately
    pub fn remove_constraint(&mut self, id: EntityId) -> Result<DistanceConstraint, PhysicsError> {
        let Entity::Constraint(stick) = self.take(id, "stick")? else {
            return Err(PhysicsError::WrongKind { id, expected: "stick" });
        };
        self.constraints.retain(|&c| c != id);
        log::trace!("Removed stick {}", id);
        Ok(stick)
    }

    /// Remove a box immediately
    pub fn remove_box(&mut self, id: EntityId) -> Result<BoxCollider, PhysicsError> {
        let Entity::Box(bx) = self.take(id, "box")? else {
            return Err(PhysicsError::WrongKind { id, expected: "box" });
        };
        self.boxes.retain(|&b| b != id);
        log::trace!("Removed box {}", id);
        Ok(bx)
    }

    fn body_mut_checked(&mut self, id: EntityId) -> Result<&mut Body, PhysicsError> {
        match self.entity(id) {
            None => return Err(PhysicsError::UnknownId(id)),
            Some(Entity::Body(_)) => {}
            Some(_) => {
                return Err(PhysicsError::WrongKind {
                    id,
                    expected: "body",
                });
            }
        }
        self.body_mut(id).ok_or(PhysicsError::UnknownId(id))
    }

    /// Empty the slot of `id` if it holds an entity of kind `expected`
    fn take(&mut self, id: EntityId, expected: &'static str) -> Result<Entity, PhysicsError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(PhysicsError::UnknownId(id))?;
        let kind = slot.as_ref().ok_or(PhysicsError::UnknownId(id))?.kind();
        if kind != expected {
            return Err(PhysicsError::WrongKind { id, expected });
        }
        slot.take().ok_or(PhysicsError::UnknownId(id))
    }

    /// Unregister every flagged body, and every stick attached to one
    pub(super) fn sweep_removed(&mut self) {
        self.removed.clear();

        let slots = &self.slots;
        let doomed: Vec<EntityId> = self
            .bodies
            .iter()
            .copied()
            .filter(|&id| {
                matches!(slots[id.index()], Some(Entity::Body(ref body)) if body.marked_for_removal)
            })
            .collect();
        if doomed.is_empty() {
            return;
        }

        for &id in &doomed {
            self.slots[id.index()] = None;
            self.static_hash.remove(id);
        }
        self.bodies.retain(|id| !doomed.contains(id));

        let orphaned: Vec<EntityId> = self
            .constraints()
            .filter(|(_, stick)| doomed.iter().any(|&d| stick.involves(d)))
            .map(|(id, _)| id)
            .collect();
        for &id in &orphaned {
            self.slots[id.index()] = None;
        }
        self.constraints.retain(|id| !orphaned.contains(id));

        log::debug!(
            "Swept {} bodies and {} attached sticks",
            doomed.len(),
            orphaned.len()
        );
        self.removed = doomed;
    }
}

/// Mutable access to two distinct slots, returned in the order asked for
pub(super) fn pair_mut(
    slots: &mut [Option<Entity>],
    a: EntityId,
    b: EntityId,
) -> Option<(&mut Entity, &mut Entity)> {
    let (i, j) = (a.index(), b.index());
    if i == j || i.max(j) >= slots.len() {
        return None;
    }
    if i < j {
        let (lo, hi) = slots.split_at_mut(j);
        Some((lo[i].as_mut()?, hi[0].as_mut()?))
    } else {
        let (lo, hi) = slots.split_at_mut(i);
        Some((hi[0].as_mut()?, lo[j].as_mut()?))
    }
}

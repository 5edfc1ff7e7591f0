//! Fixed timestep simulation step
//!
//! One call runs the whole pipeline, in order:
//! 1. sweep bodies flagged for removal
//! 2. clear the dynamic hash and the pair set
//! 3. integrate dynamic bodies
//! 4. relax sticks for a fixed number of passes
//! 5. hash dynamic bodies, rehash dirty static bodies
//! 6. query both hashes for every dynamic body
//! 7. pair every dynamic body with every box
//! 8. resolve each pair once

use super::body::EntityId;
use super::collision::{ShapeMut, resolve};
use super::events::{ContactEvent, ContactListener, NoopListener};
use super::world::{Entity, World, pair_mut};

impl World {
    /// Advance one fixed step, recording contacts without reacting to them
    pub fn step(&mut self, dt: f32) {
        self.step_with(dt, &mut NoopListener);
    }

    /// Advance one fixed step, reporting every resolved pair to `listener`
    pub fn step_with(&mut self, dt: f32, listener: &mut dyn ContactListener) {
        self.sweep_removed();

        self.dynamic_hash.clear();
        self.pairs.clear();
        self.contacts.clear();

        self.integrate(dt);
        self.relax_constraints();
        self.update_hashes();
        self.collect_pairs();
        self.resolve_pairs(listener);

        self.time_ticks += 1;
        log::trace!(
            "Tick {}: {} pairs, {} contacts",
            self.time_ticks,
            self.pairs.len(),
            self.contacts.len()
        );
    }

    fn integrate(&mut self, dt: f32) {
        let settings = &self.settings;
        for &id in &self.bodies {
            if let Some(Entity::Body(body)) = self.slots[id.index()].as_mut() {
                body.integrate(dt, settings);
            }
        }
    }

    fn relax_constraints(&mut self) {
        for _ in 0..self.settings.constraint_iterations {
            for &id in &self.constraints {
                let Some(Entity::Constraint(stick)) = self.slots[id.index()] else {
                    continue;
                };
                match pair_mut(&mut self.slots, stick.a, stick.b) {
                    Some((Entity::Body(a), Entity::Body(b))) => stick.relax(a, b),
                    _ => {
                        // Removal cascades to sticks, so this is a registry bug
                        log::error!("Stick {} has a dangling endpoint", id);
                        debug_assert!(false, "stick {id} has a dangling endpoint");
                    }
                }
            }
        }
    }

    fn update_hashes(&mut self) {
        for &id in &self.bodies {
            let Some(Entity::Body(body)) = self.slots[id.index()].as_mut() else {
                continue;
            };
            if body.is_static() {
                if body.is_static_dirty() {
                    self.static_hash.insert(id, body.pos, body.radius);
                    body.clear_static_dirty();
                }
                continue;
            }
            self.dynamic_hash.insert(id, body.pos, body.radius);
        }
    }

    fn collect_pairs(&mut self) {
        let World {
            slots,
            bodies,
            boxes,
            dynamic_hash,
            static_hash,
            pairs,
            ..
        } = self;
        let slots = &*slots;

        let is_live = |e: EntityId| {
            matches!(
                slots.get(e.index()),
                Some(Some(Entity::Body(body))) if !body.marked_for_removal
            )
        };

        for &id in bodies.iter() {
            let Some(Some(Entity::Body(body))) = slots.get(id.index()) else {
                continue;
            };
            if body.is_static() || body.marked_for_removal {
                continue;
            }
            let mut add = |other: EntityId| {
                pairs.insert(id, other);
            };
            dynamic_hash.query(id, body.pos, body.radius, is_live, &mut add);
            static_hash.query(id, body.pos, body.radius, is_live, &mut add);
        }

        // Boxes are few; pair them with every dynamic body
        for &bx in boxes.iter() {
            for &id in bodies.iter() {
                if matches!(slots.get(id.index()), Some(Some(Entity::Body(body))) if !body.is_static()) {
                    pairs.insert(id, bx);
                }
            }
        }
    }

    fn resolve_pairs(&mut self, listener: &mut dyn ContactListener) {
        let World {
            settings,
            slots,
            pairs,
            contacts,
            rng,
            ..
        } = self;

        for (a, b) in pairs.iter() {
            let Some((first, second)) = pair_mut(slots, a, b) else {
                continue;
            };
            let (Some(first), Some(second)) = (as_shape(first), as_shape(second)) else {
                continue;
            };
            let Some(contact) = resolve(first, second, rng, settings) else {
                continue;
            };

            let event = ContactEvent { a, b, contact };
            let response = listener.on_contact(&event);
            for (id, remove) in [(a, response.remove_a), (b, response.remove_b)] {
                if !remove {
                    continue;
                }
                match slots.get_mut(id.index()) {
                    Some(Some(Entity::Body(body))) => body.marked_for_removal = true,
                    _ => log::warn!("Ignoring removal of {id}: only bodies can be removed from a contact"),
                }
            }
            contacts.push(event);
        }
    }
}

fn as_shape(entity: &mut Entity) -> Option<ShapeMut<'_>> {
    match entity {
        Entity::Body(body) => Some(ShapeMut::Circle(body)),
        Entity::Box(bx) => Some(ShapeMut::Box(bx)),
        Entity::Constraint(_) => None,
    }
}

//! Snapshot records
//!
//! The engine owns the persisted shape of a world: plain records for bodies,
//! boxes and sticks. Encoding is up to the caller; JSON helpers are provided.
//!
//! Restoring assigns fresh ids. Sticks are remapped through the old → new id map,
//! and dynamic bodies get the configured restore gravity.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::PhysicsError;
use crate::sim::{Body, BoxCollider, DistanceConstraint, EntityId, World};

/// Persisted body state. Velocity is not kept: restored bodies start at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub id: u32,
    pub position: Vec2,
    pub is_static: bool,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub a: u32,
    pub b: u32,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pattern: String,
}

/// Everything needed to rebuild a world's contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub bodies: Vec<BodyRecord>,
    #[serde(default)]
    pub constraints: Vec<ConstraintRecord>,
    #[serde(default)]
    pub boxes: Vec<BoxRecord>,
}

impl WorldSnapshot {
    pub fn to_json(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl BodyRecord {
    fn from_body(id: EntityId, body: &Body) -> Self {
        Self {
            id: id.0,
            position: body.pos,
            is_static: body.is_static(),
            radius: body.radius,
            mass: body.mass(),
            restitution: body.restitution,
            friction: body.friction,
        }
    }

    fn to_body(&self, gravity: Vec2) -> Body {
        let acceleration = if self.is_static { Vec2::ZERO } else { gravity };
        Body::new(self.position, self.is_static, acceleration, self.mass)
            .with_radius(self.radius)
            .with_restitution(self.restitution)
            .with_friction(self.friction)
    }
}

impl From<&BoxCollider> for BoxRecord {
    fn from(bx: &BoxCollider) -> Self {
        Self {
            x: bx.x,
            y: bx.y,
            width: bx.width,
            height: bx.height,
            pattern: bx.pattern.clone(),
        }
    }
}

impl From<&BoxRecord> for BoxCollider {
    fn from(record: &BoxRecord) -> Self {
        BoxCollider::new(record.x, record.y, record.width, record.height)
            .with_pattern(record.pattern.clone())
    }
}

impl World {
    /// Export every non-transient body, every box, and every stick whose
    /// endpoints are both exported
    pub fn snapshot(&self) -> WorldSnapshot {
        let bodies: Vec<BodyRecord> = self
            .bodies()
            .filter(|body| !body.transient)
            .filter_map(|body| Some(BodyRecord::from_body(body.id()?, body)))
            .collect();

        let exported = |id: EntityId| bodies.iter().any(|r| r.id == id.0);
        let constraints = self
            .constraints()
            .filter(|(_, stick)| exported(stick.a) && exported(stick.b))
            .map(|(_, stick)| ConstraintRecord {
                a: stick.a.0,
                b: stick.b.0,
                distance: stick.distance,
            })
            .collect();

        let boxes = self.boxes().map(|(_, bx)| BoxRecord::from(bx)).collect();

        WorldSnapshot {
            bodies,
            constraints,
            boxes,
        }
    }

    /// Register the snapshot's contents into this world.
    ///
    /// Everything is validated before anything is registered, so a failed
    /// restore leaves the world untouched. Returns the snapshot id → new id map.
    pub fn restore(&mut self, snapshot: &WorldSnapshot) -> Result<HashMap<u32, EntityId>, PhysicsError> {
        let gravity = self.settings().restore_gravity;

        let bodies: Vec<(u32, Body)> = snapshot
            .bodies
            .iter()
            .map(|record| (record.id, record.to_body(gravity)))
            .collect();
        for (_, body) in &bodies {
            body.validate()?;
        }
        for stick in &snapshot.constraints {
            for end in [stick.a, stick.b] {
                if !snapshot.bodies.iter().any(|r| r.id == end) {
                    return Err(PhysicsError::SnapshotReference(end));
                }
            }
            if stick.a == stick.b {
                return Err(PhysicsError::SelfConstraint(EntityId(stick.a)));
            }
        }

        let mut ids = HashMap::with_capacity(bodies.len());
        for (old, body) in bodies {
            let id = self.add_body(body)?;
            ids.insert(old, id);
        }
        for record in &snapshot.boxes {
            self.add_box(BoxCollider::from(record));
        }
        for stick in &snapshot.constraints {
            let (a, b) = (ids[&stick.a], ids[&stick.b]);
            self.add_constraint(DistanceConstraint::new(a, b, stick.distance))?;
        }

        log::info!(
            "Restored {} bodies, {} boxes, {} sticks",
            ids.len(),
            snapshot.boxes.len(),
            snapshot.constraints.len()
        );
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_world() -> (World, EntityId, EntityId) {
        let mut world = World::default();
        let player = world.add_body(Body::dynamic(Vec2::new(1.0, 2.0)).transient()).unwrap();
        let a = world
            .add_body(Body::dynamic(Vec2::new(100.0, 0.0)).with_restitution(0.5))
            .unwrap();
        let b = world.add_body(Body::fixed(Vec2::new(140.0, 0.0)).with_radius(10.0)).unwrap();
        world.connect(a, b).unwrap();
        world.connect(player, a).unwrap();
        world.add_box(BoxCollider::new(0.0, 50.0, 300.0, 20.0).with_pattern("stone"));
        (world, a, b)
    }

    #[test]
    fn test_snapshot_skips_transient() {
        let (world, a, b) = sample_world();
        let snap = world.snapshot();

        assert_eq!(snap.bodies.len(), 2);
        assert_eq!(snap.bodies[0].id, a.0);
        assert!(snap.bodies[1].is_static);
        // the stick to the player is dropped with it
        assert_eq!(snap.constraints, vec![ConstraintRecord { a: a.0, b: b.0, distance: 40.0 }]);
        assert_eq!(snap.boxes[0].pattern, "stone");
    }

    #[test]
    fn test_restore_remaps_ids() {
        let (world, a, b) = sample_world();
        let json = world.snapshot().to_json().unwrap();

        let mut fresh = World::default();
        fresh.add_body(Body::dynamic(Vec2::ZERO)).unwrap();
        let ids = fresh.restore(&WorldSnapshot::from_json(&json).unwrap()).unwrap();

        let (na, nb) = (ids[&a.0], ids[&b.0]);
        assert_eq!(na, EntityId(1));
        assert_eq!(nb, EntityId(2));
        let (_, stick) = fresh.constraints().next().unwrap();
        assert_eq!((stick.a, stick.b), (na, nb));

        let body = fresh.body(na).unwrap();
        assert_eq!(body.restitution, 0.5);
        assert_eq!(body.acceleration, fresh.settings().restore_gravity);
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(fresh.body(nb).unwrap().acceleration, Vec2::ZERO);
        assert_eq!(fresh.box_count(), 1);
    }

    #[test]
    fn test_restore_rejects_dangling_stick() {
        let snap = WorldSnapshot {
            bodies: vec![BodyRecord {
                id: 4,
                position: Vec2::ZERO,
                is_static: false,
                radius: 20.0,
                mass: 1.0,
                restitution: 0.0,
                friction: 1.0,
            }],
            constraints: vec![ConstraintRecord { a: 4, b: 9, distance: 10.0 }],
            boxes: vec![],
        };
        let mut world = World::default();
        assert!(matches!(world.restore(&snap), Err(PhysicsError::SnapshotReference(9))));
        assert!(world.is_empty());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            WorldSnapshot::from_json("{\"bodies\": 3}"),
            Err(PhysicsError::Json(_))
        ));
    }
}

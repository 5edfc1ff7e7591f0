//! Narrow phase: contact tests and impulse response
//!
//! Two shape kinds exist, circles (bodies) and boxes. A box never resolves
//! actively: box-vs-circle runs the circle-vs-box routine with roles swapped.
//!
//! Velocity is implicit (Verlet), so impulses are applied by moving `prev_pos`.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::body::Body;
use super::collider::BoxCollider;
use crate::settings::SimSettings;
use crate::{closest_point_on_rect, perp, unit_from_angle};

/// Result of a resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal along which the first shape was pushed away from the second
    pub normal: Vec2,
    /// Overlap depth before correction
    pub penetration: f32,
    /// Normal impulse magnitude (0 when the shapes were already separating)
    pub impulse: f32,
}

impl Contact {
    /// Same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A shape taking part in a pair
#[derive(Debug)]
pub enum ShapeMut<'a> {
    Circle(&'a mut Body),
    Box(&'a BoxCollider),
}

/// Resolve a candidate pair, dispatching on the shape kinds.
/// Returns `None` when the shapes do not touch.
pub fn resolve<R: Rng>(
    first: ShapeMut<'_>,
    second: ShapeMut<'_>,
    rng: &mut R,
    settings: &SimSettings,
) -> Option<Contact> {
    match (first, second) {
        (ShapeMut::Circle(a), ShapeMut::Circle(b)) => circle_circle(a, b, rng, settings),
        (ShapeMut::Circle(c), ShapeMut::Box(bx)) => circle_box(c, bx, settings),
        (ShapeMut::Box(bx), ShapeMut::Circle(c)) => circle_box(c, bx, settings).map(Contact::flipped),
        (ShapeMut::Box(_), ShapeMut::Box(_)) => None,
    }
}

/// Circle vs circle: positional split by inverse mass, restitution impulse,
/// then Coulomb friction along the tangent.
pub fn circle_circle<R: Rng>(
    a: &mut Body,
    b: &mut Body,
    rng: &mut R,
    settings: &SimSettings,
) -> Option<Contact> {
    if a.is_static() && b.is_static() {
        return None;
    }

    let delta = a.pos - b.pos;
    let dist_sq = delta.length_squared();
    let radius_sum = a.radius + b.radius;
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < settings.overlap_epsilon {
        // Coincident centers have no normal; shove apart in a random direction
        let dir = unit_from_angle(rng.random::<f32>() * TAU);
        if !a.is_static() {
            a.pos += dir * settings.degenerate_separation;
        }
        if !b.is_static() {
            b.pos -= dir * settings.degenerate_separation;
        }
        return Some(Contact {
            normal: dir,
            penetration: radius_sum - dist,
            impulse: 0.0,
        });
    }

    let normal = delta / dist;
    let overlap = radius_sum - dist;
    let total_inv_mass = a.inv_mass() + b.inv_mass();

    let (share_a, share_b) = if a.is_static() {
        (0.0, 1.0)
    } else if b.is_static() {
        (1.0, 0.0)
    } else {
        (a.inv_mass() / total_inv_mass, b.inv_mass() / total_inv_mass)
    };

    if !a.is_static() {
        a.pos += normal * overlap * share_a;
    }
    if !b.is_static() {
        b.pos -= normal * overlap * share_b;
    }

    let vn = (a.velocity() - b.velocity()).dot(normal);
    if vn > 0.0 {
        return Some(Contact {
            normal,
            penetration: overlap,
            impulse: 0.0,
        });
    }

    let restitution = (a.restitution + b.restitution) / 2.0;
    let jn = -(1.0 + restitution) * vn / total_inv_mass;
    if !a.is_static() {
        a.prev_pos -= normal * jn * a.inv_mass();
    }
    if !b.is_static() {
        b.prev_pos += normal * jn * b.inv_mass();
    }

    // Friction from the post-bounce relative velocity
    let tangent = perp(normal);
    let vt = (a.velocity() - b.velocity()).dot(tangent);
    let jt = -vt / total_inv_mass;
    let max_friction = (a.friction + b.friction) / 2.0 * jn;

    let friction_impulse = if jt.abs() < max_friction {
        jt
    } else {
        -max_friction * vt.signum()
    };

    if !a.is_static() {
        a.prev_pos -= tangent * friction_impulse * a.inv_mass();
    }
    if !b.is_static() {
        b.prev_pos += tangent * friction_impulse * b.inv_mass();
    }

    Some(Contact {
        normal,
        penetration: overlap,
        impulse: jn,
    })
}

/// Circle vs immovable box. Restitution uses the circle's own coefficient; no friction.
/// Sets `can_jump` when the circle lands on top of the box.
pub fn circle_box(circle: &mut Body, bx: &BoxCollider, settings: &SimSettings) -> Option<Contact> {
    if circle.is_static() {
        return None;
    }

    let closest = closest_point_on_rect(circle.pos, bx.min(), bx.size());
    let delta = circle.pos - closest;
    let dist_sq = delta.length_squared();
    if dist_sq > circle.radius * circle.radius {
        return None;
    }

    if dist_sq < settings.overlap_epsilon {
        // Center is on or inside the box: treat it as a landing on the top face
        let normal = Vec2::NEG_Y;
        circle.pos.y = bx.y - circle.radius - settings.box_nudge;
        let impulse = -(1.0 + circle.restitution) * circle.velocity().dot(normal) * circle.mass();
        circle.prev_pos -= normal * impulse * circle.inv_mass();
        circle.can_jump = true;
        return Some(Contact {
            normal,
            penetration: circle.radius,
            impulse,
        });
    }

    let dist = dist_sq.sqrt();
    let overlap = circle.radius - dist;
    let normal = delta / dist;

    let vn = circle.velocity().dot(normal);
    if vn > 0.0 {
        return Some(Contact {
            normal,
            penetration: overlap,
            impulse: 0.0,
        });
    }

    let impulse = -(1.0 + circle.restitution) * vn * circle.mass();
    circle.prev_pos -= normal * impulse * circle.inv_mass();
    circle.pos += normal * overlap;
    circle.prev_pos += normal * overlap;

    if normal.y < settings.ground_normal_y {
        circle.can_jump = true;
    }

    Some(Contact {
        normal,
        penetration: overlap,
        impulse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(1)
    }

    #[test]
    fn test_circles_apart_miss() {
        let s = SimSettings::default();
        let mut a = Body::dynamic(Vec2::ZERO);
        let mut b = Body::dynamic(Vec2::new(40.0, 0.0));
        // exactly touching is not a contact
        assert!(circle_circle(&mut a, &mut b, &mut rng(), &s).is_none());
        assert_eq!(a.pos, Vec2::ZERO);
    }

    #[test]
    fn test_dynamic_pair_separates_to_radius_sum() {
        let s = SimSettings::default();
        let mut a = Body::dynamic(Vec2::new(0.0, 0.0)).with_radius(10.0);
        let mut b = Body::dynamic(Vec2::new(12.0, 5.0)).with_radius(15.0);

        let contact = circle_circle(&mut a, &mut b, &mut rng(), &s).unwrap();
        assert!((contact.penetration - 12.0).abs() < 1e-4);
        assert!((a.pos.distance(b.pos) - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_static_side_never_moves() {
        let s = SimSettings::default();
        let mut wall = Body::fixed(Vec2::ZERO);
        let mut ball = Body::dynamic(Vec2::new(30.0, 0.0)).with_velocity(Vec2::new(-2.0, 0.5));

        assert!(circle_circle(&mut ball, &mut wall, &mut rng(), &s).is_some());
        assert_eq!(wall.pos, Vec2::ZERO);
        assert_eq!(wall.prev_pos, Vec2::ZERO);
        assert!((ball.pos.distance(wall.pos) - 40.0).abs() < 1e-3);

        // and with the roles swapped
        let mut ball = Body::dynamic(Vec2::new(0.0, 25.0));
        assert!(circle_circle(&mut wall, &mut ball, &mut rng(), &s).is_some());
        assert_eq!(wall.pos, Vec2::ZERO);
        assert!((ball.pos.y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_two_static_bodies_ignored() {
        let s = SimSettings::default();
        let mut a = Body::fixed(Vec2::ZERO);
        let mut b = Body::fixed(Vec2::new(1.0, 0.0));
        assert!(circle_circle(&mut a, &mut b, &mut rng(), &s).is_none());
    }

    #[test]
    fn test_elastic_head_on_reverses_normal_velocity() {
        let s = SimSettings::default();
        let mut a = Body::dynamic(Vec2::new(0.0, 0.0))
            .with_velocity(Vec2::new(1.0, 0.0))
            .with_restitution(1.0)
            .with_friction(0.0);
        let mut b = Body::dynamic(Vec2::new(39.0, 0.0))
            .with_velocity(Vec2::new(-1.0, 0.0))
            .with_restitution(1.0)
            .with_friction(0.0);
        let prev_a = a.prev_pos;
        let prev_b = b.prev_pos;

        let contact = circle_circle(&mut a, &mut b, &mut rng(), &s).unwrap();
        let n = contact.normal;

        // pre-impulse velocity: corrected positions against untouched previous positions
        let before = ((a.pos - prev_a) - (b.pos - prev_b)).dot(n);
        let after = (a.velocity() - b.velocity()).dot(n);
        assert!(before < 0.0);
        assert!((after + before).abs() < 1e-4, "before {before}, after {after}");
    }

    #[test]
    fn test_separating_pair_gets_no_impulse() {
        let s = SimSettings::default();
        let mut a = Body::dynamic(Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(-5.0, 0.0));
        let mut b = Body::dynamic(Vec2::new(30.0, 0.0)).with_velocity(Vec2::new(5.0, 0.0));
        let prev_a = a.prev_pos;

        let contact = circle_circle(&mut a, &mut b, &mut rng(), &s).unwrap();
        assert_eq!(contact.impulse, 0.0);
        assert_eq!(a.prev_pos, prev_a);
    }

    #[test]
    fn test_static_friction_stops_sliding() {
        let s = SimSettings::default();
        let mut floor = Body::fixed(Vec2::new(0.0, 40.0)).with_friction(1.0);
        // falling onto the floor while drifting sideways slowly
        let mut ball = Body::dynamic(Vec2::new(0.0, 1.0))
            .with_velocity(Vec2::new(0.1, 2.0))
            .with_friction(1.0);

        circle_circle(&mut ball, &mut floor, &mut rng(), &s).unwrap();
        assert!(ball.velocity().x.abs() < 1e-4);
    }

    #[test]
    fn test_kinetic_friction_is_clamped() {
        let s = SimSettings::default();
        let mut floor = Body::fixed(Vec2::new(0.0, 40.0)).with_friction(0.1);
        let mut ball = Body::dynamic(Vec2::new(0.0, 1.0))
            .with_velocity(Vec2::new(5.0, 3.0))
            .with_friction(0.1);

        let contact = circle_circle(&mut ball, &mut floor, &mut rng(), &s).unwrap();
        let vx = ball.velocity().x;
        assert!(vx > 0.0 && vx < 5.0);
        assert!((5.0 - vx - 0.1 * contact.impulse).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_circles_pushed_apart() {
        let s = SimSettings::default();
        let mut a = Body::dynamic(Vec2::new(3.0, 3.0));
        let mut b = Body::dynamic(Vec2::new(3.0, 3.0));

        let contact = circle_circle(&mut a, &mut b, &mut rng(), &s).unwrap();
        assert_eq!(contact.impulse, 0.0);
        assert!((a.pos.distance(b.pos) - 2.0 * s.degenerate_separation).abs() < 1e-4);
        assert!(a.pos.is_finite() && b.pos.is_finite());
    }

    #[test]
    fn test_box_landing_without_bounce() {
        let s = SimSettings::default();
        let floor = BoxCollider::new(-50.0, 10.0, 100.0, 20.0);
        let mut ball = Body::dynamic(Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(0.0, 1.0));

        let contact = circle_box(&mut ball, &floor, &s).unwrap();
        assert_eq!(contact.normal, Vec2::NEG_Y);
        assert!((ball.pos.y - (floor.y - ball.radius)).abs() < 1e-4);
        assert!(ball.velocity().y <= 1e-5);
        assert!(ball.can_jump);
    }

    #[test]
    fn test_box_bounce_with_restitution() {
        let s = SimSettings::default();
        let wall = BoxCollider::new(10.0, -100.0, 20.0, 200.0);
        let mut ball = Body::dynamic(Vec2::new(-5.0, 0.0))
            .with_velocity(Vec2::new(2.0, 0.0))
            .with_restitution(1.0);

        circle_box(&mut ball, &wall, &s).unwrap();
        assert!((ball.pos.x - (-10.0)).abs() < 1e-4);
        assert!((ball.velocity().x + 2.0).abs() < 1e-4);
        // side wall is not ground
        assert!(!ball.can_jump);
    }

    #[test]
    fn test_box_separating_circle_untouched() {
        let s = SimSettings::default();
        let floor = BoxCollider::new(-50.0, 10.0, 100.0, 20.0);
        let mut ball = Body::dynamic(Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(0.0, -1.0));
        let before = ball.clone();

        let contact = circle_box(&mut ball, &floor, &s).unwrap();
        assert_eq!(contact.impulse, 0.0);
        assert_eq!(ball.pos, before.pos);
        assert_eq!(ball.prev_pos, before.prev_pos);
    }

    #[test]
    fn test_center_inside_box_lifted_to_top() {
        let s = SimSettings::default();
        let floor = BoxCollider::new(-50.0, 10.0, 100.0, 20.0);
        let mut ball = Body::dynamic(Vec2::new(0.0, 20.0)).with_velocity(Vec2::new(0.0, 3.0));

        let contact = circle_box(&mut ball, &floor, &s).unwrap();
        assert_eq!(contact.normal, Vec2::NEG_Y);
        assert!((ball.pos.y - (10.0 - 20.0 - s.box_nudge)).abs() < 1e-4);
        assert!(ball.can_jump);
    }

    #[test]
    fn test_box_first_dispatch_flips_normal() {
        let s = SimSettings::default();
        let floor = BoxCollider::new(-50.0, 10.0, 100.0, 20.0);
        let mut ball = Body::dynamic(Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(0.0, 1.0));

        let contact = resolve(ShapeMut::Box(&floor), ShapeMut::Circle(&mut ball), &mut rng(), &s).unwrap();
        assert_eq!(contact.normal, Vec2::Y);
    }
}

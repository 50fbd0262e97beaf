use bevy::math::Vec2;

use super::body::{Body, BodyId};
use super::bounds::ContainerBounds;
use crate::config::SimConfig;

/// A resolved ball-ball contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
    /// Unit vector from `a` toward `b`.
    pub normal: Vec2,
    /// Penetration depth before correction.
    pub overlap: f32,
    /// Velocity change applied along the normal (0 for separating pairs).
    pub impulse: f32,
}

/// Hook for sound/flash effects on contact. Does nothing by default.
pub trait ContactListener: Send + Sync {
    fn on_contact(&mut self, _contact: &Contact) {}
}

pub struct NoopListener;

impl ContactListener for NoopListener {}

/// One sweep over every unordered pair of free balls in registry order.
///
/// Each pair is resolved once, against positions already moved by earlier
/// pairs in the same sweep; a cluster of three or more can keep some
/// overlap until the next tick.
pub fn resolve_collisions(
    bodies: &mut [Body],
    config: &SimConfig,
    bounds: ContainerBounds,
    listener: &mut dyn ContactListener,
) -> usize {
    let mut contacts = 0;
    let n = bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (head, tail) = bodies.split_at_mut(j);
            if let Some(contact) = resolve_pair(&mut head[i], &mut tail[0], config, bounds) {
                listener.on_contact(&contact);
                contacts += 1;
            }
        }
    }
    contacts
}

/// Separate and bounce two balls if they overlap. Held balls never take
/// part; dragging pushes others through [`super::drag`] instead.
pub fn resolve_pair(
    a: &mut Body,
    b: &mut Body,
    config: &SimConfig,
    bounds: ContainerBounds,
) -> Option<Contact> {
    if !(a.is_free() && b.is_free()) {
        return None;
    }

    let delta = b.position - a.position;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;
    if distance >= min_distance {
        return None;
    }

    // Coincident centers: pick +X rather than divide by zero.
    let normal = if distance > 0.0 { delta / distance } else { Vec2::X };
    let overlap = min_distance - distance;

    // Heavier ball moves less.
    let total_mass = a.mass + b.mass;
    a.position = bounds.clamp(a.position - normal * (overlap * b.mass / total_mass), a.radius);
    b.position = bounds.clamp(b.position + normal * (overlap * a.mass / total_mass), b.radius);

    let vel_along_normal = (b.velocity - a.velocity).dot(normal);
    let mut contact = Contact {
        a: a.id,
        b: b.id,
        normal,
        overlap,
        impulse: 0.0,
    };

    if vel_along_normal > 0.0 {
        return Some(contact);
    }

    if vel_along_normal.abs() < config.min_separation_velocity {
        // Resting contact: a fixed nudge instead of a near-zero impulse
        let nudge = normal * config.min_separation_velocity;
        a.velocity -= nudge;
        b.velocity += nudge;
        contact.impulse = config.min_separation_velocity;
        return Some(contact);
    }

    let j = -(1.0 + config.bounce_damping) * vel_along_normal / (1.0 / a.mass + 1.0 / b.mass);
    a.velocity -= normal * (j / a.mass);
    b.velocity += normal * (j / b.mass);

    a.velocity *= config.collision_damping;
    b.velocity *= config.collision_damping;

    contact.impulse = j;
    Some(contact)
}

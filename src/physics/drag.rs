//! Grab / drag / throw.
//!
//! A held ball follows the pointer exactly and bulldozes free balls out of
//! its way. On release it is thrown with the velocity implied by its last
//! few pointer samples.

use bevy::math::Vec2;
use tracing::debug;

use super::body::{Body, PositionSample};
use super::bounds::ContainerBounds;
use crate::config::SimConfig;

/// Free -> Held. Returns false if the ball was already held.
pub fn start_drag(body: &mut Body, pointer: Vec2, now: f64) -> bool {
    if body.held {
        return false;
    }
    body.held = true;
    body.velocity = Vec2::ZERO;
    body.drag_offset = body.position - pointer;
    body.reset_history(PositionSample {
        position: body.position,
        time: now,
    });
    debug!(id = body.id.0, x = body.position.x, y = body.position.y, "grab");
    true
}

/// Move the held ball at `index` to follow `pointer`, pushing aside every
/// free ball it lands on. Returns the new position, or `None` if that ball
/// is not held.
pub fn update_drag(
    bodies: &mut [Body],
    index: usize,
    pointer: Vec2,
    now: f64,
    config: &SimConfig,
    bounds: ContainerBounds,
) -> Option<Vec2> {
    let held = bodies.get(index)?;
    if !held.held {
        return None;
    }
    let radius = held.radius;
    let mut desired = bounds.clamp(pointer + held.drag_offset, radius);

    for (j, other) in bodies.iter_mut().enumerate() {
        if j == index || !other.is_free() {
            continue;
        }
        let delta = other.position - desired;
        let distance = delta.length();
        let min_distance = radius + other.radius;
        if distance >= min_distance {
            continue;
        }

        let normal = if distance > 0.0 { delta / distance } else { Vec2::X };
        let overlap = min_distance - distance;

        desired -= normal * overlap;
        other.position = bounds.clamp(
            other.position + normal * (overlap * config.drag_push_fraction),
            other.radius,
        );
        other.velocity += normal * config.drag_push_strength;
    }

    let desired = bounds.clamp(desired, radius);
    let body = &mut bodies[index];
    body.position = desired;
    body.record_sample(PositionSample {
        position: desired,
        time: now,
    });
    Some(desired)
}

/// Held -> Free, throwing the ball. Returns the throw velocity, or `None`
/// if the ball was not held.
pub fn end_drag(body: &mut Body, config: &SimConfig) -> Option<Vec2> {
    if !body.held {
        return None;
    }
    let velocity = body.throw_velocity(
        config.throw_sample_window,
        config.velocity_multiplier,
        config.max_throw_velocity,
    );
    body.held = false;
    body.velocity = velocity;
    body.drag_offset = Vec2::ZERO;
    body.clear_history();
    debug!(id = body.id.0, vx = velocity.x, vy = velocity.y, "release");
    Some(velocity)
}

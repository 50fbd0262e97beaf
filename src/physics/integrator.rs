//! Fixed-tick explicit Euler for free balls.
//!
//! Gravity and friction are per-tick constants, so the effective
//! acceleration depends on how often the host calls [`step`]; the defaults
//! assume [`crate::config::PHYSICS_HZ`].

use super::body::Body;
use super::bounds::ContainerBounds;
use crate::config::SimConfig;

/// Which walls a ball touched during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallHits {
    pub left: bool,
    pub right: bool,
    pub ceiling: bool,
    pub floor: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.left || self.right || self.ceiling || self.floor
    }
}

/// Advance one free ball by a single tick. Held balls are left untouched.
pub fn step(body: &mut Body, config: &SimConfig, bounds: ContainerBounds) -> WallHits {
    let mut hits = WallHits::default();
    if !body.is_free() {
        return hits;
    }

    let mut v = body.velocity;
    v.y += config.gravity;
    v *= config.friction;

    let mut p = body.position + v;

    // Near-rest jitter suppression
    if v.length() < config.rest_threshold_speed {
        v *= config.rest_damping;
    }

    let (left, right) = bounds.x_limits(body.radius);
    let (top, bottom) = bounds.y_limits(body.radius);

    if p.x < left {
        p.x = left;
        v.x = -v.x * config.bounce_damping;
        hits.left = true;
    } else if p.x > right {
        p.x = right;
        v.x = -v.x * config.bounce_damping;
        hits.right = true;
    }

    if p.y < top {
        p.y = top;
        v.y = -v.y * config.bounce_damping;
        hits.ceiling = true;
    } else if p.y > bottom {
        p.y = bottom;
        v.y = -v.y * config.bounce_damping;
        // only the floor drags sideways
        v.x *= config.ground_friction;
        hits.floor = true;
    }

    body.velocity = v;
    body.position = bounds.clamp(p, body.radius);
    hits
}

/// Total kinetic energy, in mass-units times (pixels per tick)².
pub fn kinetic_energy(bodies: &[Body]) -> f32 {
    bodies
        .iter()
        .map(|b| 0.5 * b.mass * b.speed() * b.speed())
        .sum()
}

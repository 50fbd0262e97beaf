use bevy::math::Vec2;
use tracing::{info, warn};

use super::body::Body;

/// Container extent in container-local pixels. Origin is the top-left
/// corner, +Y points down, so the floor is at `y = height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerBounds {
    pub width: f32,
    pub height: f32,
}

impl ContainerBounds {
    pub fn new(width: f32, height: f32) -> Self {
        // Negative or NaN extents collapse to an empty box.
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Admissible `[min, max]` for a center coordinate. When the box is
    /// narrower than the ball, both ends collapse onto the middle.
    pub fn axis_limits(radius: f32, extent: f32) -> (f32, f32) {
        if extent <= 2.0 * radius {
            let mid = extent * 0.5;
            (mid, mid)
        } else {
            (radius, extent - radius)
        }
    }

    pub fn x_limits(&self, radius: f32) -> (f32, f32) {
        Self::axis_limits(radius, self.width)
    }

    pub fn y_limits(&self, radius: f32) -> (f32, f32) {
        Self::axis_limits(radius, self.height)
    }

    /// Clamp a center into the box. Never panics, never produces NaN for
    /// finite input.
    pub fn clamp(&self, position: Vec2, radius: f32) -> Vec2 {
        let (x_min, x_max) = self.x_limits(radius);
        let (y_min, y_max) = self.y_limits(radius);
        Vec2::new(
            position.x.max(x_min).min(x_max),
            position.y.max(y_min).min(y_max),
        )
    }

    pub fn contains(&self, position: Vec2, radius: f32) -> bool {
        self.clamp(position, radius) == position
    }
}

/// Outcome of a resize: how many de-overlap passes ran and whether the
/// pile ended up overlap-free.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeReport {
    pub iterations: usize,
    pub converged: bool,
}

/// Bring every ball back inside a new container.
///
/// Velocities are zeroed (stale speed against a smaller box looks
/// explosive), positions clamped, then up to `max_iterations` passes split
/// each remaining overlap 50/50 regardless of mass. Coincident centers
/// have no direction to split along and are left alone.
pub fn recover_from_resize(
    bodies: &mut [Body],
    bounds: ContainerBounds,
    max_iterations: usize,
) -> ResizeReport {
    for body in bodies.iter_mut() {
        body.velocity = Vec2::ZERO;
        body.position = bounds.clamp(body.position, body.radius);
    }

    let mut iterations = 0;
    let mut moved_any = true;
    while moved_any && iterations < max_iterations {
        iterations += 1;
        moved_any = false;
        let n = bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = bodies.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                let delta = b.position - a.position;
                let distance = delta.length();
                let min_distance = a.radius + b.radius;
                if distance >= min_distance || distance == 0.0 {
                    continue;
                }

                let normal = delta / distance;
                let half = (min_distance - distance) * 0.5;
                a.position = bounds.clamp(a.position - normal * half, a.radius);
                b.position = bounds.clamp(b.position + normal * half, b.radius);
                moved_any = true;
            }
        }
    }

    let converged = !any_overlap(bodies);
    if converged {
        info!(
            width = bounds.width,
            height = bounds.height,
            iterations,
            "resize recovered"
        );
    } else {
        warn!(
            width = bounds.width,
            height = bounds.height,
            iterations,
            "resize left overlapping balls"
        );
    }
    ResizeReport {
        iterations,
        converged,
    }
}

/// Any pair closer than the sum of their radii (coincident centers count).
pub fn any_overlap(bodies: &[Body]) -> bool {
    bodies.iter().enumerate().any(|(i, a)| {
        bodies[i + 1..].iter().any(|b| {
            // small slack so touching balls don't count as overlapping
            a.position.distance(b.position) < a.radius + b.radius - 1e-3
        })
    })
}

use bevy::math::Vec2;
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use super::body::{Body, BodyId, ColorToken};
use super::bounds::ContainerBounds;
use crate::config::SimConfig;

/// Number of palette entries the default factory cycles through.
pub const PALETTE_LEN: ColorToken = 6;

/// What a new ball looks like before physics takes over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTemplate {
    pub radius: f32,
    pub color: ColorToken,
}

/// Supplies the size and display token of each new ball.
pub trait BodyFactory: Send + Sync {
    fn next_template(&mut self) -> BodyTemplate;
}

/// Fixed radius, round-robin palette.
#[derive(Clone, Debug)]
pub struct PaletteFactory {
    radius: f32,
    next_color: ColorToken,
}

impl PaletteFactory {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            next_color: 0,
        }
    }
}

impl BodyFactory for PaletteFactory {
    fn next_template(&mut self) -> BodyTemplate {
        let color = self.next_color;
        self.next_color = (self.next_color + 1) % PALETTE_LEN;
        BodyTemplate {
            radius: self.radius,
            color,
        }
    }
}

/// Ordered arena of balls. Registry order is the collision sweep order.
pub struct BodyRegistry {
    bodies: Vec<Body>,
    next_id: u32,
    factory: Box<dyn BodyFactory>,
    rng: SmallRng,
}

impl BodyRegistry {
    pub fn new(config: &SimConfig, factory: Box<dyn BodyFactory>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => rand::make_rng(),
        };
        Self {
            bodies: Vec::with_capacity(config.max_bodies),
            next_id: 1,
            factory,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Spawn a ball from the factory at a random spot along the top of the
    /// box. Returns `None` once `max_bodies` is reached.
    pub fn spawn(&mut self, config: &SimConfig, bounds: ContainerBounds) -> Option<BodyId> {
        if self.bodies.len() >= config.max_bodies {
            debug!(count = self.bodies.len(), "registry full, spawn rejected");
            return None;
        }

        let template = self.factory.next_template();
        // A broken factory must not break the radius > 0 invariant.
        let usable = template.radius > 0.0 && config.mass_for_radius(template.radius).is_finite();
        let radius = if usable {
            template.radius
        } else {
            config.ball_radius
        };

        let id = BodyId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let mut body = Body::new(
            id,
            Vec2::ZERO,
            Vec2::ZERO,
            radius,
            config.mass_for_radius(radius),
            config.history_capacity,
            template.color,
        );
        scatter(&mut body, &mut self.rng, config, bounds);
        debug!(id = id.0, x = body.position.x, y = body.position.y, "spawned");
        self.bodies.push(body);
        Some(id)
    }

    /// Remove one ball, keeping the order of the rest.
    pub fn remove(&mut self, id: BodyId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.bodies.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Re-randomize every ball in place (ids and sizes survive). Holds are
    /// dropped.
    pub fn scatter_all(&mut self, config: &SimConfig, bounds: ContainerBounds) {
        for body in self.bodies.iter_mut() {
            scatter(body, &mut self.rng, config, bounds);
        }
    }
}

fn scatter(body: &mut Body, rng: &mut SmallRng, config: &SimConfig, bounds: ContainerBounds) {
    let (x_min, x_max) = bounds.x_limits(body.radius);
    let (y_min, _) = bounds.y_limits(body.radius);
    let x = uniform(rng, x_min, x_max);
    // start at the top edge, a little staggered
    let y = y_min + uniform(rng, 0.0, body.radius);

    body.position = bounds.clamp(Vec2::new(x, y), body.radius);
    body.velocity = Vec2::new(
        uniform(rng, -config.spawn_speed, config.spawn_speed),
        uniform(rng, 0.0, config.spawn_speed * 0.5),
    );
    body.held = false;
    body.drag_offset = Vec2::ZERO;
    body.clear_history();
}

/// `random_range` panics on an empty range; a collapsed one yields `lo`.
fn uniform(rng: &mut SmallRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

use std::collections::VecDeque;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use serde::Serialize;
use tracing::{debug, info};

use super::body::{Body, BodyId, ColorToken};
use super::bounds::{ContainerBounds, ResizeReport, recover_from_resize};
use super::collision::{ContactListener, NoopListener, resolve_collisions};
use super::drag;
use super::integrator;
use super::registry::{BodyFactory, BodyRegistry, PaletteFactory};
use crate::config::{ConfigError, SimConfig};

/// Pointer input, already mapped into container-local coordinates.
/// Times are seconds on the caller's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Grab { id: BodyId, point: Vec2, time: f64 },
    Move { id: BodyId, point: Vec2, time: f64 },
    Release { id: BodyId },
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub events: usize,
    pub wall_hits: usize,
    pub contacts: usize,
}

/// Read-only per-frame view of a ball, for renderers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub held: bool,
    pub color: ColorToken,
}

impl From<&Body> for BodySnapshot {
    fn from(b: &Body) -> Self {
        Self {
            id: b.id,
            x: b.position.x,
            y: b.position.y,
            vx: b.velocity.x,
            vy: b.velocity.y,
            radius: b.radius,
            held: b.held,
            color: b.color,
        }
    }
}

/// Owns every ball and drives them. All mutation goes through `&mut self`,
/// so a drag can land between two ticks but never inside one.
#[derive(Resource)]
pub struct Simulator {
    config: SimConfig,
    bounds: ContainerBounds,
    registry: BodyRegistry,
    listener: Box<dyn ContactListener>,
    events: VecDeque<PointerEvent>,
    running: bool,
    ticks: u64,
}

impl Simulator {
    /// Validate `config` and fill the box with `config.initial_bodies` balls.
    pub fn new(config: SimConfig, bounds: ContainerBounds) -> Result<Self, ConfigError> {
        let factory = PaletteFactory::new(config.ball_radius);
        Self::with_factory(config, bounds, Box::new(factory))
    }

    pub fn with_factory(
        config: SimConfig,
        bounds: ContainerBounds,
        factory: Box<dyn BodyFactory>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = BodyRegistry::new(&config, factory);
        let mut sim = Self {
            config,
            bounds,
            registry,
            listener: Box::new(NoopListener),
            events: VecDeque::new(),
            running: true,
            ticks: 0,
        };
        let initial = sim.config.initial_bodies;
        sim.reset_hard(initial);
        Ok(sim)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> ContainerBounds {
        self.bounds
    }

    pub fn bodies(&self) -> &[Body] {
        self.registry.bodies()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.registry.get(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = listener;
    }

    // --------------------- Scheduling ---------------------

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(ticks = self.ticks, "simulation started");
        }
        self.running = true;
    }

    /// Stop integrating. Held balls stay held.
    pub fn stop(&mut self) {
        if self.running {
            info!(ticks = self.ticks, "simulation stopped");
        }
        self.running = false;
    }

    /// Apply queued pointer events, then (if running) integrate every free
    /// ball and run one collision sweep.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport {
            events: self.drain_events(),
            ..Default::default()
        };
        if !self.running {
            return report;
        }

        let bounds = self.bounds;
        for body in self.registry.bodies_mut() {
            if integrator::step(body, &self.config, bounds).any() {
                report.wall_hits += 1;
            }
        }
        report.contacts = resolve_collisions(
            self.registry.bodies_mut(),
            &self.config,
            bounds,
            self.listener.as_mut(),
        );
        self.ticks += 1;
        report
    }

    // --------------------- Registry ---------------------

    /// Add one ball. `None` when the registry is already at `max_bodies`.
    pub fn add_body(&mut self) -> Option<BodyId> {
        self.registry.spawn(&self.config, self.bounds)
    }

    pub fn remove_body(&mut self, id: BodyId) -> bool {
        self.events.retain(|e| event_target(e) != id);
        self.registry.remove(id)
    }

    pub fn remove_all(&mut self) {
        self.events.clear();
        self.registry.clear();
    }

    /// Keep the same balls, throw them all back in from the top.
    pub fn reset_soft(&mut self) {
        self.events.clear();
        self.registry.scatter_all(&self.config, self.bounds);
        info!(count = self.registry.len(), "soft reset");
    }

    /// Replace every ball with `count` new ones (capped at `max_bodies`).
    pub fn reset_hard(&mut self, count: usize) -> usize {
        self.remove_all();
        let count = count.min(self.config.max_bodies);
        for _ in 0..count {
            self.add_body();
        }
        info!(count = self.registry.len(), "hard reset");
        self.registry.len()
    }

    /// New container size. Safe to call repeatedly with the same size.
    pub fn resize(&mut self, width: f32, height: f32) -> ResizeReport {
        self.bounds = ContainerBounds::new(width, height);
        recover_from_resize(
            self.registry.bodies_mut(),
            self.bounds,
            self.config.resize_deoverlap_iterations,
        )
    }

    // --------------------- Pointer input ---------------------

    /// Topmost ball under `point` (later in registry order wins).
    pub fn body_at(&self, point: Vec2) -> Option<BodyId> {
        self.registry
            .bodies()
            .iter()
            .rev()
            .find(|b| b.contains(point))
            .map(|b| b.id)
    }

    /// Queue an event for the next tick (or `drain_events`).
    pub fn push_event(&mut self, event: PointerEvent) {
        self.events.push_back(event);
    }

    /// Apply every queued event in arrival order. Returns how many ran.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.events.pop_front() {
            match event {
                PointerEvent::Grab { id, point, time } => {
                    self.start_drag(id, point, time);
                }
                PointerEvent::Move { id, point, time } => {
                    self.update_drag(id, point, time);
                }
                PointerEvent::Release { id } => {
                    self.end_drag(id);
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn start_drag(&mut self, id: BodyId, point: Vec2, time: f64) -> bool {
        match self.registry.get_mut(id) {
            Some(body) => drag::start_drag(body, point, time),
            None => {
                debug!(id = id.0, "grab of unknown ball ignored");
                false
            }
        }
    }

    pub fn update_drag(&mut self, id: BodyId, point: Vec2, time: f64) -> Option<Vec2> {
        let index = self.registry.index_of(id)?;
        drag::update_drag(
            self.registry.bodies_mut(),
            index,
            point,
            time,
            &self.config,
            self.bounds,
        )
    }

    pub fn end_drag(&mut self, id: BodyId) -> Option<Vec2> {
        let body = self.registry.get_mut(id)?;
        drag::end_drag(body, &self.config)
    }

    // --------------------- Output ---------------------

    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.registry.bodies().iter().map(BodySnapshot::from).collect()
    }

    pub fn kinetic_energy(&self) -> f32 {
        integrator::kinetic_energy(self.registry.bodies())
    }
}

fn event_target(event: &PointerEvent) -> BodyId {
    match *event {
        PointerEvent::Grab { id, .. } | PointerEvent::Move { id, .. } | PointerEvent::Release { id } => id,
    }
}

use std::collections::VecDeque;

use bevy::math::Vec2;
use serde::Serialize;

/// Opaque handle for a ball. Renderers key their own visual tables by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BodyId(pub u32);

/// Display-only token handed through to the renderer (a palette index).
pub type ColorToken = u8;

/// One pointer sample recorded while a ball is held.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub position: Vec2,
    /// Seconds, from whatever clock the pointer events carry.
    pub time: f64,
}

/// A single ball.
#[derive(Clone, Debug)]
pub struct Body {
    pub id: BodyId,

    /// Center, container-local pixels (+Y down).
    pub position: Vec2,
    /// Pixels per tick.
    pub velocity: Vec2,

    pub radius: f32,
    pub mass: f32,

    /// True while a pointer owns this ball.
    pub held: bool,
    /// Body center minus pointer position, captured at grab time.
    pub drag_offset: Vec2,
    history: VecDeque<PositionSample>,
    history_capacity: usize,

    pub color: ColorToken,
}

impl Body {
    /// Create a free ball. `radius` and `mass` are expected to be positive;
    /// the config validates them before any body exists.
    pub fn new(
        id: BodyId,
        position: Vec2,
        velocity: Vec2,
        radius: f32,
        mass: f32,
        history_capacity: usize,
        color: ColorToken,
    ) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            mass,
            held: false,
            drag_offset: Vec2::ZERO,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity: history_capacity.max(1),
            color,
        }
    }

    pub fn is_free(&self) -> bool {
        !self.held
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// True if `point` lies inside the disc.
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }

    // --------------------- Drag history ---------------------

    pub fn history(&self) -> impl ExactSizeIterator<Item = &PositionSample> + '_ {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop all samples and start over from `sample`.
    pub fn reset_history(&mut self, sample: PositionSample) {
        self.history.clear();
        self.history.push_back(sample);
    }

    /// Append a sample, evicting the oldest beyond capacity. A timestamp
    /// older than the newest sample is raised to it so the history stays
    /// ordered even if the event source hiccups.
    pub fn record_sample(&mut self, mut sample: PositionSample) {
        if let Some(last) = self.history.back() {
            if sample.time < last.time {
                sample.time = last.time;
            }
        }
        self.history.push_back(sample);
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Velocity implied by the last `window` samples: displacement between
    /// the oldest and newest of them over the elapsed time, scaled by
    /// `multiplier` and capped to `max_speed` without changing direction.
    ///
    /// Fewer than two samples, or no elapsed time, yield zero.
    pub fn throw_velocity(&self, window: usize, multiplier: f32, max_speed: f32) -> Vec2 {
        let len = self.history.len();
        let window = window.min(len);
        if window < 2 {
            return Vec2::ZERO;
        }
        let first = self.history[len - window];
        let last = self.history[len - 1];
        let elapsed = last.time - first.time;
        if !(elapsed > 0.0) {
            return Vec2::ZERO;
        }

        let v = (last.position - first.position) / elapsed as f32 * multiplier;
        let speed = v.length();
        if speed > max_speed {
            v * (max_speed / speed)
        } else {
            v
        }
    }
}

use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::CURSOR_RADIUS;
use crate::physics::body::{BodyId, ColorToken};
use crate::physics::simulator::Simulator;
use crate::physics::systems::{CursorWorld, GrabState, local_to_world};

/// Renderer-side table from ball id to how it is drawn. The simulator never
/// sees this; entries for removed balls are dropped on the next sync.
#[derive(Resource, Default, Debug)]
pub struct BallVisuals(pub HashMap<BodyId, Color>);

pub fn palette_color(token: ColorToken) -> Color {
    match token {
        0 => Color::srgb(0.2, 0.7, 1.0),
        1 => Color::srgb(1.0, 0.45, 0.3),
        2 => Color::srgb(0.45, 0.9, 0.4),
        3 => Color::srgb(1.0, 0.85, 0.25),
        4 => Color::srgb(0.8, 0.45, 1.0),
        _ => Color::srgb(0.95, 0.95, 0.95),
    }
}

/// Keep `BallVisuals` in step with the registry.
pub fn sync_ball_visuals(sim: Option<Res<Simulator>>, mut visuals: ResMut<BallVisuals>) {
    let Some(sim) = sim else {
        return;
    };
    visuals
        .0
        .retain(|id, _| sim.bodies().iter().any(|b| b.id == *id));
    for b in sim.bodies() {
        visuals
            .0
            .entry(b.id)
            .or_insert_with(|| palette_color(b.color));
    }
}

/// Draw every ball from the per-frame snapshot. Held balls are drawn at
/// full brightness with a second ring.
pub fn draw_balls(mut gizmos: Gizmos, sim: Option<Res<Simulator>>, visuals: Res<BallVisuals>) {
    let Some(sim) = sim else {
        return;
    };
    let bounds = sim.bounds();
    for snap in sim.snapshot() {
        let center = local_to_world(Vec2::new(snap.x, snap.y), bounds);
        let color = visuals
            .0
            .get(&snap.id)
            .copied()
            .unwrap_or_else(|| palette_color(snap.color));
        if snap.held {
            gizmos.circle_2d(center, snap.radius, color);
            gizmos.circle_2d(center, snap.radius * 0.6, color);
        } else {
            gizmos.circle_2d(center, snap.radius, color.with_alpha(0.8));
        }
    }
}

pub fn draw_cursor_gizmo(mut gizmos: Gizmos, cursor: Res<CursorWorld>, grab: Res<GrabState>) {
    // Alpha 1.0 while holding a ball, faint otherwise
    let alpha = if grab.0.is_some() { 1.0 } else { 0.25 };
    gizmos.circle_2d(cursor.0, CURSOR_RADIUS, Color::srgba(1.0, 0.0, 0.0, alpha));
}

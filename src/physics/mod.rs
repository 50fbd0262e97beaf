use bevy::prelude::*;

pub mod body;
pub mod bounds;
pub mod collision;
pub mod drag;
pub mod integrator;
pub mod registry;
pub mod simulator;
pub mod systems;

pub mod debug;

pub use body::{Body, BodyId, ColorToken, PositionSample};
pub use bounds::{ContainerBounds, ResizeReport};
pub use collision::{Contact, ContactListener};
pub use registry::{BodyFactory, BodyTemplate, PaletteFactory};
pub use simulator::{BodySnapshot, PointerEvent, Simulator, TickReport};

use crate::config::SimConfig;
use crate::physics::debug::BallVisuals;
use crate::physics::systems::{CursorWorld, GrabState, ResizeDebounce, SimSettings};

/// Plug this into your App with `.add_plugins(PhysicsPlugin::new(config))`.
pub struct PhysicsPlugin {
    pub config: SimConfig,
}

impl PhysicsPlugin {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
}

impl Default for PhysicsPlugin {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimSettings(self.config.clone()))
            .init_resource::<CursorWorld>()
            .init_resource::<GrabState>()
            .init_resource::<ResizeDebounce>()
            .init_resource::<BallVisuals>()
            // Camera + simulator sized to the window
            .add_systems(
                Startup,
                (systems::spawn_camera, systems::spawn_simulation),
            )
            // Input, resize and drawing once per render frame
            .add_systems(
                Update,
                (
                    systems::update_cursor_world,
                    systems::pointer_input.after(systems::update_cursor_world),
                    systems::debounce_window_resize,
                    systems::keyboard_controls,
                    systems::exit_on_esc_or_q_if_native,
                    debug::sync_ball_visuals,
                    debug::draw_balls.after(debug::sync_ball_visuals),
                    debug::draw_cursor_gizmo,
                ),
            )
            // Queued pointer events + integration + collisions at a fixed rate
            .add_systems(FixedUpdate, systems::fixed_tick);
    }
}

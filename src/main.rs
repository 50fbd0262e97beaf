use bevy::prelude::*;
use tracing::warn;

use ball_pit::config::{PHYSICS_HZ, SimConfig};
use ball_pit::physics::PhysicsPlugin;

/// Optional path to a JSON file overriding any subset of `SimConfig`.
const CONFIG_ENV: &str = "BALLPIT_CONFIG";

fn load_config() -> SimConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return SimConfig::default();
    };
    SimConfig::from_json_file(&path).unwrap_or_else(|err| {
        warn!(%path, %err, "could not load config, using defaults");
        SimConfig::default()
    })
}

fn main() {
    App::new()
        // Solid black background
        .insert_resource(ClearColor(Color::BLACK))
        // Configure the fixed timestep clock (used in FixedUpdate)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
        // Bevy's core engine features
        .add_plugins(DefaultPlugins)
        // Ball pit simulation, input and gizmo drawing
        .add_plugins(PhysicsPlugin::new(load_config()))
        .run();
}

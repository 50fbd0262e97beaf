use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::physics::body::BodyId;
use crate::physics::bounds::ContainerBounds;
use crate::physics::simulator::{PointerEvent, Simulator};

/// Config the simulator is (re)built from.
#[derive(Resource, Debug, Clone)]
pub struct SimSettings(pub SimConfig);

/// Cursor position in world space (origin at window center, +Y up).
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct CursorWorld(pub Vec2);

/// The ball the mouse currently owns, if any.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct GrabState(pub Option<BodyId>);

/// Quiet period after the last window resize before the simulator is told.
pub const RESIZE_DEBOUNCE_SECS: f32 = 0.15;

/// Window resizes arrive in bursts while dragging a window edge; only the
/// last size matters.
#[derive(Resource, Debug)]
pub struct ResizeDebounce {
    pending: Option<Vec2>,
    timer: Timer,
}

impl Default for ResizeDebounce {
    fn default() -> Self {
        Self {
            pending: None,
            timer: Timer::from_seconds(RESIZE_DEBOUNCE_SECS, TimerMode::Once),
        }
    }
}

impl ResizeDebounce {
    /// Remember `size`, restarting the quiet period.
    pub fn request(&mut self, size: Vec2) {
        self.pending = Some(size);
        self.timer.reset();
    }

    /// Advance by `delta`; yields the size once the quiet period elapses.
    pub fn poll(&mut self, delta: std::time::Duration) -> Option<Vec2> {
        self.pending?;
        self.timer.tick(delta);
        if self.timer.is_finished() {
            self.pending.take()
        } else {
            None
        }
    }
}

// --------------------- Coordinate frames ---------------------

/// Container-local (top-left origin, +Y down) to Bevy world (centered, +Y up).
pub fn local_to_world(p: Vec2, bounds: ContainerBounds) -> Vec2 {
    Vec2::new(p.x - bounds.width * 0.5, bounds.height * 0.5 - p.y)
}

pub fn world_to_local(p: Vec2, bounds: ContainerBounds) -> Vec2 {
    Vec2::new(p.x + bounds.width * 0.5, bounds.height * 0.5 - p.y)
}

// --------------------- Startup ---------------------

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Build the simulator sized to the primary window. A config that fails
/// validation falls back to the defaults.
pub fn spawn_simulation(
    mut commands: Commands,
    settings: Res<SimSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let size = windows.single().map(|w| w.size()).unwrap_or(Vec2::ZERO);
    let bounds = ContainerBounds::new(size.x, size.y);

    let sim = match Simulator::new(settings.0.clone(), bounds) {
        Ok(sim) => sim,
        Err(err) => {
            warn!(%err, "invalid simulation config, using defaults");
            match Simulator::new(SimConfig::default(), bounds) {
                Ok(sim) => sim,
                Err(err) => {
                    warn!(%err, "default config rejected, simulation disabled");
                    return;
                }
            }
        }
    };
    commands.insert_resource(sim);
}

// --------------------- Update ---------------------

/// Native-only quit: press Esc or Q to exit the app.
/// (No-op on wasm32.)
pub fn exit_on_esc_or_q_if_native(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: MessageWriter<AppExit>,
) {
    if cfg!(not(target_arch = "wasm32")) && keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyQ])
    {
        exit.write(AppExit::Success);
    }
}

/// Update the cursor's world position each frame (2D camera).
pub fn update_cursor_world(
    windows: Query<&Window, With<PrimaryWindow>>,
    q_cam: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut cursor: ResMut<CursorWorld>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(screen_pos) = window.cursor_position() else {
        return;
    };
    if let Ok((camera, cam_xform)) = q_cam.single() {
        if let Ok(world_pos) = camera.viewport_to_world_2d(cam_xform, screen_pos) {
            cursor.0 = world_pos;
        }
    }
}

/// Turn left-button press/move/release into queued pointer events.
pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorWorld>,
    time: Res<Time>,
    mut grab: ResMut<GrabState>,
    sim: Option<ResMut<Simulator>>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    let point = world_to_local(cursor.0, sim.bounds());
    let now = time.elapsed_secs_f64();

    if buttons.just_pressed(MouseButton::Left) {
        press(&mut sim, &mut grab, point, now);
        return;
    }

    let Some(id) = grab.0 else {
        return;
    };
    if buttons.pressed(MouseButton::Left) {
        sim.push_event(PointerEvent::Move {
            id,
            point,
            time: now,
        });
    } else {
        sim.push_event(PointerEvent::Release { id });
        grab.0 = None;
    }
}

/// A fresh press. A release and a press can land in the same frame, so the
/// previous hold is let go before anything new is grabbed.
fn press(sim: &mut Simulator, grab: &mut GrabState, point: Vec2, now: f64) {
    if let Some(prev) = grab.0.take() {
        sim.push_event(PointerEvent::Release { id: prev });
    }
    if let Some(id) = sim.body_at(point) {
        sim.push_event(PointerEvent::Grab {
            id,
            point,
            time: now,
        });
        grab.0 = Some(id);
    }
}

pub fn debounce_window_resize(
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    time: Res<Time>,
    mut debounce: ResMut<ResizeDebounce>,
    sim: Option<ResMut<Simulator>>,
) {
    let primary = primary.single().ok();
    for ev in resized.read() {
        if Some(ev.window) == primary {
            debounce.request(Vec2::new(ev.width, ev.height));
        }
    }
    let Some(size) = debounce.poll(time.delta()) else {
        return;
    };
    if let Some(mut sim) = sim {
        sim.resize(size.x, size.y);
    }
}

/// Space: start/stop. R: soft reset. Shift+R: hard reset. A: add a ball.
pub fn keyboard_controls(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<SimSettings>,
    mut grab: ResMut<GrabState>,
    sim: Option<ResMut<Simulator>>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    if keys.just_pressed(KeyCode::Space) {
        if sim.is_running() {
            sim.stop();
        } else {
            sim.start();
        }
    }
    if keys.just_pressed(KeyCode::KeyR) {
        // resets drop every hold
        grab.0 = None;
        if keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            sim.reset_hard(settings.0.initial_bodies);
        } else {
            sim.reset_soft();
        }
    }
    if keys.just_pressed(KeyCode::KeyA) && sim.add_body().is_none() {
        debug!(count = sim.len(), "ball pit is full");
    }
}

// --------------------- FixedUpdate ---------------------

/// One simulation tick per fixed step (rate set in main via Time::<Fixed>).
pub fn fixed_tick(sim: Option<ResMut<Simulator>>) {
    if let Some(mut sim) = sim {
        sim.tick();
    }
}

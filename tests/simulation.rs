use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bevy::math::Vec2;

use ball_pit::config::SimConfig;
use ball_pit::physics::bounds::any_overlap;
use ball_pit::physics::collision::{resolve_collisions, resolve_pair};
use ball_pit::physics::{
    Body, BodyId, Contact, ContactListener, ContainerBounds, PointerEvent, Simulator, drag,
    integrator,
};

/// Build a simulator with a fixed seed and `initial` balls in an 800x600 box.
pub fn seeded_sim(initial: usize, config: SimConfig) -> Simulator {
    let config = SimConfig {
        initial_bodies: initial,
        seed: Some(11),
        ..config
    };
    Simulator::new(config, ContainerBounds::new(800.0, 600.0)).expect("valid config")
}

pub fn ball(id: u32, x: f32, y: f32, vx: f32, vy: f32, mass: f32) -> Body {
    Body::new(BodyId(id), Vec2::new(x, y), Vec2::new(vx, vy), 10.0, mass, 5, 0)
}

fn assert_in_bounds(sim: &Simulator) {
    let bounds = sim.bounds();
    for b in sim.bodies() {
        assert!(
            bounds.contains(b.position, b.radius),
            "ball {:?} out of bounds at {:?}",
            b.id,
            b.position
        );
        assert!(b.radius > 0.0 && b.mass > 0.0);
    }
}

// ==================================================================================
// Integrator
// ==================================================================================

#[test]
fn wall_bounce_never_gains_speed_on_the_bounced_axis() {
    let config = SimConfig::default();
    let bounds = ContainerBounds::new(200.0, 200.0);

    for vx in [0.5f32, 3.0, 12.0, 40.0] {
        let mut b = ball(1, 185.0, 100.0, vx, 0.0, 1.0);
        let pre = (vx * config.friction).abs();
        let hits = integrator::step(&mut b, &config, bounds);
        if hits.right {
            assert!(b.velocity.x <= 0.0);
            assert!(b.velocity.x.abs() <= pre, "vx={vx} gained speed");
        }
    }

    let mut b = ball(1, 100.0, 185.0, 0.0, 20.0, 1.0);
    let pre = ((20.0 + config.gravity) * config.friction).abs();
    let hits = integrator::step(&mut b, &config, bounds);
    assert!(hits.floor);
    assert!(b.velocity.y.abs() <= pre);
}

#[test]
fn bounds_hold_every_tick_under_drags_and_resizes() {
    let mut sim = seeded_sim(40, SimConfig::default());
    let ids: Vec<BodyId> = sim.bodies().iter().map(|b| b.id).collect();

    let mut t = 0.0;
    for tick in 0..1500 {
        t += 1.0 / 60.0;
        match tick {
            100 => {
                let at = sim.bodies()[0].position;
                sim.push_event(PointerEvent::Grab { id: ids[0], point: at, time: t });
            }
            101..=300 => {
                // sweep the held ball back and forth through the pile
                let x = 400.0 + 380.0 * ((tick as f32) * 0.05).sin();
                sim.push_event(PointerEvent::Move {
                    id: ids[0],
                    point: Vec2::new(x, 560.0),
                    time: t,
                });
            }
            301 => sim.push_event(PointerEvent::Release { id: ids[0] }),
            600 => {
                sim.resize(500.0, 400.0);
            }
            900 => {
                sim.resize(1000.0, 700.0);
            }
            _ => {}
        }
        sim.tick();
        assert_in_bounds(&sim);
    }
}

// ==================================================================================
// Collision resolver
// ==================================================================================

#[test]
fn lighter_ball_moves_twice_as_far() {
    let config = SimConfig::default();
    let bounds = ContainerBounds::new(1000.0, 1000.0);
    let mut heavy = ball(1, 100.0, 100.0, 0.0, 0.0, 2.0);
    let mut light = ball(2, 112.0, 100.0, 0.0, 0.0, 1.0);

    resolve_pair(&mut heavy, &mut light, &config, bounds).expect("overlapping");
    let heavy_moved = (heavy.position.x - 100.0).abs();
    let light_moved = (light.position.x - 112.0).abs();
    assert!((light_moved - 2.0 * heavy_moved).abs() < 1e-4);
    assert!((heavy_moved + light_moved - 8.0).abs() < 1e-4);
}

#[test]
fn separating_pair_gets_no_velocity_change() {
    let config = SimConfig::default();
    let bounds = ContainerBounds::new(1000.0, 1000.0);
    let mut a = ball(1, 100.0, 100.0, -1.0, 0.5, 1.0);
    let mut b = ball(2, 115.0, 100.0, 2.0, -0.5, 3.0);

    let contact = resolve_pair(&mut a, &mut b, &config, bounds).expect("overlapping");
    assert_eq!(contact.impulse, 0.0);
    assert_eq!(a.velocity, Vec2::new(-1.0, 0.5));
    assert_eq!(b.velocity, Vec2::new(2.0, -0.5));
}

#[test]
fn single_sweep_can_leave_residual_overlap_in_a_cluster() {
    let config = SimConfig::default();
    let bounds = ContainerBounds::new(1000.0, 1000.0);
    let mut bodies = vec![
        ball(1, 100.0, 100.0, 0.0, 0.0, 1.0),
        ball(2, 110.0, 100.0, 0.0, 0.0, 1.0),
        ball(3, 120.0, 100.0, 0.0, 0.0, 1.0),
    ];
    let mut listener = Counting(Arc::new(AtomicUsize::new(0)));
    let contacts = resolve_collisions(&mut bodies, &config, bounds, &mut listener);

    // (a,b) then (b,c) resolved; (a,c) was apart when visited
    assert_eq!(contacts, 2);
    assert!((bodies[0].position.x - 95.0).abs() < 1e-4);
    assert!((bodies[1].position.x - 107.5).abs() < 1e-4);
    assert!((bodies[2].position.x - 127.5).abs() < 1e-4);
    assert!(any_overlap(&bodies));
}

struct Counting(Arc<AtomicUsize>);

impl ContactListener for Counting {
    fn on_contact(&mut self, _contact: &Contact) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn contact_listener_hears_the_pile_settle() {
    let mut sim = seeded_sim(20, SimConfig::default());
    let heard = Arc::new(AtomicUsize::new(0));
    sim.set_contact_listener(Box::new(Counting(heard.clone())));

    let mut reported = 0;
    for _ in 0..600 {
        reported += sim.tick().contacts;
    }
    assert!(reported > 0);
    assert_eq!(heard.load(Ordering::Relaxed), reported);
}

// ==================================================================================
// Drag controller
// ==================================================================================

#[test]
fn grabbed_ball_ignores_physics_until_released() {
    let mut sim = seeded_sim(1, SimConfig::default());
    let id = sim.bodies()[0].id;
    let at = sim.bodies()[0].position;

    assert!(sim.start_drag(id, at, 0.0));
    for _ in 0..30 {
        sim.tick();
    }
    let held = sim.body(id).expect("still there");
    assert!(held.held);
    assert_eq!(held.position, at);
    assert_eq!(held.velocity, Vec2::ZERO);

    // only the last three samples count, so the grab point drops out
    sim.update_drag(id, Vec2::new(290.0, 300.0), 0.1);
    sim.update_drag(id, Vec2::new(300.0, 300.0), 0.2);
    sim.update_drag(id, Vec2::new(310.0, 300.0), 0.3);
    let thrown = sim.end_drag(id).expect("was held");
    assert!(!sim.body(id).expect("still there").held);
    assert!(thrown.x > 0.0);

    sim.tick();
    let free = sim.body(id).expect("still there");
    assert!(free.position.x > 310.0);
    assert!(free.position.y > 300.0, "gravity resumes after release");
}

#[test]
fn throw_matches_the_recorded_motion_and_is_capped() {
    let config = SimConfig {
        velocity_multiplier: 0.3,
        max_throw_velocity: 15.0,
        ..Default::default()
    };
    let bounds = ContainerBounds::new(800.0, 600.0);

    let drag_path = |config: &SimConfig| {
        let mut bodies = vec![ball(1, 100.0, 100.0, 0.0, 0.0, 1.0)];
        drag::start_drag(&mut bodies[0], Vec2::new(100.0, 100.0), 0.0);
        drag::update_drag(&mut bodies, 0, Vec2::new(130.0, 100.0), 0.1, config, bounds);
        drag::update_drag(&mut bodies, 0, Vec2::new(160.0, 100.0), 0.2, config, bounds);
        drag::end_drag(&mut bodies[0], config).expect("was held")
    };

    let capped = drag_path(&config);
    assert!((capped.x - 15.0).abs() < 1e-4);
    assert_eq!(capped.y, 0.0);

    let uncapped = drag_path(&SimConfig {
        max_throw_velocity: 1000.0,
        ..config.clone()
    });
    assert!((uncapped.x - 90.0).abs() < 1e-3);
}

#[test]
fn release_of_a_free_ball_is_ignored() {
    let mut sim = seeded_sim(2, SimConfig::default());
    let id = sim.bodies()[0].id;
    assert_eq!(sim.end_drag(id), None);
    assert_eq!(sim.end_drag(BodyId(9999)), None);
    assert!(!sim.start_drag(BodyId(9999), Vec2::ZERO, 0.0));
}

#[test]
fn two_balls_can_be_held_at_once() {
    let mut sim = seeded_sim(2, SimConfig::default());
    let ids: Vec<BodyId> = sim.bodies().iter().map(|b| b.id).collect();
    let starts: Vec<Vec2> = sim.bodies().iter().map(|b| b.position).collect();

    assert!(sim.start_drag(ids[0], starts[0], 0.0));
    assert!(sim.start_drag(ids[1], starts[1], 0.0));
    sim.update_drag(ids[0], Vec2::new(200.0, 300.0), 0.1);
    sim.update_drag(ids[1], Vec2::new(600.0, 300.0), 0.1);
    sim.end_drag(ids[0]);

    assert!(!sim.body(ids[0]).expect("present").held);
    assert!(sim.body(ids[1]).expect("present").held);
    assert_eq!(sim.body(ids[1]).expect("present").position, Vec2::new(600.0, 300.0));
}

// ==================================================================================
// Boundary manager
// ==================================================================================

/// Park both balls side by side mid-box, then let go of them.
fn place_pair(sim: &mut Simulator, a: Vec2, b: Vec2) {
    let ids: Vec<BodyId> = sim.bodies().iter().map(|b| b.id).collect();
    let starts: Vec<Vec2> = sim.bodies().iter().map(|b| b.position).collect();
    sim.start_drag(ids[0], starts[0], 0.0);
    sim.start_drag(ids[1], starts[1], 0.0);
    sim.update_drag(ids[0], a, 0.0);
    sim.update_drag(ids[1], b, 0.0);
    sim.end_drag(ids[0]);
    sim.end_drag(ids[1]);
}

#[test]
fn shrink_recovers_to_separated_in_bounds_balls() {
    let mut sim = seeded_sim(2, SimConfig::default());
    place_pair(&mut sim, Vec2::new(60.0, 300.0), Vec2::new(80.0, 300.0));

    // radius 30: both clamp onto y = 30, 20px apart, then split to 60px
    let report = sim.resize(130.0, 60.0);
    assert!(report.converged);
    assert!(report.iterations <= sim.config().resize_deoverlap_iterations);
    assert_in_bounds(&sim);
    assert!(!any_overlap(sim.bodies()));
    assert!(sim.bodies().iter().all(|b| b.velocity == Vec2::ZERO));
}

#[test]
fn impossible_shrink_hits_the_iteration_cap() {
    let mut sim = seeded_sim(2, SimConfig::default());
    place_pair(&mut sim, Vec2::new(60.0, 300.0), Vec2::new(80.0, 300.0));

    // 100px wide cannot hold two 60px balls side by side
    let report = sim.resize(100.0, 60.0);
    assert!(!report.converged);
    assert_eq!(report.iterations, sim.config().resize_deoverlap_iterations);
    assert_in_bounds(&sim);
}

#[test]
fn resize_is_idempotent() {
    let mut sim = seeded_sim(2, SimConfig::default());
    // overlapping by 40px mid-box, far from every wall of the new size
    place_pair(&mut sim, Vec2::new(300.0, 200.0), Vec2::new(320.0, 200.0));

    let report = sim.resize(640.0, 480.0);
    assert!(report.converged);
    assert!(!any_overlap(sim.bodies()));
    let first = sim.snapshot();
    assert_eq!((first[0].x, first[1].x), (280.0, 340.0));

    let report = sim.resize(640.0, 480.0);
    assert!(report.converged);
    assert_eq!(sim.snapshot(), first);
}

// ==================================================================================
// Registry
// ==================================================================================

#[test]
fn registry_refuses_more_than_max_bodies() {
    let mut sim = seeded_sim(40, SimConfig::default());
    assert_eq!(sim.len(), 40);
    assert_eq!(sim.add_body(), None);
    assert_eq!(sim.len(), 40);

    sim.remove_all();
    assert!(sim.is_empty());
    assert!(sim.add_body().is_some());
}

#[test]
fn snapshot_lists_every_ball_in_order() {
    let mut sim = seeded_sim(5, SimConfig::default());
    sim.tick();
    let snap = sim.snapshot();
    let ids: Vec<BodyId> = sim.bodies().iter().map(|b| b.id).collect();
    assert_eq!(snap.iter().map(|s| s.id).collect::<Vec<_>>(), ids);
    let json = serde_json::to_string(&snap).expect("serializable");
    assert!(json.contains("\"held\":false"));
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut sim = seeded_sim(15, SimConfig::default());
        for _ in 0..300 {
            sim.tick();
        }
        sim.snapshot()
    };
    assert_eq!(run(), run());
}

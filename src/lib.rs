//! Balls in a box: gravity, wall and ball-ball bounces, and grab-and-throw.
//!
//! [`physics::Simulator`] is the whole simulation and knows nothing about
//! windows; [`physics::PhysicsPlugin`] wires it to a Bevy app.

pub mod config;
pub mod physics;

//! Granular simulation engine for the driftclock face.
//!
//! Grains live in one of two representations. Dynamic particles carry a
//! continuous position and velocity and bounce off anything occupied. Once a
//! particle comes to rest its color is written into the static mass grid,
//! where a bottom-up cellular automaton lets settled material crumble, spill
//! down slopes and get crushed by the clock digits. Disturbed mass turns back
//! into particles through the same spawn path, so the two layers hand grains
//! back and forth every tick.
//!
//! The [`Simulation`] driver owns all of it and reacts to the obstacle shape
//! it is handed each tick.

mod breeze;
mod driver;
mod mass;
mod occupancy;
mod particle;
mod pool;
mod rng;

pub use breeze::BreezeField;
pub use driver::{Simulation, TickInput};
pub use mass::StaticMass;
pub use occupancy::Occupancy;
pub use particle::Particle;
pub use pool::{ParticleId, ParticlePool};
pub use rng::GrainRng;

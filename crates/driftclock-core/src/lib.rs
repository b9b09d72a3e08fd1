//! Core types shared by the driftclock crates.
//!
//! Everything here is plain data: packed grain colors, rectangles, the
//! wall-clock instant the simulation reacts to, the obstacle query trait and
//! the tunable settings for the granular engine.

mod color;
mod geometry;
mod mask;
mod settings;
mod time;

pub use color::PackedColor;
pub use geometry::Rect;
pub use mask::ObstacleMask;
pub use settings::{
    HueMode, Material, PhysicsSettings, PoolSettings, ReactionSettings, SimSettings,
};
pub use time::{Moment, TimeFormat};

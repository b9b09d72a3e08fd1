//! Seven-segment clock face for driftclock.
//!
//! The face is both what the user reads and the obstacle the grains pile
//! against: [`DigitalClock`] implements [`driftclock_core::ObstacleMask`].

mod clock;
mod digit;
mod hue;

pub use clock::DigitalClock;
pub use digit::{Digit, SEGMENTS, Segment};
pub use hue::{face_color, hue_to_rgb};

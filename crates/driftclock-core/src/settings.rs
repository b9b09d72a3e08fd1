//! Tunable settings for the granular engine and the clock face.

use serde::{Deserialize, Serialize};

/// Per-grain physics constants.
///
/// `elasticity` and `friction` must stay below one so every bounce loses
/// energy and grains eventually come to rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration added every tick.
    pub gravity: f64,
    /// Horizontal speed kept after a vertical bounce.
    pub friction: f64,
    /// Fraction of speed kept (and reversed) by a bounce.
    pub elasticity: f64,
    /// Below this speed on both axes a supported grain is at rest.
    pub movement_epsilon: f64,
    /// Horizontal speed kept by settled mass that starts falling straight down.
    pub fall_drift: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.01,
            friction: 0.8,
            elasticity: 0.5,
            movement_epsilon: 0.1,
            fall_drift: 0.25,
        }
    }
}

/// Particle pool compaction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Never compact a pool at or below this many slots.
    pub compact_threshold: usize,
    /// Compact once the pool holds more than this many slots per live grain.
    pub compact_factor: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            compact_threshold: 128,
            compact_factor: 2,
        }
    }
}

/// Reactions to the clock face and the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionSettings {
    /// Burst vanished segments into grains.
    pub pop_vanished: bool,
    /// Let lit segments shed the occasional grain.
    pub drip: bool,
    /// Per-segment, per-tick chance of a drip.
    pub drip_chance: f64,
    /// Convert all settled mass back into grains when the hour changes.
    pub erupt_on_hour: bool,
    /// Seconds after the hour during which the floor is open.
    pub dropout_seconds: u32,
    /// Mean number of grains falling in from the top each tick.
    pub snowfall_per_tick: f64,
    /// Per-row breezes pushing airborne grains sideways.
    pub breeze: bool,
}

impl Default for ReactionSettings {
    fn default() -> Self {
        Self {
            pop_vanished: true,
            drip: false,
            drip_chance: 0.075,
            erupt_on_hour: true,
            dropout_seconds: 15,
            snowfall_per_tick: 0.0,
            breeze: false,
        }
    }
}

/// Everything the simulation driver needs to know up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub physics: PhysicsSettings,
    pub pool: PoolSettings,
    pub reactions: ReactionSettings,
}

/// The material falling around the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Colored grains that burst out of vanished digits.
    #[default]
    Sand,
    /// White flakes drifting in from the top on the breeze.
    Snow,
}

impl Material {
    /// Toggle between sand and snow.
    pub fn toggle(&self) -> Self {
        match self {
            Material::Sand => Material::Snow,
            Material::Snow => Material::Sand,
        }
    }

    /// Preset simulation settings for this material.
    pub fn settings(&self) -> SimSettings {
        match self {
            Material::Sand => SimSettings::default(),
            Material::Snow => SimSettings {
                reactions: ReactionSettings {
                    pop_vanished: false,
                    snowfall_per_tick: 2.0,
                    breeze: true,
                    ..ReactionSettings::default()
                },
                ..SimSettings::default()
            },
        }
    }

    /// Default tick length in milliseconds.
    pub fn tick_ms(&self) -> u64 {
        match self {
            Material::Sand => 33,
            Material::Snow => 100,
        }
    }
}

/// How the clock face picks its color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueMode {
    /// Walk the whole hue circle every half hour.
    #[default]
    Rainbow,
    /// Swing between red and green every minute.
    Festive,
}

impl HueMode {
    /// Cycle to the next hue mode.
    pub fn next(&self) -> Self {
        match self {
            HueMode::Rainbow => HueMode::Festive,
            HueMode::Festive => HueMode::Rainbow,
        }
    }
}

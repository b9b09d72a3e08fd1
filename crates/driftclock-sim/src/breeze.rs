//! Horizontal breezes, one per row, that push airborne grains about.

use crate::particle::{Particle, cell_of};
use crate::rng::GrainRng;

/// Strongest breeze a row can hold.
const MAX_BREEZE: f64 = 8.0;

/// Horizontal speed a grain approaches in the strongest breeze.
const MAX_DRIFT: f64 = 0.6;

/// How quickly a grain matches the breeze in its row.
const COUPLING: f64 = 0.2;

/// Upward kick per unit of breeze.
const LIFT: f64 = 0.002;

/// Per-row wind speeds, smoothed between neighbours and slowly decaying.
#[derive(Debug, Clone)]
pub struct BreezeField {
    rows: Vec<f64>,
}

impl BreezeField {
    pub fn new(height: i32) -> Self {
        Self {
            rows: vec![0.0; height.max(0) as usize],
        }
    }

    /// Breeze in row `y`, calm outside the field.
    pub fn at(&self, y: i32) -> f64 {
        usize::try_from(y)
            .ok()
            .and_then(|y| self.rows.get(y))
            .copied()
            .unwrap_or(0.0)
    }

    /// Gust one random row, then blend neighbouring rows and bleed energy.
    pub fn update(&mut self, rng: &mut GrainRng) {
        if self.rows.is_empty() {
            return;
        }
        let gust = rng.below(self.rows.len());
        self.rows[gust] = rng.frac() * 2.0 * MAX_BREEZE - MAX_BREEZE;

        let mut last = self.rows[0];
        for y in 1..self.rows.len() {
            let breeze = self.rows[y].clamp(-MAX_BREEZE, MAX_BREEZE);
            self.rows[y - 1] = last * 0.899 + breeze * 0.100;
            self.rows[y] = last * 0.100 + breeze * 0.899;
            // Depower peaks a little more.
            if breeze.abs() > 1.0 {
                self.rows[y] *= 0.99;
            }
            last = self.rows[y];
        }
    }

    /// Nudge a grain toward the breeze in its row and give it some lift.
    pub fn push(&self, particle: &mut Particle, rng: &mut GrainRng) {
        let breeze = self.at(cell_of(particle.y));
        if breeze == 0.0 {
            return;
        }
        let target = breeze / MAX_BREEZE * MAX_DRIFT;
        particle.dx = (particle.dx + (target - particle.dx) * COUPLING).clamp(-1.0, 1.0);
        particle.dy = (particle.dy - breeze.abs() * rng.frac() * LIFT).max(-particle.tv);
    }
}

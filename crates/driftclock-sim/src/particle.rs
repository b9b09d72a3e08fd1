//! A single freely moving grain.

use driftclock_core::{ObstacleMask, PackedColor, PhysicsSettings};

use crate::rng::GrainRng;

/// A grain with continuous position and velocity.
///
/// Velocity components stay within one cell per tick, so a step can never
/// tunnel through a single-cell wall.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Horizontal position in cells.
    pub x: f64,
    /// Vertical position in cells, growing downward.
    pub y: f64,
    /// Horizontal velocity in cells per tick.
    pub dx: f64,
    /// Vertical velocity in cells per tick.
    pub dy: f64,
    /// Terminal velocity; may be well below one.
    pub tv: f64,
    pub color: PackedColor,
    active: bool,
    serial: u64,
}

/// Grid cell containing a continuous coordinate.
pub(crate) fn cell_of(v: f64) -> i32 {
    v.floor() as i32
}

impl Particle {
    /// Bring the grain to life at `(x, y)` with a random heading.
    ///
    /// Both velocity components are drawn independently, each below a random
    /// terminal velocity in `[0.3, 1.0)` and with an independent random sign.
    pub fn pop(&mut self, rng: &mut GrainRng, x: f64, y: f64, color: PackedColor) {
        self.active = true;
        self.x = x;
        self.y = y;
        self.tv = rng.frac() * 0.7 + 0.3;
        self.dx = rng.frac() * self.tv;
        if rng.coinflip() {
            self.dx = -self.dx;
        }
        self.dy = rng.frac() * self.tv;
        if rng.coinflip() {
            self.dy = -self.dy;
        }
        self.color = color;
    }

    /// Retire the grain. Its fields are left as they are until the next pop.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn set_serial(&mut self, serial: u64) {
        self.serial = serial;
    }

    /// The grid cell the grain currently occupies.
    pub fn cell(&self) -> (i32, i32) {
        (cell_of(self.x), cell_of(self.y))
    }

    /// Advance one tick against everything `occupied` reports as solid.
    ///
    /// Returns `false` once the grain has settled and should be handed over
    /// to the static mass: it is barely moving with support underneath, or it
    /// is wedged so that neither axis could move this tick.
    pub fn step<M>(&mut self, occupied: &M, physics: &PhysicsSettings) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        debug_assert!(self.active, "stepping an inactive particle");

        let solid = |x: f64, y: f64| occupied.is_solid(cell_of(x), cell_of(y));

        let mut xp = self.x + self.dx;
        let mut yp = self.y + self.dy;
        let mut blocked_x = false;
        let mut blocked_y = false;

        if solid(xp, yp) {
            if solid(xp, self.y) {
                self.dx *= -physics.elasticity;
                xp = self.x;
                blocked_x = true;
            }
            if solid(self.x, yp) {
                self.dy *= -physics.elasticity;
                // Don't slide along the floor freely.
                self.dx *= physics.friction;
                yp = self.y;
                blocked_y = true;
            }
            if !blocked_x && !blocked_y {
                // Only the diagonal is occupied; treat it as landing on a corner.
                self.dy *= -physics.elasticity;
                self.dx *= physics.friction;
                yp = self.y;
                blocked_y = true;
            }
        }

        self.x = xp;
        self.y = yp;

        self.dy = (self.dy + physics.gravity).min(self.tv);

        let moving =
            self.dx.abs() > physics.movement_epsilon || self.dy.abs() > physics.movement_epsilon;
        let can_fall = !solid(self.x, self.y + 1.0);
        let making_progress = !blocked_x || !blocked_y;

        (moving || can_fall) && making_progress
    }
}

//! Everything a falling grain can bump into.

use driftclock_core::ObstacleMask;

use crate::mass::StaticMass;

/// The foreign obstacle mask combined with settled mass and the arena walls.
///
/// Side walls are always solid. The floor is solid unless it has been opened
/// for a dropout; the sky above row zero is open.
pub struct Occupancy<'a, M: ?Sized> {
    mask: &'a M,
    mass: &'a StaticMass,
    open_floor: bool,
}

impl<'a, M: ObstacleMask + ?Sized> Occupancy<'a, M> {
    pub fn new(mask: &'a M, mass: &'a StaticMass, open_floor: bool) -> Self {
        Self {
            mask,
            mass,
            open_floor,
        }
    }
}

impl<M: ObstacleMask + ?Sized> ObstacleMask for Occupancy<'_, M> {
    fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.mass.width() {
            return true;
        }
        if y >= self.mass.height() {
            return !self.open_floor;
        }
        if y < 0 {
            return false;
        }
        !self.mass.get(x, y).is_empty() || self.mask.is_solid(x, y)
    }
}

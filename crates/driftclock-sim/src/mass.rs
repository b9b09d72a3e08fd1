//! Settled grains and the cellular automaton that keeps them honest.

use driftclock_core::{ObstacleMask, PackedColor, PhysicsSettings};

use crate::particle::Particle;
use crate::pool::ParticlePool;
use crate::rng::GrainRng;

/// A fixed-size grid of resting grain colors, `EMPTY` where nothing rests.
///
/// Only rows at or below `needs_sim_from` can have become unstable since the
/// last pass, so [`StaticMass::step`] skips everything above it.
#[derive(Debug, Clone)]
pub struct StaticMass {
    cells: Vec<PackedColor>,
    width: i32,
    height: i32,
    /// Highest row that may need resettling; `height` means none.
    needs_sim_from: i32,
}

impl StaticMass {
    pub fn new(width: i32, height: i32) -> Self {
        debug_assert!(width > 0 && height > 0, "empty mass grid");
        Self {
            cells: vec![PackedColor::EMPTY; (width.max(0) * height.max(0)) as usize],
            width,
            height,
            needs_sim_from: height,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (x + y * self.width) as usize
    }

    /// Color at `(x, y)`; anything outside the grid reads as empty.
    pub fn get(&self, x: i32, y: i32) -> PackedColor {
        if !self.in_bounds(x, y) {
            return PackedColor::EMPTY;
        }
        self.cells[self.index(x, y)]
    }

    /// Write a cell; writes outside the grid are ignored.
    ///
    /// The row above may now be able to fall, so it is marked for the next pass.
    pub fn set(&mut self, x: i32, y: i32, color: PackedColor) {
        if !self.in_bounds(x, y) {
            return;
        }
        let index = self.index(x, y);
        self.cells[index] = color;
        self.needs_sim_from = self.needs_sim_from.min((y - 1).max(0));
    }

    /// Make sure the next pass reaches up to `row`.
    pub fn force_simulate_from(&mut self, row: i32) {
        self.needs_sim_from = self.needs_sim_from.min(row.max(0));
    }

    /// Highest row the next pass will examine (`height` when idle).
    pub fn needs_simulate_from(&self) -> i32 {
        self.needs_sim_from
    }

    /// Deposit a settling grain at `(x, y)`.
    ///
    /// If that cell already holds mass or is blocked, the grain stacks upward
    /// into the first free cell of the column. Returns `false` when the
    /// column had no room and the grain was lost.
    pub fn settle<M>(&mut self, x: i32, y: i32, color: PackedColor, mask: &M) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        if x < 0 || x >= self.width || y < 0 {
            return false;
        }
        let start = y.min(self.height - 1);
        for row in (0..=start).rev() {
            if self.get(x, row).is_empty() && !mask.is_solid(x, row) {
                self.set(x, row, color);
                return true;
            }
        }
        false
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Run one bottom-up automaton pass.
    ///
    /// Per occupied cell the first matching rule wins: crushed by the mask,
    /// fall into an open cell below, or spill down a free diagonal. Falling
    /// and spilling cells become particles in `pool`. The bottom row rests on
    /// the floor unless `drop_bottom` lets it fall away. Returns whether
    /// anything changed.
    pub fn step<M>(
        &mut self,
        drop_bottom: bool,
        mask: &M,
        pool: &mut ParticlePool,
        rng: &mut GrainRng,
        physics: &PhysicsSettings,
    ) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        let start_y = self.height - 1;
        // Dropout forces the bottom row even when nothing else is dirty.
        let stop_y = self
            .needs_sim_from
            .min(if drop_bottom { self.height - 1 } else { self.height });
        self.needs_sim_from = self.height;

        let mut changed = false;
        // Bottom-up, so a column keeps falling within a single pass.
        for y in (stop_y..=start_y).rev() {
            for x in 0..self.width {
                let here = self.cells[self.index(x, y)];
                if !here.is_empty() {
                    changed |= self.step_cell(x, y, here, drop_bottom, mask, pool, rng, physics);
                }
            }
        }
        changed
    }

    #[allow(clippy::too_many_arguments)]
    fn step_cell<M>(
        &mut self,
        x: i32,
        y: i32,
        here: PackedColor,
        drop_bottom: bool,
        mask: &M,
        pool: &mut ParticlePool,
        rng: &mut GrainRng,
        physics: &PhysicsSettings,
    ) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        // Crushed by the digits.
        if mask.is_solid(x, y) {
            self.set(x, y, PackedColor::EMPTY);
            return true;
        }

        let on_floor = y + 1 >= self.height;
        let fall = if on_floor {
            drop_bottom
        } else {
            self.is_open(x, y + 1, mask)
        };
        if fall {
            let particle = self.convert(x, y, here, true, pool, rng);
            particle.dx *= physics.fall_drift;
            return true;
        }
        if on_floor {
            return false;
        }

        // Angle of repose. The left-to-right sweep makes spills lean left.
        let left_open = x > 0 && self.is_open(x - 1, y + 1, mask);
        let right_open = x < self.width - 1 && self.is_open(x + 1, y + 1, mask);
        match (left_open, right_open) {
            (true, true) => {
                self.convert(x, y, here, true, pool, rng);
                true
            }
            (true, false) => {
                let particle = self.convert(x, y, here, true, pool, rng);
                particle.dx = -particle.dx.abs();
                true
            }
            (false, true) => {
                let particle = self.convert(x, y, here, true, pool, rng);
                particle.dx = particle.dx.abs();
                true
            }
            (false, false) => false,
        }
    }

    fn is_open<M>(&self, x: i32, y: i32, mask: &M) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        self.get(x, y).is_empty() && !mask.is_solid(x, y)
    }

    /// Turn the cell at `(x, y)` into a particle at the cell center.
    fn convert<'p>(
        &mut self,
        x: i32,
        y: i32,
        here: PackedColor,
        downward: bool,
        pool: &'p mut ParticlePool,
        rng: &mut GrainRng,
    ) -> &'p mut Particle {
        let particle = pool.spawn(rng, x as f64 + 0.5, y as f64 + 0.5, here);
        if downward {
            particle.dy = particle.dy.abs();
        }
        self.set(x, y, PackedColor::EMPTY);
        particle
    }

    /// Convert every settled grain back into a particle, emptying the grid.
    ///
    /// Returns the number of grains released.
    pub fn pop_all(&mut self, pool: &mut ParticlePool, rng: &mut GrainRng) -> usize {
        let mut released = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                let here = self.cells[self.index(x, y)];
                if !here.is_empty() {
                    self.convert(x, y, here, false, pool, rng);
                    released += 1;
                }
            }
        }
        // Nothing is left to resettle.
        self.needs_sim_from = self.height;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAND: PackedColor = PackedColor::from_rgb(200, 170, 90);

    fn nothing(_: i32, _: i32) -> bool {
        false
    }

    struct Harness {
        pool: ParticlePool,
        rng: GrainRng,
        physics: PhysicsSettings,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                pool: ParticlePool::new(),
                rng: GrainRng::seeded(42),
                physics: PhysicsSettings::default(),
            }
        }

        fn step<M: ObstacleMask>(&mut self, mass: &mut StaticMass, drop_bottom: bool, mask: &M) -> bool {
            mass.step(drop_bottom, mask, &mut self.pool, &mut self.rng, &self.physics)
        }
    }

    fn snapshot(mass: &StaticMass) -> Vec<PackedColor> {
        let mut cells = Vec::new();
        for y in 0..mass.height() {
            for x in 0..mass.width() {
                cells.push(mass.get(x, y));
            }
        }
        cells
    }

    #[test]
    fn test_out_of_bounds_reads_empty_and_ignores_writes() {
        let mut mass = StaticMass::new(3, 2);
        mass.set(-1, 0, SAND);
        mass.set(3, 0, SAND);
        mass.set(0, 2, SAND);
        assert_eq!(mass.occupied_count(), 0);
        assert_eq!(mass.get(-1, 0), PackedColor::EMPTY);
        assert_eq!(mass.get(0, 9), PackedColor::EMPTY);
        assert_eq!(mass.needs_simulate_from(), 2);
    }

    #[test]
    fn test_set_marks_row_above() {
        let mut mass = StaticMass::new(4, 6);
        mass.set(1, 4, SAND);
        assert_eq!(mass.needs_simulate_from(), 3);
        mass.set(1, 5, SAND);
        assert_eq!(mass.needs_simulate_from(), 3);
        mass.set(1, 0, SAND);
        assert_eq!(mass.needs_simulate_from(), 0);
    }

    #[test]
    fn test_grain_over_gap_becomes_falling_particle() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(3, 2);
        mass.set(1, 0, SAND);

        assert!(h.step(&mut mass, false, &nothing));
        assert_eq!(mass.get(1, 0), PackedColor::EMPTY);
        assert_eq!(h.pool.active_count(), 1);
        let grain = h.pool.iter_active().next().copied().unwrap();
        assert_eq!(grain.color, SAND);
        assert_eq!(grain.cell(), (1, 0));
        assert!(grain.dy >= 0.0);
    }

    #[test]
    fn test_grain_without_legal_spill_stays() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(3, 2);
        mass.set(0, 1, SAND);
        mass.set(1, 1, SAND);
        mass.set(2, 1, SAND);
        mass.set(1, 0, SAND);
        let before = snapshot(&mass);

        assert!(!h.step(&mut mass, false, &nothing));
        assert_eq!(snapshot(&mass), before);
        assert_eq!(h.pool.active_count(), 0);
    }

    #[test]
    fn test_spill_directions() {
        // Support directly below, one open diagonal.
        let mut h = Harness::new();
        let mut mass = StaticMass::new(5, 3);
        mass.set(2, 2, SAND);
        mass.set(3, 2, SAND);
        mass.set(2, 1, SAND);
        assert!(h.step(&mut mass, false, &nothing));
        assert_eq!(mass.get(2, 1), PackedColor::EMPTY);
        let grain = h.pool.iter_active().next().copied().unwrap();
        assert!(grain.dx <= 0.0, "expected a leftward spill, got {}", grain.dx);

        let mut h = Harness::new();
        let mut mass = StaticMass::new(5, 3);
        mass.set(1, 2, SAND);
        mass.set(2, 2, SAND);
        mass.set(2, 1, SAND);
        assert!(h.step(&mut mass, false, &nothing));
        let grain = h.pool.iter_active().next().copied().unwrap();
        assert!(grain.dx >= 0.0, "expected a rightward spill, got {}", grain.dx);
    }

    #[test]
    fn test_peak_spills_either_way() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(5, 3);
        mass.set(2, 2, SAND);
        mass.set(2, 1, SAND);
        assert!(h.step(&mut mass, false, &nothing));
        assert_eq!(mass.get(2, 1), PackedColor::EMPTY);
        assert_eq!(h.pool.active_count(), 1);
    }

    #[test]
    fn test_side_walls_block_spills() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(3, 2);
        mass.set(0, 1, SAND);
        mass.set(1, 1, SAND);
        mass.set(0, 0, SAND);
        assert!(!h.step(&mut mass, false, &nothing));
        assert_eq!(mass.get(0, 0), SAND);
    }

    #[test]
    fn test_mask_blocks_fall_and_spill() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(5, 4);
        mass.set(2, 1, SAND);
        let ledge = |x: i32, y: i32| y == 2 && (1..=3).contains(&x);
        assert!(!h.step(&mut mass, false, &ledge));
        assert_eq!(mass.get(2, 1), SAND);
    }

    #[test]
    fn test_crushed_cells_are_cleared() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(4, 4);
        for x in 0..4 {
            mass.set(x, 3, SAND);
            mass.set(x, 2, SAND);
        }
        let bar = |_: i32, y: i32| y == 3;
        h.step(&mut mass, false, &bar);
        for x in 0..4 {
            assert_eq!(mass.get(x, 3), PackedColor::EMPTY, "bottom row under the bar at {x}");
        }
    }

    #[test]
    fn test_stable_configuration_is_idempotent() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(5, 3);
        for x in 0..5 {
            mass.set(x, 2, SAND);
        }
        for x in 1..4 {
            mass.set(x, 1, SAND);
        }
        mass.set(2, 0, SAND);
        let before = snapshot(&mass);
        assert!(!h.step(&mut mass, false, &nothing));
        assert!(!h.step(&mut mass, false, &nothing));
        assert_eq!(snapshot(&mass), before);
        assert_eq!(mass.needs_simulate_from(), 3);
    }

    #[test]
    fn test_idle_pass_skips_everything() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(3, 3);
        assert!(!h.step(&mut mass, false, &nothing));
        // Forcing an already-settled grid still changes nothing.
        mass.force_simulate_from(0);
        assert!(!h.step(&mut mass, false, &nothing));
    }

    #[test]
    fn test_drop_bottom_releases_floor_row() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(3, 2);
        mass.set(0, 1, SAND);
        mass.set(2, 1, SAND);
        assert!(!h.step(&mut mass, false, &nothing));
        assert!(h.step(&mut mass, true, &nothing));
        assert_eq!(mass.occupied_count(), 0);
        assert_eq!(h.pool.active_count(), 2);
    }

    #[test]
    fn test_column_collapses_in_one_pass() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(1, 5);
        mass.set(0, 0, SAND);
        mass.set(0, 1, SAND);
        mass.set(0, 2, SAND);
        assert!(h.step(&mut mass, false, &nothing));
        assert_eq!(mass.occupied_count(), 0);
        assert_eq!(h.pool.active_count(), 3);
    }

    #[test]
    fn test_pop_all_releases_every_grain() {
        let mut h = Harness::new();
        let mut mass = StaticMass::new(6, 4);
        let cells = [(0, 3), (1, 3), (5, 3), (2, 2), (4, 0)];
        for (x, y) in cells {
            mass.set(x, y, SAND);
        }
        assert_eq!(mass.pop_all(&mut h.pool, &mut h.rng), cells.len());
        assert_eq!(mass.occupied_count(), 0);
        assert_eq!(h.pool.active_count(), cells.len());
        assert_eq!(mass.needs_simulate_from(), 4);
    }

    #[test]
    fn test_settle_stacks_onto_occupied_cell() {
        let mut mass = StaticMass::new(2, 3);
        assert!(mass.settle(0, 2, SAND, &nothing));
        assert!(mass.settle(0, 2, PackedColor::grey(1), &nothing));
        assert_eq!(mass.get(0, 2), SAND);
        assert_eq!(mass.get(0, 1), PackedColor::grey(1));

        let roof = |_: i32, y: i32| y == 0;
        assert!(!mass.settle(0, 2, SAND, &roof));
        assert!(!mass.settle(0, -1, SAND, &nothing));
    }
}

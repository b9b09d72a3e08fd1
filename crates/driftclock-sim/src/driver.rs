//! Tick orchestration for the whole granular system.

use driftclock_core::{Moment, ObstacleMask, PackedColor, Rect, SimSettings};

use crate::breeze::BreezeField;
use crate::mass::StaticMass;
use crate::occupancy::Occupancy;
use crate::pool::ParticlePool;
use crate::rng::GrainRng;

/// What the obstacle owner reports for one tick.
pub struct TickInput<'a, M: ?Sized> {
    /// The solid shape right now.
    pub mask: &'a M,
    /// Set when the solid shape may differ from the previous tick.
    pub shape_changed: bool,
    /// Color of material shed by the shape.
    pub color: PackedColor,
    /// Rectangles currently making up the shape, used for dripping.
    pub regions: &'a [Rect],
    pub moment: Moment,
}

impl<'a, M: ObstacleMask + ?Sized> TickInput<'a, M> {
    pub fn new(mask: &'a M, moment: Moment) -> Self {
        Self {
            mask,
            shape_changed: false,
            color: PackedColor::grey(255),
            regions: &[],
            moment,
        }
    }

    pub fn shape_changed(mut self, changed: bool) -> Self {
        self.shape_changed = changed;
        self
    }

    pub fn color(mut self, color: PackedColor) -> Self {
        self.color = color;
        self
    }

    pub fn regions(mut self, regions: &'a [Rect]) -> Self {
        self.regions = regions;
        self
    }
}

/// Owns the particles, the settled mass and the random stream, and advances
/// them one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    width: i32,
    height: i32,
    settings: SimSettings,
    rng: GrainRng,
    pool: ParticlePool,
    mass: StaticMass,
    breeze: BreezeField,
    /// Solidity of every cell as of the last shape change.
    previous_solid: Option<Vec<bool>>,
    last_hour: Option<u32>,
    needs_paint: bool,
}

impl Simulation {
    pub fn new(width: i32, height: i32, settings: SimSettings) -> Self {
        debug_assert!(width > 0 && height > 0, "empty simulation");
        let rng = match settings.seed {
            Some(seed) => GrainRng::seeded(seed),
            None => GrainRng::from_entropy(),
        };
        Self {
            width,
            height,
            settings,
            rng,
            pool: ParticlePool::new(),
            mass: StaticMass::new(width, height),
            breeze: BreezeField::new(height),
            previous_solid: None,
            last_hour: None,
            needs_paint: true,
        }
    }

    /// Start over on a differently sized arena. Nothing carries across.
    pub fn resize(&mut self, width: i32, height: i32) {
        log::debug!("resizing simulation to {width}x{height}");
        self.width = width;
        self.height = height;
        self.pool.clear();
        self.mass = StaticMass::new(width, height);
        self.breeze = BreezeField::new(height);
        self.previous_solid = None;
        self.last_hour = None;
        self.needs_paint = true;
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn mass(&self) -> &StaticMass {
        &self.mass
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Whether the floor is open at this moment.
    pub fn is_dropout(&self, moment: Moment) -> bool {
        moment.minute == 0 && moment.second < self.settings.reactions.dropout_seconds
    }

    /// Advance one tick. Returns whether anything needs repainting.
    pub fn tick<M>(&mut self, input: &TickInput<'_, M>) -> bool
    where
        M: ObstacleMask + ?Sized,
    {
        let reactions = self.settings.reactions;
        let dropout = self.is_dropout(input.moment);

        if input.shape_changed || self.previous_solid.is_none() {
            self.react_to_shape(input.mask, input.color);
        }
        self.check_hour(input.moment);
        if reactions.drip {
            self.drip(input.mask, input.regions, input.color);
        }
        if reactions.snowfall_per_tick > 0.0 {
            self.snowfall(input.mask, reactions.snowfall_per_tick);
        }
        if reactions.breeze {
            self.breeze.update(&mut self.rng);
        }

        if self.pool.active_count() > 0 {
            self.step_particles(input.mask, dropout);
            self.pool.compact_if_sparse(&self.settings.pool);
            self.needs_paint = true;
        }

        self.needs_paint |= self.mass.step(
            dropout,
            input.mask,
            &mut self.pool,
            &mut self.rng,
            &self.settings.physics,
        );
        self.needs_paint
    }

    /// Diff the shape against the last snapshot: burst vanished cells and
    /// make sure the mass pass reaches every changed row.
    fn react_to_shape<M>(&mut self, mask: &M, color: PackedColor)
    where
        M: ObstacleMask + ?Sized,
    {
        let pop = self.settings.reactions.pop_vanished && self.previous_solid.is_some();
        let mut snapshot = Vec::with_capacity((self.width * self.height) as usize);
        let mut top_changed: Option<i32> = None;
        let mut popped = 0usize;

        for y in 0..self.height {
            for x in 0..self.width {
                let solid = mask.is_solid(x, y);
                let was_solid = self
                    .previous_solid
                    .as_ref()
                    .is_some_and(|prev| prev[snapshot.len()]);
                if solid != was_solid {
                    top_changed.get_or_insert(y);
                    if pop && was_solid {
                        let grain = self.pool.spawn(
                            &mut self.rng,
                            x as f64 + 0.5,
                            y as f64 + 0.5,
                            color,
                        );
                        grain.dy = -grain.dy.abs();
                        popped += 1;
                    }
                }
                snapshot.push(solid);
            }
        }

        if let Some(row) = top_changed {
            log::debug!("obstacle shape changed from row {row}, popped {popped} grains");
            self.mass.force_simulate_from(row - 1);
            self.needs_paint = true;
        }
        self.previous_solid = Some(snapshot);
    }

    fn check_hour(&mut self, moment: Moment) {
        if self.settings.reactions.erupt_on_hour
            && self.last_hour.is_some_and(|hour| hour != moment.hour)
        {
            self.erupt();
        }
        self.last_hour = Some(moment.hour);
    }

    /// Blow every settled grain back into the air. Returns how many.
    pub fn erupt(&mut self) -> usize {
        let released = self.mass.pop_all(&mut self.pool, &mut self.rng);
        log::debug!("erupted {released} grains");
        if released > 0 {
            self.needs_paint = true;
        }
        released
    }

    /// Let lit regions shed a grain from their top or bottom edge.
    fn drip<M>(&mut self, mask: &M, regions: &[Rect], color: PackedColor)
    where
        M: ObstacleMask + ?Sized,
    {
        let chance = self.settings.reactions.drip_chance;
        for region in regions.iter().filter(|r| !r.is_empty()) {
            if !self.rng.chance(chance) {
                continue;
            }
            let down = self.rng.coinflip();
            let x = region.x + (self.rng.frac() * region.w as f64) as i32;
            let y = if down { region.y + region.h } else { region.y - 1 };
            if y < 0 || y >= self.height || x < 0 || x >= self.width {
                continue;
            }
            if !self.mass.get(x, y).is_empty() || mask.is_solid(x, y) {
                continue;
            }
            let grain = self
                .pool
                .spawn(&mut self.rng, x as f64 + 0.5, y as f64 + 0.5, color);
            grain.dy = if down { grain.dy.abs() } else { -grain.dy.abs() };
        }
    }

    /// Drop fresh flakes in along the top row.
    fn snowfall<M>(&mut self, mask: &M, per_tick: f64)
    where
        M: ObstacleMask + ?Sized,
    {
        let mut count = per_tick.trunc() as usize;
        if self.rng.chance(per_tick.fract()) {
            count += 1;
        }
        for _ in 0..count {
            let x = self.rng.below(self.width as usize) as i32;
            if !self.mass.get(x, 0).is_empty() || mask.is_solid(x, 0) {
                continue;
            }
            let level = 128 + self.rng.below(128) as u8;
            let jitter = self.rng.frac();
            let grain = self.pool.spawn(
                &mut self.rng,
                x as f64 + jitter,
                0.5,
                PackedColor::grey(level),
            );
            grain.dy = grain.dy.abs();
        }
    }

    fn step_particles<M>(&mut self, mask: &M, dropout: bool)
    where
        M: ObstacleMask + ?Sized,
    {
        let physics = self.settings.physics;
        let breeze = self.settings.reactions.breeze;

        for index in 0..self.pool.len() {
            let Some(particle) = self.pool.active_mut(index) else {
                continue;
            };
            let occupancy = Occupancy::new(mask, &self.mass, dropout);
            if breeze {
                let (cx, cy) = particle.cell();
                if !occupancy.is_solid(cx, cy + 1) {
                    self.breeze.push(particle, &mut self.rng);
                }
            }
            let alive = particle.step(&occupancy, &physics);
            let (cx, cy) = particle.cell();
            let color = particle.color;

            if dropout && cy >= self.height {
                // Fell out through the open floor.
                self.pool.stop(index);
            } else if !alive {
                if !self.mass.settle(cx, cy, color, mask) {
                    log::debug!("no room to settle a grain at {cx},{cy}, dropping it");
                }
                self.pool.stop(index);
            }
        }
    }

    /// Settled color at `(x, y)`, empty outside the arena.
    pub fn mass_at(&self, x: i32, y: i32) -> PackedColor {
        self.mass.get(x, y)
    }

    /// Cell and color of every live grain inside the arena.
    pub fn particles(&self) -> impl Iterator<Item = (i32, i32, PackedColor)> + '_ {
        self.pool.iter_active().filter_map(|p| {
            let (x, y) = p.cell();
            (x >= 0 && x < self.width && y >= 0 && y < self.height).then_some((x, y, p.color))
        })
    }

    pub fn active_particles(&self) -> usize {
        self.pool.active_count()
    }

    pub fn needs_paint(&self) -> bool {
        self.needs_paint
    }

    /// Acknowledge that the current state has been drawn.
    pub fn mark_painted(&mut self) {
        self.needs_paint = false;
    }
}

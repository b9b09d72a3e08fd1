//! Arena of particle slots with a free list.

use driftclock_core::{PackedColor, PoolSettings};

use crate::particle::Particle;
use crate::rng::GrainRng;

/// Handle to a live particle.
///
/// Handles carry the serial stamped at pop time, so a handle to a grain that
/// has since stopped, or that was moved by compaction, resolves to nothing
/// instead of aliasing whichever grain reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleId {
    index: usize,
    serial: u64,
}

impl ParticleId {
    /// Slot index at the time the handle was issued.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Owns every particle slot, live or free.
#[derive(Debug, Default)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    /// Indices of inactive slots available for reuse.
    free: Vec<usize>,
    next_serial: u64,
    active: usize,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find an inactive slot, growing the arena if none is free.
    ///
    /// The slot stays inactive until [`ParticlePool::pop`] initializes it.
    pub fn allocate(&mut self) -> usize {
        while let Some(index) = self.free.pop() {
            // A slot may have been popped directly after being freed.
            if self.slots.get(index).is_some_and(|p| !p.is_active()) {
                return index;
            }
        }
        self.slots.push(Particle::default());
        self.slots.len() - 1
    }

    /// Initialize the slot at `index` as a fresh grain.
    pub fn pop(
        &mut self,
        index: usize,
        rng: &mut GrainRng,
        x: f64,
        y: f64,
        color: PackedColor,
    ) -> ParticleId {
        let serial = self.next_serial;
        self.next_serial += 1;

        let slot = &mut self.slots[index];
        if !slot.is_active() {
            self.active += 1;
        }
        slot.pop(rng, x, y, color);
        slot.set_serial(serial);
        ParticleId { index, serial }
    }

    /// Allocate and pop in one go, returning the new grain.
    pub fn spawn(
        &mut self,
        rng: &mut GrainRng,
        x: f64,
        y: f64,
        color: PackedColor,
    ) -> &mut Particle {
        let index = self.allocate();
        self.pop(index, rng, x, y, color);
        &mut self.slots[index]
    }

    /// Retire the grain in slot `index`; its slot becomes reusable.
    pub fn stop(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_active() {
                slot.stop();
                self.active -= 1;
                self.free.push(index);
            }
        }
    }

    /// Drop every inactive slot.
    ///
    /// Slot indices shift, so every index held by a caller is invalid
    /// afterwards. Handles stay safe: they simply stop resolving.
    pub fn compact(&mut self) {
        self.slots.retain(Particle::is_active);
        self.free.clear();
    }

    /// Compact if the arena has grown sparse, returning whether it did.
    pub fn compact_if_sparse(&mut self, settings: &PoolSettings) -> bool {
        let sparse = self.slots.len() > settings.compact_threshold
            && self.active.saturating_mul(settings.compact_factor) < self.slots.len();
        if sparse {
            let before = self.slots.len();
            self.compact();
            log::debug!("compacted particle pool from {before} to {} slots", self.slots.len());
        }
        sparse
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots
            .get(id.index)
            .filter(|p| p.is_active() && p.serial() == id.serial)
    }

    /// The particle in slot `index` if it is live.
    pub(crate) fn active_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.slots.get_mut(index).filter(|p| p.is_active())
    }

    /// Total slots, live and free.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.is_active())
    }

    /// Retire every grain and forget all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn white() -> PackedColor {
        PackedColor::grey(255)
    }

    #[test]
    fn test_stopped_slots_are_reused() {
        let mut rng = GrainRng::seeded(1);
        let mut pool = ParticlePool::new();
        let a = pool.allocate();
        pool.pop(a, &mut rng, 0.0, 0.0, white());
        let b = pool.allocate();
        pool.pop(b, &mut rng, 1.0, 0.0, white());
        assert_ne!(a, b);
        assert_eq!(pool.active_count(), 2);

        pool.stop(a);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.allocate(), a);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_double_stop_is_harmless() {
        let mut rng = GrainRng::seeded(1);
        let mut pool = ParticlePool::new();
        let i = pool.allocate();
        pool.pop(i, &mut rng, 0.0, 0.0, white());
        pool.stop(i);
        pool.stop(i);
        assert_eq!(pool.active_count(), 0);
        let j = pool.allocate();
        pool.pop(j, &mut rng, 0.0, 0.0, white());
        let k = pool.allocate();
        assert_ne!(j, k, "one freed slot must not be handed out twice");
    }

    #[test]
    fn test_stale_handles_do_not_resolve() {
        let mut rng = GrainRng::seeded(2);
        let mut pool = ParticlePool::new();
        let first = {
            let i = pool.allocate();
            pool.pop(i, &mut rng, 0.0, 0.0, white())
        };
        pool.stop(first.index());
        let second = {
            let i = pool.allocate();
            pool.pop(i, &mut rng, 5.0, 5.0, PackedColor::grey(9))
        };
        assert_eq!(first.index(), second.index());
        assert!(pool.get(first).is_none());
        assert_eq!(pool.get(second).map(|p| p.color), Some(PackedColor::grey(9)));
    }

    #[test]
    fn test_compaction_invalidates_moved_handles() {
        let mut rng = GrainRng::seeded(3);
        let mut pool = ParticlePool::new();
        let ids: Vec<ParticleId> = (0..10)
            .map(|n| {
                let i = pool.allocate();
                pool.pop(i, &mut rng, n as f64, 0.0, white())
            })
            .collect();
        for id in &ids[..9] {
            pool.stop(id.index());
        }
        pool.compact();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.active_count(), 1);
        // The survivor moved from slot 9 to slot 0.
        assert!(pool.get(ids[9]).is_none());
        assert!(pool.get(ids[0]).is_none());
        assert_eq!(pool.iter_active().next().map(|p| p.x), Some(9.0));
    }

    #[test]
    fn test_compact_if_sparse_respects_threshold() {
        let settings = PoolSettings {
            compact_threshold: 8,
            compact_factor: 2,
        };
        let mut rng = GrainRng::seeded(4);
        let mut pool = ParticlePool::new();
        for _ in 0..8 {
            pool.spawn(&mut rng, 0.0, 0.0, white());
        }
        for i in 0..7 {
            pool.stop(i);
        }
        // Sparse, but not above the threshold.
        assert!(!pool.compact_if_sparse(&settings));

        for _ in 0..9 {
            pool.spawn(&mut rng, 0.0, 0.0, white());
        }
        // Seven freed slots were reused and two appended: dense enough.
        assert_eq!(pool.len(), 10);
        assert_eq!(pool.active_count(), 10);
        assert!(!pool.compact_if_sparse(&settings));

        for i in 0..9 {
            pool.stop(i);
        }
        assert!(pool.compact_if_sparse(&settings));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_huge_compact_factor_never_compacts_live_pool() {
        let settings = PoolSettings {
            compact_threshold: 0,
            compact_factor: usize::MAX,
        };
        let mut rng = GrainRng::seeded(5);
        let mut pool = ParticlePool::new();
        for _ in 0..3 {
            pool.spawn(&mut rng, 0.0, 0.0, white());
        }
        pool.stop(0);
        assert!(!pool.compact_if_sparse(&settings));
        assert_eq!(pool.len(), 3);

        // With nothing live the pool is sparse under any factor.
        pool.stop(1);
        pool.stop(2);
        assert!(pool.compact_if_sparse(&settings));
        assert_eq!(pool.len(), 0);
    }
}

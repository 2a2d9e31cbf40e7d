use crate::geometry::Geometry;
use rand::Rng;

/// Hard cap on the particle population
pub const MAX_PARTICLES: usize = 10_000;

/// Fixed-size set of particles, each a linear offset into the bitmap
#[derive(Debug, Clone)]
pub struct ParticleStore {
    offsets: Vec<u32>,
}

impl ParticleStore {
    /// Scatter `count` particles uniformly over the visible rectangle
    pub fn seeded<R: Rng>(count: usize, geometry: &Geometry, rng: &mut R) -> Self {
        assert!(
            count <= MAX_PARTICLES,
            "particle count {} exceeds the maximum of {}",
            count,
            MAX_PARTICLES
        );
        let offsets = (0..count)
            .map(|_| {
                let row = rng.gen_range(0..geometry.height);
                let col = rng.gen_range(0..geometry.width);
                geometry.offset(col, row)
            })
            .collect();
        Self { offsets }
    }

    /// Store with explicit positions
    #[cfg(test)]
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        assert!(offsets.len() <= MAX_PARTICLES);
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> u32 {
        self.offsets[index]
    }

    pub fn set(&mut self, index: usize, offset: u32) {
        self.offsets[index] = offset;
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[u32] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_particles_are_visible() {
        let geometry = Geometry::from_bounds(144, 168).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let store = ParticleStore::seeded(3000, &geometry, &mut rng);
        assert_eq!(store.len(), 3000);
        assert!(store.as_slice().iter().all(|&o| geometry.contains(o)));
    }

    #[test]
    #[should_panic]
    fn test_over_capacity_panics() {
        let geometry = Geometry::from_bounds(144, 168).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        ParticleStore::seeded(MAX_PARTICLES + 1, &geometry, &mut rng);
    }
}

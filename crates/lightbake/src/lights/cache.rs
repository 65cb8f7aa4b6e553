use std::collections::HashMap;

use crate::sampling::RandomStream;

use super::{Light, LightSurfaceSample};

/// Surface samples per (light, bounce), owned by whoever processes the bounce.
///
/// Lights stay immutable while workers sample them; each worker keeps its own cache.
#[derive(Clone, Debug, Default)]
pub struct LightSurfaceSampleCache {
    // [regular, penumbra]
    entries: HashMap<(usize, usize), [Vec<LightSurfaceSample>; 2]>,
}

impl LightSurfaceSampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the samples cached for `light_index` at `bounce`.
    ///
    /// # Panics
    /// When `num_samples` is zero, or `light` is a sky light.
    pub fn cache_surface_samples(
        &mut self,
        light_index: usize,
        light: &Light,
        bounce: usize,
        num_samples: usize,
        num_penumbra_samples: usize,
        rng: &mut RandomStream,
    ) {
        assert!(num_samples > 0);
        let regular = (0..num_samples).map(|_| light.sample_light_surface(rng)).collect();
        let penumbra = (0..num_penumbra_samples).map(|_| light.sample_light_surface(rng)).collect();
        self.entries.insert((light_index, bounce), [regular, penumbra]);
    }

    /// Empty when nothing was cached for the key.
    pub fn cached_surface_samples(&self, light_index: usize, bounce: usize, penumbra: bool) -> &[LightSurfaceSample] {
        self.entries
            .get(&(light_index, bounce))
            .map(|samples| samples[usize::from(penumbra)].as_slice())
            .unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

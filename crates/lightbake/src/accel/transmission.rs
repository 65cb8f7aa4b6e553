use smallvec::SmallVec;

use crate::color::LinearColor;

/// Translucent surfaces crossed by one ray, in whatever order the traversal reported them.
#[derive(Clone, Debug, Default)]
pub struct TransmissionAccumulator {
    entries: SmallVec<[(LinearColor, f32); 64]>,
}

impl TransmissionAccumulator {
    pub fn new() -> TransmissionAccumulator {
        TransmissionAccumulator::default()
    }

    pub fn push(&mut self, transmission: LinearColor, t: f32) {
        self.entries.push((transmission, t));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `color` tinted by every recorded surface.
    pub fn resolve(&self, color: LinearColor) -> LinearColor {
        self.entries.iter().fold(color, |color, (transmission, _)| color * *transmission)
    }

    /// `color` tinted by the surfaces strictly in front of `t_collide`.
    pub fn resolve_before(&self, color: LinearColor, t_collide: f32) -> LinearColor {
        self.entries
            .iter()
            .filter(|(_, t)| *t < t_collide)
            .fold(color, |color, (transmission, _)| color * *transmission)
    }
}

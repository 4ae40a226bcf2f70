use crate::mission::Waypoint;
use itertools::Itertools;
use std::collections::VecDeque;

/// The last few sampled positions, oldest first.
#[derive(Debug, Clone)]
pub struct PositionWindow {
    samples: VecDeque<Waypoint>,
    capacity: usize,
}

impl PositionWindow {
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, position: Waypoint) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(position);
    }

    pub fn is_full(&self) -> bool { self.samples.len() == self.capacity }

    pub fn clear(&mut self) { self.samples.clear() }

    /// Path length through all samples in metres, `None` until the window is full.
    pub fn travelled(&self) -> Option<f64> {
        self.is_full().then(|| {
            self.samples.iter().tuple_windows().map(|(a, b)| a.distance_to(b)).sum()
        })
    }
}

impl Default for PositionWindow {
    fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}

use crate::Vec2;
use serde::{Deserialize, Serialize};

/// World parameters, immutable once input parsing is done. Threaded
/// through every component instead of living in globals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct World {
    /// Number of disks.
    pub particle_count: usize,
    /// Side of the square box.
    pub box_size: f64,
    /// Disk radius, shared by all disks.
    pub radius: f64,
    /// Number of unit-length steps to simulate.
    pub steps: usize,
}

impl World {
    pub fn new(particle_count: usize, box_size: f64, radius: f64, steps: usize) -> Self {
        World {
            particle_count,
            box_size,
            radius,
            steps,
        }
    }

    /// True when a disk center lies inside the padded interior
    /// r <= x <= L - r, r <= y <= L - r.
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= self.radius
            && position.x <= self.box_size - self.radius
            && position.y >= self.radius
            && position.y <= self.box_size - self.radius
    }
}

use crate::Vec2;
use std::fmt::Debug;

/// A rigid disk. The index is assigned at creation and never changes;
/// the collision counters accumulate over the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub index: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pair_collisions: u32,
    pub wall_collisions: u32,
}

impl Particle {
    pub fn new(index: usize, position: Vec2, velocity: Vec2) -> Self {
        Particle {
            index,
            position,
            velocity,
            pair_collisions: 0,
            wall_collisions: 0,
        }
    }

    /// State line in the text output format: index, then position and
    /// velocity with 8 fraction digits.
    pub fn report(&self) -> String {
        format!(
            "{} {:.8} {:.8} {:.8} {:.8}",
            self.index, self.position.x, self.position.y, self.velocity.x, self.velocity.y
        )
    }
}

impl Default for Particle {
    fn default() -> Self {
        Particle::new(0, Vec2::ZERO, Vec2::ZERO)
    }
}

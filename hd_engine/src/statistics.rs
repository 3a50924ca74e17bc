use crate::math_core;
use crate::Particle;

/// Aggregate view of a particle slice. Every disk has unit mass.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub num_particles: usize,
    pub total_energy: f64,
    pub pair_collisions: u64,
    pub wall_collisions: u64,
}

impl Statistics {
    pub fn build(particles: &[Particle]) -> Self {
        let mut res = Self::default();
        res.num_particles = particles.len();
        res.total_energy = particles
            .iter()
            .map(|p| math_core::kinetic_energy(1.0, p.velocity.length()))
            .sum();
        res.pair_collisions = particles.iter().map(|p| p.pair_collisions as u64).sum();
        res.wall_collisions = particles.iter().map(|p| p.wall_collisions as u64).sum();
        return res;
    }
}

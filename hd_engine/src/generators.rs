use crate::{Particle, Vec2, World};
use rand::Rng;

/// Synthesizes the particles the input did not supply, with indices
/// `first_index..particle_count`: position uniform inside the padded
/// interior, velocity components uniform in [L/(8r), L/4]. Draw order
/// per particle is x, y, vx, vy, so a seeded generator reproduces runs.
pub fn generate_missing(world: &World, first_index: usize, rng: &mut impl Rng) -> Vec<Particle> {
    let position_lo = world.radius;
    let position_hi = world.box_size - world.radius;
    let velocity_lo = world.box_size / (8.0 * world.radius);
    let velocity_hi = world.box_size / 4.0;
    (first_index..world.particle_count)
        .map(|index| {
            let position = Vec2::new(
                rng.gen_range(position_lo..position_hi),
                rng.gen_range(position_lo..position_hi),
            );
            let velocity = Vec2::new(
                rng.gen_range(velocity_lo..velocity_hi),
                rng.gen_range(velocity_lo..velocity_hi),
            );
            Particle::new(index, position, velocity)
        })
        .collect()
}

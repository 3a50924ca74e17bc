use crate::collision_utils;
use crate::math_core;
use crate::{Particle, Vec2, World};
use ordered_float::OrderedFloat;
use std::ops::Range;

/// What happens to one owned disk (or a disk pair) within the current
/// unit step. The selection loop builds these; `apply` advances the
/// state accordingly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    /// No contact inside the step; the disk travels the full unit.
    Free { particle: usize },
    /// Wall contact inside the step: reflect, then finish the step.
    Wall { particle: usize, time: OrderedFloat<f64> },
    /// Mutual disk contact at `time`. `first` is the owned index that
    /// selected the event, `second` its consenting partner.
    Pair {
        first: usize,
        second: usize,
        time: OrderedFloat<f64>,
    },
}

impl StepEvent {
    /// Candidate ordering key. A free step ranks as the full unit.
    pub fn time(&self) -> OrderedFloat<f64> {
        match self {
            StepEvent::Free { .. } => OrderedFloat(1.0),
            StepEvent::Wall { time, .. } => *time,
            StepEvent::Pair { time, .. } => *time,
        }
    }

    /// Advances particle state for this event. `owned` is the calling
    /// worker's owned index range; it decides which copy of an in-block
    /// pair event performs the update.
    pub fn apply(&self, particles: &mut [Particle], world: &World, owned: &Range<usize>) {
        match *self {
            StepEvent::Free { particle } => {
                let p = &mut particles[particle];
                p.position += p.velocity;
            }
            StepEvent::Wall { particle, .. } => {
                apply_wall_bounce(&mut particles[particle], world);
            }
            StepEvent::Pair { first, second, time } => {
                // The same in-block pair exists under both endpoints; only
                // the lower index applies it. Cross-block pairs run on
                // both replicas, each worker authoritative for its own row.
                if owned.contains(&second) && first > second {
                    return;
                }
                apply_pair_bounce(particles, world, first, second, time.into_inner());
            }
        }
    }
}

/// Wall reflection: advance to the nearest axis boundary, flip that
/// component (both on an exact corner hit), then spend the rest of the
/// step, stopping at the other boundary if it is reached before the
/// step ends.
fn apply_wall_bounce(particle: &mut Particle, world: &World) {
    let (tx, ty) = collision_utils::axis_wall_times(
        particle.position,
        particle.velocity,
        world.radius,
        world.box_size,
    );
    if tx < ty {
        particle.position += particle.velocity * tx;
        particle.velocity.x = -particle.velocity.x;
        let travel = if ty < 1.0 { ty - tx } else { 1.0 - tx };
        particle.position += particle.velocity * travel;
    } else if tx == ty {
        // Exact corner: both components reverse.
        particle.position += particle.velocity * tx;
        particle.velocity = -particle.velocity;
        particle.position += particle.velocity * (1.0 - tx);
    } else {
        particle.position += particle.velocity * ty;
        particle.velocity.y = -particle.velocity.y;
        let travel = if tx < 1.0 { tx - ty } else { 1.0 - ty };
        particle.position += particle.velocity * travel;
    }
    particle.wall_collisions += 1;
}

/// Pair response: advance both disks to the contact point, exchange the
/// normal velocity components, then let each disk spend the remainder of
/// the step, stopping at a wall if one is reached (no reflection in the
/// trailing motion).
fn apply_pair_bounce(
    particles: &mut [Particle],
    world: &World,
    first: usize,
    second: usize,
    time: f64,
) {
    particles[first].position += particles[first].velocity * time;
    particles[second].position += particles[second].velocity * time;

    let normal = (particles[first].position - particles[second].position).normalized();
    let (velocity1, velocity2) = collision_utils::particles_collision_velocities(
        particles[first].velocity,
        particles[second].velocity,
        normal,
    );
    particles[first].velocity = scrub_velocity(velocity1);
    particles[second].velocity = scrub_velocity(velocity2);

    let remainder = 1.0 - time;
    for index in [first, second] {
        let p = &mut particles[index];
        let (tx, ty) = collision_utils::axis_wall_times(
            p.position,
            p.velocity,
            world.radius,
            world.box_size,
        );
        let travel = if tx >= remainder && ty >= remainder {
            remainder
        } else {
            tx.min(ty)
        };
        p.position += p.velocity * travel;
        p.pair_collisions += 1;
    }
}

fn scrub_velocity(velocity: Vec2) -> Vec2 {
    Vec2::new(
        math_core::scrub_negative_zero(velocity.x),
        math_core::scrub_negative_zero(velocity.y),
    )
}

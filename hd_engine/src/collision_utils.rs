use crate::math_core;
use crate::prelude::*;
use crate::Vec2;

/// Time until two disks of equal `radius` touch, from the quadratic in
/// their relative motion:
/// `|dv|^2 t^2 + 2 (dp . dv) t + |dp|^2 - 4 r^2 = 0`.
///
/// The policy is shared by every worker so selection stays bit-identical:
/// * no real root, or parallel relative motion: `NO_COLLISION`
/// * earliest root in the future: that root
/// * roots bracket the present (disks already overlap): 0.0, an
///   immediate collision
/// * both roots in the past (disks moving apart): `NO_COLLISION`
pub fn find_particle_vs_particle_collision(
    position1: Vec2,
    velocity1: Vec2,
    position2: Vec2,
    velocity2: Vec2,
    radius: f64,
) -> f64 {
    let dp = position1 - position2;
    let dv = velocity1 - velocity2;
    let a = dv.length_sq();
    let b = 2.0 * dp.dot(dv);
    let c = dp.length_sq() - 4.0 * radius * radius;
    match math_core::solve_quadratic(a, b, c) {
        Some((t1, _)) if t1 > 0.0 => t1,
        Some((_, t2)) if t2 > 0.0 => 0.0,
        _ => NO_COLLISION,
    }
}

/// Axis-wise times for a disk center to reach the padded interior
/// boundary of the box. An axis with zero velocity yields +inf.
pub fn axis_wall_times(position: Vec2, velocity: Vec2, radius: f64, box_size: f64) -> (f64, f64) {
    let tx = if velocity.x < 0.0 {
        (position.x - radius) / -velocity.x
    } else {
        (box_size - position.x - radius) / velocity.x
    };
    let ty = if velocity.y < 0.0 {
        (position.y - radius) / -velocity.y
    } else {
        (box_size - position.y - radius) / velocity.y
    };
    (tx, ty)
}

/// Earliest wall contact on either axis. May exceed the unit step; the
/// selection loop filters that.
pub fn find_particle_vs_wall_collision(
    position: Vec2,
    velocity: Vec2,
    radius: f64,
    box_size: f64,
) -> f64 {
    let (tx, ty) = axis_wall_times(position, velocity, radius, box_size);
    tx.min(ty)
}

/// Elastic response of two equal-mass disks. Velocities are decomposed
/// along `normal` (unit vector from disk 2 to disk 1) and its tangent,
/// and the normal components are exchanged.
pub fn particles_collision_velocities(
    velocity1: Vec2,
    velocity2: Vec2,
    normal: Vec2,
) -> (Vec2, Vec2) {
    let tangent = normal.rotated_90_ccw();
    let v1_normal = normal.dot(velocity1);
    let v1_tangent = tangent.dot(velocity1);
    let v2_normal = normal.dot(velocity2);
    let v2_tangent = tangent.dot(velocity2);
    let new_velocity1 = normal * v2_normal + tangent * v1_tangent;
    let new_velocity2 = normal * v1_normal + tangent * v2_tangent;
    return (new_velocity1, new_velocity2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::DOUBLE_COMPARE_EPS_STRICT;

    #[test]
    fn test_head_on_approach() {
        // Centers 4 apart, closing at 2 per unit, radius 1: contact when
        // the gap of 2 closes, at t = 1.
        let t = find_particle_vs_particle_collision(
            Vec2::new(10.0, 50.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(14.0, 50.0),
            Vec2::new(-1.0, 0.0),
            1.0,
        );
        assert!(math_core::approx_eq(t, 1.0, DOUBLE_COMPARE_EPS_STRICT));

        // One unit closer: contact at t = 0.5.
        let t = find_particle_vs_particle_collision(
            Vec2::new(10.0, 50.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(13.0, 50.0),
            Vec2::new(-1.0, 0.0),
            1.0,
        );
        assert!(math_core::approx_eq(t, 0.5, DOUBLE_COMPARE_EPS_STRICT));
    }

    #[test]
    fn test_miss_and_parallel_motion() {
        // Parallel tracks far apart never touch.
        let t = find_particle_vs_particle_collision(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(1.0, 0.0),
            1.0,
        );
        assert_eq!(t, NO_COLLISION);

        // Identical velocities: degenerate quadratic.
        let t = find_particle_vs_particle_collision(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(2.0, 1.0),
            1.0,
        );
        assert_eq!(t, NO_COLLISION);
    }

    #[test]
    fn test_overlap_collides_immediately() {
        // Centers 1 apart with radius 1: already overlapping, still
        // approaching, so the earliest root is in the past.
        let t = find_particle_vs_particle_collision(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            1.0,
        );
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_departing_never_collides() {
        let t = find_particle_vs_particle_collision(
            Vec2::new(0.0, 0.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(1.0, 0.0),
            1.0,
        );
        assert_eq!(t, NO_COLLISION);
    }

    #[test]
    fn test_axis_wall_times() {
        // Moving right from x = 8 in a box of 10 with radius 1: the
        // boundary at x = 9 is (9 - 8) / 3 away.
        let (tx, ty) = axis_wall_times(Vec2::new(8.0, 5.0), Vec2::new(3.0, 0.0), 1.0, 10.0);
        assert!(math_core::approx_eq(tx, 1.0 / 3.0, DOUBLE_COMPARE_EPS_STRICT));
        assert!(ty.is_infinite());

        // Moving down-left.
        let (tx, ty) = axis_wall_times(Vec2::new(5.0, 3.0), Vec2::new(-2.0, -1.0), 1.0, 10.0);
        assert!(math_core::approx_eq(tx, 2.0, DOUBLE_COMPARE_EPS_STRICT));
        assert!(math_core::approx_eq(ty, 2.0, DOUBLE_COMPARE_EPS_STRICT));
    }

    #[test]
    fn test_wall_collision_takes_nearest_axis() {
        let t = find_particle_vs_wall_collision(Vec2::new(8.0, 2.0), Vec2::new(1.0, -2.0), 1.0, 10.0);
        assert!(math_core::approx_eq(t, 0.5, DOUBLE_COMPARE_EPS_STRICT));
    }

    #[test]
    fn test_velocity_swap_head_on() {
        let normal = Vec2::new(-1.0, 0.0);
        let (v1, v2) = particles_collision_velocities(
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            normal,
        );
        assert!(v1.approx_eq(Vec2::new(-1.0, 0.0), DOUBLE_COMPARE_EPS_STRICT));
        assert!(v2.approx_eq(Vec2::new(1.0, 0.0), DOUBLE_COMPARE_EPS_STRICT));
    }

    #[test]
    fn test_velocity_swap_preserves_energy() {
        let normal = Vec2::new(0.6, 0.8);
        let v1 = Vec2::new(2.0, -1.0);
        let v2 = Vec2::new(-0.5, 3.0);
        let (w1, w2) = particles_collision_velocities(v1, v2, normal);
        let before = v1.length_sq() + v2.length_sq();
        let after = w1.length_sq() + w2.length_sq();
        assert!(math_core::approx_eq(before, after, 1e-9));
    }

    #[test]
    fn test_velocity_swap_keeps_tangential_parts() {
        // Grazing contact along y: normal along x, both velocities purely
        // tangential, so nothing changes.
        let normal = Vec2::new(1.0, 0.0);
        let (v1, v2) = particles_collision_velocities(
            Vec2::new(0.0, 2.0),
            Vec2::new(0.0, -3.0),
            normal,
        );
        assert!(v1.approx_eq(Vec2::new(0.0, 2.0), DOUBLE_COMPARE_EPS_STRICT));
        assert!(v2.approx_eq(Vec2::new(0.0, -3.0), DOUBLE_COMPARE_EPS_STRICT));
    }
}

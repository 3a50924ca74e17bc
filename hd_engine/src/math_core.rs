pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Solves a*t^2 + b*t + c = 0 and returns the roots in ascending order.
/// None when there is no real root, including the degenerate a == 0 case
/// (parallel relative motion never closes the gap).
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        return None;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    return Some(((-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)));
}

pub fn kinetic_energy(mass: f64, speed: f64) -> f64 {
    0.5 * mass * speed * speed
}

/// Maps -0.0 to +0.0; every other value passes through.
pub fn scrub_negative_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

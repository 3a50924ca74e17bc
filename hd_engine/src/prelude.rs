pub const DISTANCE_EPS: f64 = 1e-8;
pub const DOUBLE_COMPARE_EPS_STRICT: f64 = 1e-10;

/// Sentinel time meaning "these two disks never touch". Far outside the
/// unit step, so every `< 1` filter discards it.
pub const NO_COLLISION: f64 = 1.0e5;

//! Pitch geometry for shot features
//!
//! Coordinates use the StatsBomb 120 x 80 pitch with the attacked goal on the
//! right-hand byline.

use std::f64::consts::PI;

/// Center of the attacked goal (x, y)
pub const GOAL_CENTER: (f64, f64) = (120.0, 40.0);

/// Goal mouth width in pitch units
pub const GOAL_WIDTH: f64 = 7.32;

/// Euclidean distance from `(x, y)` to the goal center
pub fn distance_to_goal(x: f64, y: f64) -> f64 {
    let dx = GOAL_CENTER.0 - x;
    let dy = GOAL_CENTER.1 - y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle in degrees subtended by the goal mouth from `(x, y)`.
///
/// `atan(w·dx / (dx² + dy² − (w/2)²))`, shifted into [0°, 180°]. The
/// denominator is not guarded: it vanishing gives 90°, and 0/0 gives NaN.
pub fn shot_angle(x: f64, y: f64) -> f64 {
    let dx = GOAL_CENTER.0 - x;
    let dy = (GOAL_CENTER.1 - y).abs();
    let half_width = GOAL_WIDTH / 2.0;

    let numerator = GOAL_WIDTH * dx;
    let denominator = dx * dx + dy * dy - half_width * half_width;

    let mut angle = (numerator / denominator).atan();
    if angle < 0.0 {
        angle += PI;
    }
    angle.to_degrees()
}

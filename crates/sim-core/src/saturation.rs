//! Diminishing-returns transform. Improvements saturate as an indicator
//! approaches its ceiling; degradation is only floor-clamped. The asymmetry
//! is a deliberate modeling choice: progress gets harder near the top,
//! decline does not.

/// Maps a proposed change to the change actually applied, given the current
/// value and the indicator's bounds.
///
/// Positive changes are scaled by a logistic factor of the normalized
/// distance to the ceiling (normalized by `max`, not by the range), then
/// capped so the result never overshoots. Negative changes pass through
/// untouched except for the floor clamp.
pub fn saturate(current: f64, proposed: f64, max: f64, min: f64) -> f64 {
    if proposed == 0.0 {
        return 0.0;
    }

    if proposed > 0.0 {
        let distance_to_max = max - current;
        if distance_to_max <= 0.0 {
            return 0.0;
        }
        let normalized_distance = distance_to_max / max;
        let saturation_factor = sigmoid(10.0 * (normalized_distance - 0.5));
        let actual = proposed * saturation_factor;
        actual.min(distance_to_max)
    } else {
        let distance_to_min = current - min;
        if distance_to_min <= 0.0 {
            return 0.0;
        }
        proposed.max(-distance_to_min)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

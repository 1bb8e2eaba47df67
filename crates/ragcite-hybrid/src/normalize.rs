//! Min-max score normalization.

/// Value every score takes when a scorer produced no spread at all. Zero, so
/// "no information" never reads as "maximally relevant".
pub const DEGENERATE_SCORE: f64 = 0.0;

const RANGE_EPSILON: f64 = 1e-12;

/// Rescales one scorer's raw scores onto [0, 1].
///
/// Non-finite inputs are treated as 0. When the range is (numerically) empty,
/// including the all-zero case, every output is [`DEGENERATE_SCORE`].
pub fn min_max_normalize(raw: &[f64]) -> Vec<f64> {
    let clean: Vec<f64> = raw.iter().map(|s| if s.is_finite() { *s } else { 0.0 }).collect();
    let Some(low) = clean.iter().copied().reduce(f64::min) else { return Vec::new() };
    let high = clean.iter().copied().fold(low, f64::max);
    let range = high - low;
    if range < RANGE_EPSILON {
        return vec![DEGENERATE_SCORE; clean.len()];
    }
    clean.iter().map(|s| ((s - low) / range).clamp(0.0, 1.0)).collect()
}

//! The per-frame rescale-strength schedule.
//!
//! For animated and video inputs the distortion strength ramps up across the
//! timeline: the first frame is rescaled at just above the caller's base
//! strength, and each subsequent frame adds its timeline fraction, so the
//! final frame lands at exactly `base + 1.0`. The ramp is what produces the
//! "melting" look: early frames are nearly intact, late frames are heavily
//! carved.

/// The default base strength when the caller does not supply one.
///
/// A strength of 1.0 barely distorts; values around 2.5 approach maximum
/// distortion, and values above that are not meaningfully different.
pub const DEFAULT_BASE_STRENGTH: f64 = 1.7;

/// Compute the rescale strength for one frame of an animated sequence.
///
/// `frame_index` is 1-based. The result is
/// `round(frame_index / total_frames + base_strength, 2)`: strictly
/// increasing in `frame_index`, and equal to `round(base_strength + 1.0, 2)`
/// at the final frame, so the end of a sequence never exceeds `base + 1`.
///
/// The two-decimal rounding is part of the user-visible tuning contract and
/// is applied half-away-from-zero.
///
/// # Example
///
/// ```
/// use meltdown::schedule::strength_at;
///
/// assert_eq!(strength_at(1, 10, 1.7), 1.8);
/// assert_eq!(strength_at(10, 10, 1.7), 2.7);
/// ```
pub fn strength_at(frame_index: usize, total_frames: usize, base_strength: f64) -> f64 {
    let timeline_fraction = frame_index as f64 / total_frames as f64;
    round_two_decimals(timeline_fraction + base_strength)
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

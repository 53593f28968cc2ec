//! Restart spacing with jitter.

use rand::Rng;

/// Ticks to wait after a restart before the next one is admitted.
///
/// The result is `interval` plus a whole number of extra ticks drawn
/// uniformly from `[0, jitter * interval + 1)`. A jitter of zero always
/// yields exactly `interval`.
pub fn restart_delay<R: Rng + ?Sized>(interval: u64, jitter: f64, rng: &mut R) -> u64 {
    #[allow(clippy::cast_precision_loss)]
    let window = jitter * interval as f64 + 1.0;
    if !window.is_finite() || window <= 1.0 {
        return interval;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let extra = rng.gen_range(0.0..window).floor() as u64;
    interval.saturating_add(extra)
}

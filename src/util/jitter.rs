//! ±25% jitter for retry intervals and poll periods.

use std::time::Duration;

use rand::Rng;

/// Spread `input` uniformly over `[input - d, input + d)` where `d` is a
/// quarter of `|input|`, truncated. Values too small to jitter come back
/// unchanged. Results past the `i64` range saturate at its bounds.
pub fn apply_jitter(input: i64) -> i64 {
    let deviation = i128::from(input.unsigned_abs() / 4);
    if deviation == 0 {
        return input;
    }

    let offset = rand::thread_rng().gen_range(0..2 * deviation);
    let jittered = i128::from(input) - deviation + offset;
    jittered.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// [`apply_jitter`] on millisecond resolution.
pub fn jitter_duration(base: Duration) -> Duration {
    let millis = i64::try_from(base.as_millis()).unwrap_or(i64::MAX / 2);
    Duration::from_millis(apply_jitter(millis).max(0) as u64)
}

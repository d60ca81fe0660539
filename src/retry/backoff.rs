//! Exponential backoff with jitter.

use rand::Rng;

/// Delay before retrying after attempt `attempt` (zero-based), without jitter.
///
/// `base_ms * 2^attempt`, capped at `max_ms`.
pub fn exponential_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(max_ms)
}

/// Adds `delay * jitter * random` to `delay`, with `random` in `[0, 1)`.
pub fn apply_jitter(delay_ms: u64, jitter: f64, random: f64) -> u64 {
    let extra = delay_ms as f64 * jitter.max(0.0) * random.clamp(0.0, 1.0);
    delay_ms.saturating_add(extra as u64)
}

/// Full delay for attempt `attempt`: exponential growth, cap, then jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter: f64) -> u64 {
    let delay = exponential_delay_ms(attempt, base_ms, max_ms);
    apply_jitter(delay, jitter, rand::thread_rng().gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exponential_growth() {
        assert_eq!(exponential_delay_ms(0, 100, 10_000), 100);
        assert_eq!(exponential_delay_ms(1, 100, 10_000), 200);
        assert_eq!(exponential_delay_ms(3, 100, 10_000), 800);
        assert_eq!(exponential_delay_ms(10, 100, 10_000), 10_000);
    }

    #[test]
    fn test_huge_attempt_saturates_to_cap() {
        assert_eq!(exponential_delay_ms(200, 1_000, 30_000), 30_000);
    }

    #[test]
    fn test_jitter_bounds() {
        assert_eq!(apply_jitter(1_000, 0.1, 0.0), 1_000);
        assert_eq!(apply_jitter(1_000, 0.1, 0.5), 1_050);
        assert_eq!(apply_jitter(1_000, 0.0, 0.9), 1_000);
    }

    proptest! {
        #[test]
        fn prop_delay_within_bounds(
            attempt in 0u32..20,
            base in 1u64..5_000,
            max in 1u64..60_000,
            jitter in 0.0f64..1.0
        ) {
            let delay = calculate_backoff(attempt, base, max, jitter);
            let floor = exponential_delay_ms(attempt, base, max);

            prop_assert!(delay >= floor);
            prop_assert!(delay as f64 <= floor as f64 * (1.0 + jitter));
            prop_assert!(delay as f64 <= max as f64 * (1.0 + jitter));
        }
    }
}

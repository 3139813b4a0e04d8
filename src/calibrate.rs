use crate::clock::Clock;

/// Number of back-to-back clock reads used to estimate the read overhead.
pub const CALIBRATION_READS: usize = 10_000;

/// Multiple of the minimum read-to-read gap that counts as a hiccup.
pub const SAFETY_FACTOR: u64 = 8;

/// Derives a jitter threshold as the minimum gap between consecutive clock
/// reads times [`SAFETY_FACTOR`]. Never returns 0.
pub fn calibrate_threshold<C: Clock>(clock: &mut C) -> u64 {
    let mut min_gap = u64::MAX;
    let mut ts1 = clock.now();
    for _ in 0..CALIBRATION_READS {
        let ts2 = clock.now();
        min_gap = min_gap.min(ts2.saturating_sub(ts1));
        ts1 = ts2;
    }
    // A clock coarser than one read reports zero gaps.
    min_gap.max(1).saturating_mul(SAFETY_FACTOR)
}

/// A monotonic nanosecond timestamp source.
///
/// Each sampling worker owns its clock, so implementations may keep state
/// without synchronization.
pub trait Clock {
    fn now(&mut self) -> u64;
}

/// `clock_gettime(CLOCK_MONOTONIC)` in nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now(&mut self) -> u64 {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }
        (ts.tv_sec as u64)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(ts.tv_nsec as u64)
    }
}

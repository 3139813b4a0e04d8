use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::clock::Clock;
use crate::error::Error;
use crate::topology;

use super::store::SampleStore;

/// State shared by every worker of one run. The two atomics are the only
/// values written by more than one thread.
pub struct Shared {
    pub threshold: u64,
    pub deadline: u64,
    pub workers: usize,
    pub pin: bool,
    pub ready: AtomicUsize,
    pub aborted: AtomicBool,
}

/// Runs one worker to completion: pin, wait at the start barrier, sample
/// until the deadline.
pub fn run<C: Clock>(
    cpu: usize,
    shared: &Shared,
    clock: &mut C,
    store: &mut SampleStore,
) -> Result<(), Error> {
    if shared.pin {
        if let Err(e) = topology::pin_current_thread(cpu) {
            shared.aborted.store(true, Ordering::Release);
            return Err(e);
        }
    }
    log::debug!("cpu {}: pinned", cpu);

    shared.ready.fetch_add(1, Ordering::Release);
    while shared.ready.load(Ordering::Acquire) != shared.workers {
        if shared.aborted.load(Ordering::Acquire) {
            log::debug!("cpu {}: run aborted before sampling", cpu);
            return Ok(());
        }
        std::hint::spin_loop();
    }

    log::debug!("cpu {}: sampling", cpu);
    sample_until(clock, shared.deadline, shared.threshold, store);
    log::debug!("cpu {}: done, {} hiccups", cpu, store.len());
    Ok(())
}

/// The spin loop. Every gap of at least `threshold` between two
/// consecutive reads is recorded.
///
/// After a hiccup the reference timestamp is taken from a fresh read rather
/// than the one that closed the gap, so the next gap includes the cost of
/// recording. Reported numbers depend on this.
#[inline(never)]
pub fn sample_until<C: Clock>(clock: &mut C, deadline: u64, threshold: u64, store: &mut SampleStore) {
    let mut ts1 = clock.now();
    while ts1 < deadline {
        let ts2 = clock.now();
        let delta = ts2.saturating_sub(ts1);
        if delta < threshold {
            ts1 = ts2;
            continue;
        }
        store.record(delta);
        ts1 = clock.now();
    }
}

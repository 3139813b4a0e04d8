pub mod store;
pub mod worker;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crate::clock::Clock;
use crate::error::Error;

pub use store::{reserve, SampleStore};
use worker::Shared;

/// Runs one pinned sampling worker per CPU over a common time window.
pub struct Engine {
    threshold: u64,
    pin: bool,
}

impl Engine {
    pub fn new(threshold: u64) -> Self {
        Self { threshold, pin: true }
    }

    /// Leaves workers wherever the scheduler puts them, so tests can name
    /// CPUs the host does not have.
    #[cfg(test)]
    fn unpinned(mut self) -> Self {
        self.pin = false;
        self
    }

    /// Samples every store's CPU until `deadline` (an absolute timestamp of
    /// the clocks built by `make_clock`).
    ///
    /// The first CPU's worker runs on the calling thread, which stays pinned
    /// to it afterwards. The rest run on scoped threads. If any worker fails
    /// to pin, the others leave the start barrier without sampling and the
    /// first error is returned.
    pub fn run<C, F>(
        &self,
        stores: &mut BTreeMap<usize, SampleStore>,
        deadline: u64,
        make_clock: F,
    ) -> Result<(), Error>
    where
        C: Clock,
        F: Fn(usize) -> C + Sync,
    {
        let shared = Shared {
            threshold: self.threshold,
            deadline,
            workers: stores.len(),
            pin: self.pin,
            ready: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
        };

        let mut workers = stores.iter_mut();
        let Some((&first_cpu, first_store)) = workers.next() else {
            log::warn!("no CPUs to measure");
            return Ok(());
        };

        thread::scope(|scope| {
            let shared = &shared;
            let make_clock = &make_clock;
            let mut first_error = None;
            let mut handles = Vec::new();

            for (&cpu, store) in workers {
                let spawned = thread::Builder::new()
                    .name(format!("hiccups-cpu{}", cpu))
                    .spawn_scoped(scope, move || {
                        let mut clock = make_clock(cpu);
                        worker::run(cpu, shared, &mut clock, store)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        shared.aborted.store(true, Ordering::Release);
                        first_error = Some(Error::Io(e));
                        break;
                    }
                }
            }

            if first_error.is_none() {
                let mut clock = make_clock(first_cpu);
                if let Err(e) = worker::run(first_cpu, shared, &mut clock, first_store) {
                    first_error = Some(e);
                }
            }

            for handle in handles {
                let result = handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                if let Err(e) = result {
                    first_error.get_or_insert(e);
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::synthetic::JumpClock;
    use crate::clock::MonotonicClock;
    use crate::stats;
    use crate::topology;

    const MS: u64 = 1_000_000;
    const SECOND: u64 = 1_000_000_000;
    const TICK: u64 = 10_000;

    #[test]
    fn test_single_cpu_one_jump() {
        let mut stores = reserve(&[0], 16).unwrap();
        Engine::new(MS)
            .unpinned()
            .run(&mut stores, SECOND, |_| JumpClock::new(TICK, 2 * MS, vec![500]))
            .unwrap();

        let report = stats::summarize(0, MS, stores.remove(&0).unwrap());
        assert_eq!(report.hiccups, 1);
        assert_eq!(report.pct99_ns, 2 * MS);
        assert_eq!(report.pct999_ns, 2 * MS);
        assert_eq!(report.max_ns, 2 * MS);
    }

    #[test]
    fn test_quiet_cpu_reports_zeros() {
        let mut stores = reserve(&[0, 1], 16).unwrap();
        Engine::new(MS)
            .unpinned()
            .run(&mut stores, SECOND, |cpu| {
                if cpu == 0 {
                    JumpClock::new(TICK, 2 * MS, vec![500])
                } else {
                    JumpClock::steady(TICK)
                }
            })
            .unwrap();

        let quiet = stats::summarize(1, MS, stores.remove(&1).unwrap());
        assert_eq!(quiet.hiccups, 0);
        assert_eq!(quiet.pct99_ns, 0);
        assert_eq!(quiet.pct999_ns, 0);
        assert_eq!(quiet.max_ns, 0);

        let busy = stats::summarize(0, MS, stores.remove(&0).unwrap());
        assert_eq!(busy.hiccups, 1);
    }

    #[test]
    fn test_overflow_keeps_every_hiccup() {
        let mut stores = reserve(&[0], 2).unwrap();
        Engine::new(MS)
            .unpinned()
            .run(&mut stores, SECOND, |_| {
                JumpClock::new(TICK, 3 * MS, vec![100, 200, 300, 400, 500])
            })
            .unwrap();

        let store = &stores[&0];
        assert_eq!(store.len(), 5);
        assert!(store.overflows() >= 1);
        assert!(store.samples().iter().all(|&d| d == 3 * MS));
    }

    #[test]
    fn test_one_worker_per_cpu() {
        let cpus = [0, 2, 5, 7];
        let built = AtomicUsize::new(0);
        let mut stores = reserve(&cpus, 16).unwrap();
        Engine::new(MS)
            .unpinned()
            .run(&mut stores, 10 * MS, |_| {
                built.fetch_add(1, Ordering::Relaxed);
                JumpClock::new(TICK, 2 * MS, vec![10, 40])
            })
            .unwrap();

        assert_eq!(built.load(Ordering::Relaxed), cpus.len());
        assert_eq!(stores.len(), cpus.len());
        for store in stores.values() {
            assert_eq!(store.len(), 2);
            assert!(store.samples().iter().all(|&d| d >= MS));
        }
    }

    #[test]
    fn test_no_cpus_is_a_no_op() {
        let mut stores = reserve(&[], 16).unwrap();
        Engine::new(MS)
            .run(&mut stores, SECOND, |_| JumpClock::steady(TICK))
            .unwrap();
        assert!(stores.is_empty());
    }

    #[test]
    fn test_pinned_run_on_real_cpus() {
        // Run on a scratch thread: the engine pins its calling thread.
        let (cpus, stores, threshold) = thread::spawn(|| {
            let cpus = topology::allowed_cpus().unwrap();
            let mut stores = reserve(&cpus, 1024).unwrap();
            let threshold = 100 * 1_000;
            let deadline = MonotonicClock.now() + 20 * MS;
            Engine::new(threshold)
                .run(&mut stores, deadline, |_| MonotonicClock)
                .unwrap();
            (cpus, stores, threshold)
        })
        .join()
        .unwrap();

        assert_eq!(stores.keys().copied().collect::<Vec<_>>(), cpus);
        for store in stores.values() {
            assert!(store.samples().iter().all(|&d| d >= threshold));
        }
    }

    #[test]
    fn test_pin_failure_aborts_run() {
        let result = thread::spawn(|| {
            let first = topology::allowed_cpus().unwrap()[0];
            let bogus = libc::CPU_SETSIZE as usize;
            let mut stores = reserve(&[first, bogus], 16).unwrap();
            let result = Engine::new(MS).run(&mut stores, u64::MAX, |_| MonotonicClock);
            let sampled: usize = stores.values().map(|s| s.len()).sum();
            (result, sampled)
        })
        .join()
        .unwrap();

        match result {
            (Err(Error::Affinity(msg)), 0) => assert!(msg.contains("CPU_SETSIZE")),
            (other, sampled) => panic!("expected affinity error, got {:?} ({} samples)", other, sampled),
        }
    }
}

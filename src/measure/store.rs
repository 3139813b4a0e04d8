use std::collections::BTreeMap;

use crate::error::Error;

/// Hiccup durations (ns) recorded by one worker.
///
/// Capacity is reserved up front so the measurement window normally runs
/// without allocating. Exceeding it is reported but never loses a sample.
#[derive(Debug, Default)]
pub struct SampleStore {
    cpu: usize,
    samples: Vec<u64>,
    overflows: usize,
}

impl SampleStore {
    /// Allocates room for exactly `capacity` samples up front.
    pub fn try_with_capacity(cpu: usize, capacity: usize) -> Result<Self, Error> {
        let mut samples = Vec::new();
        samples.try_reserve_exact(capacity).map_err(|e| {
            Error::Capacity(format!(
                "cannot reserve {} samples for cpu {}: {}",
                capacity, cpu, e
            ))
        })?;
        Ok(Self {
            cpu,
            samples,
            overflows: 0,
        })
    }

    #[cfg(test)]
    pub fn with_capacity(cpu: usize, capacity: usize) -> Self {
        Self::try_with_capacity(cpu, capacity).unwrap()
    }

    #[inline]
    pub fn record(&mut self, delta: u64) {
        if self.samples.len() == self.samples.capacity() {
            self.overflows += 1;
            log::warn!(
                "preallocated sample space exceeded on cpu {}, increase threshold or number of samples",
                self.cpu
            );
        }
        self.samples.push(delta);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of times recording outgrew the allocated space.
    pub fn overflows(&self) -> usize {
        self.overflows
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Reorders the samples ascending by duration.
    pub fn sort(&mut self) {
        self.samples.sort_unstable();
    }
}

/// One store per CPU, keyed by CPU id, each with `capacity` reserved.
pub fn reserve(cpus: &[usize], capacity: usize) -> Result<BTreeMap<usize, SampleStore>, Error> {
    cpus.iter()
        .map(|&cpu| Ok((cpu, SampleStore::try_with_capacity(cpu, capacity)?)))
        .collect()
}

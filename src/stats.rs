use crate::measure::SampleStore;

/// Latency-outlier summary for one CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuReport {
    pub cpu: usize,
    pub threshold_ns: u64,
    pub hiccups: usize,
    pub pct99_ns: u64,
    pub pct999_ns: u64,
    pub max_ns: u64,
}

/// Index of quantile `q` in an ascending sequence of `len` values:
/// `floor(len * q)`, no interpolation.
pub fn percentile_index(len: usize, q: f64) -> usize {
    (len as f64 * q) as usize
}

/// Value at quantile `q` of ascending `sorted`, or 0 when empty.
pub fn percentile(sorted: &[u64], q: f64) -> u64 {
    sorted
        .get(percentile_index(sorted.len(), q))
        .copied()
        .unwrap_or(0)
}

/// Sorts the store and reduces it to count, p99, p999 and max.
pub fn summarize(cpu: usize, threshold_ns: u64, mut store: SampleStore) -> CpuReport {
    store.sort();
    let sorted = store.samples();
    CpuReport {
        cpu,
        threshold_ns,
        hiccups: sorted.len(),
        pct99_ns: percentile(sorted, 0.99),
        pct999_ns: percentile(sorted, 0.999),
        max_ns: sorted.last().copied().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(values: &[u64]) -> SampleStore {
        let mut store = SampleStore::with_capacity(0, values.len());
        for &v in values {
            store.record(v);
        }
        store
    }

    // --- Percentile indices ---

    #[test]
    fn test_percentile_index_truncates() {
        assert_eq!(percentile_index(1, 0.99), 0);
        assert_eq!(percentile_index(100, 0.99), 99);
        assert_eq!(percentile_index(150, 0.99), 148);
        assert_eq!(percentile_index(1000, 0.999), 999);
        assert_eq!(percentile_index(1500, 0.999), 1498);
    }

    #[test]
    fn test_percentile_indices_ordered_and_in_bounds() {
        for n in 1..5000 {
            let p99 = percentile_index(n, 0.99);
            let p999 = percentile_index(n, 0.999);
            assert!(p99 <= p999, "n={}: {} > {}", n, p99, p999);
            assert!(p999 < n, "n={}: p999 index {} out of range", n, p999);
        }
    }

    #[test]
    fn test_percentile_empty_is_zero() {
        assert_eq!(percentile(&[], 0.99), 0);
        assert_eq!(percentile(&[], 0.999), 0);
    }

    // --- Summaries ---

    #[test]
    fn test_summarize_empty_store() {
        let report = summarize(3, 1_000, SampleStore::with_capacity(3, 4));
        assert_eq!(
            report,
            CpuReport {
                cpu: 3,
                threshold_ns: 1_000,
                hiccups: 0,
                pct99_ns: 0,
                pct999_ns: 0,
                max_ns: 0,
            }
        );
    }

    #[test]
    fn test_summarize_single_sample() {
        let report = summarize(0, 1_000_000, store_of(&[2_000_000]));
        assert_eq!(report.hiccups, 1);
        assert_eq!(report.pct99_ns, 2_000_000);
        assert_eq!(report.pct999_ns, 2_000_000);
        assert_eq!(report.max_ns, 2_000_000);
    }

    #[test]
    fn test_summarize_sorts_before_indexing() {
        // 200 samples, shuffled: 1..=200 in reverse order.
        let values: Vec<u64> = (1..=200).rev().collect();
        let report = summarize(0, 1, store_of(&values));
        assert_eq!(report.hiccups, 200);
        assert_eq!(report.pct99_ns, 199); // sorted[198]
        assert_eq!(report.pct999_ns, 200); // sorted[199]
        assert_eq!(report.max_ns, 200);
    }
}

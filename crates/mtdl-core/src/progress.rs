//! Overall progress across workers.
//!
//! Each worker reports its own batch percent; the aggregator keeps the last
//! value per worker and turns them into one overall percent
//! (`sum / worker_count`, integer division) which is handed to the caller's
//! callback. Updating the map and invoking the callback happen under one
//! lock, so callback invocations never interleave.

use std::sync::{Arc, Mutex};

/// Callback receiving the overall percent (0..=100).
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

struct AggregateProgress {
    percents: Vec<u8>,
    callback: Option<ProgressCallback>,
}

/// Mutex-guarded per-worker percents plus the optional caller callback.
pub struct ProgressAggregator {
    inner: Mutex<AggregateProgress>,
}

impl std::fmt::Debug for ProgressAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressAggregator")
            .field("overall", &self.overall())
            .finish()
    }
}

impl ProgressAggregator {
    /// Creates an aggregator for `worker_count` workers (at least 1), all starting at 0%.
    pub fn new(worker_count: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            inner: Mutex::new(AggregateProgress {
                percents: vec![0; worker_count.max(1)],
                callback,
            }),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.lock().percents.len()
    }

    pub fn has_callback(&self) -> bool {
        self.lock().callback.is_some()
    }

    /// Records `percent` for `worker` and returns the new overall percent,
    /// invoking the callback with it while still holding the lock.
    /// Values above 100 are clamped; an unknown worker index leaves the state unchanged.
    pub fn report(&self, worker: usize, percent: u8) -> u8 {
        let mut state = self.lock();
        if let Some(slot) = state.percents.get_mut(worker) {
            *slot = percent.min(100);
        } else {
            tracing::debug!(worker, "progress report for unknown worker ignored");
        }
        let overall = overall_of(&state.percents);
        if let Some(cb) = state.callback.as_ref() {
            cb(overall);
        }
        overall
    }

    /// Current overall percent without reporting anything.
    pub fn overall(&self) -> u8 {
        overall_of(&self.lock().percents)
    }

    /// Last percent recorded for `worker` (None for an unknown index).
    pub fn worker_percent(&self, worker: usize) -> Option<u8> {
        self.lock().percents.get(worker).copied()
    }

    /// Handle that reports under a fixed worker index.
    pub fn reporter(self: &Arc<Self>, worker: usize) -> WorkerProgress {
        WorkerProgress {
            aggregator: Arc::clone(self),
            worker,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AggregateProgress> {
        // A panicking callback must not wedge the remaining workers.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn overall_of(percents: &[u8]) -> u8 {
    let sum: usize = percents.iter().map(|&p| usize::from(p)).sum();
    (sum / percents.len().max(1)) as u8
}

/// A worker's view of the aggregator; the index is bound when the handle is created.
#[derive(Debug, Clone)]
pub struct WorkerProgress {
    aggregator: Arc<ProgressAggregator>,
    worker: usize,
}

impl WorkerProgress {
    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn report(&self, percent: u8) -> u8 {
        self.aggregator.report(self.worker, percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn recording() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let cb: ProgressCallback = Box::new(move |p| seen_cb.lock().unwrap().push(p));
        (cb, seen)
    }

    #[test]
    fn overall_is_floor_of_average() {
        let (cb, seen) = recording();
        let agg = ProgressAggregator::new(4, Some(cb));
        assert_eq!(agg.report(0, 50), 12);
        assert_eq!(agg.report(1, 100), 37);
        assert_eq!(agg.report(2, 33), 45);
        assert_eq!(agg.report(3, 1), 46);
        assert_eq!(*seen.lock().unwrap(), vec![12, 37, 45, 46]);
    }

    #[test]
    fn report_overwrites_previous_value() {
        let agg = ProgressAggregator::new(2, None);
        agg.report(0, 80);
        assert_eq!(agg.report(0, 20), 10);
        assert_eq!(agg.worker_percent(0), Some(20));
    }

    #[test]
    fn all_workers_done_is_100() {
        let agg = ProgressAggregator::new(3, None);
        for w in 0..3 {
            agg.report(w, 100);
        }
        assert_eq!(agg.overall(), 100);
    }

    #[test]
    fn values_above_100_are_clamped() {
        let agg = ProgressAggregator::new(1, None);
        assert_eq!(agg.report(0, 250), 100);
    }

    #[test]
    fn unknown_worker_is_ignored() {
        let agg = ProgressAggregator::new(2, None);
        agg.report(0, 60);
        assert_eq!(agg.report(7, 100), 30);
        assert_eq!(agg.worker_percent(7), None);
    }

    #[test]
    fn no_callback_still_tracks_state() {
        let agg = ProgressAggregator::new(2, None);
        assert!(!agg.has_callback());
        agg.report(1, 40);
        assert_eq!(agg.overall(), 20);
    }

    #[test]
    fn reporter_binds_worker_index() {
        let agg = Arc::new(ProgressAggregator::new(3, None));
        let reporters: Vec<WorkerProgress> = (0..3).map(|w| agg.reporter(w)).collect();
        reporters[2].report(90);
        assert_eq!(reporters[2].worker(), 2);
        assert_eq!(agg.worker_percent(0), Some(0));
        assert_eq!(agg.worker_percent(2), Some(90));
    }

    #[test]
    fn callbacks_never_overlap() {
        let in_callback = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let flag = Arc::clone(&in_callback);
        let count = Arc::clone(&overlaps);
        let cb: ProgressCallback = Box::new(move |_| {
            if flag.swap(true, Ordering::SeqCst) {
                count.fetch_add(1, Ordering::SeqCst);
            }
            std::thread::yield_now();
            flag.store(false, Ordering::SeqCst);
        });
        let agg = Arc::new(ProgressAggregator::new(4, Some(cb)));
        let handles: Vec<_> = (0..4)
            .map(|w| {
                let r = agg.reporter(w);
                std::thread::spawn(move || {
                    for p in 0..=100u8 {
                        r.report(p);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(agg.overall(), 100);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn concurrent_reports_stay_in_range(
            seeds in proptest::collection::vec(proptest::collection::vec(0u8..=100, 1000), 8)
        ) {
            let (cb, seen) = recording();
            let agg = Arc::new(ProgressAggregator::new(8, Some(cb)));
            let handles: Vec<_> = seeds
                .into_iter()
                .enumerate()
                .map(|(w, percents)| {
                    let r = agg.reporter(w);
                    std::thread::spawn(move || {
                        for p in percents {
                            let overall = r.report(p);
                            assert!(overall <= 100);
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
            let seen = seen.lock().unwrap();
            prop_assert_eq!(seen.len(), 8000);
            prop_assert!(seen.iter().all(|&p| p <= 100));

            let expected: usize = (0..8).map(|w| usize::from(agg.worker_percent(w).unwrap())).sum::<usize>() / 8;
            prop_assert_eq!(usize::from(agg.overall()), expected);
        }
    }
}

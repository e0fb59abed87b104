//! Round-robin split of an ordered list into per-worker batches.

/// Per-worker batches: `batches[w]` is the ordered sub-list for worker `w`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan<T> {
    batches: Vec<Vec<T>>,
}

impl<T> PartitionPlan<T> {
    /// Number of workers the plan was built for.
    pub fn worker_count(&self) -> usize {
        self.batches.len()
    }

    /// Total number of items across all batches.
    pub fn item_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(Vec::is_empty)
    }

    pub fn batch(&self, worker: usize) -> &[T] {
        self.batches.get(worker).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn batches(&self) -> &[Vec<T>] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<Vec<T>> {
        self.batches
    }
}

/// Splits `items` into `worker_count` sub-lists: item `i` goes to worker `i % worker_count`.
/// A `worker_count` of 0 is treated as 1. Workers beyond `items.len()` get empty batches.
pub fn split<T: Clone>(items: &[T], worker_count: usize) -> PartitionPlan<T> {
    let worker_count = worker_count.max(1);
    let mut batches: Vec<Vec<T>> = (0..worker_count)
        .map(|w| Vec::with_capacity(items.len() / worker_count + usize::from(w < items.len() % worker_count)))
        .collect();
    for (i, item) in items.iter().enumerate() {
        batches[i % worker_count].push(item.clone());
    }
    PartitionPlan { batches }
}

//! Request and write-operation counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Which counter to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Every request handled by an API or health endpoint
    TotalRequests,
    /// Every write operation attempted
    WriteOps,
}

/// Process-lifetime counters owned by the application state.
///
/// Each counter is individually atomic. Readers may observe the two
/// counters out of step with each other.
#[derive(Debug, Default)]
pub struct Counters {
    total_requests: AtomicU64,
    write_ops: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::TotalRequests => &self.total_requests,
            Counter::WriteOps => &self.write_ops,
        }
    }

    pub fn increment(&self, counter: Counter) {
        self.cell(counter).fetch_add(1, Ordering::Relaxed);
    }

    /// Increment and return the value this call produced
    pub fn increment_and_get(&self, counter: Counter) -> u64 {
        self.cell(counter).fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn read(&self, counter: Counter) -> u64 {
        self.cell(counter).load(Ordering::Relaxed)
    }
}

// src/utils/clock.rs
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Client order indices derived from wall-clock milliseconds, bumped so that
/// two orders in the same millisecond still get distinct, increasing ids.
#[derive(Debug, Default)]
pub struct OrderIndexAllocator {
    last: AtomicI64,
}

impl OrderIndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let now = now_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

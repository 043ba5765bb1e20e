//! A single process-wide counter for the undercount observability event
//! required by spec §7/§4.4, in the style of the teacher's own
//! process-wide metrics: a plain `AtomicU64`, no metrics-export crate,
//! since nothing else in this proxy needs one.

use std::sync::atomic::{AtomicU64, Ordering};

pub struct UndercountCounter(AtomicU64);

impl UndercountCounter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub static UNDERCOUNT_COUNTER: UndercountCounter = UndercountCounter::new();

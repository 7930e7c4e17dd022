use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;

use serde::Serialize;

use crate::scanner::Risk;

/// Process-wide scan accounting, serialized as-is by the stats endpoint.
#[derive(Serialize, Debug, Default)]
pub struct ScanCounters {
    started: AtomicUsize,
    cache_hits: AtomicUsize,
    network_calls: AtomicUsize,
    failed: AtomicUsize,
    safe: AtomicUsize,
    suspicious: AtomicUsize,
    malicious: AtomicUsize,
}

impl ScanCounters {
    pub fn started(&self) {
        self.started.fetch_add(1, Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Relaxed);
    }

    pub fn network_call(&self) {
        self.network_calls.fetch_add(1, Relaxed);
    }

    pub fn failure(&self) {
        self.failed.fetch_add(1, Relaxed);
    }

    pub fn record_verdict(&self, risk: Risk) {
        match risk {
            Risk::Safe => self.safe.fetch_add(1, Relaxed),
            Risk::Suspicious => self.suspicious.fetch_add(1, Relaxed),
            Risk::Malicious => self.malicious.fetch_add(1, Relaxed),
        };
    }

    pub fn network_call_count(&self) -> usize {
        self.network_calls.load(Relaxed)
    }

    pub fn cache_hit_count(&self) -> usize {
        self.cache_hits.load(Relaxed)
    }
}

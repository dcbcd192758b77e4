//! Bounded in-memory log of aggregation runs for /debug/runs.
//! Diagnostics only; nothing here feeds back into grouping.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::ingest::Aggregation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEntry {
    pub ts_unix: u64,
    pub ok: bool,
    pub total_items: usize,
    pub total_groups: usize,
    pub failed_sources: usize,
    pub duration_ms: u64,
}

impl RunEntry {
    pub fn from_aggregation(a: &Aggregation, duration_ms: u64) -> Self {
        Self {
            ts_unix: now_unix(),
            ok: true,
            total_items: a.total_items,
            total_groups: a.total_groups,
            failed_sources: a.failed_sources,
            duration_ms,
        }
    }

    pub fn failed(duration_ms: u64) -> Self {
        Self {
            ts_unix: now_unix(),
            ok: false,
            total_items: 0,
            total_groups: 0,
            failed_sources: 0,
            duration_ms,
        }
    }
}

/// Fixed-size ring of recent runs, newest at the back.
#[derive(Debug)]
pub struct RunHistory {
    runs: Mutex<VecDeque<RunEntry>>,
    cap: usize,
}

impl RunHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            runs: Mutex::new(VecDeque::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, entry: RunEntry) {
        let mut runs = self.lock();
        if runs.len() == self.cap {
            runs.pop_front();
        }
        runs.push_back(entry);
    }

    /// Up to `n` most recent runs, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<RunEntry> {
        let runs = self.lock();
        let skip = runs.len().saturating_sub(n);
        runs.iter().skip(skip).cloned().collect()
    }

    // A poisoned lock only means a push panicked midway; the ring is still valid.
    fn lock(&self) -> MutexGuard<'_, VecDeque<RunEntry>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

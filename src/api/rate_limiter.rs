// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-window rate limiter keyed by client identity and route

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock seam so tests can drive window rollover without sleeping.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock implementation used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

struct WindowEntry {
    count: u32,
    window_end: u64,
}

/// Fixed-window counter, one entry per `(identity, route, window index)`.
///
/// Windows are calendar-aligned: two requests share an entry iff they fall
/// in the same window index (`now / window_ms`). A burst straddling a window
/// boundary can therefore reach up to twice the limit inside one window
/// duration. That trade-off buys O(1) admission over sliding-window
/// accuracy.
///
/// Entries for expired windows are left in the map; a single-process
/// deployment restarts long before this matters.
pub struct FixedWindowLimiter {
    entries: RwLock<HashMap<String, WindowEntry>>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct with an injected clock (for deterministic tests).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Admit or reject one request for `(identity, route)` under
    /// `limit` requests per `window_ms`. Consumes one unit of budget on
    /// admission; rejection never increments. Always returns, never errors.
    pub fn check_and_consume(
        &self,
        identity: &str,
        route: &str,
        limit: u32,
        window_ms: u64,
    ) -> bool {
        let now = self.clock.now_ms();
        let window_index = now / window_ms;
        let key = format!("{identity}:{route}:{window_index}");

        let mut entries = self.entries.write().unwrap();
        match entries.get_mut(&key) {
            Some(entry) if now <= entry.window_end => {
                if entry.count < limit {
                    entry.count += 1;
                    true
                } else {
                    tracing::debug!(identity, route, limit, "rate limit rejection");
                    false
                }
            }
            _ => {
                // First request in this window, or a stale entry left over
                // from a clock that moved past the stored reset time.
                entries.insert(
                    key,
                    WindowEntry {
                        count: 1,
                        window_end: (window_index + 1) * window_ms,
                    },
                );
                true
            }
        }
    }

    /// Number of tracked entries, including dead windows.
    pub fn tracked_entries(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

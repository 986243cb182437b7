//! Admission control: group authorization and per-group rate limiting
//!
//! Admission runs synchronously before any generation work is spawned.
//! Authorization is a pure membership test against the configured group
//! list; rate limiting is a fixed window counted per group. Each group gets
//! its own lock so unrelated groups never serialize on each other; locks
//! are created lazily and never evicted (group cardinality is bounded by
//! the platform).

use crate::config::{AdmissionConfig, GroupControlMode};
use crate::error::AdmissionError;
use crate::types::GroupId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One group's fixed rate window
///
/// Mutated only while holding that group's lock.
#[derive(Debug)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

impl RateWindow {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            count: 0,
        }
    }
}

/// Admission service: authorization check followed by rate limiting
///
/// Constructed once per pipeline and shared by handle; owns the per-group
/// windows and their locks (no ambient/static state).
#[derive(Clone)]
pub struct AdmissionControl {
    config: Arc<AdmissionConfig>,
    windows: Arc<Mutex<HashMap<GroupId, Arc<Mutex<RateWindow>>>>>,
}

impl AdmissionControl {
    /// Create an admission service from configuration
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config: Arc::new(config),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check whether a request may proceed
    ///
    /// Requests without a group context (direct messages) always pass: group
    /// authorization and rate limiting both apply to groups only. The whole
    /// window check-and-increment runs under the group's lock, so two
    /// concurrent calls can never both observe a free slot and exceed the cap.
    pub fn check(&self, group: Option<&GroupId>) -> Result<(), AdmissionError> {
        let Some(group) = group else {
            return Ok(());
        };

        match self.config.group_control_mode {
            GroupControlMode::Whitelist
                if !self.config.group_list.iter().any(|g| g == group.as_str()) =>
            {
                return Err(AdmissionError::GroupNotAllowed);
            }
            GroupControlMode::Blacklist
                if self.config.group_list.iter().any(|g| g == group.as_str()) =>
            {
                return Err(AdmissionError::GroupBlocked);
            }
            _ => {}
        }

        if !self.config.rate_limit_enabled {
            return Ok(());
        }

        // Fetch or lazily create the group's window; the outer map lock is
        // held only for this lookup, never across the window check.
        let window = {
            let mut windows = self
                .windows
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            windows
                .entry(group.clone())
                .or_insert_with(|| Arc::new(Mutex::new(RateWindow::new())))
                .clone()
        };

        let mut window = window.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let window_len = Duration::from_secs(self.config.rate_limit_window_seconds);

        if now.duration_since(window.window_start) >= window_len {
            window.window_start = now;
            window.count = 0;
        }

        if window.count >= self.config.rate_limit_max_calls {
            return Err(AdmissionError::RateLimited {
                max_calls: self.config.rate_limit_max_calls,
                window_secs: self.config.rate_limit_window_seconds,
            });
        }

        window.count += 1;
        Ok(())
    }
}

//! In-memory activity log.
//!
//! Counts what the shield did during this process so the host can show it
//! to the user. It records no content and is never written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Activity counters for the current session.
#[derive(Debug)]
pub struct ActivityLog {
    /// Control-channel calls answered
    calls_handled: AtomicU64,
    /// Calls naming an unknown method
    unknown_calls: AtomicU64,
    /// Enable requests served
    security_enables: AtomicU64,
    /// Background transitions that raised the blur cover
    background_covers: AtomicU64,
    /// Times the secured cover snapped visible
    secured_reveals: AtomicU64,
    /// Recording-changed pushes sent to the host
    capture_pushes: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            calls_handled: AtomicU64::new(0),
            unknown_calls: AtomicU64::new(0),
            security_enables: AtomicU64::new(0),
            background_covers: AtomicU64::new(0),
            secured_reveals: AtomicU64::new(0),
            capture_pushes: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_call(&self) {
        self.calls_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_call(&self) {
        self.unknown_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_security_enable(&self) {
        self.security_enables.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_background_cover(&self) {
        self.background_covers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_secured_reveal(&self) {
        self.secured_reveals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capture_push(&self) {
        self.capture_pushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> ActivityStats {
        ActivityStats {
            calls_handled: self.calls_handled.load(Ordering::Relaxed),
            unknown_calls: self.unknown_calls.load(Ordering::Relaxed),
            security_enables: self.security_enables.load(Ordering::Relaxed),
            background_covers: self.background_covers.load(Ordering::Relaxed),
            secured_reveals: self.secured_reveals.load(Ordering::Relaxed),
            capture_pushes: self.capture_pushes.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Shield Activity:\n\
             - Calls handled: {}\n\
             - Unknown calls: {}\n\
             - Security enabled: {} time(s)\n\
             - Background covers shown: {}\n\
             - Secured cover reveals: {}\n\
             - Recording changes pushed: {}\n\
             - Session duration: {} seconds",
            stats.calls_handled,
            stats.unknown_calls,
            stats.security_enables,
            stats.background_covers,
            stats.secured_reveals,
            stats.capture_pushes,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.calls_handled.store(0, Ordering::Relaxed);
        self.unknown_calls.store(0, Ordering::Relaxed);
        self.security_enables.store(0, Ordering::Relaxed);
        self.background_covers.store(0, Ordering::Relaxed);
        self.secured_reveals.store(0, Ordering::Relaxed);
        self.capture_pushes.store(0, Ordering::Relaxed);
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of activity statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityStats {
    pub calls_handled: u64,
    pub unknown_calls: u64,
    pub security_enables: u64,
    pub background_covers: u64,
    pub secured_reveals: u64,
    pub capture_pushes: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared activity log.
pub type SharedActivityLog = Arc<ActivityLog>;

/// Create a new shared activity log.
pub fn create_shared_log() -> SharedActivityLog {
    Arc::new(ActivityLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_log_counting() {
        let log = ActivityLog::new();

        log.record_call();
        log.record_call();
        log.record_unknown_call();
        log.record_capture_push();

        let stats = log.stats();
        assert_eq!(stats.calls_handled, 2);
        assert_eq!(stats.unknown_calls, 1);
        assert_eq!(stats.capture_pushes, 1);
        assert_eq!(stats.security_enables, 0);
    }

    #[test]
    fn test_activity_log_reset() {
        let log = ActivityLog::new();

        log.record_security_enable();
        log.record_background_cover();
        log.record_secured_reveal();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.security_enables, 0);
        assert_eq!(stats.background_covers, 0);
        assert_eq!(stats.secured_reveals, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = ActivityLog::new();
        let summary = log.summary();

        assert!(summary.contains("Calls handled"));
        assert!(summary.contains("Background covers shown"));
        assert!(summary.contains("Recording changes pushed"));
    }
}

//! Per-policy timing state.
//!
//! The executor keeps one [`SchedulingEntry`] per registered policy, in
//! registration order. Entries are created once and only their last run
//! instant ever changes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::policy::HealthPolicy;

/// Timing state for one registered policy.
pub struct SchedulingEntry {
    policy: Arc<dyn HealthPolicy>,
    interval: Duration,
    last_run: Option<Instant>,
}

impl SchedulingEntry {
    /// Create an entry for a policy that has never run.
    ///
    /// The policy's interval is read here and never again.
    pub fn new(policy: Arc<dyn HealthPolicy>) -> Self {
        let interval = policy.interval();
        Self {
            policy,
            interval,
            last_run: None,
        }
    }

    pub fn policy(&self) -> &Arc<dyn HealthPolicy> {
        &self.policy
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    /// Time left until the policy is due, saturating at zero.
    ///
    /// A policy that never ran is due immediately.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_run {
            None => Duration::ZERO,
            Some(last_run) => match last_run.checked_add(self.interval) {
                Some(next_run) => next_run.saturating_duration_since(now),
                None => Duration::MAX,
            },
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    pub fn mark_run(&mut self, at: Instant) {
        self.last_run = Some(at);
    }
}

impl fmt::Debug for SchedulingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulingEntry")
            .field("policy", &self.policy.name())
            .field("interval", &self.interval)
            .field("last_run", &self.last_run)
            .finish()
    }
}

/// How long the worker should sleep before the next cycle.
///
/// This is the smallest remaining wait across `entries`, or `idle_wait` when
/// there are none.
pub fn next_wait(entries: &[SchedulingEntry], now: Instant, idle_wait: Duration) -> Duration {
    entries
        .iter()
        .map(|entry| entry.remaining(now))
        .min()
        .unwrap_or(idle_wait)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, RecordingPolicy};

    fn entry(interval_ms: u64) -> SchedulingEntry {
        let log = CallLog::default();
        SchedulingEntry::new(Arc::new(RecordingPolicy::new(
            "p",
            Duration::from_millis(interval_ms),
            &log,
        )))
    }

    #[test]
    fn test_never_run_is_due_immediately() {
        let entry = entry(10_000);
        let now = Instant::now();
        assert_eq!(entry.remaining(now), Duration::ZERO);
        assert!(entry.is_due(now));
    }

    #[test]
    fn test_remaining_after_run() {
        let mut entry = entry(100);
        let start = Instant::now();
        entry.mark_run(start);

        assert_eq!(entry.remaining(start), Duration::from_millis(100));
        assert_eq!(
            entry.remaining(start + Duration::from_millis(40)),
            Duration::from_millis(60)
        );
        assert!(!entry.is_due(start + Duration::from_millis(99)));
        assert!(entry.is_due(start + Duration::from_millis(100)));
        assert_eq!(entry.remaining(start + Duration::from_millis(500)), Duration::ZERO);
    }

    #[test]
    fn test_zero_interval_is_always_due() {
        let mut entry = entry(0);
        let now = Instant::now();
        entry.mark_run(now);
        assert!(entry.is_due(now));
    }

    #[test]
    fn test_interval_is_read_once() {
        let entry = entry(250);
        assert_eq!(entry.interval(), Duration::from_millis(250));
        assert!(entry.last_run().is_none());
    }

    #[test]
    fn test_next_wait_is_minimum() {
        let now = Instant::now();
        let mut slow = entry(100);
        let mut fast = entry(50);
        slow.mark_run(now);
        fast.mark_run(now);

        let entries = vec![slow, fast];
        let wait = next_wait(&entries, now + Duration::from_millis(10), Duration::from_secs(1));
        assert_eq!(wait, Duration::from_millis(40));
    }

    #[test]
    fn test_next_wait_zero_when_any_never_ran() {
        let now = Instant::now();
        let mut ran = entry(100);
        ran.mark_run(now);
        let entries = vec![ran, entry(100)];

        assert_eq!(next_wait(&entries, now, Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_next_wait_empty_uses_idle_wait() {
        let wait = next_wait(&[], Instant::now(), Duration::from_millis(1000));
        assert_eq!(wait, Duration::from_millis(1000));
    }
}

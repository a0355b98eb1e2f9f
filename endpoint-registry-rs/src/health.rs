//! Endpoint health transitions.
//!
//! Allowed moves are Healthy -> Degraded on a single availability failure,
//! Degraded -> Unreachable after `failure_threshold` consecutive failures, and
//! Unreachable -> Healthy on one success. Everything else keeps the current
//! state.

use orchestration_types::{FailureKind, HealthState};

/// Observed result of one request, as reported by the dispatch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Timeout,
    TransportError,
    /// Model-quality issue; never touches health
    MalformedOutput,
}

impl OutcomeKind {
    pub fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => OutcomeKind::Timeout,
            FailureKind::Unreachable => OutcomeKind::TransportError,
            FailureKind::MalformedOutput => OutcomeKind::MalformedOutput,
        }
    }

    fn is_availability_failure(&self) -> bool {
        matches!(self, OutcomeKind::Timeout | OutcomeKind::TransportError)
    }
}

/// Health state plus the consecutive-failure counter behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthTracker {
    state: HealthState,
    consecutive_failures: u32,
}

/// A state change produced by [`HealthTracker::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTransition {
    pub from: HealthState,
    pub to: HealthState,
}

impl HealthTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl HealthTracker {
    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn observe(&mut self, outcome: OutcomeKind, failure_threshold: u32) -> HealthTransition {
        let from = self.state;

        if outcome.is_availability_failure() {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            self.state = match self.state {
                HealthState::Healthy => HealthState::Degraded,
                HealthState::Degraded if self.consecutive_failures >= failure_threshold => {
                    HealthState::Unreachable
                }
                other => other,
            };
        } else if outcome == OutcomeKind::Success {
            self.consecutive_failures = 0;
            if self.state == HealthState::Unreachable {
                self.state = HealthState::Healthy;
            }
        }

        HealthTransition { from, to: self.state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_timeout_degrades_once() {
        let mut tracker = HealthTracker::default();
        let t = tracker.observe(OutcomeKind::Timeout, 3);
        assert_eq!(t, HealthTransition { from: HealthState::Healthy, to: HealthState::Degraded });
        assert_eq!(tracker.consecutive_failures(), 1);
    }

    #[test]
    fn test_consecutive_failures_reach_unreachable() {
        let mut tracker = HealthTracker::default();
        tracker.observe(OutcomeKind::Timeout, 3);
        assert_eq!(tracker.observe(OutcomeKind::TransportError, 3).to, HealthState::Degraded);
        let t = tracker.observe(OutcomeKind::Timeout, 3);
        assert_eq!(t, HealthTransition { from: HealthState::Degraded, to: HealthState::Unreachable });

        // stays put on further failures
        assert!(!tracker.observe(OutcomeKind::Timeout, 3).changed());
    }

    #[test]
    fn test_success_breaks_the_failure_streak() {
        let mut tracker = HealthTracker::default();
        tracker.observe(OutcomeKind::Timeout, 2);
        tracker.observe(OutcomeKind::Success, 2);
        assert_eq!(tracker.state(), HealthState::Degraded);
        assert_eq!(tracker.consecutive_failures(), 0);

        tracker.observe(OutcomeKind::Timeout, 2);
        assert_eq!(tracker.state(), HealthState::Degraded);
        tracker.observe(OutcomeKind::Timeout, 2);
        assert_eq!(tracker.state(), HealthState::Unreachable);
    }

    #[test]
    fn test_unreachable_recovers_on_one_success() {
        let mut tracker = HealthTracker::default();
        for _ in 0..3 {
            tracker.observe(OutcomeKind::TransportError, 3);
        }
        assert_eq!(tracker.state(), HealthState::Unreachable);

        let t = tracker.observe(OutcomeKind::Success, 3);
        assert_eq!(t, HealthTransition { from: HealthState::Unreachable, to: HealthState::Healthy });
    }

    #[test]
    fn test_malformed_output_is_ignored() {
        let mut tracker = HealthTracker::default();
        tracker.observe(OutcomeKind::Timeout, 3);
        let before = tracker;
        let t = tracker.observe(OutcomeKind::MalformedOutput, 3);
        assert!(!t.changed());
        assert_eq!(tracker, before);
    }

    #[test]
    fn test_from_failure_mapping() {
        assert_eq!(OutcomeKind::from_failure(FailureKind::Timeout), OutcomeKind::Timeout);
        assert_eq!(OutcomeKind::from_failure(FailureKind::Unreachable), OutcomeKind::TransportError);
        assert_eq!(
            OutcomeKind::from_failure(FailureKind::MalformedOutput),
            OutcomeKind::MalformedOutput
        );
    }
}

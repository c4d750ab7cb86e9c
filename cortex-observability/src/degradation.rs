//! Tracks which embedding provider tier is actually serving requests and
//! for how long, so a prolonged fall-back to the deterministic hash
//! embedder surfaces as a visible degradation rather than a silent
//! accuracy regression.
//!
//! A ring of recent `TrackedDegradation` entries plus a "currently
//! degraded since" marker, tracking transitions across the
//! primary/cloud_fallback/hash_fallback embedding tiers.

use std::collections::VecDeque;

const MAX_TRACKED: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    CloudFallback,
    HashFallback,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::CloudFallback => "cloud_fallback",
            Tier::HashFallback => "hash_fallback",
        }
    }

    fn is_degraded(&self) -> bool {
        !matches!(self, Tier::Primary)
    }
}

#[derive(Debug, Clone)]
pub struct TrackedDegradation {
    pub tier: Tier,
    pub started_at: f64,
    pub ended_at: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStatus {
    /// Currently on the primary provider.
    Nominal,
    /// Currently degraded, ongoing.
    Degraded,
    /// Was degraded, has since recovered.
    Recovered,
}

/// Not thread-safe by itself; callers wrap it in a `Mutex` alongside the
/// rest of the process's observability state, matching how
/// `MetricsRegistry` expects to be shared.
#[derive(Debug, Default)]
pub struct DegradationTracker {
    history: VecDeque<TrackedDegradation>,
    current: Option<TrackedDegradation>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observed tier at time `now`. Opens a new degradation
    /// window on transition into a non-primary tier, closes one on
    /// transition back to primary.
    pub fn observe(&mut self, tier: Tier, now: f64) {
        match (&mut self.current, tier.is_degraded()) {
            (None, true) => {
                self.current = Some(TrackedDegradation { tier, started_at: now, ended_at: None });
            }
            (Some(open), true) if open.tier != tier => {
                open.ended_at = Some(now);
                let closed = self.current.take().unwrap();
                self.push_history(closed);
                self.current = Some(TrackedDegradation { tier, started_at: now, ended_at: None });
            }
            (Some(_), false) => {
                let mut closed = self.current.take().unwrap();
                closed.ended_at = Some(now);
                self.push_history(closed);
            }
            _ => {}
        }
    }

    fn push_history(&mut self, entry: TrackedDegradation) {
        if self.history.len() >= MAX_TRACKED {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    pub fn status(&self) -> RecoveryStatus {
        if self.current.is_some() {
            RecoveryStatus::Degraded
        } else if self.history.is_empty() {
            RecoveryStatus::Nominal
        } else {
            RecoveryStatus::Recovered
        }
    }

    /// Seconds spent in the current degradation window, `0.0` if nominal.
    pub fn degraded_duration(&self, now: f64) -> f64 {
        self.current.as_ref().map(|d| (now - d.started_at).max(0.0)).unwrap_or(0.0)
    }

    /// Count of degradation windows (open or closed) that started within
    /// `window_secs` of `now`.
    pub fn count_recent(&self, now: f64, window_secs: f64) -> usize {
        let cutoff = now - window_secs;
        let closed = self.history.iter().filter(|d| d.started_at >= cutoff).count();
        let open = self.current.as_ref().filter(|d| d.started_at >= cutoff).map_or(0, |_| 1);
        closed + open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_nominal() {
        let t = DegradationTracker::new();
        assert_eq!(t.status(), RecoveryStatus::Nominal);
    }

    #[test]
    fn falling_back_opens_a_degradation_window() {
        let mut t = DegradationTracker::new();
        t.observe(Tier::HashFallback, 100.0);
        assert_eq!(t.status(), RecoveryStatus::Degraded);
        assert_eq!(t.degraded_duration(110.0), 10.0);
    }

    #[test]
    fn recovering_to_primary_closes_the_window() {
        let mut t = DegradationTracker::new();
        t.observe(Tier::HashFallback, 100.0);
        t.observe(Tier::Primary, 120.0);
        assert_eq!(t.status(), RecoveryStatus::Recovered);
        assert_eq!(t.degraded_duration(200.0), 0.0);
    }

    #[test]
    fn switching_between_fallback_tiers_reopens_a_window() {
        let mut t = DegradationTracker::new();
        t.observe(Tier::CloudFallback, 0.0);
        t.observe(Tier::HashFallback, 50.0);
        assert_eq!(t.status(), RecoveryStatus::Degraded);
        assert_eq!(t.count_recent(50.0, 1000.0), 2);
    }

    #[test]
    fn staying_on_primary_never_opens_a_window() {
        let mut t = DegradationTracker::new();
        t.observe(Tier::Primary, 0.0);
        t.observe(Tier::Primary, 10.0);
        assert_eq!(t.status(), RecoveryStatus::Nominal);
        assert_eq!(t.count_recent(10.0, 1000.0), 0);
    }
}

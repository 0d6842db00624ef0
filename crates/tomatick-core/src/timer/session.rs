use serde::{Deserialize, Serialize};
use tracing::info;

/// Length of a work session in seconds.
pub const WORK_SECS: u64 = 25 * 60;
/// Length of a short break in seconds.
pub const SHORT_BREAK_SECS: u64 = 5 * 60;
/// Length of a long break in seconds.
pub const LONG_BREAK_SECS: u64 = 20 * 60;

/// Every eighth repetition is a long break (four work sessions per cycle).
pub const REPETITIONS_PER_CYCLE: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    /// Classify a repetition counter value.
    ///
    /// The multiple-of-8 check runs before the even check, so 8, 16, 24, ...
    /// are long breaks even though they are also even. Zero is never produced
    /// by [`SessionScheduler::start`] and classifies as a short break.
    pub fn for_repetition(repetition: u64) -> Self {
        if repetition != 0 && repetition % REPETITIONS_PER_CYCLE == 0 {
            SessionKind::LongBreak
        } else if repetition % 2 == 0 {
            SessionKind::ShortBreak
        } else {
            SessionKind::Work
        }
    }

    pub fn duration_secs(self) -> u64 {
        match self {
            SessionKind::Work => WORK_SECS,
            SessionKind::ShortBreak => SHORT_BREAK_SECS,
            SessionKind::LongBreak => LONG_BREAK_SECS,
        }
    }

    /// Title shown above the clock while this session runs.
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Working",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }

    /// Accent colour of the title, as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            SessionKind::Work => "#9bdeac",
            SessionKind::ShortBreak => "#e2979c",
            SessionKind::LongBreak => "#e7305b",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scheduled interval: the repetition that produced it and its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub repetition: u64,
    pub kind: SessionKind,
    pub duration_secs: u64,
}

impl Session {
    fn for_repetition(repetition: u64) -> Self {
        let kind = SessionKind::for_repetition(repetition);
        Self {
            repetition,
            kind,
            duration_secs: kind.duration_secs(),
        }
    }
}

/// Decides which session comes next.
///
/// Owns the repetition counter. The counter only moves forward, except for
/// [`reset`](Self::reset) which returns it to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScheduler {
    repetitions: u64,
}

impl SessionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn repetitions(&self) -> u64 {
        self.repetitions
    }

    /// Work sessions fully behind us: one per work+break pair.
    pub fn completed_work_sessions(&self) -> u64 {
        self.repetitions / 2
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the counter and return the session it selects.
    pub fn start(&mut self) -> Session {
        self.repetitions = self.repetitions.saturating_add(1);
        let session = Session::for_repetition(self.repetitions);
        info!(
            repetition = session.repetition,
            kind = %session.kind,
            duration_secs = session.duration_secs,
            "session scheduled"
        );
        session
    }

    /// Zero the counter. Any running countdown must be cancelled by the caller.
    pub fn reset(&mut self) {
        info!(repetitions = self.repetitions, "scheduler reset");
        self.repetitions = 0;
    }
}

/// The first `count` sessions of a fresh cycle.
pub fn plan(count: usize) -> Vec<Session> {
    (1..=count as u64).map(Session::for_repetition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn eight_starts_make_one_cycle() {
        let mut scheduler = SessionScheduler::new();
        let kinds: Vec<_> = (0..8).map(|_| scheduler.start().kind).collect();
        assert_eq!(
            kinds,
            vec![
                SessionKind::Work,
                SessionKind::ShortBreak,
                SessionKind::Work,
                SessionKind::ShortBreak,
                SessionKind::Work,
                SessionKind::ShortBreak,
                SessionKind::Work,
                SessionKind::LongBreak,
            ]
        );
    }

    #[test]
    fn reset_returns_to_first_session() {
        let mut fresh = SessionScheduler::new();
        let first = fresh.start();

        let mut scheduler = SessionScheduler::new();
        for _ in 0..5 {
            scheduler.start();
        }
        scheduler.reset();
        assert_eq!(scheduler.repetitions(), 0);
        assert_eq!(scheduler.start(), first);
        assert_eq!(first.kind, SessionKind::Work);
        assert_eq!(first.repetition, 1);
    }

    #[test]
    fn durations_are_fixed_per_kind() {
        assert_eq!(SessionKind::Work.duration_secs(), 1500);
        assert_eq!(SessionKind::ShortBreak.duration_secs(), 300);
        assert_eq!(SessionKind::LongBreak.duration_secs(), 1200);
    }

    #[test]
    fn sixteenth_repetition_is_long_break() {
        assert_eq!(SessionKind::for_repetition(16), SessionKind::LongBreak);
        assert_eq!(SessionKind::for_repetition(24), SessionKind::LongBreak);
        assert_eq!(SessionKind::for_repetition(18), SessionKind::ShortBreak);
    }

    #[test]
    fn completed_work_sessions_is_half_the_counter() {
        let mut scheduler = SessionScheduler::new();
        for _ in 0..5 {
            scheduler.start();
        }
        assert_eq!(scheduler.completed_work_sessions(), 2);
    }

    #[test]
    fn plan_matches_scheduler() {
        let mut scheduler = SessionScheduler::new();
        let started: Vec<_> = (0..10).map(|_| scheduler.start()).collect();
        assert_eq!(plan(10), started);
        assert!(plan(0).is_empty());
    }

    #[test]
    fn session_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SessionKind::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");
    }

    proptest! {
        #[test]
        fn classification_follows_counter(n in 1u64..1_000_000) {
            let expected = if n % 8 == 0 {
                SessionKind::LongBreak
            } else if n % 2 == 0 {
                SessionKind::ShortBreak
            } else {
                SessionKind::Work
            };
            prop_assert_eq!(SessionKind::for_repetition(n), expected);
        }
    }
}

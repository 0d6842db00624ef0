use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Every state change of the controller produces an Event.
/// Front-ends render from the event stream alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        repetition: u64,
        kind: SessionKind,
        duration_secs: u64,
        /// Tally after this start: `repetition / 2`.
        completed_work_sessions: u64,
        at: DateTime<Utc>,
    },
    Tick {
        repetition: u64,
        kind: SessionKind,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        repetition: u64,
        kind: SessionKind,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
}

//! Text shown by front-ends: the clock, the title and the tally of
//! completed work sessions.

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Clock text before the first start and after a reset.
pub const IDLE_DISPLAY: &str = "00:00";
/// Title text before the first start and after a reset.
pub const IDLE_TITLE: &str = "Timer";
/// Title colour while idle.
pub const IDLE_COLOR: &str = "#9bdeac";
/// Mark drawn once per completed work session.
pub const DEFAULT_TALLY_MARK: &str = "✔";

/// `M:SS`, minutes unpadded: 65 -> "1:05", 600 -> "10:00".
pub fn format_remaining(remaining_secs: u64) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// One `mark` per completed work session.
pub fn tally(mark: &str, count: u64) -> String {
    mark.repeat(count as usize)
}

/// Everything a front-end draws, folded from the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub title: String,
    pub color: String,
    pub clock: String,
    pub completed_work_sessions: u64,
}

impl Default for View {
    fn default() -> Self {
        Self::idle()
    }
}

impl View {
    pub fn idle() -> Self {
        Self {
            title: IDLE_TITLE.into(),
            color: IDLE_COLOR.into(),
            clock: IDLE_DISPLAY.into(),
            completed_work_sessions: 0,
        }
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::SessionStarted {
                kind,
                completed_work_sessions,
                ..
            } => {
                self.title = kind.label().into();
                self.color = kind.color().into();
                self.completed_work_sessions = *completed_work_sessions;
            }
            Event::Tick { remaining_secs, .. } => {
                self.clock = format_remaining(*remaining_secs);
            }
            Event::SessionCompleted { .. } => {}
            Event::TimerReset { .. } => *self = Self::idle(),
        }
    }

    pub fn tally(&self, mark: &str) -> String {
        tally(mark, self.completed_work_sessions)
    }
}

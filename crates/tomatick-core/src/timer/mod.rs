mod countdown;
mod session;

pub use countdown::{CountdownDriver, CountdownState, TimerHandle, TICK_PERIOD};
pub use session::{
    plan, Session, SessionKind, SessionScheduler, LONG_BREAK_SECS, REPETITIONS_PER_CYCLE,
    SHORT_BREAK_SECS, WORK_SECS,
};

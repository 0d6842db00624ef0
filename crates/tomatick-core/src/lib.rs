//! # Tomatick Core Library
//!
//! Core logic of the Tomatick Pomodoro timer: which session comes next, how
//! long it lasts, and the once-per-second countdown that drives it. The
//! `tomatick` binary is a thin terminal front-end over this crate.
//!
//! ## Architecture
//!
//! - **Session Scheduler**: a repetition counter mapped to Work, Short Break
//!   and Long Break sessions of fixed length
//! - **Countdown Driver**: a cancellable tick loop on the tokio timer
//! - **Controller**: the event loop that chains sessions and answers
//!   Start/Reset commands, publishing [`Event`]s
//! - **Display**: clock and tally text derived from events
//!
//! ## Key Components
//!
//! - [`SessionScheduler`]: repetition counter and classification
//! - [`CountdownDriver`]: tick loop with [`TimerHandle`] cancellation
//! - [`Controller`]: orchestration loop
//! - [`Config`]: display and logging preferences

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod events;
pub mod timer;

pub use config::Config;
pub use controller::{Command, Controller};
pub use display::{format_remaining, tally, View};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use timer::{
    CountdownDriver, CountdownState, Session, SessionKind, SessionScheduler, TimerHandle,
};

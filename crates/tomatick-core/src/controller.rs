//! Session controller.
//!
//! Wires user commands to the scheduler and the countdown driver. The
//! completion of one countdown starts the next session from the controller
//! loop itself, so a long-running cycle never nests callbacks.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::Result;
use crate::events::Event;
use crate::timer::{CountdownDriver, Session, SessionScheduler, TimerHandle};

/// Requests a front-end can send to a running [`Controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the next session. Ignored while a countdown runs.
    Start,
    /// Cancel the countdown and zero the repetition counter.
    Reset,
    /// Cancel the countdown and return from [`Controller::run`].
    Shutdown,
}

/// Reports from countdown tasks, tagged with the generation that began them.
#[derive(Debug)]
enum Signal {
    Tick { generation: u64, remaining: u64 },
    Complete { generation: u64 },
}

struct Active {
    generation: u64,
    session: Session,
    handle: TimerHandle,
}

struct State {
    scheduler: SessionScheduler,
    driver: CountdownDriver,
    active: Option<Active>,
    generation: u64,
    events: mpsc::UnboundedSender<Event>,
    signals: mpsc::UnboundedSender<Signal>,
}

pub struct Controller {
    state: State,
    signals: mpsc::UnboundedReceiver<Signal>,
}

impl Controller {
    /// Controller with a one-second countdown.
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self::with_driver(CountdownDriver::new(), events)
    }

    pub fn with_driver(driver: CountdownDriver, events: mpsc::UnboundedSender<Event>) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self {
            state: State {
                scheduler: SessionScheduler::new(),
                driver,
                active: None,
                generation: 0,
                events,
                signals: signal_tx,
            },
            signals: signal_rx,
        }
    }

    /// Process commands until `Shutdown` or until every sender is dropped.
    pub async fn run(self, mut commands: mpsc::Receiver<Command>) -> Result<()> {
        let Controller {
            mut state,
            mut signals,
        } = self;

        loop {
            // Pending countdown signals go before the next command, so a
            // command always sees the ticks that preceded it.
            tokio::select! {
                biased;
                Some(signal) = signals.recv() => state.handle_signal(signal),
                command = commands.recv() => match command {
                    Some(Command::Start) => state.start(),
                    Some(Command::Reset) => state.reset(),
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        state.cancel_active();
        info!(
            repetitions = state.scheduler.repetitions(),
            "controller stopped"
        );
        Ok(())
    }
}

impl State {
    fn start(&mut self) {
        if self.active.is_some() {
            debug!("start ignored: a session is already running");
            return;
        }
        self.begin_next();
    }

    fn reset(&mut self) {
        self.cancel_active();
        self.scheduler.reset();
        self.emit(Event::TimerReset { at: Utc::now() });
    }

    fn begin_next(&mut self) {
        let session = self.scheduler.start();
        self.generation += 1;
        let generation = self.generation;

        self.emit(Event::SessionStarted {
            repetition: session.repetition,
            kind: session.kind,
            duration_secs: session.duration_secs,
            completed_work_sessions: self.scheduler.completed_work_sessions(),
            at: Utc::now(),
        });

        let ticks = self.signals.clone();
        let done = self.signals.clone();
        let handle = self.driver.begin(
            session.duration_secs,
            move |remaining| {
                let _ = ticks.send(Signal::Tick {
                    generation,
                    remaining,
                });
            },
            move || {
                let _ = done.send(Signal::Complete { generation });
            },
        );

        self.active = Some(Active {
            generation,
            session,
            handle,
        });
    }

    fn handle_signal(&mut self, signal: Signal) {
        let generation = match signal {
            Signal::Tick { generation, .. } | Signal::Complete { generation } => generation,
        };
        let session = match &self.active {
            Some(active) if active.generation == generation => active.session,
            _ => {
                debug!(generation, "dropping signal from a stale countdown");
                return;
            }
        };

        match signal {
            Signal::Tick { remaining, .. } => self.emit(Event::Tick {
                repetition: session.repetition,
                kind: session.kind,
                remaining_secs: remaining,
                at: Utc::now(),
            }),
            Signal::Complete { .. } => {
                self.active = None;
                info!(
                    repetition = session.repetition,
                    kind = %session.kind,
                    "session completed"
                );
                self.emit(Event::SessionCompleted {
                    repetition: session.repetition,
                    kind: session.kind,
                    at: Utc::now(),
                });
                self.begin_next();
            }
        }
    }

    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.driver.cancel(&active.handle);
        }
    }

    fn emit(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

use std::io::Write;

use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tomatick_core::config::DisplayConfig;
use tomatick_core::{Command, Config, Controller, Event, View};
use tracing::warn;

/// Width the status line is padded to, so a shorter line hides a longer one.
const STATUS_WIDTH: usize = 40;

#[derive(Args)]
pub struct RunArgs {
    /// Press Start right away
    #[arg(long)]
    start: bool,
    /// Print events as JSON lines instead of the status line
    #[arg(long)]
    json: bool,
}

/// A line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Control(Command),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(Input::Control(Command::Start)),
        "r" | "reset" => Some(Input::Control(Command::Reset)),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Draws the widget: one status line, or one JSON object per event.
struct Renderer {
    json: bool,
    display: DisplayConfig,
    view: View,
}

impl Renderer {
    fn new(json: bool, display: DisplayConfig) -> Self {
        Self {
            json,
            display,
            view: View::idle(),
        }
    }

    fn status_line(&self) -> String {
        let title = match hex_rgb(&self.view.color) {
            Some((r, g, b)) if self.display.color => {
                self.view.title.truecolor(r, g, b).bold().to_string()
            }
            _ => self.view.title.clone(),
        };
        let tally = self.view.tally(&self.display.tally_mark);
        let line = format!("{title}  {}  {tally}", self.view.clock);
        // Pad on the visible width; colour codes take no columns.
        let visible = self.view.title.chars().count()
            + 4
            + self.view.clock.chars().count()
            + tally.chars().count();
        format!("{line}{}", " ".repeat(STATUS_WIDTH.saturating_sub(visible)))
    }

    fn intro(&self) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        println!("[s]tart  [r]eset  [q]uit");
        self.draw()
    }

    fn render(&mut self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        self.view.apply(event);
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }
        self.draw()?;
        Ok(())
    }

    fn draw(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "\r{}", self.status_line())?;
        stdout.flush()
    }

    fn finish(&self) {
        if !self.json {
            println!();
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(widget(args, config));
    // The stdin reader sits on a blocking thread until the next line; don't wait for it.
    runtime.shutdown_background();
    result
}

async fn widget(args: RunArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel(8);
    let controller = tokio::spawn(Controller::new(event_tx).run(command_rx));

    let mut renderer = Renderer::new(args.json, config.display);
    renderer.intro()?;
    if args.start {
        commands.send(Command::Start).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_input(&line) {
                    Some(Input::Control(command)) => commands.send(command).await?,
                    Some(Input::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => warn!(input = %line.trim(), "unknown command"),
                },
                None => break,
            },
            Some(event) = events.recv() => renderer.render(&event)?,
            _ = &mut ctrl_c => break,
        }
    }

    // Commands are handled in order, so everything sent before Shutdown
    // has produced its events by the time the controller returns.
    let _ = commands.send(Command::Shutdown).await;
    controller.await??;
    while let Ok(event) = events.try_recv() {
        renderer.render(&event)?;
    }
    renderer.finish();
    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, ConsoleError, ConsoleSession, RenderMode};
use shared::domain::{LineStyle, ResultEntry};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::MissedTickBehavior,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod input;

use input::ConsoleInput;

#[derive(Parser, Debug)]
struct Args {
    /// Server base url; overrides console.toml and the environment.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,
    /// Submit a single command, print what the server produced, and exit.
    #[arg(long)]
    once: Option<String>,
}

/// Prints render-mode banners only when the mode changes.
struct ModeBanner {
    last: RenderMode,
}

impl ModeBanner {
    fn show(&mut self, mode: RenderMode) {
        if mode == self.last {
            return;
        }
        self.last = mode;
        if let RenderMode::Unreachable | RenderMode::ServerError { .. } = mode {
            if let Some(banner) = mode.banner() {
                eprintln!("[{banner}]");
            }
        }
    }
}

fn print_entries(entries: &[ResultEntry]) {
    for (style, value) in client_core::console::rendered_lines(entries) {
        let prefix = match style {
            LineStyle::Input => "> ",
            LineStyle::Error => "error: ",
            LineStyle::Warn => "warning: ",
            LineStyle::Plain => "",
        };
        println!("{prefix}{value}");
    }
}

async fn poll(session: &mut ConsoleSession, banner: &mut ModeBanner) {
    match session.update().await {
        Ok(entries) => print_entries(&entries),
        Err(ConsoleError::Request(error)) => debug!(%error, "poll failed"),
        Err(error) => eprintln!("[{error}]"),
    }
    banner.show(session.chamber_mode());
}

async fn submit(session: &mut ConsoleSession, command: &str, banner: &mut ModeBanner) {
    match session.execute(command).await {
        Ok(_) => {}
        Err(ConsoleError::Request(error)) => debug!(%error, command, "submission failed"),
        Err(error) => eprintln!("[{error}]"),
    }
    banner.show(session.message_mode());
    poll(session, banner).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = load_settings(args.base_url.as_deref()).context("failed to resolve settings")?;
    let mut session = ConsoleSession::connect(config).context("failed to start console")?;
    let mut banner = ModeBanner {
        last: RenderMode::Ready,
    };

    if let Some(command) = args.once {
        submit(&mut session, &command, &mut banner).await;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match ConsoleInput::parse(&line) {
                    ConsoleInput::Quit => break,
                    ConsoleInput::Empty => {}
                    ConsoleInput::Clear => session.clear(),
                    ConsoleInput::History => {
                        for (index, command) in session.history().iter().enumerate() {
                            println!("{:>4}  {command}", index + 1);
                        }
                    }
                    ConsoleInput::RepeatLast => match session.recall_last().map(str::to_string) {
                        Some(command) => submit(&mut session, &command, &mut banner).await,
                        None => eprintln!("[history is empty]"),
                    },
                    ConsoleInput::Command(command) => {
                        submit(&mut session, command, &mut banner).await;
                    }
                }
            }
            _ = ticker.tick() => poll(&mut session, &mut banner).await,
        }
    }

    info!(submitted = session.history().len(), "console closed");
    Ok(())
}

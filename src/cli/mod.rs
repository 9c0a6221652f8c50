//! # CLI Module
//!
//! Command-line demonstration of scoped event channels.
//!
//! ## Usage
//! ```bash
//! # Mount a modal host and a button, then click the button
//! tiny-events demo --modal-id settings
//!
//! # Click three times and print the result as JSON
//! tiny-events demo --clicks 3 --output json
//!
//! # List the demo registry's channels
//! tiny-events inspect
//! ```

mod modal;

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use serde::Serialize;
use tiny_events::error::{EventError, Result};
use tiny_events::events::{ChannelInfo, DispatchReport};
use tiny_events::create_event_manager;

use modal::{ModalEvents, ModalHost, OpenModal, OpenModalButton};

/// Tiny Events - typed channels behind scoped registries
#[derive(Parser, Debug)]
#[command(name = "tiny-events")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the modal example: a button opens a modal through a shared channel
    Demo {
        /// Modal the button asks for
        #[arg(short, long, default_value = "my-modal")]
        modal_id: String,

        /// How many times the button is clicked
        #[arg(short, long, default_value = "1")]
        clicks: u32,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Log channel activity to stderr
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the channels of the modal registry
    Inspect {
        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    received: Vec<OpenModal>,
    dispatches: Vec<DispatchReport>,
    channels: Vec<ChannelInfo>,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            modal_id,
            clicks,
            output,
            verbose,
        } => {
            if verbose {
                tiny_events::init_verbose_tracing();
            }
            let report = demo(&modal_id, clicks)?;
            match output {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Pretty => {
                    print_demo(&report);
                    Ok(())
                }
            }
        }
        Commands::Inspect { output } => {
            let channels = inspect()?;
            match output {
                OutputFormat::Json => print_json(&channels),
                OutputFormat::Pretty => {
                    print_channels(&channels);
                    Ok(())
                }
            }
        }
    }
}

/// Mount a modal host and a button, click `clicks` times, then close
fn demo(modal_id: &str, clicks: u32) -> Result<DemoReport> {
    let manager = create_event_manager(ModalEvents::new());
    let _scope = manager.provider();

    let host = ModalHost::mount(&manager)?;
    let button = OpenModalButton::mount(&manager)?;

    let dispatches = (0..clicks).map(|_| button.click(modal_id)).collect();
    manager.events()?.on_close_modal.notify();

    Ok(DemoReport {
        received: host.shown(),
        dispatches,
        channels: manager.events()?.describe(),
    })
}

/// Channels of the modal registry while a host is mounted
fn inspect() -> Result<Vec<ChannelInfo>> {
    let manager = create_event_manager(ModalEvents::new());
    let _scope = manager.provider();
    let _host = ModalHost::mount(&manager)?;

    Ok(manager.events()?.describe())
}

fn print_demo(report: &DemoReport) {
    let term = Term::stdout();
    term.write_line(&format!(
        "{} {}",
        style("Tiny Events").bold().cyan(),
        style("modal demo").dim()
    ))
    .ok();
    term.write_line("").ok();
    for (event, dispatch) in report.received.iter().zip(&report.dispatches) {
        term.write_line(&format!(
            "  {} opened {} ({} listener{})",
            style("✓").green(),
            style(&event.modal_id).bold(),
            dispatch.delivered,
            if dispatch.delivered == 1 { "" } else { "s" }
        ))
        .ok();
    }
    if report.received.is_empty() {
        term.write_line(&format!("  {}", style("Nothing was opened").yellow()))
            .ok();
    }
}

fn print_channels(channels: &[ChannelInfo]) {
    let term = Term::stdout();
    for channel in channels {
        term.write_line(&format!(
            "{:<16} {} listener(s), {} pending once",
            style(&channel.name).bold(),
            channel.listeners,
            channel.once_listeners
        ))
        .ok();
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| EventError::Config(e.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

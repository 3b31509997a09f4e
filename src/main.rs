//! stlvr - part tree viewer with a VR render coordinator
//!
//! Reads control commands from stdin while the VR view runs on its own thread.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stlvr::input::{parse_line, ControlAction, HELP};
use stlvr::render::{CoordinatorEvent, HeadlessFactory};
use stlvr::{Application, ViewerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::block_in_place;

#[derive(Debug, Parser)]
#[command(name = "stlvr", version = stlvr::VERSION)]
#[command(about = "View a tree of STL parts on screen and in VR")]
struct Cli {
    /// STL files to load at startup
    files: Vec<PathBuf>,

    /// Configuration file (defaults to <config dir>/stlvr/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum milliseconds between animation ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Start the VR view immediately
    #[arg(long)]
    vr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG controls verbosity)
    env_logger::init();

    let cli = Cli::parse();
    let mut config =
        ViewerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(ms) = cli.tick_ms {
        config.tick_interval_ms = ms;
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let factory = Arc::new(HeadlessFactory::new(config.event_poll()));
    let mut app = Application::new(config, factory).with_events(event_tx);

    for file in &cli.files {
        if let Err(e) = app.load_part(file, None) {
            eprintln!("{}", e);
        }
    }

    if cli.vr {
        if let Err(e) = block_in_place(|| app.start_vr()) {
            eprintln!("VR view unavailable: {}", e);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if !execute(&mut app, parse_line(&line)) {
                    break;
                }
            }
            Some(event) = event_rx.recv() => match event {
                CoordinatorEvent::Started => println!("VR view running"),
                CoordinatorEvent::Stopped { ticks } => {
                    println!("VR view stopped after {} animation ticks", ticks)
                }
                CoordinatorEvent::Failed(message) => eprintln!("VR view failed: {}", message),
            },
        }
    }

    block_in_place(|| app.stop_vr()).context("failed to stop VR view")?;
    Ok(())
}

/// Execute one control action - returns false if should quit
fn execute(app: &mut Application, action: ControlAction) -> bool {
    let outcome = match action {
        ControlAction::Quit => return false,
        ControlAction::NoAction => Ok(()),
        ControlAction::Help => {
            println!("{}", HELP);
            Ok(())
        }
        ControlAction::InvalidInput(input) => {
            eprintln!("unrecognised command: {} (try `help`)", input);
            Ok(())
        }
        ControlAction::Load(path) => app.load_part(&path, None).map(|_| ()),
        ControlAction::StartVr => block_in_place(|| app.start_vr()),
        ControlAction::StopVr => block_in_place(|| app.stop_vr()).map(|_| ()),
        ControlAction::Rotate { axis, degrees } => {
            app.rotate(axis, degrees);
            Ok(())
        }
        ControlAction::SetVisible { row, visible } => match app.part_at_row(row) {
            Some(node) => app.set_visible(node, visible),
            None => {
                eprintln!("no part at row {}", row);
                Ok(())
            }
        },
        ControlAction::SetColour { row, colour } => match app.part_at_row(row) {
            Some(node) => app.set_colour(node, colour),
            None => {
                eprintln!("no part at row {}", row);
                Ok(())
            }
        },
        ControlAction::ShowTree => {
            print!("{}", app.render_tree());
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
    }
    true
}

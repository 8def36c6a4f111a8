mod demo;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use demo::Demo;

#[derive(Parser)]
#[command(name = "busyline-demo")]
#[command(about = "Walk through the busyline spinner features")]
#[command(version)]
struct Cli {
    /// Which part of the demo to run
    #[arg(long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Seconds each step keeps spinning
    #[arg(long, default_value_t = 2)]
    pause: u64,

    /// Milliseconds between frames
    #[arg(long)]
    speed: Option<u64>,

    /// Comma-separated glyphs to animate with
    #[arg(long, value_delimiter = ',')]
    frames: Vec<String>,

    /// Log file (defaults to the user cache directory)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    All,
    Outcomes,
    Reuse,
    Frames,
    Speed,
    Messages,
    Misuse,
    Interrupt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = cli
        .log
        .clone()
        .or_else(logging::default_log_path)
        .and_then(|path| logging::init(&path, cli.verbose).ok());

    let demo = Demo {
        pause: Duration::from_secs(cli.pause),
        speed: cli.speed.map(Duration::from_millis),
        frames: cli.frames,
    };
    tracing::info!("demo starting");
    demo.run(cli.scenario)
}

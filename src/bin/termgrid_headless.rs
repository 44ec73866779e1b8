//! Termgrid Headless Runner
//!
//! Feeds a byte stream from a file or stdin through the engine and prints
//! the resulting screen as text or as a JSON snapshot. Used for testing,
//! golden files and automation.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use termgrid::{EngineConfig, Terminal};

/// Run terminal output through the emulation engine without a display
#[derive(Parser, Debug)]
#[command(name = "termgrid-headless", version, about)]
struct CliArgs {
    /// Input file (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Engine config file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Terminal height
    #[arg(short, long, value_name = "ROWS")]
    rows: Option<usize>,

    /// Terminal width
    #[arg(short = 'C', long, value_name = "COLS")]
    cols: Option<usize>,

    /// Number of scrollback lines
    #[arg(long, value_name = "LINES")]
    scrollback: Option<usize>,

    /// Feed the input in chunks of this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = 4096)]
    chunk_size: usize,

    /// View this many lines back into scrollback
    #[arg(long, value_name = "LINES", default_value_t = 0)]
    scroll_offset: usize,

    /// Print the snapshot as JSON instead of text
    #[arg(short, long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("termgrid-headless: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.cols = cols;
    }
    if let Some(lines) = args.scrollback {
        config.scrollback_lines = lines;
    }

    let input = read_input(args.input.as_ref())?;
    debug!(bytes = input.len(), rows = config.rows, cols = config.cols, "running");

    let mut terminal = Terminal::with_config(&config);
    for chunk in input.chunks(args.chunk_size.max(1)) {
        terminal.feed(chunk);
    }

    let snapshot = terminal.snapshot(args.scroll_offset);
    let rendered = if args.json {
        let mut json = snapshot.to_json()?;
        json.push('\n');
        json
    } else {
        snapshot.to_text()
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path),
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

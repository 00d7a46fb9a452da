use std::path::PathBuf;

use clap::Parser;

/// Watch game controllers come and go.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// YAML file with driver settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How often inputs are polled, in milliseconds
    #[arg(long, default_value_t = 16)]
    pub interval_ms: u64,

    /// Pulse both motors once when a controller connects
    #[arg(long)]
    pub rumble_test: bool,
}

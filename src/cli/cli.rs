use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Manage a shared tree of folders, uploaded files and web links.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory holding hub.yaml; relative upload paths resolve against it
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Read commands from this file instead of stdin
    #[clap(long, short)]
    pub script: Option<PathBuf>,

    /// Start with an empty tree instead of the demo dataset
    #[clap(long)]
    pub no_seed: bool,
}

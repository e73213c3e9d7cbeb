//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for denkeeper
#[derive(Parser, Debug)]
#[command(name = "denkeeper")]
#[command(author, version, about = "Reaction-gated workflows for a community den")]
#[command(long_about = r#"
denkeeper runs the proposal and review workflows of a community bot.

Commands are read line by line from stdin, standing in for chat events:
proposals wait for a reaction, submissions ask their questions over DM and
wait for a moderator's decision.

Configuration files are loaded from (in priority order):
1. DENKEEPER_<SECTION>__<FIELD>    Environment variables
2. --config <path>                 Explicit config file
3. ./denkeeper.toml                Project-level config
4. ~/.config/denkeeper/config.toml Global config

Example:
  denkeeper -v
  echo "grant @1 adult" | denkeeper --no-config
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append committed decisions to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Don't print the command help on startup
    #[arg(short, long)]
    pub quiet: bool,
}

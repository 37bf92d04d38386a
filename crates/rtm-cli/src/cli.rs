use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rtm_versioning::EntityKey;

#[derive(Parser)]
#[command(
    name = "rtm",
    about = "RTM redline: version history and redlines for requirements and test cases",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Version log file (overrides the config's `log_path`)
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record the full field state of an entity as its next version
    Record(RecordArgs),
    /// Show field changes between two versions
    Redline(RedlineArgs),
    /// List the versions of an entity
    History(HistoryArgs),
    /// Check version histories for gaps and inconsistencies
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct RecordArgs {
    /// Entity key, e.g. REQ-12 or TC-4
    pub key: EntityKey,
    /// JSON file with the entity's fields ("-" for stdin)
    #[arg(short, long)]
    pub fields: PathBuf,
    /// User making the edit
    #[arg(short, long)]
    pub user: String,
}

#[derive(Args)]
pub struct RedlineArgs {
    pub key: EntityKey,
    /// Old version; defaults to the version before the latest
    pub from: Option<u32>,
    /// New version; defaults to the latest
    pub to: Option<u32>,
    /// Show word-level changes inside modified fields
    #[arg(long)]
    pub inline: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    pub key: EntityKey,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Entity to verify; all entities when omitted
    pub key: Option<EntityKey>,
}

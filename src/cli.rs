//! CLI argument parsing.
//!
//! The CLI is thin: it collects paths and flags and hands them to the
//! workflow, which owns every decision.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "enumsync",
    version,
    about = "Synchronize generated enumeration blocks with a specification table",
    after_help = "Examples:\n  enumsync sync --spec docs/kmip-spec-enumerations-v2.1-os_enumerations.csv\n  enumsync sync --spec docs/kmip-spec-enumerations-v2.1-os_enumerations.csv --write\n  enumsync sync --spec enums-v3.0.csv --category State --write\n  enumsync resolve --spec enums-v3.0.csv",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug-level diagnostics on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Sync(SyncArgs),
    Resolve(ResolveArgs),
}

/// Inputs shared by every command.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Specification CSV; its file name must carry the target version (e.g. `v2.1`)
    #[arg(long, value_name = "CSV")]
    pub spec: PathBuf,

    /// Project root that configured directories are relative to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory holding the generated enum files (overrides the config)
    #[arg(long, value_name = "DIR")]
    pub enum_dir: Option<PathBuf>,

    /// JSON config overriding markers, naming tables, and layout
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Compare enum blocks with the specification and optionally rewrite them")]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Apply changes to files (default: dry run)
    #[arg(long)]
    pub write: bool,

    /// Process only this category (file stem, file name, or specification category)
    #[arg(long, value_name = "NAME")]
    pub category: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Show which file each specification category maps to")]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

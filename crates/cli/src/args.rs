//! Command-line argument definitions, parsed with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// `snapvault` — an incremental, content-addressed file backup tool.
#[derive(Debug, Parser)]
#[command(name = "snapvault", version, about)]
pub struct Cli {
    /// Increase verbosity (`-v` for info, `-vv` for info and debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// A `snapvault` subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs one backup, either from command-line arguments or a config file.
    Backup(BackupArgs),
    /// Manages a persisted `BackupConfig` document.
    Config(ConfigArgs),
}

/// Arguments for `snapvault backup`.
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// A persisted config file to load (overridden by any flag given
    /// explicitly alongside it).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// A source directory to walk. May be given more than once; directories
    /// are processed in the order given.
    #[arg(short = 'd', long = "directory")]
    pub directories: Vec<PathBuf>,

    /// A path prefix to exclude from the walk. May be given more than once.
    #[arg(short = 'e', long = "exclude")]
    pub exclude: Vec<PathBuf>,

    /// The digest algorithm used to detect changed files.
    #[arg(long, default_value = "sha256")]
    pub digest: String,

    /// The compression codec applied to every artifact.
    #[arg(long, default_value = "gzip")]
    pub compressor: String,

    /// Compression level, `0` for codec default, else `1..=9`.
    #[arg(long, default_value_t = 0)]
    pub level: u32,

    /// Use the `xz` codec's extreme preset.
    #[arg(long)]
    pub xz_extreme: bool,

    /// The cipher applied to each artifact after compression. Prompts for a
    /// password (confirmed by double entry on a terminal) when set.
    #[cfg(feature = "cipher")]
    #[arg(long)]
    pub cipher: Option<String>,

    /// The destination snapshot root.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Which cloud backend to mirror artifacts to.
    #[arg(long, default_value = "none")]
    pub cloud_provider: String,

    /// The remote root path artifacts are mirrored under.
    #[arg(long, default_value = "")]
    pub cloud_remote_root: String,

    /// Cloud account username or access key, if the provider requires one.
    #[arg(long)]
    pub cloud_user: Option<String>,

    /// Cloud account password or secret key, if the provider requires one.
    /// Prefer `SNAPVAULT_CLOUD_PASS` over passing this on the command line.
    #[arg(long, env = "SNAPVAULT_CLOUD_PASS")]
    pub cloud_pass: Option<String>,

    /// Writes the resolved configuration (excluding secrets) to `path` after
    /// a successful run.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

/// Arguments for `snapvault config`.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// The config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// A `snapvault config` action.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Prints a config file as pretty-printed JSON.
    Show {
        /// The config file to read.
        path: PathBuf,
    },
    /// Writes a config file built from the given flags.
    Init(Box<BackupArgs>),
}

//! Argument parsing, password prompting, progress reporting, and the
//! `snapvault config` subcommand.
//!
//! [`run`] is the crate's single entry point: it parses [`args::Cli`],
//! installs logging at the requested verbosity, and dispatches to either a
//! backup run or a config-file action.

pub mod args;
pub mod error;
#[cfg(feature = "cipher")]
pub mod password;
pub mod progress;

use std::str::FromStr;

use clap::Parser;

use compress::{CompFlags, Codec, Level};
use digest::DigestKind;
use orchestrator::config::BackupConfig;
use orchestrator::options::{CloudProviderKind, CloudTarget, Options};
use logging::VerbosityConfig;

#[cfg(feature = "cipher")]
use cipher::CipherKind;

use args::{BackupArgs, Cli, Command, ConfigAction};
pub use error::CliError;

/// Parses arguments, installs logging, and runs the requested command.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(VerbosityConfig::from_verbose_level(cli.verbose));

    match cli.command {
        Command::Backup(args) => run_backup(&args),
        Command::Config(config_args) => run_config(config_args.action),
    }
}

fn run_backup(args: &BackupArgs) -> Result<(), CliError> {
    let loaded = args
        .config
        .as_deref()
        .map(BackupConfig::load)
        .transpose()?;

    let options = build_options(args, loaded.as_ref())?;

    #[cfg(feature = "cipher")]
    let options = {
        let mut options = options;
        if options.cipher_kind.is_some() {
            options.password = Some(password::acquire_password()?);
        }
        options
    };

    let stats = orchestrator::run_backup(&options)?;
    progress::report(&stats);

    if let Some(path) = &args.save_config {
        BackupConfig::from_options(&options).save(path)?;
    }

    Ok(())
}

fn run_config(action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show { path } => {
            let config = BackupConfig::load(&path)?;
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| orchestrator::config::ConfigError::Json { path, source: e })?;
            println!("{json}");
            Ok(())
        }
        ConfigAction::Init(args) => {
            let options = build_options(&args, None)?;
            let config = BackupConfig::from_options(&options);
            let path = args
                .save_config
                .clone()
                .unwrap_or_else(|| std::path::PathBuf::from("snapvault.json"));
            config.save(&path)?;
            Ok(())
        }
    }
}

/// Merges command-line arguments with an optionally loaded config file into
/// one [`Options`] record.
///
/// `directories`, `exclude`, `output`, and the cloud provider/remote-root
/// fall back to `config`'s values only when the command line left them at
/// their unset default. Every tuning flag — digest, compressor, level,
/// `xz_extreme`, cipher — always comes from the command line, which already
/// carries its own defaults.
fn build_options(args: &BackupArgs, config: Option<&BackupConfig>) -> Result<Options, CliError> {
    let directories = if args.directories.is_empty() {
        config
            .map(|c| c.directories.clone())
            .unwrap_or_default()
    } else {
        args.directories.clone()
    };

    let exclude = if args.exclude.is_empty() {
        config.map(|c| c.exclude.clone()).unwrap_or_default()
    } else {
        args.exclude.clone()
    };

    let output_root = args
        .output
        .clone()
        .or_else(|| config.map(|c| c.output_root.clone()))
        .ok_or(CliError::MissingOutput)?;

    let (cloud_provider_name, cloud_remote_root) = if args.cloud_provider == "none"
        && args.cloud_remote_root.is_empty()
    {
        config
            .map(|c| (c.cloud.provider.clone(), c.cloud.remote_root.clone()))
            .unwrap_or_else(|| (args.cloud_provider.clone(), args.cloud_remote_root.clone()))
    } else {
        (args.cloud_provider.clone(), args.cloud_remote_root.clone())
    };

    let digest_kind = DigestKind::from_str(&args.digest)?;
    let compressor = Codec::from_str(&args.compressor)?;
    let provider = CloudProviderKind::from_str(&cloud_provider_name)?;

    #[cfg(feature = "cipher")]
    let cipher_kind = args
        .cipher
        .as_deref()
        .map(CipherKind::from_str)
        .transpose()?;

    let mut comp_flags = CompFlags::NONE;
    if args.xz_extreme {
        comp_flags = comp_flags.union(CompFlags::XZ_EXTREME);
    }

    let credentials = match (&args.cloud_user, &args.cloud_pass) {
        (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
        _ => None,
    };

    Ok(Options {
        directories,
        exclude,
        digest_kind,
        #[cfg(feature = "cipher")]
        cipher_kind,
        #[cfg(feature = "cipher")]
        password: None,
        compressor,
        comp_level: Level::new(args.level),
        comp_flags,
        output_root,
        cloud_target: CloudTarget {
            provider,
            credentials,
            remote_root: cloud_remote_root,
        },
        verbose: config.map_or(false, |c| c.verbose),
    })
}

//! The backup pipeline's state machine: one call to [`run_backup`] executes
//! exactly the sequence in spec.md §4.11 — ensure the destination, rotate
//! the manifest, reconcile deletions against the prior manifest, walk every
//! source root writing changed artifacts, mirror to the cloud, then sort
//! the new manifest.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use manifest::{Decision, Manifest};

use crate::error::BackupError;
use crate::options::{CloudProviderKind, Options};

/// Summary counts for one completed run, returned for the `cli` crate's
/// verbose/stats output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// Files written because they were new or had changed.
    pub written: u64,
    /// Files left untouched because their digest matched the prior run.
    pub unchanged: u64,
    /// Deltas produced by rotating a changed file's prior artifact aside.
    pub deltas: u64,
    /// Artifacts removed because their source file no longer exists.
    pub removed: u64,
    /// Per-file failures that were logged and skipped.
    pub file_errors: u64,
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Reconstructs the manifest path the orchestrator records for `file`
/// under `root`: the root directory's own final path component, followed
/// by `file`'s path relative to `root`.
///
/// A source root configured as `/home/alice/src` turns
/// `/home/alice/src/a.txt` into the manifest path `src/a.txt`, which is
/// also the suffix used under `<output>/files` and `<output>/deltas` — so
/// the destination tree visibly mirrors each configured root by name.
fn manifest_path_for(root: &Path, file: &Path) -> Option<String> {
    let root_name = root.file_name()?.to_str()?;
    let relative = file.strip_prefix(root).ok()?;
    let relative_str = relative.to_str()?;
    if relative_str.is_empty() {
        return Some(root_name.to_string());
    }
    Some(pathutil::join(root_name, relative_str))
}

/// Resolves a manifest path back to its absolute source location, given
/// the same configured `directories` list `manifest_path_for` was derived
/// from. Used by deletion reconciliation to test whether the source file
/// still exists.
fn resolve_absolute(manifest_path: &str, directories: &[PathBuf]) -> Option<PathBuf> {
    let first_component = manifest_path.split('/').next()?;
    let root = directories
        .iter()
        .find(|dir| dir.file_name().and_then(|n| n.to_str()) == Some(first_component))?;
    let parent = root.parent()?;
    Some(parent.join(manifest_path))
}

/// Runs one backup according to `options`, returning summary counts.
///
/// Only failures that invalidate the whole snapshot (destination cannot be
/// created, manifest cannot be opened, every source root fails to open)
/// propagate as [`BackupError`]; every other failure is logged and the run
/// continues, per spec.md §7.
pub fn run_backup(options: &Options) -> Result<RunStats, BackupError> {
    let run_epoch = epoch_seconds();
    let mut stats = RunStats::default();

    let files_root = options.output_root.join("files");
    let deltas_root = options.output_root.join("deltas");
    let manifest_path = options.output_root.join("checksums.txt");

    fsutil::mkdir_p(&files_root).map_err(|e| BackupError::CreateDestRoot {
        path: options.output_root.clone(),
        source: e,
    })?;
    fsutil::mkdir_p(&deltas_root).map_err(|e| BackupError::CreateDestRoot {
        path: options.output_root.clone(),
        source: e,
    })?;

    let prior_manifest_path = if manifest_path.exists() {
        let rotated = options.output_root.join(format!("checksums.txt.{run_epoch}"));
        if fsutil::rename_file(&manifest_path, &rotated).is_ok() {
            Some(rotated)
        } else {
            None
        }
    } else {
        None
    };

    let manifest_file = File::create(&manifest_path).map_err(|e| BackupError::OpenManifest {
        path: manifest_path.clone(),
        source: e,
    })?;
    let mut manifest_writer = BufWriter::new(manifest_file);

    let mut session = login_cloud(options);

    if let Some(prior) = prior_manifest_path.as_deref() {
        reconcile_deletions(options, prior, &files_root, session.as_deref_mut(), &mut stats);
    }

    let manifest_engine = Manifest::default();
    let mut any_root_opened = false;

    for root in &options.directories {
        if !root.exists() {
            logging::warn_log!("{}: source root does not exist, skipping", root.display());
            continue;
        }
        any_root_opened = true;
        walk_root(
            options,
            root,
            prior_manifest_path.as_deref(),
            &manifest_engine,
            &mut manifest_writer,
            &files_root,
            &deltas_root,
            run_epoch,
            session.as_deref_mut(),
            &mut stats,
        );
    }

    if !any_root_opened {
        return Err(BackupError::NoSourcesOpened);
    }

    if let Err(e) = manifest_writer.flush() {
        logging::warn_log!("{}: failed to flush manifest: {e}", manifest_path.display());
    }
    drop(manifest_writer);
    manifest_engine.sort_in_place(&manifest_path)?;

    if let Some(session) = session {
        if let Err(e) = session.logout() {
            logging::warn_log!("cloud logout failed: {e}");
        }
    }

    Ok(stats)
}

#[allow(clippy::too_many_arguments)]
fn walk_root(
    options: &Options,
    root: &Path,
    prior_manifest: Option<&Path>,
    manifest_engine: &Manifest,
    manifest_writer: &mut impl std::io::Write,
    files_root: &Path,
    deltas_root: &Path,
    run_epoch: u64,
    mut session: Option<&mut dyn cloud::CloudSession>,
    stats: &mut RunStats,
) {
    let mut walker = walk::DirWalker::start(root);
    while let Some(file) = walker.next() {
        if options.is_excluded(&file) {
            logging::info_log!(logging::InfoFlags::SKIP, "{}: excluded", file.display());
            // The walker has already descended into this file's directory to
            // yield it; abandon the rest of that directory's entries rather
            // than enumerating the whole excluded subtree file by file.
            walker.skip_current_dir();
            continue;
        }

        let Some(manifest_path) = manifest_path_for(root, &file) else {
            logging::warn_log!("{}: could not derive a manifest path, skipping", file.display());
            continue;
        };

        let decision = manifest_engine.incremental_write(
            manifest_writer,
            &manifest_path,
            &file,
            options.digest_kind,
            prior_manifest,
        );

        match decision {
            Ok(Decision::Unchanged) => {
                stats.unchanged += 1;
            }
            Ok(Decision::Changed) => {
                match write_artifact(
                    options,
                    &file,
                    &manifest_path,
                    files_root,
                    deltas_root,
                    run_epoch,
                    session.as_deref_mut(),
                ) {
                    Ok(produced_delta) => {
                        stats.written += 1;
                        if produced_delta {
                            stats.deltas += 1;
                        }
                    }
                    Err(e) => {
                        logging::warn_log!("{}: {e}", file.display());
                        stats.file_errors += 1;
                    }
                }
            }
            Err(e) => {
                logging::warn_log!("{}: {e}", file.display());
                stats.file_errors += 1;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ArtifactError {
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
    #[error(transparent)]
    Compress(#[from] compress::CompressError),
    #[cfg(feature = "cipher")]
    #[error(transparent)]
    Cipher(#[from] cipher::CipherError),
}

/// Writes one changed file's artifact: rotates any existing artifact into
/// a delta, compresses the new content in place, optionally encrypts it,
/// and mirrors it to the cloud. Returns whether a delta was produced.
fn write_artifact(
    options: &Options,
    source_file: &Path,
    manifest_path: &str,
    files_root: &Path,
    deltas_root: &Path,
    run_epoch: u64,
    session: Option<&mut dyn cloud::CloudSession>,
) -> Result<bool, ArtifactError> {
    let local_dst = files_root.join(manifest_path);
    let delta_dst = deltas_root.join(format!("{manifest_path}.{run_epoch}"));

    if let Some(parent) = local_dst.parent() {
        fsutil::mkdir_p(parent)?;
    }
    if let Some(parent) = delta_dst.parent() {
        fsutil::mkdir_p(parent)?;
    }

    let produced_delta = if local_dst.exists() {
        fsutil::rename_file(&local_dst, &delta_dst)?;
        true
    } else {
        false
    };

    compress::compress_file(
        source_file,
        &local_dst,
        options.compressor,
        options.comp_level,
        options.comp_flags,
    )?;

    #[cfg(feature = "cipher")]
    if let (Some(cipher_kind), Some(password)) = (options.cipher_kind, options.password.as_ref()) {
        cipher::encrypt_in_place(&local_dst, cipher_kind, password)?;
    }

    if let Some(session) = session {
        if options.cloud_target.provider != CloudProviderKind::None {
            let remote_files = pathutil::join(&options.cloud_target.remote_root, manifest_path);
            let remote_deltas = pathutil::join(
                &options.cloud_target.remote_root,
                &format!("{manifest_path}.{run_epoch}"),
            );
            if let Err(e) = cloud::cloud_upload_artifact(session, &local_dst, &remote_files, &remote_deltas) {
                logging::warn_log!("cloud upload of {manifest_path}: {e}");
            }
        }
    }

    Ok(produced_delta)
}

fn login_cloud(options: &Options) -> Option<Box<dyn cloud::CloudSession>> {
    if options.cloud_target.provider == CloudProviderKind::None {
        return None;
    }
    let credentials = options
        .cloud_target
        .credentials
        .as_ref()
        .map(|(user, pass)| cloud::Credentials::new(user.clone(), pass.clone()));

    #[cfg(feature = "mega")]
    if options.cloud_target.provider == CloudProviderKind::Mega {
        let provider = match url::Url::parse(&options.cloud_target.remote_root) {
            Ok(url) => cloud::MegaProvider::new(url),
            Err(e) => {
                logging::warn_log!("invalid cloud remote root: {e}");
                return None;
            }
        };
        return match provider.login(credentials.as_ref()) {
            Ok(session) => Some(session),
            Err(e) => {
                logging::warn_log!("cloud login failed: {e}");
                None
            }
        };
    }

    let _ = credentials;
    None
}

fn reconcile_deletions(
    options: &Options,
    prior_manifest: &Path,
    files_root: &Path,
    mut session: Option<&mut dyn cloud::CloudSession>,
    stats: &mut RunStats,
) {
    let file = match File::open(prior_manifest) {
        Ok(f) => f,
        Err(e) => {
            logging::warn_log!("{}: {e}", prior_manifest.display());
            return;
        }
    };
    let mut reader = std::io::BufReader::new(file);

    loop {
        let entry = match manifest::read_entry(&mut reader) {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                logging::warn_log!("{}: malformed prior manifest entry: {e}", prior_manifest.display());
                break;
            }
        };

        let Some(absolute) = resolve_absolute(&entry.path, &options.directories) else {
            continue;
        };
        if fs::symlink_metadata(&absolute).is_ok() {
            continue;
        }

        let artifact = files_root.join(&entry.path);
        if artifact.exists() {
            if let Err(e) = fs::remove_file(&artifact) {
                logging::warn_log!("{}: failed to remove stale artifact: {e}", artifact.display());
            } else {
                stats.removed += 1;
                logging::info_log!(logging::InfoFlags::DEL, "{}: removed (source deleted)", entry.path);
            }
        }

        if let Some(session) = session.as_deref_mut() {
            if options.cloud_target.provider != CloudProviderKind::None {
                let remote_path = pathutil::join(&options.cloud_target.remote_root, &entry.path);
                if let Err(e) = session.remove(&remote_path) {
                    logging::warn_log!("cloud remove of {remote_path}: {e}");
                }
            }
        }
    }
}

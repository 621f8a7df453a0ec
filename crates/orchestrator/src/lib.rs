#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! The backup pipeline's orchestrator: wires the directory walker, the
//! manifest engine, the compression/cipher transform chain, and the cloud
//! mirror into the single state machine described by spec.md §4.11 —
//! ensure the destination, rotate the manifest, reconcile deletions, walk
//! and copy every configured source root, sort the completed manifest,
//! log out of the cloud.
//!
//! # Design
//!
//! [`Options`] is the in-memory configuration one run consumes, built by
//! the `cli` crate either from arguments directly or from a persisted
//! [`config::BackupConfig`] plus a runtime-supplied password. [`run::run_backup`]
//! is the crate's only entry point; every other item here exists to
//! support that one call.
//!
//! # Invariants
//!
//! - A run either succeeds and leaves a freshly sorted manifest at
//!   `<output>/checksums.txt`, or fails with a [`error::BackupError`] and
//!   leaves the previous manifest (if any) untouched under its rotated
//!   name.
//! - Per-file and per-cloud-operation failures never abort a run; they are
//!   logged and counted in [`run::RunStats`].
//!
//! # Errors
//!
//! See [`error::BackupError`] for the run-fatal failure modes.

pub mod config;
pub mod error;
pub mod options;
pub mod run;

pub use error::BackupError;
pub use options::{CloudProviderKind, CloudTarget, Options};
pub use run::{run_backup, RunStats};

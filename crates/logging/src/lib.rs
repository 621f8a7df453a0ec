#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! A process-wide verbosity gate for the backup pipeline's diagnostics.
//! Warnings and errors are always emitted; info and debug lines are gated
//! by the [`VerbosityConfig`] installed at process start, mirroring `-v`/
//! `-vv` on the command line.
//!
//! # Design
//!
//! [`info_log!`]/[`debug_log!`] check the current [`VerbosityConfig`]
//! before formatting their message, so disabled diagnostics cost a flag
//! check, not a string allocation. With the `capture` feature enabled,
//! every emitted event is pushed to an in-memory ring instead of printed to
//! stderr, so tests can assert on exactly what would have been logged via
//! [`drain_events`].
//!
//! # Invariants
//!
//! - [`warn_log!`]/[`error_log!`] are never gated: they always emit.
//! - [`VerbosityConfig::from_verbose_level`] is monotonic: a higher level
//!   never disables a flag enabled at a lower level.

use std::fmt;
use std::sync::{Mutex, OnceLock};

/// Informational diagnostics, gated by [`VerbosityConfig::info`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct InfoFlags(u8);

impl InfoFlags {
    /// No info flags enabled.
    pub const NONE: Self = Self(0);
    /// A file was written to the destination.
    pub const NAME: Self = Self(1 << 0);
    /// An artifact was copied (reused) unchanged.
    pub const COPY: Self = Self(1 << 1);
    /// A deletion was reconciled.
    pub const DEL: Self = Self(1 << 2);
    /// A cloud mirror operation ran.
    pub const CLOUD: Self = Self(1 << 3);
    /// Summary counts at the end of a run.
    pub const STATS: Self = Self(1 << 4);
    /// A path matched an exclude prefix.
    pub const SKIP: Self = Self(1 << 5);
    /// Every info flag.
    pub const ALL: Self = Self(0b0011_1111);

    /// Returns whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Debug diagnostics, gated by [`VerbosityConfig::debug`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct DebugFlags(u8);

impl DebugFlags {
    /// No debug flags enabled.
    pub const NONE: Self = Self(0);
    /// Directory-walk tracing.
    pub const WALK: Self = Self(1 << 0);
    /// Manifest read/write/sort tracing.
    pub const MANIFEST: Self = Self(1 << 1);
    /// Cipher engine tracing.
    pub const CIPHER: Self = Self(1 << 2);
    /// Compression engine tracing.
    pub const COMPRESS: Self = Self(1 << 3);
    /// Cloud mirror tracing.
    pub const CLOUD: Self = Self(1 << 4);
    /// Every debug flag.
    pub const ALL: Self = Self(0b0001_1111);

    /// Returns whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// The process-wide verbosity configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct VerbosityConfig {
    /// Info-level flags currently enabled.
    pub info: InfoFlags,
    /// Debug-level flags currently enabled.
    pub debug: DebugFlags,
}

impl VerbosityConfig {
    /// Maps a `-v` repeat count onto a verbosity staircase: `0` is silent
    /// (beyond always-on warnings/errors), `1` enables every info flag, and
    /// `2` or higher additionally enables every debug flag.
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        match level {
            0 => Self {
                info: InfoFlags::NONE,
                debug: DebugFlags::NONE,
            },
            1 => Self {
                info: InfoFlags::ALL,
                debug: DebugFlags::NONE,
            },
            _ => Self {
                info: InfoFlags::ALL,
                debug: DebugFlags::ALL,
            },
        }
    }
}

/// Severity of one diagnostic event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Level {
    /// Fatal-to-run or fatal-to-file condition.
    Error,
    /// Non-fatal, logged condition.
    Warn,
    /// Gated informational message.
    Info,
    /// Gated debug message.
    Debug,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        })
    }
}

/// One emitted diagnostic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagnosticEvent {
    /// The event's severity.
    pub level: Level,
    /// The formatted message.
    pub message: String,
}

static CONFIG: OnceLock<Mutex<VerbosityConfig>> = OnceLock::new();
static EVENTS: Mutex<Vec<DiagnosticEvent>> = Mutex::new(Vec::new());

/// Installs the process-wide verbosity configuration.
///
/// Calling this more than once replaces the previous configuration; the
/// backup binary calls it once at startup with the level decoded from
/// `-v`/`-vv`.
pub fn init(config: VerbosityConfig) {
    match CONFIG.get() {
        Some(existing) => *existing.lock().unwrap_or_else(|e| e.into_inner()) = config,
        None => {
            let _ = CONFIG.set(Mutex::new(config));
        }
    }
}

/// Returns the current verbosity configuration, or the default (silent)
/// configuration if [`init`] was never called.
#[must_use]
pub fn current() -> VerbosityConfig {
    CONFIG
        .get()
        .map(|m| *m.lock().unwrap_or_else(|e| e.into_inner()))
        .unwrap_or_default()
}

/// Replaces the process-wide verbosity configuration. Equivalent to
/// [`init`], kept as a distinct name for call sites that are clearly
/// mutating rather than installing for the first time.
pub fn set_level(config: VerbosityConfig) {
    init(config);
}

/// Pushes one diagnostic event. Gating on the current [`VerbosityConfig`]
/// for info/debug events is the caller's responsibility — use
/// [`info_log!`]/[`debug_log!`] rather than calling this directly.
pub fn emit(level: Level, message: String) {
    if cfg!(feature = "capture") {
        EVENTS
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DiagnosticEvent { level, message });
    } else {
        eprintln!("{level}: {message}");
    }
}

/// Drains and returns every event captured so far (only meaningful with the
/// `capture` feature enabled; otherwise always returns an empty vector
/// since events are printed directly rather than retained).
pub fn drain_events() -> Vec<DiagnosticEvent> {
    std::mem::take(&mut *EVENTS.lock().unwrap_or_else(|e| e.into_inner()))
}

/// Emits an always-on error diagnostic.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::emit($crate::Level::Error, format!($($arg)*))
    };
}

/// Emits an always-on warning diagnostic.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::emit($crate::Level::Warn, format!($($arg)*))
    };
}

/// Emits an info diagnostic, gated on `$flag` being enabled in the current
/// [`VerbosityConfig::info`].
#[macro_export]
macro_rules! info_log {
    ($flag:expr, $($arg:tt)*) => {
        if $crate::current().info.contains($flag) {
            $crate::emit($crate::Level::Info, format!($($arg)*));
        }
    };
}

/// Emits a debug diagnostic, gated on `$flag` being enabled in the current
/// [`VerbosityConfig::debug`].
#[macro_export]
macro_rules! debug_log {
    ($flag:expr, $($arg:tt)*) => {
        if $crate::current().debug.contains($flag) {
            $crate::emit($crate::Level::Debug, format!($($arg)*));
        }
    };
}

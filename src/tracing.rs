//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging sync and
//! link state transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=phrase_sync::sync=trace` - module-level filtering
//! - `RUST_LOG=phrase_sync::update=debug` - sandbox message dispatch
//!
//! # Log Files
//!
//! Logs are written to `~/.config/phrase-sync/logs/phrase-sync.log` with daily
//! rotation. File logging uses debug level by default for more verbose
//! troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::link::LinkState;
use crate::model::SandboxModel;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var for filtering, default `warn`.
/// File logging writes to `~/.config/phrase-sync/logs/phrase-sync.log` with
/// daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "phrase-sync.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Link counts on the current page, for logging what a message changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkSnapshot {
    pub unlinked: usize,
    pub in_sync: usize,
    pub locally_ahead: usize,
    pub file_configured: bool,
}

impl LinkSnapshot {
    pub fn from_model(model: &SandboxModel) -> Self {
        let mut snapshot = Self {
            file_configured: model.file_binding().is_some(),
            ..Self::default()
        };
        for leaf in model.page_leaves() {
            match leaf.state() {
                LinkState::Unlinked => snapshot.unlinked += 1,
                LinkState::InSync => snapshot.in_sync += 1,
                LinkState::LocallyAhead => snapshot.locally_ahead += 1,
            }
        }
        snapshot
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &LinkSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.file_configured != other.file_configured {
            changes.push(format!(
                "file configured: {} → {}",
                self.file_configured, other.file_configured
            ));
        }
        for (label, before, after) in [
            ("unlinked", self.unlinked, other.unlinked),
            ("in-sync", self.in_sync, other.in_sync),
            ("locally-ahead", self.locally_ahead, other.locally_ahead),
        ] {
            if before != after {
                changes.push(format!("{}: {} → {}", label, before, after));
            }
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

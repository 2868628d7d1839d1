// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tracing` subscriber setup, run once per process before `(S, Σ, Q)` is
//! touched. Fans out to an optional console layer and an optional
//! non-blocking rolling file layer under `logs/<role>.log`, gated by
//! `LOG_TO_CONSOLE`/`LOG_TO_FILE`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wh_core::{Result, WarehouseError};

use crate::env;

/// Holds the file appender's flush guard for the lifetime of `main`; drop
/// it only once the process is exiting so buffered lines are not lost.
pub struct LoggingGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

/// `LOG_LEVEL` accepts the C++ original's naming (`trace, debug, info, warn,
/// err, crit, off`), case-insensitive, mapped onto `tracing`'s levels with
/// `crit` folded into `error` since `tracing` has no distinct critical
/// level.
fn mapped_level(raw: &str) -> &'static str {
    match raw {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "err" | "crit" => "error",
        "off" => "off",
        _ => "info",
    }
}

/// Initialize the process-wide subscriber. Safe to call exactly once; a
/// second call would panic inside `tracing_subscriber`, which is why every
/// `main` calls this before doing anything else.
pub fn setup_logging(role: &str) -> Result<LoggingGuard> {
    let filter = EnvFilter::new(mapped_level(&env::log_level()));

    let console_layer = env::log_to_console().then(|| fmt::layer().with_target(false));

    let (file_layer, guard) = if env::log_to_file() {
        let dir = env::logs_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|source| WarehouseError::ResourceInit { resource: "logs directory", source })?;
        let file_appender = tracing_appender::rolling::never(&dir, format!("{role}.log"));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(fmt::layer().with_writer(non_blocking).with_ansi(false)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(filter).with(console_layer).with(file_layer).init();

    Ok(LoggingGuard(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crit_and_err_fold_into_error() {
        assert_eq!(mapped_level("crit"), "error");
        assert_eq!(mapped_level("err"), "error");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(mapped_level("nonsense"), "info");
    }

    #[test]
    fn level_mapping_is_case_sensitive_at_this_layer() {
        // env::log_level() already lowercases; this function trusts that.
        assert_eq!(mapped_level("warn"), "warn");
    }
}

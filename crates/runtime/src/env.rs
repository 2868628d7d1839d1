// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the runtime crate. Every
//! other module in `wh-runtime` reaches configuration through here rather
//! than calling `std::env::var` directly.

use std::path::PathBuf;
use std::time::Duration;

/// `true` unless `LOG_TO_CONSOLE=false`. Multiple role processes writing to
/// the same terminal interleaves badly, so the file sink is the one that
/// defaults on; console is opt-in for local runs.
pub fn log_to_console() -> bool {
    bool_var("LOG_TO_CONSOLE", false)
}

/// `true` unless `LOG_TO_FILE=false`.
pub fn log_to_file() -> bool {
    bool_var("LOG_TO_FILE", true)
}

fn bool_var(name: &str, default: bool) -> bool {
    std::env::var(name).ok().map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(default)
}

/// Raw `LOG_LEVEL` value, case-insensitive, defaulting to `info`. Mapping
/// onto a `tracing` level (including folding `crit` into `error`) happens
/// in [`crate::logging`].
pub fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).to_lowercase()
}

/// Directory role log files are rooted at, overridable via `WH_LOGS_DIR`.
pub fn logs_dir() -> PathBuf {
    std::env::var("WH_LOGS_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("logs"))
}

/// Delay between spawning consecutive child roles, overridable via
/// `WH_STARTUP_STAGGER_MS`.
pub fn startup_stagger() -> Duration {
    duration_var("WH_STARTUP_STAGGER_MS", Duration::from_millis(50))
}

/// Grace period the orchestrator waits after broadcasting `END_WORK`
/// before destroying `(S, Σ, Q)`, overridable via `WH_SHUTDOWN_GRACE_MS`.
pub fn shutdown_grace() -> Duration {
    duration_var("WH_SHUTDOWN_GRACE_MS", Duration::from_secs(2))
}

/// Interval between non-blocking reap sweeps, overridable via
/// `WH_REAP_POLL_MS`.
pub fn reap_poll_interval() -> Duration {
    duration_var("WH_REAP_POLL_MS", Duration::from_millis(250))
}

fn duration_var(name: &str, default: Duration) -> Duration {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn log_to_console_defaults_false_and_honors_override() {
        std::env::remove_var("LOG_TO_CONSOLE");
        assert!(!log_to_console());
        std::env::set_var("LOG_TO_CONSOLE", "true");
        assert!(log_to_console());
        std::env::remove_var("LOG_TO_CONSOLE");
    }

    #[test]
    #[serial]
    fn log_level_is_lowercased_and_defaults_to_info() {
        std::env::remove_var("LOG_LEVEL");
        assert_eq!(log_level(), "info");
        std::env::set_var("LOG_LEVEL", "WARN");
        assert_eq!(log_level(), "warn");
        std::env::remove_var("LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn startup_stagger_parses_override_in_milliseconds() {
        std::env::set_var("WH_STARTUP_STAGGER_MS", "10");
        assert_eq!(startup_stagger(), Duration::from_millis(10));
        std::env::remove_var("WH_STARTUP_STAGGER_MS");
    }
}

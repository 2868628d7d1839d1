// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability surface over the belt: periodically logs occupancy and
//! warns once `total_weight` crosses the optional `max_belt_weight`
//! ceiling. Read-only — this process never pushes, pops, or registers as a
//! worker.

use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use wh_core::{Config, Result};
use wh_ipc::{Facade, SysVFacade};
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-belt-monitor")]
struct Cli;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

fn main() -> std::process::ExitCode {
    let _ = Cli::parse();

    let _guard = match logging::setup_logging("belt-monitor") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "belt monitor exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;

    while facade.is_running() {
        let (count, capacity, total_weight, worker_count) =
            facade.with_belt(|belt, _| (belt.count(), belt.capacity(), belt.total_weight, belt.worker_count))?;

        info!(count, capacity, total_weight, worker_count, "belt snapshot");

        if let Some(ceiling) = cfg.max_belt_weight {
            if total_weight > ceiling {
                warn!(total_weight, ceiling, "belt total weight exceeds the configured soft ceiling");
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    facade.close(false);
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A worker process: produces packages onto the belt with a small
//! configurable think-time between pushes, until told to stop.

use clap::Parser;
use tracing::{info, warn};
use wh_core::{Config, Package, Result, Role, WarehouseError};
use wh_engine::{belt_ops, clock, session_ops, WarehouseRng};
use wh_ipc::{Facade, SysVFacade};
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-worker")]
struct Cli {
    /// This worker's ordinal, assigned by the orchestrator at spawn time.
    id: Option<u32>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let role = match cli.id {
        Some(id) => format!("worker-{id}"),
        None => "worker".to_string(),
    };

    let _guard = match logging::setup_logging(&role) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "worker exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;
    let mut rng = WarehouseRng::from_entropy();
    let pid = clock::self_pid();

    if !belt_ops::register_worker(&facade, cfg.worker_count as u32)? {
        warn!(pid, "worker population cap already reached, exiting");
        facade.close(false);
        return Ok(());
    }

    session_ops::login(&facade, &format!("worker-{pid}"), pid, Role::VIEWER, 0, 1)?;
    if !session_ops::try_spawn_process(&facade, pid)? {
        warn!(pid, "worker session quota already exhausted, exiting");
        session_ops::logout(&facade, pid)?;
        belt_ops::unregister_worker(&facade)?;
        facade.close(false);
        return Ok(());
    }

    info!(pid, "worker registered, producing packages");

    let result = produce(&facade, &cfg, &mut rng, pid);

    session_ops::report_process_finished(&facade, pid)?;
    session_ops::logout(&facade, pid)?;
    belt_ops::unregister_worker(&facade)?;
    facade.close(false);
    result
}

fn produce<F: Facade>(facade: &F, cfg: &Config, rng: &mut WarehouseRng, pid: i32) -> Result<()> {
    while facade.is_running() {
        let package = Package::new(pid, rng.package_type(), rng.package_weight(), rng.package_volume(), clock::now_ms());
        match belt_ops::push(facade, package) {
            Ok(id) => info!(package_id = id, "pushed package onto belt"),
            Err(WarehouseError::ShuttingDown) => break,
            Err(e) => return Err(e),
        }
        std::thread::sleep(cfg.worker_poll_backoff);
    }
    Ok(())
}

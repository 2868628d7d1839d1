// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The express process: logs in as a well-known "System-Express" session so
//! the terminal's `vip` command can address it, then services
//! `EXPRESS_LOAD` commands while also attempting a scheduled priority batch
//! on its own cadence.

use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use wh_core::{CommandId, Config, RecipientTag, Result, Role};
use wh_engine::{express, clock, session_ops, WarehouseRng};
use wh_ipc::{Facade, SysVFacade};
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-express")]
struct Cli;

/// How often this process attempts a priority batch on its own, independent
/// of any `vip` command from the terminal. Not a domain tunable the belt or
/// dock care about, so it lives here rather than in `wh_core::Config`.
const BATCH_ATTEMPT_INTERVAL: Duration = Duration::from_secs(6);

/// Poll cadence while idle, matching the terminal's own 100ms input-poll
/// granularity so shutdown is noticed just as promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> std::process::ExitCode {
    let _ = Cli::parse();

    let _guard = match logging::setup_logging("express") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "express exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;
    let mut rng = WarehouseRng::from_entropy();
    let pid = clock::self_pid();
    let me = RecipientTag::for_pid(pid);

    // SysAdmin-equivalent quota of zero: this process never spawns
    // sub-processes of its own, it only exists so the registry can resolve
    // its pid by name.
    session_ops::login(&facade, "System-Express", pid, Role::SYS_ADMIN, 0, 0)?;
    info!(pid, "express lane online");

    let mut last_batch = Instant::now();
    while facade.is_running() {
        if let Some(msg) = facade.recv_nonblocking(me) {
            if msg.command() == Some(CommandId::ExpressLoad) {
                match express::deliver_vip_package(&facade, &mut rng)? {
                    express::VipOutcome::Loaded => info!("VIP package loaded"),
                    express::VipOutcome::Dropped => warn!("VIP package dropped"),
                }
            }
        }

        if last_batch.elapsed() >= BATCH_ATTEMPT_INTERVAL {
            let outcome = express::deliver_express_batch(&facade, &mut rng)?;
            info!(
                attempted = outcome.attempted,
                loaded = outcome.loaded,
                truck_id = outcome.truck_id,
                "attempted a priority batch"
            );
            last_batch = Instant::now();
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    session_ops::logout(&facade, pid)?;
    facade.close(false);
    Ok(())
}

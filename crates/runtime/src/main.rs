// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wh-orchestrator: creates `(S, Σ, Q)`, spawns every role process, and
//! drives shutdown once asked to stop.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use wh_core::{CommandId, CommandMessage, Config, RecipientTag, Result, WarehouseError};
use wh_engine::session_ops;
use wh_ipc::{Facade, SysVFacade};
use wh_runtime::{env, logging, spawn};

/// A single optional integer argument, accepted for a uniform command
/// surface across every role binary even though the orchestrator itself
/// has no use for it.
#[derive(Debug, Parser)]
#[command(name = "wh-orchestrator")]
struct Cli {
    id: Option<u32>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let _cli = Cli::parse();

    let _guard = match logging::setup_logging("orchestrator") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "orchestrator exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = Config::load()?;
    info!(
        belt_slots = cfg.belt_slots,
        worker_count = cfg.worker_count,
        truck_cycles = cfg.truck_cycles,
        "creating warehouse IPC resources"
    );

    // Any pre-existing namesake resources belong to a prior, presumably
    // crashed, run. `create` owns them outright rather than trying to
    // reconcile with whatever state they were left in.
    let facade = SysVFacade::create(&cfg)?;

    let mut roster = spawn::spawn_children(&cfg)?;
    info!(roles = ?roster.labels(), "spawned child roles");

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|source| WarehouseError::ResourceInit { resource: "SIGTERM handler", source })?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|source| WarehouseError::ResourceInit { resource: "SIGINT handler", source })?;

    let mut reap_tick = tokio::time::interval(env::reap_poll_interval());

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            _ = reap_tick.tick() => {
                for (label, status) in roster.reap() {
                    warn!(role = label.as_str(), ?status, "child role exited before shutdown was requested");
                }
            }
        }
    }

    shutdown(&facade, &mut roster).await?;
    facade.close(true);
    info!("warehouse stopped");
    Ok(())
}

/// Stop the world: clear `S.running`, broadcast `END_WORK` to every active
/// session, give children a grace period to notice and exit on their own,
/// then terminate and reap whatever is left.
async fn shutdown(facade: &SysVFacade, roster: &mut spawn::Roster) -> Result<()> {
    facade.stop_world()?;

    let pids = session_ops::active_session_pids(facade)?;
    info!(session_count = pids.len(), "broadcasting END_WORK");
    for pid in pids {
        if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(pid), CommandId::EndWork)) {
            warn!(pid, error = %e, "failed to deliver END_WORK to session");
        }
    }

    tokio::time::sleep(env::shutdown_grace()).await;

    for (label, status) in roster.reap() {
        info!(role = label.as_str(), ?status, "role exited during shutdown grace period");
    }

    if !roster.is_empty() {
        warn!(roles = ?roster.labels(), "some roles did not exit during the grace period, signaling them");
        roster.terminate_all();
        tokio::time::sleep(env::shutdown_grace()).await;
        for (label, status) in roster.reap() {
            info!(role = label.as_str(), ?status, "role exited after SIGTERM");
        }
    }

    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A truck process: drives the dock-occupancy FSM in `wh-engine::truck_ops`
//! until `END_WORK` or shutdown.

use clap::Parser;
use wh_core::{Config, Result};
use wh_engine::{truck_ops, WarehouseRng};
use wh_ipc::SysVFacade;
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-truck")]
struct Cli {
    /// This truck's ordinal, assigned by the orchestrator at spawn time.
    id: Option<u32>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let role = match cli.id {
        Some(id) => format!("truck-{id}"),
        None => "truck".to_string(),
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
            tracing::error!(error = %e, "truck exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;
    let mut rng = WarehouseRng::from_entropy();

    let result = truck_ops::run(&facade, &cfg, &mut rng);
    facade.close(false);
    result
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher process: pops packages off the belt and retry-loads each
//! one into the dock until shutdown.

use clap::Parser;
use wh_core::{Config, Result};
use wh_engine::dispatcher;
use wh_ipc::SysVFacade;
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-dispatcher")]
struct Cli;

fn main() -> std::process::ExitCode {
    let _ = Cli::parse();

    let _guard = match logging::setup_logging("dispatcher") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dispatcher exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;

    let result = dispatcher::run(&facade, &cfg);
    facade.close(false);
    result
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interactive console: reads a line at a time from the keyboard
//! without ever blocking longer than 100ms, so it can notice shutdown
//! between keystrokes, and dispatches a fixed command table against the
//! session registry.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use wh_core::{CommandId, CommandMessage, Config, RecipientTag, Result, Role};
use wh_engine::{clock, session_ops};
use wh_ipc::{Facade, SysVFacade};
use wh_runtime::logging;

#[derive(Debug, Parser)]
#[command(name = "wh-terminal")]
struct Cli;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// This console always represents a fully-privileged human operator: it
/// logs itself in with both roles `vip`/`depart`/`stop` ever require,
/// rather than prompting for credentials the simulation has no use for.
const CONSOLE_ROLE: Role = Role::OPERATOR.union(Role::SYS_ADMIN);

fn main() -> std::process::ExitCode {
    let _ = Cli::parse();

    let _guard = match logging::setup_logging("terminal") {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal exiting with error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = Config::load()?;
    let facade = SysVFacade::attach(&cfg)?;
    let pid = clock::self_pid();

    session_ops::login(&facade, "console", pid, CONSOLE_ROLE, 0, 0)?;
    print_help();

    let outcome = read_eval_loop(&facade, pid);

    session_ops::logout(&facade, pid)?;
    facade.close(false);
    outcome
}

enum LoopOutcome {
    ConsoleExited,
    SystemStopped,
    ShuttingDown,
}

fn read_eval_loop<F: Facade>(facade: &F, pid: i32) -> Result<()> {
    enable_raw_mode().map_err(|source| wh_core::WarehouseError::ResourceInit { resource: "terminal raw mode", source })?;
    let outcome = read_eval_loop_inner(facade, pid);
    let _ = disable_raw_mode();

    match outcome? {
        LoopOutcome::ConsoleExited => tracing::info!("console closed by operator"),
        LoopOutcome::SystemStopped => tracing::info!("warehouse stopped by operator"),
        LoopOutcome::ShuttingDown => tracing::info!("console exiting: warehouse is shutting down"),
    }
    Ok(())
}

fn read_eval_loop_inner<F: Facade>(facade: &F, pid: i32) -> Result<LoopOutcome> {
    let mut line = String::new();
    write_prompt(&line);

    loop {
        if !facade.is_running() {
            return Ok(LoopOutcome::ShuttingDown);
        }

        let has_event = event::poll(INPUT_POLL_TIMEOUT)
            .map_err(|source| wh_core::WarehouseError::ResourceInit { resource: "terminal input poll", source })?;
        if !has_event {
            continue;
        }

        let ev = event::read()
            .map_err(|source| wh_core::WarehouseError::ResourceInit { resource: "terminal input read", source })?;
        let Event::Key(key) = ev else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Enter => {
                print!("\r\n");
                let command = line.trim().to_lowercase();
                line.clear();
                match dispatch(facade, pid, &command)? {
                    Some(outcome @ LoopOutcome::ConsoleExited) | Some(outcome @ LoopOutcome::SystemStopped) => {
                        return Ok(outcome)
                    }
                    _ => write_prompt(&line),
                }
            }
            KeyCode::Backspace => {
                line.pop();
                write_prompt(&line);
            }
            KeyCode::Char(c) => {
                line.push(c);
                write_prompt(&line);
            }
            _ => {}
        }
    }
}

fn write_prompt(line: &str) {
    print!("\r> {line}");
    let _ = std::io::stdout().flush();
}

fn dispatch<F: Facade>(facade: &F, pid: i32, command: &str) -> Result<Option<LoopOutcome>> {
    let role = session_ops::current_role(facade, pid)?;

    match command {
        "vip" => {
            if !role.intersects(Role::OPERATOR | Role::SYS_ADMIN) {
                println_raw("permission denied: vip requires Operator or SysAdmin");
                return Ok(None);
            }
            match session_ops::find_pid_by_username(facade, "System-Express")? {
                Some(target) => match facade.send(CommandMessage::new(RecipientTag::for_pid(target), CommandId::ExpressLoad)) {
                    Ok(()) => println_raw("EXPRESS_LOAD sent"),
                    Err(e) => {
                        tracing::warn!(target, error = %e, "failed to send EXPRESS_LOAD, command may be lost");
                        println_raw("failed to deliver EXPRESS_LOAD");
                    }
                },
                None => println_raw("no express session is currently logged in"),
            }
            Ok(None)
        }
        "depart" => {
            if !role.intersects(Role::OPERATOR | Role::SYS_ADMIN) {
                println_raw("permission denied: depart requires Operator or SysAdmin");
                return Ok(None);
            }
            let occupant = facade.with_dock(|dock| dock.is_present.then_some(dock.id))?;
            match occupant {
                Some(truck_id) => match facade.send(CommandMessage::new(RecipientTag::for_pid(truck_id), CommandId::Departure)) {
                    Ok(()) => println_raw("DEPARTURE sent"),
                    Err(e) => {
                        tracing::warn!(truck_id, error = %e, "failed to send DEPARTURE, command may be lost");
                        println_raw("failed to deliver DEPARTURE");
                    }
                },
                None => println_raw("no truck is currently docked"),
            }
            Ok(None)
        }
        "stop" => {
            if !role.intersects(Role::SYS_ADMIN) {
                println_raw("permission denied: stop requires SysAdmin");
                return Ok(None);
            }
            for session_pid in session_ops::active_session_pids(facade)? {
                if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(session_pid), CommandId::EndWork)) {
                    tracing::warn!(session_pid, error = %e, "failed to send END_WORK, command may be lost");
                }
            }
            facade.stop_world()?;
            println_raw("stopping the warehouse");
            Ok(Some(LoopOutcome::SystemStopped))
        }
        "help" => {
            print_help();
            Ok(None)
        }
        "exit" | "quit" => {
            println_raw("closing console");
            Ok(Some(LoopOutcome::ConsoleExited))
        }
        "" => Ok(None),
        other => {
            println_raw(&format!("unrecognized command: {other:?} (try \"help\")"));
            Ok(None)
        }
    }
}

fn println_raw(msg: &str) {
    print!("{msg}\r\n");
}

fn print_help() {
    println_raw("commands:");
    println_raw("  vip     send an express load to the System-Express session (Operator/SysAdmin)");
    println_raw("  depart  force the docked truck to depart (Operator/SysAdmin)");
    println_raw("  stop    end every session and shut the warehouse down (SysAdmin)");
    println_raw("  help    show this menu");
    println_raw("  exit/quit  close this console only");
}

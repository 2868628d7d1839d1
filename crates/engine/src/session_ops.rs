// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry operations, exercised through `belt.mutex` (reused as
//! the registry mutex — see the design ledger's broadcast/locking
//! decisions). This module is a thin pass-through to
//! [`wh_core::SessionRegistry`]; its only job is mapping
//! [`wh_core::session::LoginError`] onto [`WarehouseError`].

use wh_core::session::LoginError;
use wh_core::{Result, Role, WarehouseError};
use wh_ipc::Facade;

/// Admit a new session under `belt.mutex`.
pub fn login<F: Facade>(
    facade: &F,
    username: &str,
    session_pid: i32,
    role: Role,
    org_id: i32,
    max_processes: i32,
) -> Result<usize> {
    let outcome = facade.with_belt(|_, registry| registry.login(username, session_pid, role, org_id, max_processes))?;
    outcome.map_err(|e| match e {
        LoginError::DuplicateName => WarehouseError::DuplicateName(username.to_string()),
        LoginError::Full => WarehouseError::SessionFull,
    })
}

pub fn logout<F: Facade>(facade: &F, session_pid: i32) -> Result<()> {
    facade.with_belt(|_, registry| registry.logout(session_pid))
}

pub fn current_role<F: Facade>(facade: &F, session_pid: i32) -> Result<Role> {
    facade.with_belt(|_, registry| registry.current_role(session_pid))
}

pub fn session_index<F: Facade>(facade: &F, session_pid: i32) -> Result<Option<usize>> {
    facade.with_belt(|_, registry| registry.session_index(session_pid))
}

/// Atomically check-and-increment the caller's process quota. `false` means
/// the quota was already exhausted and the caller must not spawn.
pub fn try_spawn_process<F: Facade>(facade: &F, session_pid: i32) -> Result<bool> {
    facade.with_belt(|_, registry| registry.try_spawn_process(session_pid))
}

pub fn report_process_finished<F: Facade>(facade: &F, session_pid: i32) -> Result<()> {
    facade.with_belt(|_, registry| registry.report_process_finished(session_pid))
}

/// Resolve the pid of the session named `username`, used by the terminal
/// to address `vip` at "System-Express" and `depart`/`stop` at whichever
/// pids are currently active.
pub fn find_pid_by_username<F: Facade>(facade: &F, username: &str) -> Result<Option<i32>> {
    facade.with_belt(|_, registry| registry.find_by_username(username).map(|row| row.session_pid))
}

/// Every active session's pid, used by the orchestrator/terminal to
/// broadcast `END_WORK` / `stop`.
pub fn active_session_pids<F: Facade>(facade: &F) -> Result<Vec<i32>> {
    facade.with_belt(|_, registry| registry.active_rows().map(|row| row.session_pid).collect())
}

#[cfg(test)]
#[path = "session_ops_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session registry: who is logged in, with what role, under what
//! process-spawn quota.
//!
//! All operations here are serialized by the caller under `belt.mutex`,
//! reused as the registry mutex — this module does not take a lock itself,
//! it just enforces the registry's invariants once the caller holds one.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Fixed session-table size (`U`).
pub const DEFAULT_SESSION_SLOTS: usize = 5;

pub const MAX_SESSION_SLOTS: usize = 16;

/// Longest username a row can hold (`username[32]` in the spec).
pub const USERNAME_CAP: usize = 32;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Role: u16 {
        const VIEWER    = 1 << 0;
        const OPERATOR  = 1 << 1;
        const ORG_ADMIN = 1 << 2;
        const SYS_ADMIN = 1 << 3;
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_bits_truncate(u16::deserialize(deserializer)?))
    }
}

/// A fixed-size username buffer, analogous to the spec's `username[32]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct UsernameBuf {
    len: u8,
    buf: [u8; USERNAME_CAP],
}

impl UsernameBuf {
    pub const fn empty() -> Self {
        Self { len: 0, buf: [0; USERNAME_CAP] }
    }

    pub fn new(s: &str) -> Self {
        let len = s.len().min(USERNAME_CAP);
        let mut buf = [0u8; USERNAME_CAP];
        buf[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self { len: len as u8, buf }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("")
    }
}

/// One row of the session registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct UserSession {
    pub active: bool,
    pub username: UsernameBuf,
    pub session_pid: i32,
    pub role: Role,
    pub org_id: i32,
    pub max_processes: i32,
    pub current_processes: i32,
}

impl Default for UserSession {
    fn default() -> Self {
        Self {
            active: false,
            username: UsernameBuf::empty(),
            session_pid: 0,
            role: Role::empty(),
            org_id: 0,
            max_processes: 0,
            current_processes: 0,
        }
    }
}

/// Errors specific to registry admission; mapped to
/// [`crate::WarehouseError`] by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    DuplicateName,
    Full,
}

/// Fixed array of `U` session rows.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SessionRegistry {
    len: usize,
    rows: [UserSession; MAX_SESSION_SLOTS],
}

impl SessionRegistry {
    pub fn new(len: usize) -> Self {
        assert!(len > 0 && len <= MAX_SESSION_SLOTS, "session slot count out of range");
        Self { len, rows: [UserSession::default(); MAX_SESSION_SLOTS] }
    }

    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn rows(&self) -> &[UserSession] {
        &self.rows[..self.len]
    }

    pub fn active_rows(&self) -> impl Iterator<Item = &UserSession> {
        self.rows().iter().filter(|r| r.active)
    }

    /// Admit a new session. Rejects a duplicate active username before
    /// looking for a free slot.
    pub fn login(
        &mut self,
        username: &str,
        session_pid: i32,
        role: Role,
        org_id: i32,
        max_processes: i32,
    ) -> Result<usize, LoginError> {
        if self.rows[..self.len].iter().any(|r| r.active && r.username.as_str() == username) {
            return Err(LoginError::DuplicateName);
        }
        let Some(idx) = self.rows[..self.len].iter().position(|r| !r.active) else {
            return Err(LoginError::Full);
        };
        self.rows[idx] = UserSession {
            active: true,
            username: UsernameBuf::new(username),
            session_pid,
            role,
            org_id,
            max_processes,
            current_processes: 0,
        };
        Ok(idx)
    }

    /// Clear the row belonging to `session_pid`, if any.
    pub fn logout(&mut self, session_pid: i32) {
        if let Some(row) = self.rows[..self.len].iter_mut().find(|r| r.active && r.session_pid == session_pid) {
            *row = UserSession::default();
        }
    }

    pub fn session_index(&self, session_pid: i32) -> Option<usize> {
        self.rows[..self.len].iter().position(|r| r.active && r.session_pid == session_pid)
    }

    pub fn current_role(&self, session_pid: i32) -> Role {
        self.session_index(session_pid).map(|i| self.rows[i].role).unwrap_or(Role::empty())
    }

    /// Atomically check-and-increment the caller's process quota.
    pub fn try_spawn_process(&mut self, session_pid: i32) -> bool {
        let Some(idx) = self.session_index(session_pid) else {
            return false;
        };
        let row = &mut self.rows[idx];
        if row.current_processes >= row.max_processes {
            return false;
        }
        row.current_processes += 1;
        true
    }

    /// Saturating decrement; a no-op if already at zero.
    pub fn report_process_finished(&mut self, session_pid: i32) {
        if let Some(idx) = self.session_index(session_pid) {
            let row = &mut self.rows[idx];
            row.current_processes = row.current_processes.saturating_sub(1);
        }
    }

    pub fn find_by_username(&self, username: &str) -> Option<&UserSession> {
        self.rows[..self.len].iter().find(|r| r.active && r.username.as_str() == username)
    }

    /// Checks that active usernames stay distinct and
    /// `0 <= current_processes <= max_processes`.
    pub fn check_invariant(&self) -> bool {
        let active: Vec<&str> = self.active_rows().map(|r| r.username.as_str()).collect();
        let mut sorted = active.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != active.len() {
            return false;
        }
        self.active_rows().all(|r| r.current_processes >= 0 && r.current_processes <= r.max_processes)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

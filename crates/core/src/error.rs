// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one error vocabulary shared by the facade, engine, and runtime crates.

use thiserror::Error;

/// Disposition (fatal vs recoverable) is documented on each variant below.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `(S, Σ, Q)` could not be created or attached. Fatal: the owning
    /// process should exit non-zero.
    #[error("failed to initialize IPC resource {resource}: {source}")]
    ResourceInit {
        resource: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A blocking wait was aborted because `S.running` was cleared.
    #[error("shutting down")]
    ShuttingDown,

    /// The message queue rejected `send` because it is saturated.
    #[error("message queue full, command to {recipient} dropped")]
    QueueFull { recipient: i64 },

    /// The session registry has no free row.
    #[error("session registry is full")]
    SessionFull,

    /// `login` was attempted with a username already active.
    #[error("username {0:?} is already logged in")]
    DuplicateName(String),

    /// `try_spawn_process` observed the session's quota already saturated.
    #[error("process quota exceeded for session {0}")]
    QuotaExceeded(i32),

    /// A structural invariant was observed broken (dock identity mismatch,
    /// negative count, etc). The affected role aborts its current cycle.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The command issuer's role mask does not authorize the command.
    #[error("permission denied: {command} requires one of {required:?}")]
    PermissionDenied { command: &'static str, required: &'static [&'static str] },
}

pub type Result<T> = std::result::Result<T, WarehouseError>;

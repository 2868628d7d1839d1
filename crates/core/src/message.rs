// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message-queue wire format: a typed, per-recipient command.

use serde::{Deserialize, Serialize};

/// Opaque recipient address. Always a real process id in this
/// implementation — there is no implicit wildcard `mtype`. Broadcast is
/// realized by the orchestrator iterating active sessions and calling
/// [`RecipientTag::for_pid`] once per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientTag(pub i64);

impl RecipientTag {
    pub fn for_pid(pid: i32) -> Self {
        Self(pid as i64)
    }

    pub fn this_process() -> Self {
        Self::for_pid(std::process::id() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum CommandId {
    None = 0,
    Departure = 1,
    ExpressLoad = 2,
    EndWork = 3,
}

impl CommandId {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::None),
            1 => Some(Self::Departure),
            2 => Some(Self::ExpressLoad),
            3 => Some(Self::EndWork),
            _ => None,
        }
    }
}

/// Wire message as laid out over the queue: `{i64 recipient_tag, i32 command_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct CommandMessage {
    pub recipient_tag: i64,
    pub command_id: i32,
}

impl CommandMessage {
    pub fn new(to: RecipientTag, command: CommandId) -> Self {
        Self { recipient_tag: to.0, command_id: command as i32 }
    }

    pub fn recipient(&self) -> RecipientTag {
        RecipientTag(self.recipient_tag)
    }

    pub fn command(&self) -> Option<CommandId> {
        CommandId::from_i32(self.command_id)
    }
}

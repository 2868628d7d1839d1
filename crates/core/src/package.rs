// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Packages: the unit of cargo that flows belt → dock → truck.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Maximum number of audit records a package carries. Append-only; the log
/// saturates silently once full.
pub const AUDIT_LOG_CAP: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PackageType {
    A = 0,
    B = 1,
    C = 2,
}

bitflags! {
    /// `status` bitmask: a package can be `Express` and `Loaded` at once
    /// (an express batch item that has already been admitted).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PackageStatus: u8 {
        const NORMAL  = 0b0000_0001;
        const EXPRESS = 0b0000_0010;
        const LOADED  = 0b0000_0100;
    }
}

bitflags! {
    /// Audit action bitmask. Composed as `event | actor`, e.g.
    /// `ActionFlag::CREATED | ActionFlag::BY_WORKER`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ActionFlag: u16 {
        // events
        const CREATED         = 1 << 0;
        const LOADED_TO_TRUCK = 1 << 1;
        const FORCED_RETRY    = 1 << 2;
        const DEAD_LETTERED   = 1 << 3;
        // actors
        const BY_WORKER     = 1 << 8;
        const BY_DISPATCHER = 1 << 9;
        const BY_EXPRESS    = 1 << 10;
        const BY_TRUCK      = 1 << 11;
        const BY_SYSTEM     = 1 << 12;
    }
}

macro_rules! impl_bitflags_serde {
    ($ty:ty, $repr:ty) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.bits().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bits = <$repr>::deserialize(deserializer)?;
                Ok(Self::from_bits_truncate(bits))
            }
        }
    };
}

impl_bitflags_serde!(PackageStatus, u8);
impl_bitflags_serde!(ActionFlag, u16);

/// One append-only audit entry. `actor_pid` is the OS process id that
/// performed `action`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct AuditRecord {
    pub action: ActionFlag,
    pub actor_pid: i32,
    pub timestamp: u64,
}

/// A package in flight between belt, dock, and truck.
///
/// `id` is assigned at belt entry (monotonic, strictly increasing) except
/// for express packages, which are assigned under the same belt-mutex-gated
/// counter without ever occupying a belt slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Package {
    pub id: u64,
    pub producer_pid: i32,
    pub last_editor_pid: i32,
    pub package_type: PackageType,
    pub status: PackageStatus,
    pub weight: f64,
    pub volume: f64,
    pub created_at: u64,
    pub updated_at: u64,
    audit_len: u8,
    audit: [AuditRecord; AUDIT_LOG_CAP],
}

impl Package {
    const EMPTY_RECORD: AuditRecord = AuditRecord { action: ActionFlag::empty(), actor_pid: 0, timestamp: 0 };

    /// Build a freshly created package. `id` is filled in by the belt (or by
    /// the express allocator) once the creation-time mutex is held, so it
    /// starts at 0 here.
    pub fn new(producer_pid: i32, package_type: PackageType, weight: f64, volume: f64, now: u64) -> Self {
        let mut p = Self {
            id: 0,
            producer_pid,
            last_editor_pid: producer_pid,
            package_type,
            status: PackageStatus::NORMAL,
            weight,
            volume,
            created_at: now,
            updated_at: now,
            audit_len: 0,
            audit: [Self::EMPTY_RECORD; AUDIT_LOG_CAP],
        };
        p.audit(ActionFlag::CREATED | ActionFlag::BY_WORKER, producer_pid, now);
        p
    }

    /// Append an audit record, saturating silently at [`AUDIT_LOG_CAP`].
    pub fn audit(&mut self, action: ActionFlag, actor_pid: i32, timestamp: u64) {
        self.last_editor_pid = actor_pid;
        self.updated_at = timestamp;
        if (self.audit_len as usize) < AUDIT_LOG_CAP {
            self.audit[self.audit_len as usize] = AuditRecord { action, actor_pid, timestamp };
            self.audit_len += 1;
        }
    }

    pub fn audit_log(&self) -> &[AuditRecord] {
        &self.audit[..self.audit_len as usize]
    }

    /// Zero the package in place, used when a belt slot is popped, so a
    /// reused slot can never leak a previous occupant's audit history.
    pub fn zero(&mut self) {
        *self = Self {
            id: 0,
            producer_pid: 0,
            last_editor_pid: 0,
            package_type: PackageType::A,
            status: PackageStatus::empty(),
            weight: 0.0,
            volume: 0.0,
            created_at: 0,
            updated_at: 0,
            audit_len: 0,
            audit: [Self::EMPTY_RECORD; AUDIT_LOG_CAP],
        };
    }

    pub fn is_loaded(&self) -> bool {
        self.status.contains(PackageStatus::LOADED)
    }

    pub fn mark_loaded(&mut self, actor_pid: i32, timestamp: u64) {
        self.status.insert(PackageStatus::LOADED);
        self.audit(ActionFlag::LOADED_TO_TRUCK | ActionFlag::BY_DISPATCHER, actor_pid, timestamp);
    }
}

impl Default for Package {
    /// The zero package occupying an empty belt slot.
    fn default() -> Self {
        Self {
            id: 0,
            producer_pid: 0,
            last_editor_pid: 0,
            package_type: PackageType::A,
            status: PackageStatus::empty(),
            weight: 0.0,
            volume: 0.0,
            created_at: 0,
            updated_at: 0,
            audit_len: 0,
            audit: [Self::EMPTY_RECORD; AUDIT_LOG_CAP],
        }
    }
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;

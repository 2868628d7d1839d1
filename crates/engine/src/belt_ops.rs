// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The belt protocol that brackets [`wh_core::Belt::push_slot`]/`pop_slot`
//! with the `belt.empty`/`belt.full`/`belt.mutex` semaphore trio. The belt
//! itself has no idea these semaphores exist; this module is the seam.

use wh_core::{Package, Result, WarehouseError};
use wh_ipc::Facade;

/// Wait for a free slot, write `p` in under `belt.mutex`, then announce the
/// fill. Returns the belt-assigned package id.
pub fn push<F: Facade>(facade: &F, p: Package) -> Result<u64> {
    facade.wait_belt_empty()?;
    let id = facade.with_belt(|belt, _| belt.push_slot(p))?.ok_or_else(|| {
        WarehouseError::InvariantViolation("push observed a full belt after a successful empty-slot wait".into())
    })?;
    facade.post_belt_full()?;
    Ok(id)
}

/// Wait for a filled slot, read and zero it under `belt.mutex`, then
/// announce the vacancy.
pub fn pop<F: Facade>(facade: &F) -> Result<Package> {
    facade.wait_belt_full()?;
    let p = facade.with_belt(|belt, _| belt.pop_slot())?.ok_or_else(|| {
        WarehouseError::InvariantViolation("pop observed an empty belt after a successful full-slot wait".into())
    })?;
    facade.post_belt_empty()?;
    Ok(p)
}

/// Register a worker, bounded by `max`. `false` means the population cap
/// was already reached and the caller should not start producing.
pub fn register_worker<F: Facade>(facade: &F, max: u32) -> Result<bool> {
    facade.with_belt(|belt, _| belt.register_worker(max))
}

pub fn unregister_worker<F: Facade>(facade: &F) -> Result<()> {
    facade.with_belt(|belt, _| belt.unregister_worker())
}

#[cfg(test)]
#[path = "belt_ops_tests.rs"]
mod tests;

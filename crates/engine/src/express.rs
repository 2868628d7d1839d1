// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The express lane: priority loads that bypass `belt.*` entirely and are
//! admitted straight into the dock. Express competes for `dock.mutex`
//! fairly with the dispatcher — there is no priority inheritance, and
//! "bypass" only means skipping the belt, not preempting anyone.

use wh_core::{ActionFlag, CommandId, CommandMessage, Package, PackageStatus, RecipientTag, Result};
use wh_ipc::Facade;

use crate::clock;
use crate::rng::WarehouseRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipOutcome {
    Loaded,
    /// No truck was present, or the package didn't fit; the order is
    /// dropped rather than queued, so the express path never stalls.
    Dropped,
}

/// Allocate one VIP package and attempt to load it in a single dock
/// encounter — no retry loop, unlike the dispatcher.
pub fn deliver_vip_package<F: Facade>(facade: &F, rng: &mut WarehouseRng) -> Result<VipOutcome> {
    let pid = clock::self_pid();
    let now = clock::now_ms();
    let id = facade.with_belt(|belt, _| belt.next_package_id())?;
    let mut package = Package::new(pid, rng.package_type(), rng.package_weight(), rng.package_volume(), now);
    package.id = id;
    package.status.insert(PackageStatus::EXPRESS);
    package.audit(ActionFlag::CREATED | ActionFlag::BY_EXPRESS, pid, now);

    let loaded = facade.with_dock(|dock| {
        if !dock.is_present || !dock.fits(package.weight, package.volume).all() {
            return None;
        }
        dock.load(package.weight, package.volume);
        Some((dock.id, dock.should_depart()))
    })?;

    match loaded {
        Some((truck_id, should_depart)) => {
            package.mark_loaded(pid, clock::now_ms());
            if should_depart {
                if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(truck_id), CommandId::Departure)) {
                    tracing::warn!(truck_id, error = %e, "failed to send DEPARTURE, command may be lost");
                }
            }
            Ok(VipOutcome::Loaded)
        }
        None => {
            tracing::warn!(package_id = package.id, "VIP package dropped: no truck present or package did not fit");
            Ok(VipOutcome::Dropped)
        }
    }
}

pub struct BatchOutcome {
    pub attempted: usize,
    pub loaded: usize,
    pub truck_id: Option<i32>,
}

/// Load 3-5 randomly typed packages directly into the current truck in one
/// `dock.mutex` critical section, stopping at the first one that doesn't
/// fit and signaling `DEPARTURE` for that truck.
pub fn deliver_express_batch<F: Facade>(facade: &F, rng: &mut WarehouseRng) -> Result<BatchOutcome> {
    let pid = clock::self_pid();
    let now = clock::now_ms();
    let batch_size = rng.express_batch_size();
    let mut batch = Vec::with_capacity(batch_size);
    for _ in 0..batch_size {
        let id = facade.with_belt(|belt, _| belt.next_package_id())?;
        let mut p = Package::new(pid, rng.package_type(), rng.package_weight(), rng.package_volume(), now);
        p.id = id;
        p.status.insert(PackageStatus::EXPRESS);
        batch.push(p);
    }

    let (loaded, truck_id) = facade.with_dock(|dock| {
        if !dock.is_present {
            return (0, None);
        }
        let truck_id = dock.id;
        let mut loaded = 0;
        for p in &batch {
            if !dock.fits(p.weight, p.volume).all() {
                break;
            }
            dock.load(p.weight, p.volume);
            loaded += 1;
        }
        (loaded, Some(truck_id))
    })?;

    if loaded < batch.len() {
        if let Some(truck_id) = truck_id {
            if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(truck_id), CommandId::Departure)) {
                tracing::warn!(truck_id, error = %e, "failed to send DEPARTURE, command may be lost");
            }
        }
    }

    Ok(BatchOutcome { attempted: batch.len(), loaded, truck_id })
}

#[cfg(test)]
#[path = "express_tests.rs"]
mod tests;

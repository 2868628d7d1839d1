// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Belt → dock transfer: pop a package, then retry-load it into the docked
//! truck until it fits, the truck departs and a new one arrives, or the
//! package is dead-lettered.
//!
//! Known gap, left visible rather than silently patched: if this process
//! dies mid-retry after popping a package from the belt, that package is
//! gone. There is no durable "in-flight" slot recording a pop that hasn't
//! yet been admitted to a truck.

use wh_core::{ActionFlag, CommandId, CommandMessage, Config, Package, RecipientTag, Result, WarehouseError};
use wh_ipc::Facade;

use crate::{belt_ops, clock};

enum DockEncounter {
    NoTruck,
    Mismatch { truck_id: i32 },
    Loaded { truck_id: i32, should_depart: bool },
}

/// Pop packages off the belt and retry-load each one until shutdown.
pub fn run<F: Facade>(facade: &F, cfg: &Config) -> Result<()> {
    while facade.is_running() {
        let package = match belt_ops::pop(facade) {
            Ok(p) => p,
            Err(WarehouseError::ShuttingDown) => break,
            Err(e) => return Err(e),
        };
        retry_load(facade, cfg, package)?;
    }
    Ok(())
}

/// Drive one package through the dock admission protocol until it is
/// loaded, dead-lettered, or shutdown is requested.
pub fn retry_load<F: Facade>(facade: &F, cfg: &Config, mut package: Package) -> Result<()> {
    let mut dock_encounters: u32 = 0;
    loop {
        if !facade.is_running() {
            return Err(WarehouseError::ShuttingDown);
        }

        let encounter = facade.with_dock(|dock| {
            if !dock.is_present {
                return DockEncounter::NoTruck;
            }
            let fit = dock.fits(package.weight, package.volume);
            if fit.all() {
                dock.load(package.weight, package.volume);
                DockEncounter::Loaded { truck_id: dock.id, should_depart: dock.should_depart() }
            } else {
                DockEncounter::Mismatch { truck_id: dock.id }
            }
        })?;

        match encounter {
            DockEncounter::Loaded { truck_id, should_depart } => {
                package.mark_loaded(clock::self_pid(), clock::now_ms());
                if should_depart {
                    if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(truck_id), CommandId::Departure)) {
                        tracing::warn!(truck_id, error = %e, "failed to send DEPARTURE, command may be lost");
                    }
                }
                return Ok(());
            }
            DockEncounter::NoTruck => {
                dock_encounters += 1;
                if dock_encounters > cfg.dispatch_max_retries {
                    return dead_letter(facade, package);
                }
                std::thread::sleep(cfg.dispatcher_poll_backoff);
            }
            DockEncounter::Mismatch { truck_id } => {
                // Force the mismatched occupant out so a truck that can
                // host this package gets a chance to dock.
                if let Err(e) = facade.send(CommandMessage::new(RecipientTag::for_pid(truck_id), CommandId::Departure)) {
                    tracing::warn!(truck_id, error = %e, "failed to send forced DEPARTURE, command may be lost");
                }
                package.audit(ActionFlag::FORCED_RETRY | ActionFlag::BY_DISPATCHER, clock::self_pid(), clock::now_ms());
                dock_encounters += 1;
                if dock_encounters > cfg.dispatch_max_retries {
                    return dead_letter(facade, package);
                }
                std::thread::sleep(cfg.dispatcher_poll_backoff);
            }
        }
    }
}

fn dead_letter<F: Facade>(facade: &F, mut package: Package) -> Result<()> {
    package.audit(ActionFlag::DEAD_LETTERED | ActionFlag::BY_DISPATCHER, clock::self_pid(), clock::now_ms());
    let total = facade.record_dead_letter()?;
    tracing::error!(
        package_id = package.id,
        weight = package.weight,
        volume = package.volume,
        dead_lettered_total = total,
        "dead-lettering package: exceeded dispatch_max_retries dock encounters"
    );
    Ok(())
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

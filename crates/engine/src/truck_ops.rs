// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dock-occupancy FSM a truck process drives:
//! `Arriving -> Docked -> Departing -> EnRoute -> Arriving`, with a
//! terminal `Done` reached on `END_WORK`.

use std::thread;
use std::time::Duration;

use wh_core::{CommandId, Config, RecipientTag, Result};
use wh_ipc::Facade;

use crate::clock;
use crate::rng::WarehouseRng;

const ARRIVING_RETRY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A full cycle completed: this truck docked, was told to depart, and
    /// is now en route to arrive again.
    CycleComplete,
    /// `END_WORK` was received; this truck's run is over.
    Done,
}

/// Run one truck process's lifecycle until `END_WORK` or shutdown.
pub fn run<F: Facade>(facade: &F, cfg: &Config, rng: &mut WarehouseRng) -> Result<()> {
    let pid = clock::self_pid();
    loop {
        if !facade.is_running() {
            return Ok(());
        }
        match run_one_cycle(facade, cfg, rng, pid)? {
            Outcome::Done => return Ok(()),
            Outcome::CycleComplete => {}
        }
    }
}

fn run_one_cycle<F: Facade>(facade: &F, cfg: &Config, rng: &mut WarehouseRng, pid: i32) -> Result<Outcome> {
    arrive(facade, cfg, rng, pid)?;
    match await_docked_signal(facade, pid)? {
        CommandId::EndWork => Ok(Outcome::Done),
        _ => {
            depart(facade, pid)?;
            thread::sleep(rng.travel_time(cfg.truck_travel_time));
            Ok(Outcome::CycleComplete)
        }
    }
}

/// Loop claiming the dock until it is free, randomizing this occupancy's
/// capacities at the moment of the claim.
fn arrive<F: Facade>(facade: &F, cfg: &Config, rng: &mut WarehouseRng, pid: i32) -> Result<()> {
    loop {
        if !facade.is_running() {
            return Ok(());
        }
        let (max_load, max_weight, max_volume) = rng.truck_capacities(cfg);
        let claimed = facade.with_dock(|dock| {
            if dock.is_present {
                false
            } else {
                dock.claim(pid, max_load, max_weight, max_volume);
                true
            }
        })?;
        if claimed {
            return Ok(());
        }
        thread::sleep(ARRIVING_RETRY);
    }
}

/// Block until a command addressed to this truck resolves the `Docked`
/// state: `DEPARTURE` or `END_WORK`. Anything else is not expected on this
/// recipient tag and is ignored.
fn await_docked_signal<F: Facade>(facade: &F, pid: i32) -> Result<CommandId> {
    loop {
        let msg = facade.recv_blocking(RecipientTag::for_pid(pid))?;
        match msg.command() {
            Some(id @ CommandId::Departure) | Some(id @ CommandId::EndWork) => return Ok(id),
            _ => continue,
        }
    }
}

/// Clear the dock, guarded by the identity check: only the truck whose pid
/// matches `dock_truck.id` may vacate it. A mismatch means this truck lost
/// its slot somehow (a structural bug elsewhere) and is logged, not
/// silently tolerated.
fn depart<F: Facade>(facade: &F, pid: i32) -> Result<()> {
    let cleared = facade.with_dock(|dock| {
        if dock.id == pid {
            dock.vacate();
            true
        } else {
            false
        }
    })?;
    if cleared {
        facade.record_truck_departure()?;
    } else {
        tracing::error!(pid, "identity guard failed: dock occupant changed before this truck could depart");
    }
    Ok(())
}

#[cfg(test)]
#[path = "truck_ops_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dock: the single `TruckState` slot every loader and occupant truck
//! contends for under `dock.mutex`.

use serde::{Deserialize, Serialize};

/// Snapshot of the single dock slot.
///
/// While `is_present` holds, `id` names the one OS process allowed to clear
/// it; every other field is mutated under `dock.mutex` by whichever loader
/// (dispatcher or express) is admitting a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct TruckState {
    pub is_present: bool,
    pub id: i32,
    pub current_load: u32,
    pub max_load: u32,
    pub current_weight: f64,
    pub max_weight: f64,
    pub current_volume: f64,
    pub max_volume: f64,
}

impl TruckState {
    /// Claim the dock for `pid` with the given randomized capacities.
    /// Caller must already hold `dock.mutex` and have checked `!is_present`.
    pub fn claim(&mut self, pid: i32, max_load: u32, max_weight: f64, max_volume: f64) {
        *self = Self {
            is_present: true,
            id: pid,
            current_load: 0,
            max_load,
            current_weight: 0.0,
            max_weight,
            current_volume: 0.0,
            max_volume,
        };
    }

    /// Clear the dock. Caller is responsible for the identity guard
    /// (`self.id == self_pid`) before calling this — `TruckState` itself
    /// cannot know who the caller is.
    pub fn vacate(&mut self) {
        *self = Self::default();
    }

    pub fn fits(&self, weight: f64, volume: f64) -> FitCheck {
        FitCheck {
            weight: self.current_weight + weight <= self.max_weight,
            volume: self.current_volume + volume <= self.max_volume,
            slot: self.current_load < self.max_load,
        }
    }

    /// Admit one package's weight/volume/slot. Caller must have already
    /// checked [`TruckState::fits`] returns all-true.
    pub fn load(&mut self, weight: f64, volume: f64) {
        self.current_load += 1;
        self.current_weight += weight;
        self.current_volume += volume;
    }

    /// `true` once the truck is full by count, or within 1% of either
    /// capacity ceiling.
    pub fn should_depart(&self) -> bool {
        if self.current_load >= self.max_load {
            return true;
        }
        let weight_near_full = self.max_weight > 0.0 && self.current_weight >= self.max_weight * 0.99;
        let volume_near_full = self.max_volume > 0.0 && self.current_volume >= self.max_volume * 0.99;
        weight_near_full || volume_near_full
    }

    /// Checks that load/weight/volume stay within capacity whenever a truck is present.
    pub fn check_invariant(&self) -> bool {
        if !self.is_present {
            return true;
        }
        (0..=self.max_load).contains(&self.current_load)
            && (0.0..=self.max_weight).contains(&self.current_weight)
            && (0.0..=self.max_volume).contains(&self.current_volume)
    }
}

/// Result of [`TruckState::fits`]: each dimension checked independently so
/// the dispatcher can log exactly which one rejected a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitCheck {
    pub weight: bool,
    pub volume: bool,
    pub slot: bool,
}

impl FitCheck {
    pub fn all(self) -> bool {
        self.weight && self.volume && self.slot
    }
}

#[cfg(test)]
#[path = "truck_tests.rs"]
mod tests;

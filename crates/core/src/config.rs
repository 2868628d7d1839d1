// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized, overridable tunables for every crate in this workspace.
//!
//! A single `Config::load()` call gives every binary the same values: belt
//! size, dock capacity ranges, retry/backoff timing, and the three SysV
//! keys the orchestrator and workers agree on ahead of time.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::belt::DEFAULT_BELT_SLOTS;
use crate::session::DEFAULT_SESSION_SLOTS;

/// A closed range used for randomizing truck capacities and timing jitter.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Belt slot count (`K`).
    pub belt_slots: usize,
    /// Session table size (`U`).
    pub session_slots: usize,
    /// Worker process count (`W`).
    pub worker_count: usize,
    /// Number of distinct truck driver processes the orchestrator cycles
    /// through across the run (`T`).
    pub truck_cycles: usize,
    /// Dispatcher retry cap before a package is dead-lettered.
    pub dispatch_max_retries: u32,
    /// Optional soft ceiling on the belt's summed package weight, observed
    /// for monitoring only; slot count remains the sole admission gate.
    pub max_belt_weight: Option<f64>,
    pub truck_max_load: Range<u32>,
    pub truck_max_weight: Range<f64>,
    pub truck_max_volume: Range<f64>,
    pub worker_poll_backoff: Duration,
    pub dispatcher_poll_backoff: Duration,
    pub truck_travel_time: Range<Duration>,
    pub shm_key: i32,
    pub sem_key: i32,
    pub msg_key: i32,
    /// Upper bound on messages the command queue holds before `send` starts
    /// failing with `QueueFull`.
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            belt_slots: DEFAULT_BELT_SLOTS,
            session_slots: DEFAULT_SESSION_SLOTS,
            worker_count: 3,
            truck_cycles: 2,
            dispatch_max_retries: 50,
            max_belt_weight: None,
            truck_max_load: Range::new(5, 15),
            truck_max_weight: Range::new(200.0, 500.0),
            truck_max_volume: Range::new(20.0, 50.0),
            worker_poll_backoff: Duration::from_millis(200),
            dispatcher_poll_backoff: Duration::from_millis(150),
            truck_travel_time: Range::new(Duration::from_secs(2), Duration::from_secs(5)),
            shm_key: 1234,
            sem_key: 5678,
            msg_key: 9012,
            queue_capacity: 64,
        }
    }
}

impl Config {
    /// Starts from [`Config::default`] and overlays `warehouse.toml` if the
    /// `WH_CONFIG` environment variable points at a file that exists.
    /// Missing or unset `WH_CONFIG` is not an error; a present-but-malformed
    /// file is.
    pub fn load() -> crate::Result<Self> {
        let Ok(path) = std::env::var("WH_CONFIG") else {
            return Ok(Self::default());
        };
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|source| crate::WarehouseError::ResourceInit { resource: "warehouse.toml", source })?;
        toml::from_str(&raw).map_err(|e| crate::WarehouseError::InvariantViolation(format!("malformed config: {e}")))
    }
}

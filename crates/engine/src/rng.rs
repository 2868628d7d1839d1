// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seedable randomization carried by each component, per the "per-action
//! randomization" re-architecture: weights, volumes, delays, and batch
//! sizes all flow through one generator instance rather than ad hoc calls
//! to a thread-local source, so a scenario can be made reproducible by
//! fixing a seed.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wh_core::config::Range;
use wh_core::PackageType;

pub struct WarehouseRng(StdRng);

impl WarehouseRng {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn truck_capacities(&mut self, cfg: &wh_core::Config) -> (u32, f64, f64) {
        (
            self.0.gen_range(cfg.truck_max_load.min..=cfg.truck_max_load.max),
            self.0.gen_range(cfg.truck_max_weight.min..=cfg.truck_max_weight.max),
            self.0.gen_range(cfg.truck_max_volume.min..=cfg.truck_max_volume.max),
        )
    }

    pub fn travel_time(&mut self, range: Range<Duration>) -> Duration {
        let min = range.min.as_secs_f64();
        let max = range.max.as_secs_f64();
        Duration::from_secs_f64(self.0.gen_range(min..=max))
    }

    pub fn package_type(&mut self) -> PackageType {
        match self.0.gen_range(0..3) {
            0 => PackageType::A,
            1 => PackageType::B,
            _ => PackageType::C,
        }
    }

    pub fn package_weight(&mut self) -> f64 {
        self.0.gen_range(0.5..25.0)
    }

    pub fn package_volume(&mut self) -> f64 {
        self.0.gen_range(0.05..2.0)
    }

    /// Batch size for an express delivery: 3 to 5 packages inclusive.
    pub fn express_batch_size(&mut self) -> usize {
        self.0.gen_range(3..=5)
    }
}

impl Default for WarehouseRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

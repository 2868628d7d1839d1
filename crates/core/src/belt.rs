// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The belt: a fixed-capacity circular buffer of packages.
//!
//! This module is pure data plus the index arithmetic; it has no idea a
//! semaphore exists. `wh-engine::belt_ops` is the thing that brackets
//! [`Belt::push_slot`]/[`Belt::pop_slot`] with the `belt.empty`/`belt.full`/
//! `belt.mutex` protocol.

use crate::package::Package;

/// Default slot count when no override is configured.
pub const DEFAULT_BELT_SLOTS: usize = 10;

/// Maximum number of slots a `Belt` can be built with. Shared memory has a
/// fixed layout, so `K` is a compile-time ceiling with a runtime `len`.
pub const MAX_BELT_SLOTS: usize = 64;

/// Bounded circular buffer of [`Package`] held by value.
///
/// `count == (tail - head) mod len` is the load-bearing invariant; every
/// mutating method here restores it before returning, so any caller that
/// always goes through [`Belt::push_slot`]/[`Belt::pop_slot`] cannot observe
/// it broken. The "fatal invariant violation" edge case is
/// caught by [`Belt::push_slot`] returning `None` instead of panicking: the
/// engine crate is responsible for turning that into
/// `WarehouseError::InvariantViolation`.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Belt {
    len: usize,
    slots: [Package; MAX_BELT_SLOTS],
    head: usize,
    tail: usize,
    count: usize,
    pub total_weight: f64,
    pub worker_count: u32,
    pub total_packages_created: u64,
}

impl Belt {
    /// Build an empty belt with `len` slots (`len <= MAX_BELT_SLOTS`).
    pub fn new(len: usize) -> Self {
        assert!(len > 0 && len <= MAX_BELT_SLOTS, "belt slot count out of range");
        Self {
            len,
            slots: [Package::default(); MAX_BELT_SLOTS],
            head: 0,
            tail: 0,
            count: 0,
            total_weight: 0.0,
            worker_count: 0,
            total_packages_created: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.len
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_full(&self) -> bool {
        self.count == self.len
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Allocate the next id from the same monotonic counter [`Belt::push_slot`]
    /// draws from, without writing to any slot. Express/VIP packages never
    /// occupy a belt slot but still draw their id from this counter, under
    /// the same `belt.mutex`.
    pub fn next_package_id(&mut self) -> u64 {
        self.total_packages_created += 1;
        self.total_packages_created
    }

    /// Write `p` into the tail slot, assigning its belt id from the
    /// monotonic counter. Returns `None` for a full belt — a fatal
    /// invariant violation, since callers must have already gated entry on
    /// `belt.empty` and this should never happen in practice.
    pub fn push_slot(&mut self, mut p: Package) -> Option<u64> {
        if self.count >= self.len {
            return None;
        }
        p.id = self.next_package_id();
        self.total_weight += p.weight;
        let tail = self.tail;
        self.slots[tail] = p;
        self.tail = (self.tail + 1) % self.len;
        self.count += 1;
        Some(p.id)
    }

    /// Read and zero the head slot. Returns `None` if the belt was already
    /// empty (callers must have gated entry on `belt.full`).
    pub fn pop_slot(&mut self) -> Option<Package> {
        if self.count == 0 {
            return None;
        }
        let head = self.head;
        let p = self.slots[head];
        self.slots[head].zero();
        self.head = (self.head + 1) % self.len;
        self.count -= 1;
        self.total_weight -= p.weight;
        Some(p)
    }

    /// `true` once `worker_count` would exceed `max`.
    pub fn register_worker(&mut self, max: u32) -> bool {
        if self.worker_count >= max {
            return false;
        }
        self.worker_count += 1;
        true
    }

    pub fn unregister_worker(&mut self) {
        self.worker_count = self.worker_count.saturating_sub(1);
    }

    /// Checks that `count == (tail - head) mod len` still holds.
    pub fn check_invariant(&self) -> bool {
        let expected = (self.tail + self.len - self.head) % self.len;
        // When count == len, tail == head (wrapped), so the modular formula
        // collapses to 0; special-case the full belt.
        if self.count == self.len {
            self.tail == self.head
        } else {
            expected == self.count
        }
    }
}

#[cfg(test)]
#[path = "belt_tests.rs"]
mod tests;

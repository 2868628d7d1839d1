// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-process stand-in for the real IPC substrate.
//!
//! Same `Facade` contract, ordinary locks instead of semaphores and a
//! `VecDeque` instead of a message queue. Used by every `wh-engine` test so
//! belt/dock/dispatcher logic can be exercised without attaching to real
//! shared memory.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use wh_core::{Belt, CommandMessage, Config, RecipientTag, Result, SessionRegistry, TruckState, WarehouseError};

use crate::facade::Facade;
use crate::shutdown::ShutdownToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A counting semaphore built from a `Mutex<usize>` and a `Condvar`, woken
/// periodically so it can notice a cleared `ShutdownToken` even though
/// nothing posted to it.
struct CountingSem {
    value: Mutex<usize>,
    cond: Condvar,
}

impl CountingSem {
    fn new(initial: usize) -> Self {
        Self { value: Mutex::new(initial), cond: Condvar::new() }
    }

    fn wait(&self, token: &ShutdownToken) -> Result<()> {
        let mut value = self.value.lock();
        loop {
            if *value > 0 {
                *value -= 1;
                return Ok(());
            }
            if !token.is_running() {
                return Err(WarehouseError::ShuttingDown);
            }
            self.cond.wait_for(&mut value, POLL_INTERVAL);
        }
    }

    fn post(&self) {
        let mut value = self.value.lock();
        *value += 1;
        self.cond.notify_all();
    }
}

fn take_for(queue: &mut VecDeque<CommandMessage>, me: RecipientTag) -> Option<CommandMessage> {
    let pos = queue.iter().position(|m| m.recipient() == me)?;
    queue.remove(pos)
}

pub struct MemoryFacade {
    belt: Mutex<(Belt, SessionRegistry)>,
    dock: Mutex<TruckState>,
    empty: CountingSem,
    full: CountingSem,
    queue: Mutex<VecDeque<CommandMessage>>,
    queue_cond: Condvar,
    queue_capacity: usize,
    shutdown: ShutdownToken,
    dead_lettered: AtomicU64,
    trucks_completed: AtomicU64,
}

impl MemoryFacade {
    pub fn new(belt_slots: usize, session_slots: usize, queue_capacity: usize) -> Self {
        Self {
            belt: Mutex::new((Belt::new(belt_slots), SessionRegistry::new(session_slots))),
            dock: Mutex::new(TruckState::default()),
            empty: CountingSem::new(belt_slots),
            full: CountingSem::new(0),
            queue: Mutex::new(VecDeque::new()),
            queue_cond: Condvar::new(),
            queue_capacity,
            shutdown: ShutdownToken::new(),
            dead_lettered: AtomicU64::new(0),
            trucks_completed: AtomicU64::new(0),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.belt_slots, cfg.session_slots, cfg.queue_capacity)
    }
}

impl Facade for MemoryFacade {
    fn wait_belt_empty(&self) -> Result<()> {
        self.empty.wait(&self.shutdown)
    }

    fn post_belt_empty(&self) -> Result<()> {
        self.empty.post();
        Ok(())
    }

    fn wait_belt_full(&self) -> Result<()> {
        self.full.wait(&self.shutdown)
    }

    fn post_belt_full(&self) -> Result<()> {
        self.full.post();
        Ok(())
    }

    fn with_belt<R>(&self, f: impl FnOnce(&mut Belt, &mut SessionRegistry) -> R) -> Result<R> {
        let mut guard = self.belt.lock();
        let (belt, registry) = &mut *guard;
        Ok(f(belt, registry))
    }

    fn with_dock<R>(&self, f: impl FnOnce(&mut TruckState) -> R) -> Result<R> {
        let mut guard = self.dock.lock();
        Ok(f(&mut guard))
    }

    fn send(&self, msg: CommandMessage) -> Result<()> {
        let mut queue = self.queue.lock();
        if queue.len() >= self.queue_capacity {
            return Err(WarehouseError::QueueFull { recipient: msg.recipient_tag });
        }
        queue.push_back(msg);
        self.queue_cond.notify_all();
        Ok(())
    }

    fn recv_blocking(&self, me: RecipientTag) -> Result<CommandMessage> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(msg) = take_for(&mut queue, me) {
                return Ok(msg);
            }
            if !self.shutdown.is_running() {
                return Err(WarehouseError::ShuttingDown);
            }
            self.queue_cond.wait_for(&mut queue, POLL_INTERVAL);
        }
    }

    fn recv_nonblocking(&self, me: RecipientTag) -> Option<CommandMessage> {
        let mut queue = self.queue.lock();
        take_for(&mut queue, me)
    }

    fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    fn stop_world(&self) -> Result<()> {
        self.shutdown.request_shutdown();
        self.empty.cond.notify_all();
        self.full.cond.notify_all();
        self.queue_cond.notify_all();
        Ok(())
    }

    fn record_dead_letter(&self) -> Result<u64> {
        Ok(self.dead_lettered.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn record_truck_departure(&self) -> Result<u64> {
        Ok(self.trucks_completed.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

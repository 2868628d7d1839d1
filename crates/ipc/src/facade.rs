// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between IPC mechanics and everything that sits on top of them.
//!
//! `wh-engine` is written against this trait, never against `SysVFacade` or
//! `MemoryFacade` directly, so the same belt/dock/dispatcher logic runs
//! unmodified in production (real shared memory, semaphores, a message
//! queue) and in tests (one process, ordinary locks).

use wh_core::{Belt, CommandMessage, RecipientTag, Result, SessionRegistry, TruckState};

use crate::shutdown::ShutdownToken;

/// Operations available over the shared region, the semaphore set, and the
/// message queue.
///
/// Contracts every implementation must uphold:
/// - `wait_belt_empty`/`wait_belt_full` retry on interrupt unless shutdown
///   has been requested, in which case they return `ShuttingDown` without
///   decrementing.
/// - `with_belt` and `with_dock` never perform a blocking wait while their
///   mutex is held; only O(1) field updates happen inside the closure.
pub trait Facade: Send + Sync {
    /// Block until a belt slot is free. Mirrors `sem_wait(belt.empty)`.
    fn wait_belt_empty(&self) -> Result<()>;
    /// Release one belt slot back to producers. Mirrors `sem_post(belt.empty)`.
    fn post_belt_empty(&self) -> Result<()>;
    /// Block until a belt slot is filled. Mirrors `sem_wait(belt.full)`.
    fn wait_belt_full(&self) -> Result<()>;
    /// Announce one filled belt slot to consumers. Mirrors `sem_post(belt.full)`.
    fn post_belt_full(&self) -> Result<()>;

    /// Run `f` with exclusive access to the belt and the session registry,
    /// serialized on `belt.mutex` (the registry reuses this same mutex).
    fn with_belt<R>(&self, f: impl FnOnce(&mut Belt, &mut SessionRegistry) -> R) -> Result<R>;

    /// Run `f` with exclusive access to the single dock slot, serialized on
    /// `dock.mutex`.
    fn with_dock<R>(&self, f: impl FnOnce(&mut TruckState) -> R) -> Result<R>;

    /// Enqueue a command. Non-blocking; fails with `QueueFull` if the queue
    /// is saturated.
    fn send(&self, msg: CommandMessage) -> Result<()>;

    /// Block until a message addressed to `me` arrives, or shutdown is
    /// requested.
    fn recv_blocking(&self, me: RecipientTag) -> Result<CommandMessage>;

    /// Return the first queued message addressed to `me`, if any, without
    /// blocking.
    fn recv_nonblocking(&self, me: RecipientTag) -> Option<CommandMessage>;

    /// The cancellation flag this facade's waits are gated on.
    fn shutdown_token(&self) -> &ShutdownToken;

    /// Convenience: `true` while the shared `running` flag (or its
    /// in-process analogue) is still set.
    fn is_running(&self) -> bool {
        self.shutdown_token().is_running()
    }

    /// Clear the shared `running` flag and the local shutdown token in one
    /// step. Orchestrator-only; every other role learns of shutdown through
    /// `END_WORK` on the queue or by observing [`Facade::is_running`] turn
    /// false between retries.
    fn stop_world(&self) -> Result<()>;

    /// Increment the shared dead-letter counter and return its new value.
    /// The dispatcher is this counter's only writer, so no dedicated
    /// mutex is introduced for it; implementations may serialize it on
    /// whichever mutex is cheapest to reuse.
    fn record_dead_letter(&self) -> Result<u64>;

    /// Increment the shared `trucks_completed` counter and return its new
    /// value. Called once a truck has cleared the dock, which already
    /// happens under `dock.mutex`, so this reuses that same mutex rather
    /// than adding a third.
    fn record_truck_departure(&self) -> Result<u64>;
}

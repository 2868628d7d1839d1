// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The production `Facade`: real shared memory, a real semaphore set, a
//! real message queue.

use wh_core::{
    Belt, CommandMessage, Config, RecipientTag, Result, SessionRegistry, SharedState, TruckState, WarehouseError,
};

use super::raw;
use crate::facade::Facade;
use crate::shutdown::ShutdownToken;

const SEM_BELT_MUTEX: i16 = 0;
const SEM_BELT_EMPTY: i16 = 1;
const SEM_BELT_FULL: i16 = 2;
const SEM_DOCK_MUTEX: i16 = 3;
const SEM_COUNT: i32 = 4;

/// A live attachment to `(S, Σ, Q)`.
pub struct SysVFacade {
    shm_id: i32,
    sem_id: i32,
    msg_id: i32,
    state: *mut SharedState,
    shutdown: ShutdownToken,
}

// The pointee is only ever mutated while this process holds the matching
// OS semaphore (belt.mutex or dock.mutex); the mutex, not the borrow
// checker, is what rules out concurrent mutation.
#[allow(unsafe_code)]
unsafe impl Send for SysVFacade {}
#[allow(unsafe_code)]
unsafe impl Sync for SysVFacade {}

impl SysVFacade {
    /// Create and initialize all three IPC resources. Called once, by the
    /// orchestrator, before any other role attaches.
    pub fn create(cfg: &Config) -> Result<Self> {
        let shm_id = raw::shmget(cfg.shm_key, std::mem::size_of::<SharedState>())?;
        let ptr = raw::shmat(shm_id)? as *mut SharedState;
        let sem_id = raw::semget(cfg.sem_key, SEM_COUNT)?;
        let msg_id = raw::msgget(cfg.msg_key)?;

        #[allow(unsafe_code)]
        // SAFETY: ptr was just attached and no other process has seen it
        // yet; writing the initial value here is the one place that holds.
        unsafe {
            ptr.write(SharedState::new(cfg.belt_slots, cfg.session_slots));
        }

        raw::semctl_setval(sem_id, SEM_BELT_MUTEX as i32, 1)?;
        raw::semctl_setval(sem_id, SEM_BELT_EMPTY as i32, cfg.belt_slots as i32)?;
        raw::semctl_setval(sem_id, SEM_BELT_FULL as i32, 0)?;
        raw::semctl_setval(sem_id, SEM_DOCK_MUTEX as i32, 1)?;

        Ok(Self { shm_id, sem_id, msg_id, state: ptr, shutdown: ShutdownToken::new() })
    }

    /// Attach to resources a prior `create` call already initialized.
    pub fn attach(cfg: &Config) -> Result<Self> {
        let shm_id = raw::shmget(cfg.shm_key, std::mem::size_of::<SharedState>())?;
        let ptr = raw::shmat(shm_id)? as *mut SharedState;
        let sem_id = raw::semget(cfg.sem_key, SEM_COUNT)?;
        let msg_id = raw::msgget(cfg.msg_key)?;

        #[allow(unsafe_code)]
        // SAFETY: `create` already initialized this region; we only read
        // the version tag here, never write through the pointer.
        let layout_ok = unsafe { (*ptr).layout_compatible() };
        if !layout_ok {
            return Err(WarehouseError::InvariantViolation(
                "attached shared memory region uses an incompatible layout version".to_string(),
            ));
        }

        Ok(Self { shm_id, sem_id, msg_id, state: ptr, shutdown: ShutdownToken::new() })
    }

    /// Detach from shared memory. If `remove` is set, additionally mark all
    /// three resources for destruction once every attacher has detached —
    /// only the orchestrator should pass `true`.
    pub fn close(self, remove: bool) {
        raw::shmdt(self.state as *mut u8);
        if remove {
            raw::shmctl_remove(self.shm_id);
            raw::semctl_remove(self.sem_id);
            raw::msgctl_remove(self.msg_id);
        }
    }

    #[allow(unsafe_code)]
    fn state(&self) -> &mut SharedState {
        // SAFETY: self.state points at a live shmat mapping for the
        // lifetime of this value; the Facade contract requires callers to
        // hold the matching semaphore before reaching this reference.
        unsafe { &mut *self.state }
    }

    /// Acquire a binary-semaphore mutex, retrying indefinitely on `EINTR`.
    fn lock(&self, num: i16) -> Result<()> {
        loop {
            if raw::semop(self.sem_id, num, -1)? {
                return Ok(());
            }
        }
    }

    fn unlock(&self, num: i16) -> Result<()> {
        raw::semop(self.sem_id, num, 1).map(|_| ())
    }

    /// Block on a counting semaphore, honoring shutdown by polling with a
    /// non-blocking `try` between short sleeps instead of trusting a single
    /// interruptible wait — `semop` has no native timeout.
    fn wait_counting(&self, num: i16) -> Result<()> {
        loop {
            if raw::semop(self.sem_id, num, -1)? {
                return Ok(());
            }
            if !self.is_running() {
                return Err(WarehouseError::ShuttingDown);
            }
        }
    }
}

impl Facade for SysVFacade {
    fn wait_belt_empty(&self) -> Result<()> {
        self.wait_counting(SEM_BELT_EMPTY)
    }

    fn post_belt_empty(&self) -> Result<()> {
        raw::semop(self.sem_id, SEM_BELT_EMPTY, 1).map(|_| ())
    }

    fn wait_belt_full(&self) -> Result<()> {
        self.wait_counting(SEM_BELT_FULL)
    }

    fn post_belt_full(&self) -> Result<()> {
        raw::semop(self.sem_id, SEM_BELT_FULL, 1).map(|_| ())
    }

    fn with_belt<R>(&self, f: impl FnOnce(&mut Belt, &mut SessionRegistry) -> R) -> Result<R> {
        self.lock(SEM_BELT_MUTEX)?;
        let state = self.state();
        let result = f(&mut state.belt, &mut state.users);
        self.unlock(SEM_BELT_MUTEX)?;
        Ok(result)
    }

    fn with_dock<R>(&self, f: impl FnOnce(&mut TruckState) -> R) -> Result<R> {
        self.lock(SEM_DOCK_MUTEX)?;
        let state = self.state();
        let result = f(&mut state.dock_truck);
        self.unlock(SEM_DOCK_MUTEX)?;
        Ok(result)
    }

    fn send(&self, msg: CommandMessage) -> Result<()> {
        raw::msgsnd(self.msg_id, msg.recipient_tag, msg.command_id)
    }

    fn recv_blocking(&self, me: RecipientTag) -> Result<CommandMessage> {
        loop {
            if let Some((mtype, command_id)) = raw::msgrcv(self.msg_id, me.0, false)? {
                return Ok(CommandMessage { recipient_tag: mtype, command_id });
            }
            if !self.is_running() {
                return Err(WarehouseError::ShuttingDown);
            }
        }
    }

    fn recv_nonblocking(&self, me: RecipientTag) -> Option<CommandMessage> {
        let (mtype, command_id) = raw::msgrcv(self.msg_id, me.0, true).ok()??;
        Some(CommandMessage { recipient_tag: mtype, command_id })
    }

    fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// Local shutdown request (this process's own signal handler) or the
    /// shared `S.running` flag the orchestrator clears — whichever trips
    /// first stops this process's loops.
    fn is_running(&self) -> bool {
        self.shutdown.is_running() && self.state().running
    }

    fn stop_world(&self) -> Result<()> {
        self.state().running = false;
        self.shutdown.request_shutdown();
        Ok(())
    }

    fn record_dead_letter(&self) -> Result<u64> {
        self.lock(SEM_DOCK_MUTEX)?;
        self.state().dead_lettered += 1;
        let total = self.state().dead_lettered;
        self.unlock(SEM_DOCK_MUTEX)?;
        Ok(total)
    }

    fn record_truck_departure(&self) -> Result<u64> {
        self.lock(SEM_DOCK_MUTEX)?;
        self.state().trucks_completed += 1;
        let total = self.state().trucks_completed;
        self.unlock(SEM_DOCK_MUTEX)?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use wh_core::{CommandId, PackageType};

    use super::*;

    fn test_config(suffix: i32) -> Config {
        let mut cfg = Config::default();
        // Distinct keys per test so a stray leftover segment from a prior
        // run (or a concurrent `cargo test` process) can't collide.
        cfg.shm_key += suffix;
        cfg.sem_key += suffix;
        cfg.msg_key += suffix;
        cfg.belt_slots = 3;
        cfg
    }

    #[test]
    #[serial]
    #[ignore = "touches real System V IPC resources; run explicitly with --ignored"]
    fn create_then_attach_share_the_same_region() {
        let cfg = test_config(1);
        let owner = SysVFacade::create(&cfg).expect("create");
        let attacher = SysVFacade::attach(&cfg).expect("attach");

        owner
            .with_belt(|belt, _| belt.push_slot(wh_core::Package::new(1, PackageType::A, 1.0, 0.1, 0)))
            .expect("lock succeeds");
        let seen = attacher.with_belt(|belt, _| belt.count()).expect("lock succeeds");
        assert_eq!(seen, 1);

        attacher.close(false);
        owner.close(true);
    }

    #[test]
    #[serial]
    #[ignore = "touches real System V IPC resources; run explicitly with --ignored"]
    fn belt_semaphores_gate_push_and_pop() {
        let cfg = test_config(2);
        let facade = SysVFacade::create(&cfg).expect("create");

        facade.wait_belt_empty().expect("slot available");
        facade
            .with_belt(|belt, _| belt.push_slot(wh_core::Package::new(1, PackageType::A, 1.0, 0.1, 0)))
            .expect("lock succeeds");
        facade.post_belt_full().expect("post");

        facade.wait_belt_full().expect("slot filled");
        let popped = facade.with_belt(|belt, _| belt.pop_slot()).expect("lock succeeds");
        assert!(popped.is_some());
        facade.post_belt_empty().expect("post");

        facade.close(true);
    }

    #[test]
    #[serial]
    #[ignore = "touches real System V IPC resources; run explicitly with --ignored"]
    fn send_then_recv_roundtrips_through_the_real_queue() {
        let cfg = test_config(3);
        let facade = SysVFacade::create(&cfg).expect("create");
        let me = RecipientTag::for_pid(std::process::id() as i32);

        facade.send(CommandMessage::new(me, CommandId::Departure)).expect("send");
        let msg = facade.recv_blocking(me).expect("message arrives");
        assert_eq!(msg.command(), Some(CommandId::Departure));

        facade.close(true);
    }
}

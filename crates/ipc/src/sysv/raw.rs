// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrappers over the System V shared-memory, semaphore, and message
//! queue syscalls. Every `unsafe` block here is scoped to a single FFI call
//! with a SAFETY comment; nothing above this module touches libc directly.

use std::io;

use wh_core::{Result, WarehouseError};

fn last_os_error(resource: &'static str) -> WarehouseError {
    WarehouseError::ResourceInit { resource, source: io::Error::last_os_error() }
}

/// `shmget` an existing or new segment of `size` bytes at `key`.
// shmget is a raw syscall wrapper; no safe abstraction exists for it.
#[allow(unsafe_code)]
pub fn shmget(key: i32, size: usize) -> Result<i32> {
    // SAFETY: shmget takes plain integers and returns an id or -1; no
    // pointers cross the FFI boundary.
    let id = unsafe { libc::shmget(key, size, libc::IPC_CREAT | 0o666) };
    if id < 0 {
        return Err(last_os_error("shared memory segment"));
    }
    Ok(id)
}

/// Attach `id` and return the mapped address.
// shmat hands back a raw pointer into this process's address space.
#[allow(unsafe_code)]
pub fn shmat(id: i32) -> Result<*mut u8> {
    // SAFETY: id was just returned by a successful shmget; shmat's only
    // failure mode is returning (void*)-1, checked below.
    let ptr = unsafe { libc::shmat(id, std::ptr::null(), 0) };
    if ptr as isize == -1 {
        return Err(last_os_error("shared memory attach"));
    }
    Ok(ptr as *mut u8)
}

/// Detach a previously attached segment.
// shmdt takes the raw pointer shmat returned; the caller owns its validity.
#[allow(unsafe_code)]
pub fn shmdt(ptr: *mut u8) {
    // SAFETY: ptr was returned by this module's own `shmat` and is still
    // attached; shmdt's failure modes (EINVAL) are not actionable here.
    unsafe {
        libc::shmdt(ptr as *const libc::c_void);
    }
}

/// Mark a segment for removal once the last process detaches.
// shmctl(IPC_RMID) needs a scratch shmid_ds the kernel ignores for removal.
#[allow(unsafe_code)]
pub fn shmctl_remove(id: i32) {
    // SAFETY: IPC_RMID ignores the buf argument; a null pointer is the
    // documented usage for this command on Linux.
    unsafe {
        libc::shmctl(id, libc::IPC_RMID, std::ptr::null_mut());
    }
}

/// `semget` a set of `count` semaphores at `key`.
#[allow(unsafe_code)]
pub fn semget(key: i32, count: i32) -> Result<i32> {
    // SAFETY: semget takes plain integers; no pointers involved.
    let id = unsafe { libc::semget(key, count, libc::IPC_CREAT | 0o666) };
    if id < 0 {
        return Err(last_os_error("semaphore set"));
    }
    Ok(id)
}

/// Initialize semaphore `num` in set `id` to `value`.
#[allow(unsafe_code)]
pub fn semctl_setval(id: i32, num: i32, value: i32) -> Result<()> {
    // SAFETY: SETVAL's variadic argument is an int, matching libc's semctl
    // signature on Linux; no union semun is needed for this command there.
    let rc = unsafe { libc::semctl(id, num, libc::SETVAL, value) };
    if rc < 0 {
        return Err(last_os_error("semaphore initialize"));
    }
    Ok(())
}

#[allow(unsafe_code)]
pub fn semctl_getval(id: i32, num: i32) -> Result<i32> {
    // SAFETY: GETVAL takes no extra argument and returns the value directly.
    let rc = unsafe { libc::semctl(id, num, libc::GETVAL) };
    if rc < 0 {
        return Err(last_os_error("semaphore read"));
    }
    Ok(rc)
}

/// Remove the whole semaphore set.
#[allow(unsafe_code)]
pub fn semctl_remove(id: i32) {
    // SAFETY: IPC_RMID on a semaphore set ignores the extra argument.
    unsafe {
        libc::semctl(id, 0, libc::IPC_RMID);
    }
}

/// `true` once `sem_op` succeeds, `false` if interrupted by a signal
/// (`EINTR`) and the caller should retry, propagating any other error.
#[allow(unsafe_code)]
pub fn semop(id: i32, num: i16, op: i16) -> Result<bool> {
    let mut buf = libc::sembuf { sem_num: num as libc::c_ushort, sem_op: op, sem_flg: 0 };
    // SAFETY: buf is a single well-formed sembuf on the stack, alive for the
    // duration of the call, as semop requires.
    let rc = unsafe { libc::semop(id, &mut buf, 1) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::Interrupted {
        return Ok(false);
    }
    Err(WarehouseError::ResourceInit { resource: "semaphore operation", source: err })
}

/// `msgget` a queue at `key`.
#[allow(unsafe_code)]
pub fn msgget(key: i32) -> Result<i32> {
    // SAFETY: msgget takes plain integers; no pointers involved.
    let id = unsafe { libc::msgget(key, libc::IPC_CREAT | 0o666) };
    if id < 0 {
        return Err(last_os_error("message queue"));
    }
    Ok(id)
}

#[allow(unsafe_code)]
pub fn msgctl_remove(id: i32) {
    // SAFETY: IPC_RMID on a message queue ignores the extra argument.
    unsafe {
        libc::msgctl(id, libc::IPC_RMID, std::ptr::null_mut());
    }
}

#[repr(C)]
struct RawMsg {
    mtype: libc::c_long,
    command_id: i32,
}

/// Send `command_id` tagged with `mtype` (the recipient's pid). Non-blocking
/// (`IPC_NOWAIT`); `EAGAIN` becomes `QueueFull`.
#[allow(unsafe_code)]
pub fn msgsnd(id: i32, mtype: i64, command_id: i32) -> Result<()> {
    let msg = RawMsg { mtype: mtype as libc::c_long, command_id };
    let payload_size = std::mem::size_of::<i32>();
    // SAFETY: msg is a single repr(C) value on the stack matching the size
    // passed below, laid out with mtype first as msgsnd requires.
    let rc =
        unsafe { libc::msgsnd(id, &msg as *const RawMsg as *const libc::c_void, payload_size, libc::IPC_NOWAIT) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EAGAIN) {
            return Err(WarehouseError::QueueFull { recipient: mtype });
        }
        return Err(WarehouseError::ResourceInit { resource: "message send", source: err });
    }
    Ok(())
}

/// Receive a message typed `mtype` (exact match, see `man msgrcv`).
/// `nowait = true` returns `Ok(None)` immediately instead of blocking when
/// nothing matches.
#[allow(unsafe_code)]
pub fn msgrcv(id: i32, mtype: i64, nowait: bool) -> Result<Option<(i64, i32)>> {
    let mut msg = RawMsg { mtype: 0, command_id: 0 };
    let flags = if nowait { libc::IPC_NOWAIT } else { 0 };
    let payload_size = std::mem::size_of::<i32>();
    // SAFETY: msg is a single repr(C) value sized to fit the payload
    // msgrcv writes back into it, with mtype first as the kernel expects.
    let rc = unsafe {
        libc::msgrcv(id, &mut msg as *mut RawMsg as *mut libc::c_void, payload_size, mtype as libc::c_long, flags)
    };
    if rc < 0 {
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ENOMSG) => return Ok(None),
            Some(libc::EINTR) => return Ok(None),
            _ => return Err(WarehouseError::ResourceInit { resource: "message receive", source: err }),
        }
    }
    Ok(Some((msg.mtype as i64, msg.command_id)))
}

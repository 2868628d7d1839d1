// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use wh_core::{CommandId, CommandMessage, Package, PackageType, RecipientTag, WarehouseError};

use super::*;

fn pkg() -> Package {
    Package::new(1, PackageType::A, 1.0, 0.1, 0)
}

#[test]
fn belt_empty_and_full_counts_move_together() {
    let f = MemoryFacade::new(2, 5, 8);
    f.wait_belt_empty().expect("slot available");
    f.with_belt(|belt, _| belt.push_slot(pkg())).expect("lock never fails");
    f.post_belt_full().expect("post never fails");

    f.wait_belt_full().expect("slot filled");
    let popped = f.with_belt(|belt, _| belt.pop_slot()).expect("lock never fails");
    assert!(popped.is_some());
    f.post_belt_empty().expect("post never fails");
}

#[test]
fn dock_mutex_serializes_access_across_threads() {
    let f = Arc::new(MemoryFacade::new(4, 5, 8));
    f.with_dock(|dock| dock.claim(1, 10, 100.0, 100.0)).expect("lock never fails");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let f = Arc::clone(&f);
        handles.push(thread::spawn(move || {
            f.with_dock(|dock| dock.load(1.0, 0.1)).expect("lock never fails");
        }));
    }
    for h in handles {
        h.join().expect("thread panicked");
    }
    let loaded = f.with_dock(|dock| dock.current_load).expect("lock never fails");
    assert_eq!(loaded, 8);
}

#[test]
fn send_then_recv_nonblocking_roundtrips() {
    let f = MemoryFacade::new(2, 5, 8);
    let tag = RecipientTag::for_pid(77);
    f.send(CommandMessage::new(tag, CommandId::Departure)).expect("queue has room");
    let msg = f.recv_nonblocking(tag).expect("message is queued");
    assert_eq!(msg.command(), Some(CommandId::Departure));
    assert!(f.recv_nonblocking(tag).is_none());
}

#[test]
fn recv_nonblocking_ignores_messages_for_other_recipients() {
    let f = MemoryFacade::new(2, 5, 8);
    f.send(CommandMessage::new(RecipientTag::for_pid(1), CommandId::EndWork)).unwrap();
    assert!(f.recv_nonblocking(RecipientTag::for_pid(2)).is_none());
}

#[test]
fn send_fails_once_queue_capacity_is_reached() {
    let f = MemoryFacade::new(2, 5, 2);
    let tag = RecipientTag::for_pid(1);
    f.send(CommandMessage::new(tag, CommandId::Departure)).unwrap();
    f.send(CommandMessage::new(tag, CommandId::Departure)).unwrap();
    let err = f.send(CommandMessage::new(tag, CommandId::Departure)).unwrap_err();
    assert!(matches!(err, WarehouseError::QueueFull { .. }));
}

#[test]
fn blocked_recv_returns_shutting_down_once_requested() {
    let f = Arc::new(MemoryFacade::new(2, 5, 8));
    let waiter = {
        let f = Arc::clone(&f);
        thread::spawn(move || f.recv_blocking(RecipientTag::for_pid(9)))
    };
    thread::sleep(Duration::from_millis(20));
    f.shutdown_token().request_shutdown();
    let result = waiter.join().expect("thread panicked");
    assert!(matches!(result, Err(WarehouseError::ShuttingDown)));
}

#[test]
fn record_dead_letter_increments_and_returns_running_total() {
    let f = MemoryFacade::new(2, 5, 8);
    assert_eq!(f.record_dead_letter().unwrap(), 1);
    assert_eq!(f.record_dead_letter().unwrap(), 2);
}

#[test]
fn record_truck_departure_increments_and_returns_running_total() {
    let f = MemoryFacade::new(2, 5, 8);
    assert_eq!(f.record_truck_departure().unwrap(), 1);
    assert_eq!(f.record_truck_departure().unwrap(), 2);
}

#[test]
fn stop_world_unblocks_a_belt_wait_without_a_matching_post() {
    let f = Arc::new(MemoryFacade::new(1, 5, 8));
    f.wait_belt_empty().expect("first slot free");
    let waiter = {
        let f = Arc::clone(&f);
        thread::spawn(move || f.wait_belt_empty())
    };
    thread::sleep(Duration::from_millis(20));
    f.stop_world().expect("stop_world never fails");
    let result = waiter.join().expect("thread panicked");
    assert!(matches!(result, Err(WarehouseError::ShuttingDown)));
}

#[test]
fn blocked_belt_empty_wait_returns_shutting_down_once_requested() {
    let f = Arc::new(MemoryFacade::new(1, 5, 8));
    f.wait_belt_empty().expect("first slot free");
    let waiter = {
        let f = Arc::clone(&f);
        thread::spawn(move || f.wait_belt_empty())
    };
    thread::sleep(Duration::from_millis(20));
    f.shutdown_token().request_shutdown();
    let result = waiter.join().expect("thread panicked");
    assert!(matches!(result, Err(WarehouseError::ShuttingDown)));
}

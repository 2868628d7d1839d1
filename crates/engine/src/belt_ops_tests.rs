// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use wh_core::PackageType;
use wh_ipc::MemoryFacade;

use super::*;

fn pkg() -> Package {
    Package::new(1, PackageType::A, 1.0, 0.1, 0)
}

#[test]
fn push_then_pop_roundtrips_through_the_facade() {
    let facade = MemoryFacade::new(4, 5, 8);
    let id = push(&facade, pkg()).unwrap();
    assert_eq!(id, 1);
    let popped = pop(&facade).unwrap();
    assert_eq!(popped.id, 1);
}

#[test]
fn push_assigns_monotonically_increasing_ids() {
    let facade = MemoryFacade::new(4, 5, 8);
    let first = push(&facade, pkg()).unwrap();
    let second = push(&facade, pkg()).unwrap();
    assert!(second > first);
}

#[test]
fn register_worker_is_bounded() {
    let facade = MemoryFacade::new(4, 5, 8);
    assert!(register_worker(&facade, 1).unwrap());
    assert!(!register_worker(&facade, 1).unwrap());
    unregister_worker(&facade).unwrap();
    assert!(register_worker(&facade, 1).unwrap());
}

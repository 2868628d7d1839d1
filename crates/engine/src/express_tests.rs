// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use wh_ipc::MemoryFacade;

use super::*;

#[test]
fn vip_package_loads_when_a_truck_is_present_and_it_fits() {
    let facade = MemoryFacade::new(4, 5, 8);
    facade.with_dock(|dock| dock.claim(100, 10, 500.0, 500.0)).unwrap();
    let mut rng = WarehouseRng::from_seed(1);

    let outcome = deliver_vip_package(&facade, &mut rng).unwrap();

    assert_eq!(outcome, VipOutcome::Loaded);
    assert_eq!(facade.with_dock(|dock| dock.current_load).unwrap(), 1);
}

#[test]
fn vip_package_is_dropped_not_queued_when_no_truck_is_present() {
    let facade = MemoryFacade::new(4, 5, 8);
    let mut rng = WarehouseRng::from_seed(1);

    let outcome = deliver_vip_package(&facade, &mut rng).unwrap();

    assert_eq!(outcome, VipOutcome::Dropped);
    assert_eq!(facade.with_belt(|belt, _| belt.count()).unwrap(), 0);
}

#[test]
fn express_batch_loads_three_to_five_packages() {
    let facade = MemoryFacade::new(4, 5, 8);
    facade.with_dock(|dock| dock.claim(100, 10, 500.0, 500.0)).unwrap();
    let mut rng = WarehouseRng::from_seed(2);

    let outcome = deliver_express_batch(&facade, &mut rng).unwrap();

    assert!((3..=5).contains(&outcome.attempted));
    assert_eq!(outcome.loaded, outcome.attempted);
    assert_eq!(outcome.truck_id, Some(100));
}

#[test]
fn express_batch_signals_departure_on_first_overflow() {
    let facade = MemoryFacade::new(4, 5, 8);
    // One unit of slack: the truck can take exactly one package before its
    // load ceiling is hit.
    facade.with_dock(|dock| dock.claim(100, 1, 500.0, 500.0)).unwrap();
    let mut rng = WarehouseRng::from_seed(2);

    let outcome = deliver_express_batch(&facade, &mut rng).unwrap();

    assert!(outcome.loaded < outcome.attempted);
    let msg = facade.recv_nonblocking(wh_core::RecipientTag::for_pid(100)).expect("departure signaled");
    assert_eq!(msg.command(), Some(wh_core::CommandId::Departure));
}

#[test]
fn express_batch_with_no_truck_present_loads_nothing_and_signals_nobody() {
    let facade = MemoryFacade::new(4, 5, 8);
    let mut rng = WarehouseRng::from_seed(2);

    let outcome = deliver_express_batch(&facade, &mut rng).unwrap();

    assert_eq!(outcome.loaded, 0);
    assert_eq!(outcome.truck_id, None);
}

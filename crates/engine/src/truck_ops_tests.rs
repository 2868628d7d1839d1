// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use wh_core::CommandMessage;
use wh_ipc::MemoryFacade;

use super::*;

#[test]
fn arrive_claims_an_empty_dock_with_randomized_capacities() {
    let facade = MemoryFacade::new(4, 5, 8);
    let cfg = Config::default();
    let mut rng = WarehouseRng::from_seed(7);

    arrive(&facade, &cfg, &mut rng, 42).unwrap();

    let (present, id, max_load) = facade.with_dock(|dock| (dock.is_present, dock.id, dock.max_load)).unwrap();
    assert!(present);
    assert_eq!(id, 42);
    assert!((cfg.truck_max_load.min..=cfg.truck_max_load.max).contains(&max_load));
}

#[test]
fn departure_signal_resolves_docked_into_departing() {
    let facade = MemoryFacade::new(4, 5, 8);
    let pid = 42;
    facade.send(CommandMessage::new(RecipientTag::for_pid(pid), CommandId::Departure)).unwrap();

    let resolved = await_docked_signal(&facade, pid).unwrap();
    assert_eq!(resolved, CommandId::Departure);
}

#[test]
fn end_work_signal_resolves_docked_into_done() {
    let facade = MemoryFacade::new(4, 5, 8);
    let pid = 42;
    facade.send(CommandMessage::new(RecipientTag::for_pid(pid), CommandId::EndWork)).unwrap();

    let resolved = await_docked_signal(&facade, pid).unwrap();
    assert_eq!(resolved, CommandId::EndWork);
}

#[test]
fn depart_clears_the_dock_only_for_the_rightful_occupant() {
    let facade = MemoryFacade::new(4, 5, 8);
    facade.with_dock(|dock| dock.claim(42, 10, 100.0, 100.0)).unwrap();

    depart(&facade, 99).unwrap();
    assert!(facade.with_dock(|dock| dock.is_present).unwrap(), "wrong pid must not clear the dock");

    depart(&facade, 42).unwrap();
    assert!(!facade.with_dock(|dock| dock.is_present).unwrap());
}

#[test]
fn full_cycle_runs_through_arriving_docked_departing_enroute() {
    let facade = MemoryFacade::new(4, 5, 8);
    let mut cfg = Config::default();
    cfg.truck_travel_time = wh_core::config::Range::new(std::time::Duration::ZERO, std::time::Duration::ZERO);
    let mut rng = WarehouseRng::from_seed(1);
    let pid = 7;

    facade.send(CommandMessage::new(RecipientTag::for_pid(pid), CommandId::Departure)).unwrap();
    let outcome = run_one_cycle(&facade, &cfg, &mut rng, pid).unwrap();

    assert_eq!(outcome, Outcome::CycleComplete);
    assert!(!facade.with_dock(|dock| dock.is_present).unwrap());
}

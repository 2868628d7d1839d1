// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use wh_ipc::MemoryFacade;

use super::*;

#[test]
fn login_then_logout_roundtrips() {
    let facade = MemoryFacade::new(4, 5, 8);
    let idx = login(&facade, "alice", 100, Role::OPERATOR, 1, 4).unwrap();
    assert_eq!(session_index(&facade, 100).unwrap(), Some(idx));

    logout(&facade, 100).unwrap();
    assert_eq!(session_index(&facade, 100).unwrap(), None);
}

#[test]
fn duplicate_username_is_rejected() {
    let facade = MemoryFacade::new(4, 5, 8);
    login(&facade, "alice", 100, Role::VIEWER, 1, 4).unwrap();
    let err = login(&facade, "alice", 101, Role::VIEWER, 1, 4).unwrap_err();
    assert!(matches!(err, WarehouseError::DuplicateName(_)));
}

#[test]
fn registry_full_is_rejected() {
    let facade = MemoryFacade::new(4, 1, 8);
    login(&facade, "alice", 100, Role::VIEWER, 1, 4).unwrap();
    let err = login(&facade, "bob", 101, Role::VIEWER, 1, 4).unwrap_err();
    assert!(matches!(err, WarehouseError::SessionFull));
}

#[test]
fn process_quota_is_enforced() {
    let facade = MemoryFacade::new(4, 5, 8);
    login(&facade, "alice", 100, Role::OPERATOR, 1, 1).unwrap();

    assert!(try_spawn_process(&facade, 100).unwrap());
    assert!(!try_spawn_process(&facade, 100).unwrap());

    report_process_finished(&facade, 100).unwrap();
    assert!(try_spawn_process(&facade, 100).unwrap());
}

#[test]
fn find_pid_by_username_resolves_active_sessions() {
    let facade = MemoryFacade::new(4, 5, 8);
    login(&facade, "System-Express", 200, Role::SYS_ADMIN, 0, 0).unwrap();
    assert_eq!(find_pid_by_username(&facade, "System-Express").unwrap(), Some(200));
    assert_eq!(find_pid_by_username(&facade, "nobody").unwrap(), None);
}

#[test]
fn active_session_pids_lists_every_logged_in_session() {
    let facade = MemoryFacade::new(4, 5, 8);
    login(&facade, "alice", 100, Role::VIEWER, 1, 1).unwrap();
    login(&facade, "bob", 101, Role::VIEWER, 1, 1).unwrap();

    let mut pids = active_session_pids(&facade).unwrap();
    pids.sort_unstable();
    assert_eq!(pids, vec![100, 101]);
}

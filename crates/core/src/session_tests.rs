// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn login_then_logout_leaves_row_inactive_with_zero_processes() {
    let mut reg = SessionRegistry::new(5);
    let idx = reg.login("alice", 100, Role::OPERATOR, 1, 3).expect("login");
    reg.logout(100);
    assert!(reg.session_index(100).is_none());
    assert!(!reg.rows()[idx].active);
}

#[test]
fn duplicate_active_username_is_rejected() {
    let mut reg = SessionRegistry::new(5);
    reg.login("alice", 100, Role::VIEWER, 1, 1).expect("first login");
    let err = reg.login("alice", 200, Role::VIEWER, 1, 1).unwrap_err();
    assert_eq!(err, LoginError::DuplicateName);
}

#[test]
fn registry_rejects_login_once_full() {
    let mut reg = SessionRegistry::new(2);
    reg.login("a", 1, Role::VIEWER, 1, 1).unwrap();
    reg.login("b", 2, Role::VIEWER, 1, 1).unwrap();
    let err = reg.login("c", 3, Role::VIEWER, 1, 1).unwrap_err();
    assert_eq!(err, LoginError::Full);
}

#[test]
fn same_username_can_log_back_in_after_logout() {
    let mut reg = SessionRegistry::new(2);
    reg.login("a", 1, Role::VIEWER, 1, 1).unwrap();
    reg.logout(1);
    assert!(reg.login("a", 2, Role::VIEWER, 1, 1).is_ok());
}

#[test]
fn quota_scenario_from_spec_section_8() {
    let mut reg = SessionRegistry::new(5);
    reg.login("q", 500, Role::OPERATOR, 1, 2).expect("login");
    assert!(reg.try_spawn_process(500));
    assert!(reg.try_spawn_process(500));
    assert!(!reg.try_spawn_process(500));
    reg.report_process_finished(500);
    assert!(reg.try_spawn_process(500));
}

#[test]
fn report_process_finished_saturates_at_zero() {
    let mut reg = SessionRegistry::new(5);
    reg.login("q", 500, Role::VIEWER, 1, 2).unwrap();
    reg.report_process_finished(500);
    assert_eq!(reg.session_index(500).map(|i| reg.rows()[i].current_processes), Some(0));
}

#[test]
fn admit_then_release_leaves_current_processes_unchanged() {
    let mut reg = SessionRegistry::new(5);
    reg.login("q", 500, Role::VIEWER, 1, 2).unwrap();
    assert!(reg.try_spawn_process(500));
    reg.report_process_finished(500);
    let idx = reg.session_index(500).unwrap();
    assert_eq!(reg.rows()[idx].current_processes, 0);
}

#[test]
fn current_role_reflects_login_role_mask() {
    let mut reg = SessionRegistry::new(5);
    reg.login("admin", 9, Role::SYS_ADMIN | Role::OPERATOR, 1, 1).unwrap();
    let role = reg.current_role(9);
    assert!(role.contains(Role::SYS_ADMIN));
    assert!(role.contains(Role::OPERATOR));
    assert!(!role.contains(Role::VIEWER));
}

#[test]
fn invariant_holds_across_mixed_sessions() {
    let mut reg = SessionRegistry::new(5);
    reg.login("a", 1, Role::VIEWER, 1, 3).unwrap();
    reg.login("b", 2, Role::OPERATOR, 1, 1).unwrap();
    reg.try_spawn_process(1);
    reg.try_spawn_process(1);
    assert!(reg.check_invariant());
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_package_carries_a_created_audit_entry() {
    let p = Package::new(111, PackageType::B, 3.5, 0.2, 1_000);
    assert_eq!(p.audit_log().len(), 1);
    let entry = p.audit_log()[0];
    assert_eq!(entry.action, ActionFlag::CREATED | ActionFlag::BY_WORKER);
    assert_eq!(entry.actor_pid, 111);
}

#[test]
fn audit_log_saturates_silently_at_cap() {
    let mut p = Package::new(1, PackageType::A, 1.0, 1.0, 0);
    for i in 0..(AUDIT_LOG_CAP as u64 + 10) {
        p.audit(ActionFlag::FORCED_RETRY | ActionFlag::BY_DISPATCHER, 2, i);
    }
    assert_eq!(p.audit_log().len(), AUDIT_LOG_CAP);
}

#[test]
fn zero_clears_audit_history_so_a_reused_slot_cannot_leak_it() {
    let mut p = Package::new(1, PackageType::C, 2.0, 2.0, 5);
    p.mark_loaded(42, 10);
    assert!(!p.audit_log().is_empty());
    p.zero();
    assert!(p.audit_log().is_empty());
    assert_eq!(p.id, 0);
    assert_eq!(p.weight, 0.0);
}

#[test]
fn mark_loaded_sets_status_and_appends_audit() {
    let mut p = Package::new(1, PackageType::A, 1.0, 1.0, 0);
    assert!(!p.is_loaded());
    p.mark_loaded(99, 20);
    assert!(p.is_loaded());
    let last = p.audit_log().last().copied().expect("audit entry");
    assert_eq!(last.action, ActionFlag::LOADED_TO_TRUCK | ActionFlag::BY_DISPATCHER);
    assert_eq!(last.actor_pid, 99);
}

#[test]
fn action_flags_compose_as_event_or_actor() {
    let combo = ActionFlag::CREATED | ActionFlag::BY_WORKER;
    assert!(combo.contains(ActionFlag::CREATED));
    assert!(combo.contains(ActionFlag::BY_WORKER));
    assert!(!combo.contains(ActionFlag::BY_DISPATCHER));
}

#[test]
fn status_roundtrips_through_serde_as_its_integer_repr() {
    let status = PackageStatus::EXPRESS | PackageStatus::LOADED;
    let json = serde_json::to_string(&status).expect("serialize");
    let back: PackageStatus = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(status, back);
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process spawn/reap plumbing for the orchestrator: which role binaries to
//! start, in what order, and how their exit is noticed without blocking.

use std::path::PathBuf;
use std::process::{Child, Command};

use wh_core::{Config, Result, WarehouseError};

use crate::env;

/// One role process the orchestrator is responsible for starting.
/// `id` distinguishes replicated roles (workers, trucks); singleton roles
/// (dispatcher, express, the belt monitor) leave it `None`.
struct RoleSpec {
    binary: &'static str,
    id: Option<u32>,
}

/// Every role this run's `cfg` calls for, in spawn order: singletons first,
/// then `truck_cycles` trucks, then `worker_count` workers.
fn plan(cfg: &Config) -> Vec<RoleSpec> {
    let mut specs = vec![
        RoleSpec { binary: "wh-dispatcher", id: None },
        RoleSpec { binary: "wh-express", id: None },
        RoleSpec { binary: "wh-belt-monitor", id: None },
    ];
    for i in 0..cfg.truck_cycles {
        specs.push(RoleSpec { binary: "wh-truck", id: Some(i as u32) });
    }
    for i in 0..cfg.worker_count {
        specs.push(RoleSpec { binary: "wh-worker", id: Some(i as u32) });
    }
    specs
}

fn role_label(binary: &str, id: Option<u32>) -> String {
    match id {
        Some(id) => format!("{binary}#{id}"),
        None => binary.to_string(),
    }
}

/// Directory this orchestrator binary was launched from, which is also
/// where cargo places every other binary in this workspace.
fn sibling_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// A spawned child, labeled with the role it's running.
pub struct Roster(Vec<(String, Child)>);

impl Roster {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Poll every remaining child's exit status without blocking, removing
    /// any that have exited and returning their labels and statuses.
    pub fn reap(&mut self) -> Vec<(String, std::process::ExitStatus)> {
        let mut exited = Vec::new();
        self.0.retain_mut(|(label, child)| match child.try_wait() {
            Ok(Some(status)) => {
                exited.push((label.clone(), status));
                false
            }
            Ok(None) => true,
            Err(_) => true,
        });
        exited
    }

    /// Send `SIGTERM` to every still-running child, best-effort.
    pub fn terminate_all(&self) {
        for (label, child) in &self.0 {
            let pid = nix::unistd::Pid::from_raw(child.id() as i32);
            if let Err(e) = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM) {
                tracing::warn!(role = label.as_str(), error = %e, "failed to signal child");
            }
        }
    }
}

/// Spawn every role `cfg` calls for, staggered by [`env::startup_stagger`].
pub fn spawn_children(cfg: &Config) -> Result<Roster> {
    let dir = sibling_dir();
    let stagger = env::startup_stagger();
    let specs = plan(cfg);
    let last = specs.len().saturating_sub(1);
    let mut children = Vec::new();

    for (i, spec) in specs.into_iter().enumerate() {
        let path = dir.join(spec.binary);
        let mut cmd = Command::new(&path);
        if let Some(id) = spec.id {
            cmd.arg(id.to_string());
        }
        let child = cmd
            .spawn()
            .map_err(|source| WarehouseError::ResourceInit { resource: spec.binary, source })?;
        children.push((role_label(spec.binary, spec.id), child));
        if i < last {
            std::thread::sleep(stagger);
        }
    }

    Ok(Roster(children))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_spawns_singletons_then_trucks_then_workers_in_order() {
        let mut cfg = Config::default();
        cfg.truck_cycles = 2;
        cfg.worker_count = 3;
        let specs = plan(&cfg);
        let labels: Vec<String> = specs.iter().map(|s| role_label(s.binary, s.id)).collect();
        assert_eq!(
            labels,
            vec![
                "wh-dispatcher",
                "wh-express",
                "wh-belt-monitor",
                "wh-truck#0",
                "wh-truck#1",
                "wh-worker#0",
                "wh-worker#1",
                "wh-worker#2",
            ]
        );
    }
}

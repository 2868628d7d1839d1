// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A cloneable, process-wide cancellation flag.
//!
//! Every blocking wait in this crate is built to notice this flag being
//! cleared instead of looping forever on an interrupted syscall. Passed
//! explicitly to whatever needs to observe it, never read from a bare
//! global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared `running` flag. Cloning shares the same underlying bool; clearing
/// it through any handle is visible to all of them.
#[derive(Debug, Clone)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

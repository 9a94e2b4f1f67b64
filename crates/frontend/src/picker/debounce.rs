// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{future::Future, sync::Mutex, time::Duration};

use tokio::{runtime::Handle, task::AbortHandle};

/// Delays a task until no other task has been scheduled for
/// the duration of the window.
///
/// Scheduling a task aborts the previously scheduled task, even
/// if it is already running. Pending tasks are aborted on drop.
#[derive(Debug)]
pub struct Debouncer {
    rt: Handle,
    window: Duration,
    pending: Mutex<Option<AbortHandle>>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(rt: Handle, window: Duration) -> Self {
        Self {
            rt,
            window,
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    #[allow(clippy::missing_panics_doc)]
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let join_handle = self.rt.spawn(async move {
            tokio::time::sleep(window).await;
            task.await;
        });
        let superseded = self
            .pending
            .lock()
            .unwrap()
            .replace(join_handle.abort_handle());
        if let Some(superseded) = superseded {
            log::debug!("Aborting superseded task");
            superseded.abort();
        }
    }

    /// Returns `true` if a task has been aborted.
    #[allow(clippy::missing_panics_doc)]
    pub fn cancel(&self) -> bool {
        let Some(pending) = self.pending.lock().unwrap().take() else {
            return false;
        };
        let finished = pending.is_finished();
        pending.abort();
        !finished
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

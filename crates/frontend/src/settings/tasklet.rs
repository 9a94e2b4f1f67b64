// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    future::Future,
    path::PathBuf,
    sync::{Arc, Weak},
};

use discro::Subscriber;

use crate::notification::{Level, Notifications};

use super::State;

/// Persist all subsequent changes of the settings.
///
/// Failures are reported as error notifications.
pub fn on_state_changed_save_to_file(
    mut subscriber: Subscriber<State>,
    settings_dir: PathBuf,
    notifications: &Arc<Notifications>,
) -> impl Future<Output = ()> + Send + 'static {
    // Acknowledge the current settings before spawning the task
    // to notice all changes that happen in the meantime.
    let mut saved = subscriber.read_ack().clone();
    let notifications = Arc::downgrade(notifications);
    async move {
        log::debug!("Starting on_state_changed_save_to_file");
        while subscriber.changed().await.is_ok() {
            let changed = {
                let current = subscriber.read_ack();
                if *current == saved {
                    continue;
                }
                current.clone()
            };
            saved = changed.clone();
            if let Err(err) = changed.save_spawn_blocking(settings_dir.clone()).await {
                log::warn!("Failed to save settings: {err}");
                report_error(&notifications, &err);
            }
        }
        log::debug!("Stopping on_state_changed_save_to_file");
    }
}

fn report_error(notifications: &Weak<Notifications>, err: &anyhow::Error) {
    let Some(notifications) = notifications.upgrade() else {
        return;
    };
    notifications.push(Level::Error, format!("Settings not saved: {err}"));
}

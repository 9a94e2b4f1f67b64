// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{future::Future, sync::Arc};

use tokio::time::{Instant, sleep_until};

use super::Notifications;

/// Dismiss notifications when they expire.
///
/// Terminates after the notifications have been dropped.
pub fn on_pending_dismiss_expired(
    notifications: &Arc<Notifications>,
) -> impl Future<Output = ()> + Send + 'static {
    let mut subscriber = notifications.subscribe_changed();
    let notifications = Arc::downgrade(notifications);
    async move {
        log::debug!("Starting on_pending_dismiss_expired");
        loop {
            let next_expiry = {
                let Some(notifications) = notifications.upgrade() else {
                    break;
                };
                let dismissed = notifications.dismiss_expired(Instant::now());
                if dismissed > 0 {
                    log::debug!("Dismissed {dismissed} expired notification(s)");
                }
                notifications.next_expiry()
            };
            if let Some(next_expiry) = next_expiry {
                // Notifications pushed in the meantime expire later.
                sleep_until(next_expiry).await;
                continue;
            }
            // Notifications might have been pushed in the meantime.
            let has_pending = !subscriber.read_ack().pending().is_empty();
            if has_pending {
                continue;
            }
            if subscriber.changed().await.is_err() {
                break;
            }
        }
        log::debug!("Stopping on_pending_dismiss_expired");
    }
}

// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use discro::Subscriber;
use tokio::time::Instant;

use crate::{Observable, ObservableRef};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

pub mod tasklet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct State {
    pending: Vec<Notification>,
}

impl State {
    /// Oldest first
    #[must_use]
    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }
}

/// Transient messages that disappear after a while.
#[derive(Debug)]
pub struct Notifications {
    ttl: Duration,
    state: Observable<State>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifications {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Default::default(),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn read(&self) -> ObservableRef<'_, State> {
        self.state.read()
    }

    #[must_use]
    pub fn subscribe_changed(&self) -> Subscriber<State> {
        self.state.subscribe_changed()
    }

    pub fn push(&self, level: Level, message: impl Into<String>) {
        let notification = Notification {
            level,
            message: message.into(),
            created_at: Instant::now(),
        };
        log::debug!("Pushing notification: {notification:?}");
        self.state.modify(|state| {
            state.pending.push(notification);
            true
        });
    }

    /// Remove all notifications that have been created before
    /// `now` minus the time-to-live.
    ///
    /// Returns the number of removed notifications.
    pub fn dismiss_expired(&self, now: Instant) -> usize {
        let ttl = self.ttl;
        let mut dismissed = 0;
        self.state.modify(|state| {
            let len_before = state.pending.len();
            state
                .pending
                .retain(|notification| now.saturating_duration_since(notification.created_at) < ttl);
            dismissed = len_before - state.pending.len();
            dismissed > 0
        });
        dismissed
    }

    /// The instant when the oldest pending notification expires.
    #[must_use]
    pub fn next_expiry(&self) -> Option<Instant> {
        self.state
            .read()
            .pending
            .first()
            .map(|notification| notification.created_at + self.ttl)
    }

    pub fn dismiss_all(&self) -> usize {
        let mut dismissed = 0;
        self.state.modify(|state| {
            dismissed = state.pending.len();
            state.pending.clear();
            dismissed > 0
        });
        dismissed
    }
}

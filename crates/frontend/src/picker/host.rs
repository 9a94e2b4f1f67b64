// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{future::Future, sync::Arc};

use classdesk_usecases::resource::LoadPage;
use discro::Subscriber;
use tokio::runtime::Handle;

use crate::Observable;

use super::{OpenRequest, PickerConfig, PickerDialog, PickerOutcome, PickerSession};

pub type ActiveSession<B> = Option<Arc<PickerSession<B>>>;

/// Publishes the session of the currently open picker.
///
/// The UI subscribes to the active session for rendering and
/// driving it. Opening a new picker cancels the previous one.
#[allow(missing_debug_implementations)]
pub struct DialogHost<B> {
    rt: Handle,
    backend: Arc<B>,
    config: PickerConfig,
    active_session: Observable<ActiveSession<B>>,
}

impl<B> DialogHost<B>
where
    B: LoadPage + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(rt: Handle, backend: Arc<B>, config: PickerConfig) -> Self {
        Self {
            rt,
            backend,
            config,
            active_session: Observable::new(None),
        }
    }

    #[must_use]
    pub fn active_session(&self) -> ActiveSession<B> {
        self.active_session.read().clone()
    }

    #[must_use]
    pub fn subscribe_active_session(&self) -> Subscriber<ActiveSession<B>> {
        self.active_session.subscribe_changed()
    }
}

impl<B> PickerDialog for DialogHost<B>
where
    B: LoadPage + Send + Sync + 'static,
{
    fn open(&self, request: OpenRequest) -> impl Future<Output = PickerOutcome> + Send {
        let (session, pending_outcome) = PickerSession::open(
            self.rt.clone(),
            Arc::clone(&self.backend),
            &self.config,
            request,
        );
        let session = Arc::new(session);
        let mut superseded = None;
        self.active_session.modify(|active_session| {
            superseded = active_session.replace(Arc::clone(&session));
            true
        });
        if let Some(superseded) = superseded {
            log::info!("Cancelling superseded picker session");
            superseded.cancel();
        }
        async move {
            let outcome = pending_outcome.recv().await;
            self.active_session.modify(|active_session| {
                if !active_session
                    .as_ref()
                    .is_some_and(|active_session| Arc::ptr_eq(active_session, &session))
                {
                    return false;
                }
                *active_session = None;
                true
            });
            outcome
        }
    }
}

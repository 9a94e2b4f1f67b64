// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    future::Future,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use classdesk_core_api::{FIRST_PAGE, PageNumber, PageRequest, PageSize};
use classdesk_usecases::resource::{LoadPage, load_page};
use tokio::{runtime::Handle, sync::oneshot};

use super::{
    ObservableState, OpenRequest, PickerOutcome, SelectionMode, State, debounce::Debouncer,
};

pub const DEFAULT_PAGE_SIZE: PageSize = PageSize::new(10).unwrap();

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub page_size: PageSize,

    /// Delay after the last keystroke before searching.
    pub debounce_window: Duration,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

/// Resolves with the outcome of a [`PickerSession`].
#[derive(Debug)]
pub struct PendingOutcome(oneshot::Receiver<PickerOutcome>);

impl PendingOutcome {
    pub async fn recv(self) -> PickerOutcome {
        let Self(rx) = self;
        rx.await.unwrap_or_else(|_| {
            log::debug!("Picker session has been dropped");
            PickerOutcome::Cancelled
        })
    }
}

struct PageLoader<B> {
    rt: Handle,
    backend: Arc<B>,
    state: Weak<ObservableState>,
    page_size: PageSize,
}

impl<B> Clone for PageLoader<B> {
    fn clone(&self) -> Self {
        Self {
            rt: self.rt.clone(),
            backend: Arc::clone(&self.backend),
            state: Weak::clone(&self.state),
            page_size: self.page_size,
        }
    }
}

impl<B> PageLoader<B>
where
    B: LoadPage + Send + Sync + 'static,
{
    /// Switch into the pending state immediately and return the
    /// task for fetching the page.
    fn fetch_page(&self, page: PageNumber) -> Option<impl Future<Output = ()> + Send + 'static> {
        let observable_state = self.state.upgrade()?;
        let mut context = None;
        observable_state.modify(|state| {
            context = Some(state.fetch_page_started(page));
            true
        });
        let context = context?;
        let this = self.clone();
        Some(async move {
            let request = PageRequest {
                page,
                page_size: this.page_size,
                params: context.params.clone(),
            };
            let result = load_page(this.backend.as_ref(), context.kind, request)
                .await
                .map_err(anyhow::Error::from);
            let Some(observable_state) = this.state.upgrade() else {
                log::debug!("Discarding page {page} after the picker has been closed");
                return;
            };
            observable_state.modify(|state| state.fetch_page_finished(&context, page, result));
        })
    }

    /// Apply the search text and start fetching the first page.
    ///
    /// Only the debounced part is abortable. The fetch is spawned
    /// separately and always finishes, outdated results are discarded
    /// by context.
    fn search(&self) {
        let Some(observable_state) = self.state.upgrade() else {
            return;
        };
        if !observable_state.modify(State::apply_search_text) {
            return;
        }
        drop(observable_state);
        self.spawn_fetch_page(FIRST_PAGE);
    }

    fn spawn_fetch_page(&self, page: PageNumber) {
        if let Some(task) = self.fetch_page(page) {
            self.rt.spawn(task);
        }
    }
}

/// A modal session for picking resources.
///
/// Dropping the session without finishing it is equivalent
/// to cancelling it.
#[allow(missing_debug_implementations)]
pub struct PickerSession<B> {
    state: Arc<ObservableState>,
    loader: PageLoader<B>,
    debouncer: Debouncer,
    outcome_tx: Mutex<Option<oneshot::Sender<PickerOutcome>>>,
}

impl<B> PickerSession<B>
where
    B: LoadPage + Send + Sync + 'static,
{
    /// Open a new session and start fetching the first page.
    #[must_use]
    pub fn open(
        rt: Handle,
        backend: Arc<B>,
        config: &PickerConfig,
        request: OpenRequest,
    ) -> (Self, PendingOutcome) {
        log::debug!("Opening picker: {request:?}");
        let state = Arc::new(ObservableState::new(State::new(request)));
        let loader = PageLoader {
            rt: rt.clone(),
            backend,
            state: Arc::downgrade(&state),
            page_size: config.page_size,
        };
        let debouncer = Debouncer::new(rt, config.debounce_window);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let session = Self {
            state,
            loader,
            debouncer,
            outcome_tx: Mutex::new(Some(outcome_tx)),
        };
        session.spawn_fetch_page(FIRST_PAGE);
        (session, PendingOutcome(outcome_rx))
    }

    #[must_use]
    pub const fn state(&self) -> &Arc<ObservableState> {
        &self.state
    }

    fn spawn_fetch_page(&self, page: PageNumber) {
        self.loader.spawn_fetch_page(page);
    }

    /// Search after the user stopped typing.
    pub fn input_search_text(&self, search_text: &str) {
        if !self
            .state
            .modify(|state| state.update_search_text_input(search_text))
        {
            return;
        }
        let loader = self.loader.clone();
        self.debouncer.schedule(async move { loader.search() });
    }

    /// Returns `false` if the page doesn't exist.
    pub fn goto_page(&self, page: PageNumber) -> bool {
        let total_pages = self.state.read().total_pages();
        if total_pages.is_some_and(|total_pages| page.get() > total_pages) {
            log::debug!("Page {page} is out of range: {total_pages:?}");
            return false;
        }
        self.spawn_fetch_page(page);
        true
    }

    pub fn toggle_selected(&self, id: &str) -> bool {
        self.state.modify(|state| state.toggle_selected(id))
    }

    /// Finish the session with one of the visible candidates.
    pub fn confirm(&self, id: &str) -> bool {
        let resource = self.state.read().find_item(id).cloned();
        let Some(resource) = resource else {
            log::warn!("Cannot confirm unknown resource {id}");
            return false;
        };
        self.finish(PickerOutcome::Confirmed(resource))
    }

    /// Finish the session with all selected resources.
    pub fn confirm_selection(&self) -> bool {
        let selected = {
            let state = self.state.read();
            if state.mode() != SelectionMode::Multiple {
                log::warn!("Multiple selection is disabled");
                return false;
            }
            state.selection().as_slice().to_vec()
        };
        self.finish(PickerOutcome::ConfirmedMany(selected))
    }

    pub fn cancel(&self) -> bool {
        self.finish(PickerOutcome::Cancelled)
    }

    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn is_finished(&self) -> bool {
        self.outcome_tx.lock().unwrap().is_none()
    }

    #[allow(clippy::missing_panics_doc)]
    fn finish(&self, outcome: PickerOutcome) -> bool {
        let Some(outcome_tx) = self.outcome_tx.lock().unwrap().take() else {
            log::warn!("Picker session has already been finished");
            return false;
        };
        self.debouncer.cancel();
        log::debug!("Finishing picker session: {outcome:?}");
        if outcome_tx.send(outcome).is_err() {
            log::debug!("Picker outcome has been ignored");
        }
        true
    }
}

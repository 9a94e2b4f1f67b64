// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::future::Future;

use classdesk_core::{ResourceKind, ResourceReference};
use classdesk_core_api::{Filters, Page, PageNumber, Params};

use crate::Observable;

pub mod debounce;

mod host;
pub use self::host::DialogHost;

pub mod selection;
use self::selection::SelectionMap;

mod session;
pub use self::session::{
    DEFAULT_DEBOUNCE_WINDOW, DEFAULT_PAGE_SIZE, PendingOutcome, PickerConfig, PickerSession,
};

/// Displayed when no candidates are available, including
/// when loading them failed.
pub const EMPTY_STATE_MESSAGE: &str = "No items found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub kind: ResourceKind,
    pub mode: SelectionMode,

    /// Highlighted when present among the candidates.
    pub current_selection_id: Option<String>,

    /// Fixed filters that could not be changed by the user.
    pub filters: Filters,
}

impl OpenRequest {
    #[must_use]
    pub fn new(kind: ResourceKind, mode: SelectionMode) -> Self {
        Self {
            kind,
            mode,
            current_selection_id: None,
            filters: Filters::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Confirmed(ResourceReference),
    ConfirmedMany(Vec<ResourceReference>),
    Cancelled,
}

/// A modal dialog for picking resources.
pub trait PickerDialog {
    /// Resolves when the dialog is closed.
    fn open(&self, request: OpenRequest) -> impl Future<Output = PickerOutcome> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ResourceKind,
    pub params: Params,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Initial,
    Pending {
        page: PageNumber,
        fetched_before: Option<Page<ResourceReference>>,
    },
    Ready {
        page: PageNumber,
        fetched: Page<ResourceReference>,
    },
    Failed {
        page: PageNumber,
        err_msg: String,
    },
}

impl FetchState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        match self {
            Self::Initial | Self::Ready { .. } | Self::Failed { .. } => true,
            Self::Pending { .. } => false,
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<PageNumber> {
        match self {
            Self::Initial => None,
            Self::Pending { page, .. } | Self::Ready { page, .. } | Self::Failed { page, .. } => {
                Some(*page)
            }
        }
    }

    /// The most recently fetched page, if any.
    ///
    /// Still available while fetching the next page.
    #[must_use]
    pub fn fetched(&self) -> Option<&Page<ResourceReference>> {
        match self {
            Self::Initial | Self::Failed { .. } => None,
            Self::Ready { fetched, .. } => Some(fetched),
            Self::Pending { fetched_before, .. } => fetched_before.as_ref(),
        }
    }

    pub fn reset(&mut self) -> bool {
        if matches!(self, Self::Initial) {
            return false;
        }
        *self = Self::Initial;
        log::debug!("Reset: {self:?}");
        true
    }

    fn fetch_started(&mut self, page: PageNumber) {
        let fetched_before = match std::mem::take(self) {
            Self::Initial | Self::Failed { .. } => None,
            Self::Ready { fetched, .. } => Some(fetched),
            Self::Pending { fetched_before, .. } => fetched_before,
        };
        *self = Self::Pending {
            page,
            fetched_before,
        };
    }

    fn fetch_succeeded(&mut self, page: PageNumber, fetched: Page<ResourceReference>) -> bool {
        match self {
            Self::Pending {
                page: pending_page, ..
            } if *pending_page == page => {
                *self = Self::Ready { page, fetched };
                log::debug!("Fetching succeeded: {self:?}");
                true
            }
            Self::Pending {
                page: pending_page, ..
            } => {
                log::debug!(
                    "Discarding fetched page {page} while waiting for page {pending_page}: {num_fetched} item(s)",
                    num_fetched = fetched.items.len()
                );
                false
            }
            _ => {
                log::error!("Illegal state when fetching succeeded: {self:?}");
                false
            }
        }
    }

    fn fetch_failed(&mut self, page: PageNumber, err_msg: String) -> bool {
        match self {
            Self::Pending {
                page: pending_page, ..
            } if *pending_page == page => {
                *self = Self::Failed { page, err_msg };
                log::debug!("Fetching failed: {self:?}");
                true
            }
            _ => {
                log::debug!("Discarding error of page {page}: {err_msg}");
                false
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct State {
    context: Context,
    mode: SelectionMode,
    current_selection_id: Option<String>,
    search_text_input: String,
    fetch: FetchState,
    selection: SelectionMap,
}

impl State {
    #[must_use]
    pub fn new(request: OpenRequest) -> Self {
        let OpenRequest {
            kind,
            mode,
            current_selection_id,
            filters,
        } = request;
        Self {
            context: Context {
                kind,
                params: Params {
                    search_text: String::new(),
                    filters,
                },
            },
            mode,
            current_selection_id,
            search_text_input: String::new(),
            fetch: FetchState::Initial,
            selection: SelectionMap::default(),
        }
    }

    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// The search text as typed, i.e. not yet applied.
    #[must_use]
    pub fn search_text_input(&self) -> &str {
        &self.search_text_input
    }

    #[must_use]
    pub const fn fetch(&self) -> &FetchState {
        &self.fetch
    }

    #[must_use]
    pub const fn selection(&self) -> &SelectionMap {
        &self.selection
    }

    #[must_use]
    pub fn is_current_selection(&self, id: &str) -> bool {
        self.current_selection_id.as_deref() == Some(id)
    }

    /// Visible candidates
    #[must_use]
    pub fn items(&self) -> &[ResourceReference] {
        self.fetch
            .fetched()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.fetch.fetched().map(|page| page.total_pages)
    }

    #[must_use]
    pub fn current_page(&self) -> Option<PageNumber> {
        self.fetch.page()
    }

    #[must_use]
    pub fn find_item(&self, id: &str) -> Option<&ResourceReference> {
        self.items().iter().find(|item| item.id == id)
    }

    /// Returns [`EMPTY_STATE_MESSAGE`] if nothing is pending and
    /// there is nothing to show.
    #[must_use]
    pub fn empty_state_message(&self) -> Option<&'static str> {
        match &self.fetch {
            FetchState::Initial | FetchState::Pending { .. } => None,
            FetchState::Ready { fetched, .. } if !fetched.is_empty() => None,
            FetchState::Ready { .. } | FetchState::Failed { .. } => Some(EMPTY_STATE_MESSAGE),
        }
    }

    pub fn update_search_text_input(&mut self, search_text_input: &str) -> bool {
        if self.search_text_input == search_text_input {
            return false;
        }
        search_text_input.clone_into(&mut self.search_text_input);
        true
    }

    /// Apply the (debounced) search text input.
    ///
    /// Returns `true` if the context has changed and the first
    /// page needs to be fetched.
    pub fn apply_search_text(&mut self) -> bool {
        let search_text = self.search_text_input.trim();
        if self.context.params.search_text == search_text {
            return false;
        }
        search_text.clone_into(&mut self.context.params.search_text);
        self.fetch.reset();
        log::debug!("Search text applied: {context:?}", context = self.context);
        true
    }

    /// Returns the context of the page request.
    pub fn fetch_page_started(&mut self, page: PageNumber) -> Context {
        self.fetch.fetch_started(page);
        self.context.clone()
    }

    pub fn fetch_page_finished(
        &mut self,
        context: &Context,
        page: PageNumber,
        result: anyhow::Result<Page<ResourceReference>>,
    ) -> bool {
        if *context != self.context {
            log::debug!(
                "Discarding result of page {page} for outdated context: expected = {expected:?}, actual = {context:?}",
                expected = self.context,
            );
            return false;
        }
        match result {
            Ok(fetched) => {
                if !self.fetch.fetch_succeeded(page, fetched) {
                    return false;
                }
                let Self {
                    mode,
                    fetch,
                    selection,
                    ..
                } = self;
                if let (SelectionMode::Multiple, Some(fetched)) = (mode, fetch.fetched()) {
                    let refreshed = selection.merge_fetched(&fetched.items);
                    if refreshed > 0 {
                        log::debug!("Refreshed {refreshed} selected item(s)");
                    }
                }
                true
            }
            Err(err) => {
                log::warn!(
                    "Failed to fetch page {page} of {kind} resources: {err}",
                    kind = context.kind
                );
                self.fetch.fetch_failed(page, err.to_string())
            }
        }
    }

    /// Select or deselect an item.
    ///
    /// Selected items could be deselected even if they are currently
    /// not visible.
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        if self.mode != SelectionMode::Multiple {
            log::warn!("Multiple selection is disabled");
            return false;
        }
        if self.selection.deselect(id).is_some() {
            return true;
        }
        let Some(item) = self.find_item(id).cloned() else {
            log::warn!("Cannot select invisible item {id}");
            return false;
        };
        self.selection.select(item)
    }
}

pub type ObservableState = Observable<State>;

#[cfg(test)]
mod tests;

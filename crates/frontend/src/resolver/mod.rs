// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use classdesk_core::{CollectionItem, ItemUid, Payload, ResourceKind, ResourceReference};
use classdesk_usecases::resource::{GetById, resolve};
use tokio::runtime::Handle;

use crate::{Observable, editor::OnChange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Pending {
        requested_id: String,
    },
    Resolved {
        requested_id: String,
        resource: ResourceReference,
    },
    Failed {
        requested_id: String,
        err_msg: String,
    },
}

impl Resolution {
    #[must_use]
    pub fn requested_id(&self) -> &str {
        match self {
            Self::Pending { requested_id }
            | Self::Resolved { requested_id, .. }
            | Self::Failed { requested_id, .. } => requested_id,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Falls back to the raw identifier until resolved
    /// successfully.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Resolved { resource, .. } => resource.display_name_or_id(),
            Self::Pending { requested_id } | Self::Failed { requested_id, .. } => requested_id,
        }
    }
}

/// Resolutions of the referenced resources, keyed by item.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct State {
    resolutions: HashMap<ItemUid, Resolution>,
}

impl State {
    #[must_use]
    pub fn get(&self, uid: &ItemUid) -> Option<&Resolution> {
        self.resolutions.get(uid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }

    #[must_use]
    pub fn display_name(&self, uid: &ItemUid) -> Option<&str> {
        self.get(uid).map(Resolution::display_name)
    }

    /// Adjust the resolutions to the current items.
    ///
    /// Returns the identifiers that need to be resolved.
    pub fn sync_with<P: Payload>(
        &mut self,
        items: &[CollectionItem<P>],
    ) -> (bool, Vec<(ItemUid, String)>) {
        let mut modified = false;
        let mut requests = Vec::new();
        let mut retained = HashMap::with_capacity(items.len());
        for item in items {
            let Some(resource_id) = item.payload.resource_id() else {
                continue;
            };
            let resolution = match self.resolutions.remove(&item.uid) {
                Some(resolution) if resolution.requested_id() == resource_id => resolution,
                _ => {
                    modified = true;
                    requests.push((item.uid, resource_id.to_owned()));
                    Resolution::Pending {
                        requested_id: resource_id.to_owned(),
                    }
                }
            };
            retained.insert(item.uid, resolution);
        }
        if !self.resolutions.is_empty() {
            log::debug!(
                "Dropping {num_dropped} outdated resolution(s)",
                num_dropped = self.resolutions.len()
            );
            modified = true;
        }
        self.resolutions = retained;
        (modified, requests)
    }

    /// Apply the result of a lookup.
    ///
    /// The result is discarded if the item no longer references
    /// the requested resource.
    pub fn resolution_finished(
        &mut self,
        uid: ItemUid,
        requested_id: &str,
        result: anyhow::Result<ResourceReference>,
    ) -> bool {
        let Some(resolution) = self.resolutions.get_mut(&uid) else {
            log::debug!("Discarding resolution of {requested_id} for removed item {uid}");
            return false;
        };
        if resolution.requested_id() != requested_id {
            log::debug!(
                "Discarding stale resolution of {requested_id} for item {uid}: expected = {expected}",
                expected = resolution.requested_id()
            );
            return false;
        }
        let requested_id = requested_id.to_owned();
        *resolution = match result {
            Ok(resource) => Resolution::Resolved {
                requested_id,
                resource,
            },
            Err(err) => {
                log::warn!("Failed to resolve {requested_id}: {err}");
                Resolution::Failed {
                    requested_id,
                    err_msg: err.to_string(),
                }
            }
        };
        true
    }
}

pub type ObservableState = Observable<State>;

/// Resolves the display names of the resources referenced
/// by the items of a list editor.
///
/// Lookups are fire-and-forget and may complete in any order.
#[allow(missing_debug_implementations)]
pub struct ResourceResolver<B> {
    rt: Handle,
    backend: Arc<B>,
    kind: ResourceKind,
    state: Arc<ObservableState>,
}

impl<B> Clone for ResourceResolver<B> {
    fn clone(&self) -> Self {
        Self {
            rt: self.rt.clone(),
            backend: Arc::clone(&self.backend),
            kind: self.kind,
            state: Arc::clone(&self.state),
        }
    }
}

impl<B> ResourceResolver<B>
where
    B: GetById + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(rt: Handle, backend: Arc<B>, kind: ResourceKind) -> Self {
        Self {
            rt,
            backend,
            kind,
            state: Default::default(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub const fn state(&self) -> &Arc<ObservableState> {
        &self.state
    }

    /// The resolved display name or the raw identifier.
    ///
    /// Returns `None` if the item doesn't reference a resource.
    #[must_use]
    pub fn display_name<P: Payload>(&self, item: &CollectionItem<P>) -> Option<String> {
        let resource_id = item.payload.resource_id()?;
        let state = self.state.read();
        let display_name = state
            .get(&item.uid)
            .filter(|resolution| resolution.requested_id() == resource_id)
            .map_or(resource_id, Resolution::display_name);
        Some(display_name.to_owned())
    }

    pub fn sync_with<P: Payload>(&self, items: &[CollectionItem<P>]) {
        let mut requests = Vec::new();
        self.state.modify(|state| {
            let (modified, new_requests) = state.sync_with(items);
            requests = new_requests;
            modified
        });
        for (uid, requested_id) in requests {
            self.spawn_resolve(uid, requested_id);
        }
    }

    fn spawn_resolve(&self, uid: ItemUid, requested_id: String) {
        log::debug!(
            "Resolving {kind} {requested_id} for item {uid}",
            kind = self.kind
        );
        let backend = Arc::clone(&self.backend);
        let kind = self.kind;
        let state: Weak<ObservableState> = Arc::downgrade(&self.state);
        self.rt.spawn(async move {
            let result = resolve(backend.as_ref(), kind, &requested_id)
                .await
                .map_err(anyhow::Error::from);
            let Some(state) = state.upgrade() else {
                log::debug!("Discarding resolution of {requested_id} after the resolver has been dropped");
                return;
            };
            state.modify(|state| state.resolution_finished(uid, &requested_id, result));
        });
    }
}

impl<P, B> OnChange<P> for ResourceResolver<B>
where
    P: Payload,
    B: GetById + Send + Sync + 'static,
{
    fn on_change(&mut self, items: &[CollectionItem<P>]) {
        self.sync_with(items);
    }

    fn on_reset(&mut self, items: &[CollectionItem<P>]) {
        self.sync_with(items);
    }
}

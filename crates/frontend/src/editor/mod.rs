// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use classdesk_core::{
    CollectionItem, Direction, IndexOutOfRange, Payload, ResourceReference,
    SelectResource,
    collection::{self, neighbor_index},
};
use classdesk_core_api::FILTER_KEY_MEDIA_TYPE;
use thiserror::Error;

use crate::picker::{OpenRequest, PickerDialog, PickerOutcome, SelectionMode};

/// Receives the new sequence after every effective mutation.
pub trait OnChange<P> {
    fn on_change(&mut self, items: &[CollectionItem<P>]);

    /// The sequence has been replaced from outside.
    ///
    /// Invoked by [`ListEditor::set_value()`] instead of [`OnChange::on_change()`],
    /// i.e. for refreshing derived state without echoing the value back.
    fn on_reset(&mut self, items: &[CollectionItem<P>]) {
        let _ = items;
    }
}

impl<P, F> OnChange<P> for F
where
    F: FnMut(&[CollectionItem<P>]),
{
    fn on_change(&mut self, items: &[CollectionItem<P>]) {
        self(items);
    }
}

/// Notify both listeners, first `A` and then `B`.
impl<P, A, B> OnChange<P> for (A, B)
where
    A: OnChange<P>,
    B: OnChange<P>,
{
    fn on_change(&mut self, items: &[CollectionItem<P>]) {
        self.0.on_change(items);
        self.1.on_change(items);
    }

    fn on_reset(&mut self, items: &[CollectionItem<P>]) {
        self.0.on_reset(items);
        self.1.on_reset(items);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorPolicy {
    /// Items could only be removed while the sequence contains
    /// more than this number of items.
    pub min_items: usize,
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    IndexOutOfRange(#[from] IndexOutOfRange),

    #[error("at least {min_items} item(s) required")]
    MinItems { min_items: usize },
}

pub type EditResult<T> = Result<T, EditError>;

/// Owns a normalized sequence and reports all changes upward.
#[allow(missing_debug_implementations)]
pub struct ListEditor<P, C> {
    items: Vec<CollectionItem<P>>,
    policy: EditorPolicy,
    on_change: C,
}

impl<P, C> ListEditor<P, C>
where
    P: Payload + Clone + PartialEq,
    C: OnChange<P>,
{
    /// The initial value is normalized silently.
    pub fn new(value: &[CollectionItem<P>], policy: EditorPolicy, mut on_change: C) -> Self {
        let items = collection::normalize(value);
        on_change.on_reset(&items);
        Self {
            items,
            policy,
            on_change,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CollectionItem<P>] {
        &self.items
    }

    #[must_use]
    pub const fn policy(&self) -> EditorPolicy {
        self.policy
    }

    #[must_use]
    pub const fn on_change(&self) -> &C {
        &self.on_change
    }

    /// Replace the whole sequence.
    pub fn set_value(&mut self, value: &[CollectionItem<P>]) {
        self.items = collection::normalize(value);
        log::debug!("Value replaced: {len} item(s)", len = self.items.len());
        self.on_change.on_reset(&self.items);
    }

    fn replace(&mut self, items: Vec<CollectionItem<P>>) -> bool {
        if items == self.items {
            return false;
        }
        self.items = items;
        self.on_change.on_change(&self.items);
        true
    }

    /// Append a new item.
    pub fn add(&mut self, payload: P) {
        let items = collection::insert(&self.items, payload);
        self.replace(items);
    }

    /// Append new items, preserving their order.
    ///
    /// Returns the number of added items.
    pub fn add_all(&mut self, payloads: impl IntoIterator<Item = P>) -> usize {
        let len_before = self.items.len();
        let items = collection::insert_all(&self.items, payloads);
        let added = items.len() - len_before;
        if added > 0 {
            self.replace(items);
        }
        added
    }

    #[must_use]
    pub fn can_remove(&self) -> bool {
        self.items.len() > self.policy.min_items
    }

    pub fn remove(&mut self, index: usize) -> EditResult<()> {
        let items = collection::remove(&self.items, index)?;
        if !self.can_remove() {
            let EditorPolicy { min_items } = self.policy;
            return Err(EditError::MinItems { min_items });
        }
        self.replace(items);
        Ok(())
    }

    #[must_use]
    pub fn can_move(&self, index: usize, direction: Direction) -> bool {
        neighbor_index(self.items.len(), index, direction).is_some()
    }

    /// Swap an item with its neighbor.
    ///
    /// Returns `false` if the item could not be moved any further.
    pub fn move_item(&mut self, index: usize, direction: Direction) -> EditResult<bool> {
        let items = collection::move_item(&self.items, index, direction)?;
        Ok(self.replace(items))
    }

    /// Returns `false` if the patches had no effect.
    pub fn update_at(
        &mut self,
        index: usize,
        patches: impl IntoIterator<Item = P::Patch>,
    ) -> EditResult<bool> {
        let items = collection::update_at(&self.items, index, patches)?;
        Ok(self.replace(items))
    }
}

impl<P, C> ListEditor<P, C>
where
    P: SelectResource + Clone + PartialEq,
    C: OnChange<P>,
{
    /// Reference the given resource from the item at `index`.
    pub fn select_resource(
        &mut self,
        index: usize,
        resource: &ResourceReference,
    ) -> EditResult<bool> {
        self.update_at(index, P::select_resource(resource))
    }

    /// Append one new item per resource.
    pub fn append_picked(&mut self, resources: &[ResourceReference]) -> usize {
        self.add_all(resources.iter().map(P::from_resource))
    }

    /// Pick a resource for the item at `index`.
    ///
    /// Returns `false` if the dialog was cancelled or the selection
    /// didn't change anything.
    pub async fn pick_resource<D>(&mut self, index: usize, dialog: &D) -> EditResult<bool>
    where
        D: PickerDialog,
    {
        let len = self.items.len();
        let item = self
            .items
            .get(index)
            .ok_or(IndexOutOfRange { index, len })?;
        let uid = item.uid;
        let mut request = OpenRequest::new(P::RESOURCE_KIND, SelectionMode::Single);
        request.current_selection_id = item.payload.resource_id().map(ToOwned::to_owned);
        if let Some(media_type) = item.payload.media_type_filter() {
            request
                .filters
                .insert(FILTER_KEY_MEDIA_TYPE.to_owned(), media_type.to_owned());
        }
        let resource = match dialog.open(request).await {
            PickerOutcome::Confirmed(resource) => resource,
            PickerOutcome::ConfirmedMany(mut resources) => {
                if resources.len() != 1 {
                    log::warn!(
                        "Expected a single resource instead of {num_resources}",
                        num_resources = resources.len()
                    );
                }
                let Some(resource) = resources.pop() else {
                    return Ok(false);
                };
                resource
            }
            PickerOutcome::Cancelled => {
                log::debug!("Picking a resource for item {uid} has been cancelled");
                return Ok(false);
            }
        };
        // The editor is borrowed mutably while the dialog is open,
        // i.e. the item is still at the same position.
        debug_assert_eq!(Some(uid), self.items.get(index).map(|item| item.uid));
        self.select_resource(index, &resource)
    }

    /// Pick multiple resources and append them.
    ///
    /// Returns the number of added items.
    pub async fn pick_and_append<D>(&mut self, dialog: &D) -> usize
    where
        D: PickerDialog,
    {
        let request = OpenRequest::new(P::RESOURCE_KIND, SelectionMode::Multiple);
        match dialog.open(request).await {
            PickerOutcome::Confirmed(resource) => self.append_picked(&[resource]),
            PickerOutcome::ConfirmedMany(resources) => self.append_picked(&resources),
            PickerOutcome::Cancelled => 0,
        }
    }
}

// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ordered collections of items inside multi-step builders.
//!
//! All operators are pure: they borrow the current sequence and return
//! a new, fully renumbered sequence. The `order` of the items in every
//! returned sequence is the contiguous range `1..=len`.

use std::fmt;

use uuid::Uuid;

/// Stable identifier of an item while it is edited.
///
/// Positions shift when items are moved or removed. Side maps must be
/// keyed by this identifier instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemUid(Uuid);

impl ItemUid {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 1-based rank of an item within its sequence.
pub type OrderNumber = u32;

/// Kind-specific content of a [`CollectionItem`].
pub trait Payload {
    /// A single field update.
    type Patch;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Foreign key of the referenced resource, if any.
    fn resource_id(&self) -> Option<&str>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CollectionItem<P> {
    #[cfg_attr(feature = "serde", serde(default = "ItemUid::random"))]
    pub uid: ItemUid,

    /// Rewritten by every operator, i.e. only meaningful within a
    /// normalized sequence.
    #[cfg_attr(feature = "serde", serde(default))]
    pub order: OrderNumber,

    #[cfg_attr(feature = "serde", serde(flatten))]
    pub payload: P,
}

impl<P> CollectionItem<P> {
    /// Create a new, not yet ordered item.
    #[must_use]
    pub fn new(payload: P) -> Self {
        Self {
            uid: ItemUid::random(),
            order: 0,
            payload,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("index {index} out of range for {len} item(s)")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("item at index {index} is ordered as {actual} instead of {expected}")]
pub struct OrderMismatch {
    pub index: usize,
    pub expected: OrderNumber,
    pub actual: OrderNumber,
}

const fn order_of_index(index: usize) -> OrderNumber {
    (index + 1) as OrderNumber
}

fn renumber<P>(items: &mut [CollectionItem<P>]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.order = order_of_index(index);
    }
}

fn check_index(len: usize, index: usize) -> Result<(), IndexOutOfRange> {
    if index < len {
        Ok(())
    } else {
        Err(IndexOutOfRange { index, len })
    }
}

/// Rewrite the order of all items according to their position.
#[must_use]
pub fn normalize<P: Clone>(items: &[CollectionItem<P>]) -> Vec<CollectionItem<P>> {
    let mut items = items.to_vec();
    renumber(&mut items);
    items
}

/// Verify that the items are ordered as `1..=len`.
pub fn check_order<P>(items: &[CollectionItem<P>]) -> Result<(), OrderMismatch> {
    items
        .iter()
        .enumerate()
        .find_map(|(index, item)| {
            let expected = order_of_index(index);
            (item.order != expected).then_some(OrderMismatch {
                index,
                expected,
                actual: item.order,
            })
        })
        .map_or(Ok(()), Err)
}

/// Apply field updates to the item at `index`.
///
/// The patches are applied in the given order.
pub fn update_at<P>(
    items: &[CollectionItem<P>],
    index: usize,
    patches: impl IntoIterator<Item = P::Patch>,
) -> Result<Vec<CollectionItem<P>>, IndexOutOfRange>
where
    P: Payload + Clone,
{
    check_index(items.len(), index)?;
    let mut items = normalize(items);
    let payload = &mut items[index].payload;
    for patch in patches {
        payload.apply_patch(patch);
    }
    Ok(items)
}

/// Index of the neighbor in the given direction, if any.
#[must_use]
pub fn neighbor_index(len: usize, index: usize, direction: Direction) -> Option<usize> {
    if index >= len {
        return None;
    }
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => {
            let next = index + 1;
            (next < len).then_some(next)
        }
    }
}

/// Swap the item at `index` with its neighbor.
///
/// Moving the first item up or the last item down leaves the
/// sequence unchanged.
pub fn move_item<P: Clone>(
    items: &[CollectionItem<P>],
    index: usize,
    direction: Direction,
) -> Result<Vec<CollectionItem<P>>, IndexOutOfRange> {
    check_index(items.len(), index)?;
    let mut items = items.to_vec();
    if let Some(neighbor) = neighbor_index(items.len(), index, direction) {
        items.swap(index, neighbor);
    }
    renumber(&mut items);
    Ok(items)
}

/// Append a new item at the end.
#[must_use]
pub fn insert<P: Clone>(items: &[CollectionItem<P>], payload: P) -> Vec<CollectionItem<P>> {
    insert_all(items, [payload])
}

/// Append multiple new items at the end, preserving their order.
#[must_use]
pub fn insert_all<P: Clone>(
    items: &[CollectionItem<P>],
    payloads: impl IntoIterator<Item = P>,
) -> Vec<CollectionItem<P>> {
    let mut items = items.to_vec();
    items.extend(payloads.into_iter().map(CollectionItem::new));
    renumber(&mut items);
    items
}

pub fn remove<P: Clone>(
    items: &[CollectionItem<P>],
    index: usize,
) -> Result<Vec<CollectionItem<P>>, IndexOutOfRange> {
    check_index(items.len(), index)?;
    let mut items = items.to_vec();
    items.remove(index);
    renumber(&mut items);
    Ok(items)
}

#[must_use]
pub fn position_of<P>(items: &[CollectionItem<P>], uid: &ItemUid) -> Option<usize> {
    items.iter().position(|item| &item.uid == uid)
}

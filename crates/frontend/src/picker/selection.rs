// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashMap;

use classdesk_core::ResourceReference;

/// Selected resources across pages, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMap {
    selected: Vec<ResourceReference>,
}

impl SelectionMap {
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ResourceReference] {
        &self.selected
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ResourceReference> {
        self.selected
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.selected.iter().position(|selected| selected.id == id)
    }

    /// Returns `false` if already selected.
    pub fn select(&mut self, resource: ResourceReference) -> bool {
        if self.contains(&resource.id) {
            return false;
        }
        self.selected.push(resource);
        true
    }

    pub fn deselect(&mut self, id: &str) -> Option<ResourceReference> {
        let index = self.position(id)?;
        Some(self.selected.remove(index))
    }

    /// Refresh selected entries with freshly fetched data.
    ///
    /// Selected entries that are missing from `fetched` are kept
    /// unchanged, i.e. they may be located on a different page.
    ///
    /// Returns the number of modified entries.
    pub fn merge_fetched(&mut self, fetched: &[ResourceReference]) -> usize {
        if self.selected.is_empty() {
            return 0;
        }
        let fetched = fetched
            .iter()
            .map(|resource| (resource.id.as_str(), resource))
            .collect::<HashMap<_, _>>();
        let mut modified = 0;
        for selected in &mut self.selected {
            let Some(fetched) = fetched.get(selected.id.as_str()) else {
                continue;
            };
            if *selected != **fetched {
                selected.clone_from(fetched);
                modified += 1;
            }
        }
        modified
    }
}

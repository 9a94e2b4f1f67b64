// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory backend, e.g. for fixtures and tests.

use std::future::{Future, ready};

use classdesk_core::{ResourceKind, ResourceReference};
use classdesk_core_api::{FILTER_KEY_MEDIA_TYPE, Page, PageRequest, Params, count_pages};

use crate::{
    Error, InputError, Result,
    resource::{GetById, LoadPage},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "json",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Catalog {
    #[cfg_attr(feature = "json", serde(default))]
    pub files: Vec<ResourceReference>,

    #[cfg_attr(feature = "json", serde(default))]
    pub lessons: Vec<ResourceReference>,

    #[cfg_attr(feature = "json", serde(default))]
    pub quizzes: Vec<ResourceReference>,
}

impl Catalog {
    #[must_use]
    pub fn resources(&self, kind: ResourceKind) -> &[ResourceReference] {
        match kind {
            ResourceKind::File => &self.files,
            ResourceKind::Lesson => &self.lessons,
            ResourceKind::Quiz => &self.quizzes,
        }
    }

    pub fn resources_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceReference> {
        match kind {
            ResourceKind::File => &mut self.files,
            ResourceKind::Lesson => &mut self.lessons,
            ResourceKind::Quiz => &mut self.quizzes,
        }
    }

    pub fn insert(&mut self, kind: ResourceKind, resource: ResourceReference) {
        self.resources_mut(kind).push(resource);
    }

    #[cfg(feature = "json")]
    pub fn from_json_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }

    pub fn search<'a>(
        &'a self,
        kind: ResourceKind,
        params: &Params,
    ) -> Result<Vec<&'a ResourceReference>> {
        let Params {
            search_text,
            filters,
        } = params;
        let mut media_type_prefix = None;
        for (key, value) in filters {
            if key == FILTER_KEY_MEDIA_TYPE {
                media_type_prefix = Some(value.as_str());
            } else {
                return Err(InputError(anyhow::anyhow!("Unsupported filter: {key}")).into());
            }
        }
        let search_text = search_text.to_lowercase();
        let matches = self
            .resources(kind)
            .iter()
            .filter(|resource| {
                media_type_prefix.is_none_or(|prefix| resource.has_media_type_prefix(prefix))
            })
            .filter(|resource| {
                search_text.is_empty()
                    || resource.display_name.to_lowercase().contains(&search_text)
                    || resource.id.to_lowercase() == search_text
            })
            .collect();
        Ok(matches)
    }

    fn load_page_now(
        &self,
        kind: ResourceKind,
        request: &PageRequest,
    ) -> Result<Page<ResourceReference>> {
        let matches = self.search(kind, &request.params)?;
        let total_pages = count_pages(matches.len(), request.page_size);
        let pagination = request.pagination();
        let items = matches
            .into_iter()
            .skip(pagination.mandatory_offset() as usize)
            .take(pagination.mandatory_limit() as usize)
            .cloned()
            .collect();
        Ok(Page { items, total_pages })
    }

    fn get_by_id_now(&self, kind: ResourceKind, id: &str) -> Result<ResourceReference> {
        self.resources(kind)
            .iter()
            .find(|resource| resource.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }
}

impl LoadPage for Catalog {
    fn load_page(
        &self,
        kind: ResourceKind,
        request: &PageRequest,
    ) -> impl Future<Output = Result<Page<ResourceReference>>> + Send {
        ready(self.load_page_now(kind, request))
    }
}

impl GetById for Catalog {
    fn get_by_id(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> impl Future<Output = Result<ResourceReference>> + Send {
        ready(self.get_by_id_now(kind, id))
    }
}

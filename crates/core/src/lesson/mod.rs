// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::{
    collection::{CollectionItem, Payload, check_order},
    prelude::*,
    resource::{ResourceKind, ResourceReference, SelectResource},
};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

pub const VIDEO_MEDIA_TYPE_PREFIX: &str = "video/";

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum ContentKind {
    #[default]
    Pdf,
    Video,
}

impl ContentKind {
    /// Media type (prefix) of matching file resources.
    #[must_use]
    pub const fn media_type_prefix(self) -> &'static str {
        match self {
            Self::Pdf => PDF_MEDIA_TYPE,
            Self::Video => VIDEO_MEDIA_TYPE_PREFIX,
        }
    }

    #[must_use]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        if media_type.starts_with(VIDEO_MEDIA_TYPE_PREFIX) {
            Some(Self::Video)
        } else if media_type == PDF_MEDIA_TYPE {
            Some(Self::Pdf)
        } else {
            None
        }
    }
}

/// A single content block of a lesson.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LessonContent {
    #[cfg_attr(feature = "serde", serde(rename = "contentKind"))]
    pub kind: ContentKind,

    /// File resource
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub resource_id: Option<String>,

    /// Cached name of the file resource for display.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub resource_name: Option<String>,
}

impl LessonContent {
    #[must_use]
    pub const fn new(kind: ContentKind) -> Self {
        Self {
            kind,
            resource_id: None,
            resource_name: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LessonContentPatch {
    /// Switching to a different kind clears the resource.
    Kind(ContentKind),
    Resource { id: String, name: Option<String> },
    ClearResource,
}

impl Payload for LessonContent {
    type Patch = LessonContentPatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        match patch {
            LessonContentPatch::Kind(kind) => {
                if self.kind == kind {
                    return;
                }
                self.kind = kind;
                self.resource_id = None;
                self.resource_name = None;
            }
            LessonContentPatch::Resource { id, name } => {
                self.resource_id = Some(id);
                self.resource_name = name;
            }
            LessonContentPatch::ClearResource => {
                self.resource_id = None;
                self.resource_name = None;
            }
        }
    }

    fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }
}

impl SelectResource for LessonContent {
    const RESOURCE_KIND: ResourceKind = ResourceKind::File;

    fn media_type_filter(&self) -> Option<&'static str> {
        Some(self.kind.media_type_prefix())
    }

    fn select_resource(resource: &ResourceReference) -> Vec<Self::Patch> {
        vec![LessonContentPatch::Resource {
            id: resource.id.clone(),
            name: Some(resource.display_name.clone()),
        }]
    }

    fn from_resource(resource: &ResourceReference) -> Self {
        let kind = resource
            .media_type
            .as_deref()
            .and_then(ContentKind::from_media_type)
            .unwrap_or_default();
        Self {
            kind,
            resource_id: Some(resource.id.clone()),
            resource_name: Some(resource.display_name.clone()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LessonContentInvalidity {
    ResourceMissing,
    ResourceIdEmpty,
}

impl Validate for LessonContent {
    type Invalidity = LessonContentInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            resource_id,
            kind: _,
            resource_name: _,
        } = self;
        ValidationContext::new()
            .invalidate_if(resource_id.is_none(), Self::Invalidity::ResourceMissing)
            .invalidate_if(
                resource_id.as_ref().is_some_and(|id| id.trim().is_empty()),
                Self::Invalidity::ResourceIdEmpty,
            )
            .into()
    }
}

/// The value of the lesson form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LessonDraft {
    pub title: String,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub category_id: Option<String>,

    /// Ordered list of content blocks.
    #[cfg_attr(feature = "serde", serde(default))]
    pub contents: Vec<CollectionItem<LessonContent>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LessonDraftInvalidity {
    TitleEmpty,
    CategoryIdEmpty,
    ContentsEmpty,
    Content(usize, LessonContentInvalidity),
    OrderMismatch,
}

impl Validate for LessonDraft {
    type Invalidity = LessonDraftInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            title,
            category_id,
            contents,
            description: _,
        } = self;
        let context = ValidationContext::new()
            .invalidate_if(title.trim().is_empty(), Self::Invalidity::TitleEmpty)
            .invalidate_if(
                category_id.as_ref().is_some_and(|id| id.trim().is_empty()),
                Self::Invalidity::CategoryIdEmpty,
            )
            .invalidate_if(contents.is_empty(), Self::Invalidity::ContentsEmpty)
            .invalidate_if(check_order(contents).is_err(), Self::Invalidity::OrderMismatch);
        contents
            .iter()
            .enumerate()
            .fold(context, |context, (index, item)| {
                context.validate_with(&item.payload, |invalidity| {
                    Self::Invalidity::Content(index, invalidity)
                })
            })
            .into()
    }
}

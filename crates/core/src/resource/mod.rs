// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use url::Url;

use crate::collection::Payload;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ResourceKind {
    File,
    Lesson,
    Quiz,
}

/// Lightweight projection of an external resource.
///
/// Only used for display purposes, e.g. for showing a human-readable
/// name instead of the raw identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ResourceReference {
    pub id: String,

    pub display_name: String,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub media_type: Option<String>,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub preview_url: Option<Url>,
}

impl ResourceReference {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            media_type: None,
            preview_url: None,
        }
    }

    /// The display name or the identifier if the name is blank.
    #[must_use]
    pub fn display_name_or_id(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }

    #[must_use]
    pub fn has_media_type_prefix(&self, prefix: &str) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|media_type| media_type.starts_with(prefix))
    }
}

/// Payloads that reference a resource which could be picked from
/// a remote collection.
pub trait SelectResource: Payload + Sized {
    const RESOURCE_KIND: ResourceKind;

    /// Restrict the candidates by media type (prefix match).
    fn media_type_filter(&self) -> Option<&'static str> {
        None
    }

    /// Field updates for referencing the selected resource.
    fn select_resource(resource: &ResourceReference) -> Vec<Self::Patch>;

    /// A new payload that references the selected resource.
    fn from_resource(resource: &ResourceReference) -> Self;
}

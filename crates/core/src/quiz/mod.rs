// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashSet;

use crate::{
    collection::{CollectionItem, Payload, check_order},
    prelude::*,
    resource::{ResourceKind, ResourceReference, SelectResource},
};

/// Reference to a quiz within a quiz collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct QuizReference {
    /// Empty until a quiz has been picked.
    pub quiz_id: String,
}

impl QuizReference {
    #[must_use]
    pub fn new(quiz_id: impl Into<String>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizReferencePatch {
    QuizId(String),
}

impl Payload for QuizReference {
    type Patch = QuizReferencePatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        match patch {
            QuizReferencePatch::QuizId(quiz_id) => self.quiz_id = quiz_id,
        }
    }

    fn resource_id(&self) -> Option<&str> {
        (!self.quiz_id.is_empty()).then_some(self.quiz_id.as_str())
    }
}

impl SelectResource for QuizReference {
    const RESOURCE_KIND: ResourceKind = ResourceKind::Quiz;

    fn select_resource(resource: &ResourceReference) -> Vec<Self::Patch> {
        vec![QuizReferencePatch::QuizId(resource.id.clone())]
    }

    fn from_resource(resource: &ResourceReference) -> Self {
        Self::new(resource.id.clone())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuizReferenceInvalidity {
    QuizIdEmpty,
}

impl Validate for QuizReference {
    type Invalidity = QuizReferenceInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.quiz_id.trim().is_empty(),
                Self::Invalidity::QuizIdEmpty,
            )
            .into()
    }
}

/// The value of the quiz collection form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct QuizCollectionDraft {
    pub title: String,

    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,

    /// Ordered list of quizzes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub quizzes: Vec<CollectionItem<QuizReference>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuizCollectionDraftInvalidity {
    TitleEmpty,
    Quiz(usize, QuizReferenceInvalidity),
    /// The same quiz is referenced more than once.
    DuplicateQuiz(usize),
    OrderMismatch,
}

impl Validate for QuizCollectionDraft {
    type Invalidity = QuizCollectionDraftInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        let Self {
            title,
            quizzes,
            description: _,
        } = self;
        let context = ValidationContext::new()
            .invalidate_if(title.trim().is_empty(), Self::Invalidity::TitleEmpty)
            .invalidate_if(check_order(quizzes).is_err(), Self::Invalidity::OrderMismatch);
        let mut quiz_ids = HashSet::with_capacity(quizzes.len());
        quizzes
            .iter()
            .enumerate()
            .fold(context, |context, (index, item)| {
                let quiz_id = item.payload.quiz_id.trim();
                let duplicate = !quiz_id.is_empty() && !quiz_ids.insert(quiz_id);
                context
                    .validate_with(&item.payload, |invalidity| {
                        Self::Invalidity::Quiz(index, invalidity)
                    })
                    .invalidate_if(duplicate, Self::Invalidity::DuplicateQuiz(index))
            })
            .into()
    }
}

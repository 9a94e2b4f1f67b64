// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{marker::PhantomData, sync::Arc};

use classdesk_core::{
    CollectionItem, LessonContent, LessonDraft, Payload, QuizCollectionDraft, QuizReference,
    lesson::{LessonContentInvalidity, LessonDraftInvalidity},
    quiz::{QuizCollectionDraftInvalidity, QuizReferenceInvalidity},
};
use discro::Subscriber;
use semval::Validate;
use thiserror::Error;

use crate::{
    Observable, ObservableRef,
    editor::{EditorPolicy, ListEditor, OnChange},
    notification::{Level, Notifications},
};

/// A draft with an ordered list of items.
pub trait ListField<P> {
    fn items(&self) -> &[CollectionItem<P>];

    fn items_mut(&mut self) -> &mut Vec<CollectionItem<P>>;
}

impl ListField<LessonContent> for LessonDraft {
    fn items(&self) -> &[CollectionItem<LessonContent>] {
        &self.contents
    }

    fn items_mut(&mut self) -> &mut Vec<CollectionItem<LessonContent>> {
        &mut self.contents
    }
}

impl ListField<QuizReference> for QuizCollectionDraft {
    fn items(&self) -> &[CollectionItem<QuizReference>] {
        &self.quizzes
    }

    fn items_mut(&mut self) -> &mut Vec<CollectionItem<QuizReference>> {
        &mut self.quizzes
    }
}

/// User-facing description of a validation failure.
pub trait InvalidityMessage {
    fn message(&self) -> String;
}

impl InvalidityMessage for LessonDraftInvalidity {
    fn message(&self) -> String {
        match self {
            Self::TitleEmpty => "The title is required".to_owned(),
            Self::CategoryIdEmpty => "The category is invalid".to_owned(),
            Self::ContentsEmpty => "At least one content is required".to_owned(),
            Self::Content(index, invalidity) => {
                let position = index + 1;
                match invalidity {
                    LessonContentInvalidity::ResourceMissing => {
                        format!("Content #{position}: No file selected")
                    }
                    LessonContentInvalidity::ResourceIdEmpty => {
                        format!("Content #{position}: Invalid file")
                    }
                }
            }
            Self::OrderMismatch => "The contents are not ordered".to_owned(),
        }
    }
}

impl InvalidityMessage for QuizCollectionDraftInvalidity {
    fn message(&self) -> String {
        match self {
            Self::TitleEmpty => "The title is required".to_owned(),
            Self::Quiz(index, QuizReferenceInvalidity::QuizIdEmpty) => {
                format!("Quiz #{position}: No quiz selected", position = index + 1)
            }
            Self::DuplicateQuiz(index) => {
                format!("Quiz #{position}: Already included", position = index + 1)
            }
            Self::OrderMismatch => "The quizzes are not ordered".to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError<I> {
    #[error("invalid draft")]
    Invalid { invalidities: Vec<I> },
}

/// Writes the changes of a list editor into the draft.
#[allow(missing_debug_implementations)]
pub struct DraftBinding<D, P> {
    draft: Arc<Observable<D>>,
    item: PhantomData<fn(P)>,
}

impl<D, P> Clone for DraftBinding<D, P> {
    fn clone(&self) -> Self {
        Self {
            draft: Arc::clone(&self.draft),
            item: PhantomData,
        }
    }
}

impl<D, P> OnChange<P> for DraftBinding<D, P>
where
    D: ListField<P>,
    P: Clone + PartialEq,
{
    fn on_change(&mut self, items: &[CollectionItem<P>]) {
        self.draft.modify(|draft| {
            let draft_items = draft.items_mut();
            if draft_items.as_slice() == items {
                return false;
            }
            *draft_items = items.to_vec();
            true
        });
    }

    // The draft must reflect the normalized items.
    fn on_reset(&mut self, items: &[CollectionItem<P>]) {
        self.on_change(items);
    }
}

/// The state of an open form.
///
/// Invalid drafts are rejected on submit and the form stays
/// open for corrections.
#[allow(missing_debug_implementations)]
pub struct FormSession<D> {
    draft: Arc<Observable<D>>,
    notifications: Arc<Notifications>,
}

impl<D> FormSession<D>
where
    D: Validate + Clone,
    D::Invalidity: InvalidityMessage,
{
    #[must_use]
    pub fn new(draft: D, notifications: Arc<Notifications>) -> Self {
        Self {
            draft: Arc::new(Observable::new(draft)),
            notifications,
        }
    }

    #[must_use]
    pub fn draft(&self) -> ObservableRef<'_, D> {
        self.draft.read()
    }

    #[must_use]
    pub fn subscribe_draft_changed(&self) -> Subscriber<D> {
        self.draft.subscribe_changed()
    }

    #[must_use]
    pub const fn notifications(&self) -> &Arc<Notifications> {
        &self.notifications
    }

    pub fn modify_draft(&self, modify: impl FnOnce(&mut D) -> bool) -> bool {
        self.draft.modify(modify)
    }

    /// Replace the whole draft, e.g. after loading an existing entity.
    ///
    /// Bound list editors must be updated separately.
    pub fn reset(&self, draft: D)
    where
        D: PartialEq,
    {
        self.draft.modify(|current| {
            if *current == draft {
                return false;
            }
            *current = draft;
            true
        });
    }

    #[must_use]
    pub fn list_binding<P>(&self) -> DraftBinding<D, P>
    where
        D: ListField<P>,
    {
        DraftBinding {
            draft: Arc::clone(&self.draft),
            item: PhantomData,
        }
    }

    /// A list editor that is bound to the draft.
    ///
    /// Changes are reported to `on_change` after they have been
    /// written into the draft.
    pub fn list_editor<P, C>(
        &self,
        policy: EditorPolicy,
        on_change: C,
    ) -> ListEditor<P, (DraftBinding<D, P>, C)>
    where
        D: ListField<P>,
        P: Payload + Clone + PartialEq,
        C: OnChange<P>,
    {
        let items = ListField::<P>::items(&*self.draft.read()).to_vec();
        ListEditor::new(&items, policy, (self.list_binding(), on_change))
    }

    /// Validate the current draft.
    ///
    /// Returns the validated draft or pushes a warning if invalid.
    pub fn submit(&self) -> Result<D, SubmitError<D::Invalidity>> {
        let draft = self.draft.read().clone();
        if let Err(invalidities) = draft.validate() {
            let invalidities = invalidities.into_iter().collect::<Vec<_>>();
            log::info!("Rejecting invalid draft: {invalidities:?}");
            let message = invalidities
                .iter()
                .map(InvalidityMessage::message)
                .collect::<Vec<_>>()
                .join("\n");
            self.notifications.push(Level::Warning, message);
            return Err(SubmitError::Invalid { invalidities });
        }
        Ok(draft)
    }
}

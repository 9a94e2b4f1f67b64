// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod collection;
pub use self::collection::{CollectionItem, Direction, IndexOutOfRange, ItemUid, Payload};

pub mod lesson;
pub use self::lesson::{ContentKind, LessonContent, LessonContentPatch, LessonDraft};

pub mod quiz;
pub use self::quiz::{QuizCollectionDraft, QuizReference, QuizReferencePatch};

pub mod resource;
pub use self::resource::{ResourceKind, ResourceReference, SelectResource};

pub mod prelude {
    pub(crate) use semval::prelude::*;
    // Re-export trait methods from semval
    pub use semval::{IsValid as _, Validate as _};
}

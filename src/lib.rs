// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Editing ordered collections of learning resources.
//!
//! The sub-crates are re-exported behind features.

pub use classdesk_core as core;

#[cfg(feature = "api")]
pub use classdesk_core_api as api;

#[cfg(feature = "usecases")]
pub use classdesk_usecases as usecases;

#[cfg(feature = "frontend")]
pub use classdesk_frontend as frontend;

pub use semval;

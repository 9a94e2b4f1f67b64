// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use classdesk_core_api::PageSize;
use serde::{Deserialize, Serialize};

use crate::{
    Observable,
    editor::EditorPolicy,
    notification,
    picker::{DEFAULT_DEBOUNCE_WINDOW, DEFAULT_PAGE_SIZE, PickerConfig},
};

pub const FILE_NAME: &str = "classdesk_settings";

pub const FILE_SUFFIX: &str = "ron";

pub mod tasklet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Minimum number of items that could not be removed.
    pub min_items: usize,
}

impl EditorSettings {
    #[must_use]
    pub const fn policy(self) -> EditorPolicy {
        let Self { min_items } = self;
        EditorPolicy { min_items }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    /// Delay after the last keystroke before searching.
    pub debounce_millis: u64,

    /// Number of candidates per page in pickers.
    pub page_size: PageSize,

    /// Time-to-live of transient notifications.
    pub notification_ttl_millis: u64,

    pub lesson_contents: EditorSettings,

    pub quiz_collection: EditorSettings,
}

impl Default for State {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        Self {
            debounce_millis: DEFAULT_DEBOUNCE_WINDOW.as_millis() as u64,
            page_size: DEFAULT_PAGE_SIZE,
            notification_ttl_millis: notification::DEFAULT_TTL.as_millis() as u64,
            lesson_contents: EditorSettings { min_items: 1 },
            quiz_collection: EditorSettings { min_items: 0 },
        }
    }
}

impl State {
    /// Load the settings or fall back to the defaults.
    #[must_use]
    pub fn restore_from_parent_dir(parent_dir: &Path) -> Self {
        log::info!("Loading saved settings from: {}", parent_dir.display());
        Self::load(parent_dir)
            .map_err(|err| {
                log::warn!("Failed to load saved settings: {err}");
            })
            .unwrap_or_default()
    }

    pub fn load(parent_dir: &Path) -> anyhow::Result<Self> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Loading settings from file: {}", file_path.display());
        match fs::read_to_string(&file_path) {
            Ok(text) => ron::from_str(&text).map_err(Into::into),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Default::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, parent_dir: &Path) -> anyhow::Result<()> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Saving current settings into file: {}", file_path.display());
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        if let Some(parent_path) = file_path.parent() {
            fs::create_dir_all(parent_path)?;
        }
        fs::write(&file_path, text)?;
        Ok(())
    }

    pub async fn save_spawn_blocking(self, parent_dir: PathBuf) -> anyhow::Result<()> {
        match tokio::runtime::Handle::current()
            .spawn_blocking(move || self.save(&parent_dir))
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                anyhow::bail!("failed to save: {err}");
            }
            Err(err) => {
                anyhow::bail!("failed to join blocking task after saving: {err}");
            }
        }
    }

    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }

    #[must_use]
    pub const fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_millis)
    }

    #[must_use]
    pub const fn picker_config(&self) -> PickerConfig {
        PickerConfig {
            page_size: self.page_size,
            debounce_window: self.debounce_window(),
        }
    }
}

pub type ObservableState = Observable<State>;

#[must_use]
pub fn new_settings_file_path(parent_dir: PathBuf) -> PathBuf {
    let mut path_buf = parent_dir;
    path_buf.push(FILE_NAME);
    path_buf.set_extension(FILE_SUFFIX);
    path_buf
}

#[cfg(test)]
mod tests;

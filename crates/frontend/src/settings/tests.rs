// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use crate::notification::Notifications;

use super::*;

#[test]
fn default_settings() {
    let settings = State::default();
    assert_eq!(DEFAULT_DEBOUNCE_WINDOW, settings.debounce_window());
    assert_eq!(notification::DEFAULT_TTL, settings.notification_ttl());
    assert_eq!(1, settings.lesson_contents.policy().min_items);
    assert_eq!(0, settings.quiz_collection.policy().min_items);
    let picker_config = settings.picker_config();
    assert_eq!(DEFAULT_PAGE_SIZE, picker_config.page_size);
    assert_eq!(DEFAULT_DEBOUNCE_WINDOW, picker_config.debounce_window);
}

#[test]
fn settings_file_path() {
    assert_eq!(
        Path::new("/tmp/config/classdesk_settings.ron"),
        new_settings_file_path(PathBuf::from("/tmp/config"))
    );
}

#[test]
fn save_and_load() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    let settings_dir = tempdir.path().join("nested");
    let settings = State {
        debounce_millis: 150,
        page_size: PageSize::new(25).unwrap(),
        quiz_collection: EditorSettings { min_items: 2 },
        ..Default::default()
    };
    settings.save(&settings_dir)?;
    assert_eq!(settings, State::load(&settings_dir)?);
    assert_eq!(settings, State::restore_from_parent_dir(&settings_dir));
    Ok(())
}

#[test]
fn missing_file_yields_defaults() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    assert_eq!(State::default(), State::load(tempdir.path())?);
    Ok(())
}

#[test]
fn restore_defaults_from_malformed_file() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    fs::write(
        new_settings_file_path(tempdir.path().to_path_buf()),
        "(debounce_millis: \"soon\"",
    )?;
    assert!(State::load(tempdir.path()).is_err());
    assert_eq!(
        State::default(),
        State::restore_from_parent_dir(tempdir.path())
    );
    Ok(())
}

#[test]
fn fill_in_missing_fields() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    fs::write(
        new_settings_file_path(tempdir.path().to_path_buf()),
        "(page_size: 5, lesson_contents: (min_items: 3))",
    )?;
    let settings = State::load(tempdir.path())?;
    assert_eq!(5, settings.page_size.get());
    assert_eq!(3, settings.lesson_contents.min_items);
    assert_eq!(DEFAULT_DEBOUNCE_WINDOW, settings.debounce_window());
    assert_eq!(0, settings.quiz_collection.min_items);
    Ok(())
}

#[tokio::test]
async fn save_changed_settings() -> anyhow::Result<()> {
    let tempdir = tempfile::tempdir()?;
    let settings_dir = tempdir.path().to_path_buf();
    let state = ObservableState::new(State::default());
    let notifications = Arc::new(Notifications::default());
    let task = tokio::spawn(tasklet::on_state_changed_save_to_file(
        state.subscribe_changed(),
        settings_dir.clone(),
        &notifications,
    ));
    // Unchanged settings are not saved.
    tokio::task::yield_now().await;
    assert!(!new_settings_file_path(settings_dir.clone()).exists());

    assert!(state.modify(|settings| {
        settings.debounce_millis = 500;
        true
    }));
    let mut saved = State::default();
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        // The file might still be written.
        if let Ok(loaded) = State::load(&settings_dir) {
            saved = loaded;
        }
        if saved.debounce_millis == 500 {
            break;
        }
    }
    assert_eq!(500, saved.debounce_millis);
    assert!(notifications.read().pending().is_empty());

    // The task terminates after the publisher has been dropped.
    drop(state);
    task.await?;
    Ok(())
}

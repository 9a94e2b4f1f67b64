// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context as _;
use clap::Parser as _;
use directories::ProjectDirs;
use log::LevelFilter;

use classdesk::{frontend::settings, usecases::memory::Catalog};

mod command;
use self::command::{Cli, Command};

/// Default log level for debug builds.
#[cfg(debug_assertions)]
const DEFAULT_LOG_FILTER_LEVEL: LevelFilter = LevelFilter::Info;

/// Reduce log verbosity for release builds.
#[cfg(not(debug_assertions))]
const DEFAULT_LOG_FILTER_LEVEL: LevelFilter = LevelFilter::Warn;

const CATALOG_FILE_NAME: &str = "catalog.json";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(DEFAULT_LOG_FILTER_LEVEL)
        // Parse environment variables after configuring all default option(s).
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        catalog,
        config_dir,
        command,
    } = cli;
    let config_dir = match config_dir {
        Some(config_dir) => config_dir,
        None => app_config_dir().context("config directory is unavailable")?,
    };
    log::info!(
        "Config directory: {dir_path}",
        dir_path = config_dir.display()
    );
    let settings = settings::State::restore_from_parent_dir(&config_dir);
    let catalog_path = catalog.unwrap_or_else(|| config_dir.join(CATALOG_FILE_NAME));
    let backend = Arc::new(load_catalog(&catalog_path)?);
    let rt = tokio::runtime::Handle::current();
    match command {
        Command::Search(args) => command::search(backend.as_ref(), &settings, args).await,
        Command::Resolve(args) => command::resolve(backend.as_ref(), args).await,
        Command::Edit(args) => command::edit(rt, backend, &settings, args).await,
    }
}

fn load_catalog(file_path: &Path) -> anyhow::Result<Catalog> {
    log::debug!("Loading catalog from file: {}", file_path.display());
    let bytes = std::fs::read(file_path)
        .with_context(|| format!("failed to read catalog {}", file_path.display()))?;
    Catalog::from_json_slice(&bytes)
        .with_context(|| format!("failed to parse catalog {}", file_path.display()))
}

#[must_use]
const fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

#[must_use]
fn app_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", app_name())
}

fn init_app_dir(app_dir: &Path) {
    if let Err(err) = std::fs::create_dir_all(app_dir) {
        log::error!(
            "Failed to create app directory '{dir}': {err}",
            dir = app_dir.display(),
        );
    } else {
        debug_assert!(app_dir.exists());
    }
}

#[must_use]
fn init_config_dir(app_dirs: &ProjectDirs) -> &Path {
    let app_config_dir = app_dirs.config_local_dir();
    init_app_dir(app_config_dir);
    app_config_dir
}

#[must_use]
fn app_config_dir() -> Option<PathBuf> {
    app_dirs()
        .as_ref()
        .map(init_config_dir)
        .map(Path::to_path_buf)
}

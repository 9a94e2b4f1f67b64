// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fs, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{Context as _, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Handle;

use classdesk::{
    api::{FILTER_KEY_MEDIA_TYPE, PageNumber, PageRequest, Params},
    core::{CollectionItem, Direction, QuizCollectionDraft, QuizReference, ResourceKind},
    frontend::{
        form::{FormSession, SubmitError},
        notification::Notifications,
        picker::EMPTY_STATE_MESSAGE,
        resolver::{Resolution, ResourceResolver},
        settings,
    },
    usecases::{memory::Catalog, resource},
};

#[derive(Debug, Parser)]
#[command(version, about = "Edit ordered collections of learning resources")]
pub(crate) struct Cli {
    /// JSON file with the available resources [default: <config dir>/catalog.json]
    #[arg(long, global = true)]
    pub(crate) catalog: Option<PathBuf>,

    /// Directory of the settings file
    #[arg(long, global = true)]
    pub(crate) config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Browse the candidates of a resource picker
    Search(SearchArgs),

    /// Display the name of a referenced resource
    Resolve(ResolveArgs),

    /// Edit the quizzes of a collection stored as JSON
    Edit(EditArgs),
}

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    #[arg(long)]
    kind: ResourceKind,

    /// 1-based page number
    #[arg(long, default_value = "1")]
    page: PageNumber,

    /// Media type prefix of files, e.g. "video/"
    #[arg(long)]
    media_type: Option<String>,

    text: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    #[arg(long)]
    kind: ResourceKind,

    id: String,
}

/// Edit operations are applied in groups: append, move, remove.
#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    sequence: PathBuf,

    /// Append a quiz by its identifier
    #[arg(long = "append", value_name = "QUIZ_ID")]
    append: Vec<String>,

    /// Move an item by one position, e.g. "2:up" (0-based index)
    #[arg(long = "move", value_name = "INDEX:up|down")]
    moves: Vec<MoveArg>,

    /// Remove an item (0-based index)
    #[arg(long = "remove", value_name = "INDEX")]
    remove: Vec<usize>,

    /// Validate and print the result without saving
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveArg {
    index: usize,
    direction: Direction,
}

impl FromStr for MoveArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((index, direction)) = s.split_once(':') else {
            bail!("expected INDEX:up|down");
        };
        let index = index.trim().parse().context("invalid index")?;
        let direction = direction
            .trim()
            .parse()
            .map_err(|_| anyhow!("invalid direction \"{direction}\""))?;
        Ok(Self { index, direction })
    }
}

pub(crate) async fn search(
    backend: &Catalog,
    settings: &settings::State,
    args: SearchArgs,
) -> anyhow::Result<()> {
    let SearchArgs {
        kind,
        page,
        media_type,
        text,
    } = args;
    let mut params = Params {
        search_text: text.unwrap_or_default(),
        ..Default::default()
    };
    if let Some(media_type) = media_type {
        params
            .filters
            .insert(FILTER_KEY_MEDIA_TYPE.to_owned(), media_type);
    }
    let request = PageRequest {
        page,
        page_size: settings.page_size,
        params,
    };
    let loaded = resource::load_page(backend, kind, request).await?;
    if loaded.is_empty() {
        println!("{EMPTY_STATE_MESSAGE}");
        return Ok(());
    }
    for resource in &loaded.items {
        println!("{id}\t{name}", id = resource.id, name = resource.display_name);
    }
    println!(
        "Page {page} of {total_pages}",
        total_pages = loaded.total_pages
    );
    Ok(())
}

pub(crate) async fn resolve(backend: &Catalog, args: ResolveArgs) -> anyhow::Result<()> {
    let ResolveArgs { kind, id } = args;
    let resource = resource::resolve(backend, kind, &id)
        .await
        .with_context(|| format!("failed to resolve {kind} \"{id}\""))?;
    println!("{}", resource.display_name_or_id());
    Ok(())
}

pub(crate) async fn edit(
    rt: Handle,
    backend: Arc<Catalog>,
    settings: &settings::State,
    args: EditArgs,
) -> anyhow::Result<()> {
    let EditArgs {
        sequence,
        append,
        moves,
        remove,
        dry_run,
    } = args;
    let json = fs::read(&sequence)
        .with_context(|| format!("failed to read sequence {}", sequence.display()))?;
    let draft: QuizCollectionDraft = serde_json::from_slice(&json)
        .with_context(|| format!("failed to parse sequence {}", sequence.display()))?;

    let notifications = Arc::new(Notifications::new(settings.notification_ttl()));
    let form = FormSession::new(draft, Arc::clone(&notifications));
    let resolver = ResourceResolver::new(rt, Arc::clone(&backend), ResourceKind::Quiz);
    let mut editor = form.list_editor(settings.quiz_collection.policy(), resolver.clone());

    for quiz_id in append {
        let picked = resource::resolve(backend.as_ref(), ResourceKind::Quiz, &quiz_id)
            .await
            .with_context(|| format!("failed to append quiz \"{quiz_id}\""))?;
        editor.append_picked(&[picked]);
    }
    for MoveArg { index, direction } in moves {
        if !editor.move_item(index, direction)? {
            log::warn!("Item #{index} cannot be moved {direction}");
        }
    }
    for index in remove {
        editor
            .remove(index)
            .with_context(|| format!("failed to remove item #{index}"))?;
    }

    wait_until_resolved(&resolver, editor.items()).await;
    for (index, item) in editor.items().iter().enumerate() {
        let name = resolver
            .display_name(item)
            .unwrap_or_else(|| "(no quiz selected)".to_owned());
        println!("{index}\t{name}");
    }

    let draft = match form.submit() {
        Ok(draft) => draft,
        Err(SubmitError::Invalid { invalidities }) => {
            for notification in notifications.read().pending() {
                eprintln!("{}", notification.message);
            }
            bail!("{count} invalid item(s)", count = invalidities.len());
        }
    };
    if dry_run {
        return Ok(());
    }
    let json = serde_json::to_vec_pretty(&draft)?;
    fs::write(&sequence, json)
        .with_context(|| format!("failed to save sequence {}", sequence.display()))?;
    log::info!("Saved sequence: {}", sequence.display());
    Ok(())
}

async fn wait_until_resolved(
    resolver: &ResourceResolver<Catalog>,
    items: &[CollectionItem<QuizReference>],
) {
    let mut subscriber = resolver.state().subscribe_changed();
    loop {
        let pending = {
            let state = subscriber.read_ack();
            items
                .iter()
                .any(|item| state.get(&item.uid).is_some_and(Resolution::is_pending))
        };
        if !pending || subscriber.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_move_arg() {
        assert_eq!(
            MoveArg {
                index: 2,
                direction: Direction::Up
            },
            "2:up".parse().unwrap()
        );
        assert_eq!(
            MoveArg {
                index: 0,
                direction: Direction::Down
            },
            " 0 : down".parse().unwrap()
        );
        assert!("2".parse::<MoveArg>().is_err());
        assert!("x:up".parse::<MoveArg>().is_err());
        assert!("1:left".parse::<MoveArg>().is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory as _;
        Cli::command().debug_assert();
    }
}

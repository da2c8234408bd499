use anyhow::bail;
use clap::Parser;
use inquire::error::InquireResult;
use serde::Serialize;
use tracing::Instrument;

mod bookmarks;
mod cli;
mod config;
mod factory;
mod gateway;
mod store;
#[cfg(test)]
mod tests;

use bookmarks::{BookmarkCreate, BookmarkUpdate, CollectionCreate, CollectionUpdate, TagCreate};
use cli::{CollectionAction, TagAction, ViewArgs};
use factory::AppFactory;
use bookmarks::Bookmark;
use store::{Dashboard, RenderSource, Rendered, ViewMode};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppFactory::create_config()?;
    let dashboard = AppFactory::create_dashboard(&config)?;

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(&dashboard, args).instrument(tracing::info_span!("bbdash")));

    dashboard.dispose();
    result
}

fn apply_view(dashboard: &Dashboard, view: &ViewArgs) {
    let store = dashboard.bookmarks();

    if let Some(collection) = &view.collection {
        dashboard.select_collection(collection);
    }
    for tag in &view.tags {
        store.toggle_tag(tag);
    }
    if let Some(filter) = view.filter {
        store.set_filter_type(filter);
    }
    if let Some(sort) = view.sort {
        store.set_sort_by(sort);
    }
    if let Some(view_mode) = view.view {
        store.set_view_mode(view_mode);
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rendered(dashboard: &Dashboard, rendered: &Rendered) {
    let store = dashboard.bookmarks();

    match &rendered.source {
        RenderSource::Search { query } => {
            println!("Semantic search (top {}): {query}", rendered.bookmarks.len())
        }
        RenderSource::Local => {
            let selection = store.selection();
            let name = dashboard
                .collections()
                .find(&selection.collection)
                .map(|c| c.name)
                .unwrap_or_else(|| "All Bookmarks".to_string());
            let filtered = if store.has_active_filters() {
                " (filtered)"
            } else {
                ""
            };
            println!("{name}: {} bookmarks{filtered}", rendered.bookmarks.len());
        }
    }

    print_bookmarks(&rendered.bookmarks, store.selection().view_mode);
}

fn print_bookmarks(bookmarks: &[Bookmark], view_mode: ViewMode) {
    for bmark in bookmarks {
        let star = if bmark.is_favorite { "*" } else { " " };
        let tags = if bmark.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", bmark.tags.join(", "))
        };

        match view_mode {
            ViewMode::Grid => {
                println!("{star} {:>5}  {}  {}{tags}", bmark.id, bmark.title, bmark.url)
            }
            ViewMode::List => {
                println!("{star} {:>5}  {}{tags}", bmark.id, bmark.title);
                println!("         {}", bmark.url);
                if !bmark.description.is_empty() {
                    println!("         {}", bmark.description);
                }
                println!("         added {}", bmark.created_at.format("%Y-%m-%d %H:%M"));
            }
        }
    }
}

async fn run(dashboard: &Dashboard, args: cli::Args) -> anyhow::Result<()> {
    let json = args.json;
    let store = dashboard.bookmarks();

    match args.command {
        cli::Command::List { view } => {
            dashboard.mount().await;
            if let Some(err) = store.error() {
                bail!(err);
            }

            apply_view(dashboard, &view);
            let rendered = dashboard.rendered();
            if json {
                print_json(&rendered)?;
            } else {
                print_rendered(dashboard, &rendered);
            }
            Ok(())
        }

        cli::Command::Search { query, view } => {
            dashboard.mount().await;
            apply_view(dashboard, &view);

            store.search_bookmarks(&query).await;
            if let Some(err) = store.error() {
                bail!(err);
            }

            let rendered = dashboard.rendered();
            if json {
                print_json(&rendered)?;
            } else {
                print_rendered(dashboard, &rendered);
            }
            Ok(())
        }

        cli::Command::Show { id } => {
            let detail = dashboard.detail();
            detail.load(&id).await;

            match detail.bookmark() {
                Some(bmark) if json => print_json(&bmark),
                Some(bmark) => {
                    print_bookmarks(&[bmark], ViewMode::List);
                    Ok(())
                }
                None => bail!(detail
                    .error()
                    .unwrap_or_else(|| "Bookmark not found".to_string())),
            }
        }

        cli::Command::Favorites {} => match store.fetch_favorites().await {
            Some(favorites) if json => print_json(&favorites),
            Some(favorites) => {
                print_bookmarks(&favorites, store.selection().view_mode);
                Ok(())
            }
            None => bail!(store.error().unwrap_or_default()),
        },

        cli::Command::Tags {} => {
            let tags = dashboard.tags();
            tags.fetch().await;
            if let Some(err) = tags.error() {
                log::warn!("{err}");
            }

            if json {
                return print_json(&tags.tags());
            }
            for tag in tags.tags() {
                println!("{:>5}  {} ({})", tag.id, tag.name, tag.count);
            }
            Ok(())
        }

        cli::Command::Collections {} => {
            let collections = dashboard.collections();
            collections.fetch().await;
            if let Some(err) = collections.error() {
                log::warn!("{err}");
            }

            if json {
                return print_json(&collections.collections());
            }
            for collection in collections.collections() {
                println!(
                    "{:>5}  {} [{}] ({})",
                    collection.id, collection.name, collection.icon, collection.count
                );
            }
            Ok(())
        }

        cli::Command::Add {
            url,
            title,
            description,
            collection,
            tag_ids,
            favorite,
        } => {
            let bmark_create = BookmarkCreate {
                title,
                url,
                description,
                collection_id: collection,
                tag_ids,
                is_favorite: favorite,
            };

            match dashboard.create_bookmark(bmark_create).await {
                Some(bmark) => print_json(&bmark),
                None => bail!(store.error().unwrap_or_default()),
            }
        }

        cli::Command::Edit {
            id,
            url,
            title,
            description,
            collection,
            tag_ids,
        } => {
            let bmark_update = BookmarkUpdate {
                title,
                url,
                description,
                collection_id: collection,
                tag_ids,
                is_favorite: None,
            };

            if bmark_update.title.is_none()
                && bmark_update.url.is_none()
                && bmark_update.description.is_none()
                && bmark_update.collection_id.is_none()
                && bmark_update.tag_ids.is_none()
            {
                println!("This update request does nothing");
                return Ok(());
            }

            match store.update_bookmark(&id, bmark_update).await {
                Some(bmark) => print_json(&bmark),
                None => bail!(store.error().unwrap_or_default()),
            }
        }

        cli::Command::Rm { id, yes } => {
            if !yes {
                match inquire::prompt_confirmation(format!(
                    "Are you sure you want to delete bookmark {id}?"
                )) {
                    InquireResult::Ok(true) => {}
                    InquireResult::Ok(false) => return Ok(()),
                    InquireResult::Err(err) => bail!("An error occurred: {}", err),
                }
            }

            if dashboard.delete_bookmark(&id).await {
                println!("bookmark {id} removed");
                return Ok(());
            }
            match store.error() {
                Some(err) => bail!(err),
                None => bail!("bookmark {id} was not removed"),
            }
        }

        cli::Command::Fav { id, off } => {
            if store.set_favorite(&id, !off).await {
                return Ok(());
            }
            bail!(store.error().unwrap_or_else(|| "favorite was not updated".to_string()))
        }

        cli::Command::Tag { action } => {
            let tags = dashboard.tags();
            match action {
                TagAction::Add { name, color } => {
                    match tags.create(TagCreate { name, color }).await {
                        Some(tag) => print_json(&tag),
                        None => bail!(tags.error().unwrap_or_default()),
                    }
                }
                TagAction::Rm { id } => {
                    if tags.delete(&id).await {
                        println!("tag {id} removed");
                        return Ok(());
                    }
                    bail!(tags.error().unwrap_or_else(|| format!("tag {id} was not removed")))
                }
            }
        }

        cli::Command::Collection { action } => {
            let collections = dashboard.collections();
            match action {
                CollectionAction::Add { name, icon, color } => {
                    let collection_create = CollectionCreate { name, icon, color };
                    match collections.create(collection_create).await {
                        Some(collection) => print_json(&collection),
                        None => bail!(collections.error().unwrap_or_default()),
                    }
                }
                CollectionAction::Update {
                    id,
                    name,
                    icon,
                    color,
                } => {
                    let collection_update = CollectionUpdate { name, icon, color };
                    match collections.update(&id, collection_update).await {
                        Some(collection) => print_json(&collection),
                        None => bail!(collections.error().unwrap_or_default()),
                    }
                }
                CollectionAction::Show { id } => match collections.load(&id).await {
                    Some(collection) => print_json(&collection),
                    None => bail!(collections.error().unwrap_or_default()),
                },
                CollectionAction::Rm { id } => {
                    if collections.delete(&id).await {
                        println!("collection {id} removed");
                        return Ok(());
                    }
                    bail!(collections
                        .error()
                        .unwrap_or_else(|| format!("collection {id} was not removed")))
                }
            }
        }
    }
}

//! Command-line front-end for browsing public sports court availability.

mod args;
mod render;
mod state;

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use courtside_core::bookmarks::BookmarkBook;
use courtside_core::config::CoreConfig;
use courtside_core::preferences::Preferences;
use courtside_core::{CourtsideService, KeyValueStore, ProviderRegistry, SportType};
use courtside_provider_lcsd as lcsd;
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{BookmarksArgs, Cli, Command, PrefsArgs, VenueArgs, VenuesArgs};
use crate::state::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let store: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::open(&cli.state)
            .with_context(|| format!("opening state file {}", cli.state.display()))?,
    );

    // HTTP + service setup
    let client = Client::builder().user_agent("courtside/0.1").build()?;
    let registry = Arc::new(ProviderRegistry::new(lcsd::plugins(&client)));
    let mut service = CourtsideService::new(registry, config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Venues(args) => venues(&mut service, &args, &mut out).await,
        Command::Venue(args) => venue(&mut service, &args, &mut out).await,
        Command::Bookmark(args) => toggle_bookmark(store, &args, &mut out),
        Command::Bookmarks(args) => bookmarks(&mut service, store, &args, &mut out).await,
        Command::Prefs(args) => prefs(store.as_ref(), &args, &mut out),
    }
}

fn load_config(path: Option<&Path>) -> Result<CoreConfig> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = CoreConfig::from_json_str(&raw)
        .with_context(|| format!("loading config {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

async fn refresh_if_stale(service: &mut CourtsideService, sport: SportType) -> Result<()> {
    if service.is_stale(sport) {
        service
            .refresh(sport)
            .await
            .with_context(|| format!("fetching {sport} availability"))?;
    }
    Ok(())
}

async fn venues(
    service: &mut CourtsideService,
    args: &VenuesArgs,
    out: &mut impl Write,
) -> Result<()> {
    refresh_if_stale(service, args.sport).await?;
    let outcome = service.filter_venues(args.sport, &args.criteria());
    render::venue_list(out, args.sport, &outcome, service.next_refresh_eta(args.sport))?;
    Ok(())
}

async fn venue(
    service: &mut CourtsideService,
    args: &VenueArgs,
    out: &mut impl Write,
) -> Result<()> {
    refresh_if_stale(service, args.sport).await?;
    let id = args.venue_id();
    let venue = service
        .venue(args.sport, &id)
        .with_context(|| format!("no {} venue with id `{id}`", args.sport))?;
    let sections = service.date_sections(args.sport, &id).unwrap_or_default();
    render::venue_sections(out, venue, &sections)?;
    Ok(())
}

fn toggle_bookmark(
    store: Arc<dyn KeyValueStore>,
    args: &VenueArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut book = BookmarkBook::load(store).context("loading bookmarks")?;
    let id = args.venue_id();
    let added = book
        .toggle(&id, args.sport, Utc::now())
        .context("saving bookmarks")?;
    writeln!(
        out,
        "{} {id} ({})",
        if added { "bookmarked" } else { "removed" },
        args.sport
    )?;
    Ok(())
}

async fn bookmarks(
    service: &mut CourtsideService,
    store: Arc<dyn KeyValueStore>,
    args: &BookmarksArgs,
    out: &mut impl Write,
) -> Result<()> {
    let book = BookmarkBook::load(store).context("loading bookmarks")?;

    if !args.offline {
        let sports: BTreeSet<SportType> =
            book.refs().iter().map(|entry| entry.sport_type).collect();
        for sport in sports {
            // A failed sport leaves its bookmarks listed without venue details.
            if let Err(err) = refresh_if_stale(service, sport).await {
                warn!("{err:#}");
            }
        }
    }

    let groups = service.hydrate_bookmarks(book.refs());
    render::bookmark_groups(out, &groups)?;
    Ok(())
}

fn prefs(store: &dyn KeyValueStore, args: &PrefsArgs, out: &mut impl Write) -> Result<()> {
    let mut prefs = Preferences::load(store);
    let before = prefs;
    if let Some(language) = args.language {
        prefs.language = language.into();
    }
    if let Some(theme) = args.theme {
        prefs.theme = theme.into();
    }
    if prefs != before {
        prefs.save(store).context("saving preferences")?;
    }
    render::preferences(out, &prefs)?;
    Ok(())
}

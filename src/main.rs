#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use waymark::app::{App, FixedLocator, WorkoutForm};
use waymark::render::{GpxMap, ListView, TerminalList, TerminalMap, format_entry};
use waymark::store::{SqliteSlots, WorkoutStore, parse_snapshot};
use waymark::types::{Workout, WorkoutId};
use waymark::{cli, gpx, utils};

#[macro_use]
extern crate waymark;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let db_path = cli.db.clone().unwrap_or_else(utils::default_db_path);
    let home = cli.home.as_deref().map(utils::parse_coords).transpose()?;
    let locator = FixedLocator(home);
    dlog!("db={} home={:?} zoom={}", db_path.display(), home, cli.zoom);

    let slots = SqliteSlots::open(&db_path)
        .with_context(|| format!("opening workout store: {}", db_path.display()))?;
    let store = WorkoutStore::new(slots);

    match cli.cmd {
        cli::Cmd::List { details } => {
            let app = start_terminal(store, TerminalList::stdout(details), &locator, cli.zoom)?;
            if app.workouts().is_empty() {
                tracing::info!("no workouts logged yet");
            }
            Ok(())
        }
        cli::Cmd::ExportGpx { file } => {
            let mut app = App::start(store, Quiet, cli.zoom)?;
            app.load_map(&locator, GpxMap::new(&file))?;
            if let Some(map) = app.map() {
                map.flush()
                    .with_context(|| format!("writing GPX: {}", file.display()))?;
            }
            Ok(())
        }
        cmd => run(start_terminal(store, Quiet, &locator, cli.zoom)?, cmd),
    }
}

fn start_terminal<L: ListView>(
    store: WorkoutStore<SqliteSlots>,
    list: L,
    locator: &FixedLocator,
    zoom: u8,
) -> Result<App<SqliteSlots, TerminalMap, L>> {
    let mut app = App::start(store, list, zoom)?;
    if let Err(e) = app.load_map(locator, TerminalMap::default()) {
        tracing::warn!("{e}");
    }
    Ok(app)
}

fn run(mut app: App<SqliteSlots, TerminalMap, Quiet>, cmd: cli::Cmd) -> Result<()> {
    match cmd {
        cli::Cmd::Add { place, form } => {
            let coords = match (place.at, place.from_gpx) {
                (Some(at), _) => utils::parse_coords(&at)?,
                (None, Some(path)) => gpx::track_start(&path)
                    .with_context(|| format!("reading GPX: {}", path.display()))?,
                (None, None) => anyhow::bail!("either --at or --from-gpx is required"),
            };
            app.show_form(coords);
            let w = app.submit(&WorkoutForm::from(&form))?;
            println!("{}\t{}", w.id, format_entry(w));
        }
        cli::Cmd::Show { id } => {
            let id = WorkoutId::from(id);
            let coords = app.move_to(&id)?;
            println!("{coords}");
        }
        cli::Cmd::Edit { id, form } => {
            let w = app.edit(&WorkoutId::from(id), &WorkoutForm::from(&form))?;
            println!("{}\t{}", w.id, format_entry(w));
        }
        cli::Cmd::Delete { id } => {
            let w = app.delete(&WorkoutId::from(id))?;
            println!("deleted {}", w.description);
        }
        cli::Cmd::Reset => {
            app.reset()?;
            println!("all workouts deleted");
        }
        cli::Cmd::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading snapshot: {}", file.display()))?;
            let incoming = parse_snapshot(&json)
                .with_context(|| format!("parsing snapshot: {}", file.display()))?;
            let total = incoming.len();
            let added = app.import(incoming)?;
            tracing::info!(found = total, added, "import done");
        }
        cli::Cmd::List { .. } | cli::Cmd::ExportGpx { .. } => {}
    }
    Ok(())
}

/// List view for commands that print their own result.
#[derive(Debug)]
struct Quiet;

impl ListView for Quiet {
    fn push_entry(&mut self, _workout: &Workout) -> waymark::error::Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> waymark::error::Result<()> {
        Ok(())
    }
}

//! One invocation: load, apply, save

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use citymap_graph::Command;
use citymap_history::{load_from_file, save_to_file, History, HistoryConfig, HistoryError};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, warn};

/// Run the parsed command line and return what should be printed
///
/// # Errors
/// Config, document or command failures, with the file involved as context
pub fn run(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => HistoryConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HistoryConfig::default(),
    };
    let mut history = open(&cli.file, config.clone())?;

    let output = dispatch(&mut history, cli, &config)?;
    if cli.command.mutates() {
        save(&history, &cli.file, &config)?;
    }
    Ok(output)
}

/// Load `path`, or start empty when it does not exist yet
fn open(path: &Path, config: HistoryConfig) -> Result<History> {
    let mut history = History::with_config(config);
    if path.exists() {
        load_from_file(&mut history, path)
            .with_context(|| format!("loading {}", path.display()))?;
    } else {
        debug!(path = %path.display(), "no document yet, starting empty");
    }
    Ok(history)
}

fn save(history: &History, path: &Path, config: &HistoryConfig) -> Result<()> {
    save_to_file(history, path, config).with_context(|| format!("saving {}", path.display()))
}

fn dispatch(history: &mut History, cli: &Cli, config: &HistoryConfig) -> Result<String> {
    let edit = match &cli.command {
        Commands::AddCity { name } => Command::add_city(name.as_str()),
        Commands::RemoveCity { name } => Command::remove_city(name.as_str()),
        Commands::RenameCity { old_name, new_name } => {
            Command::rename_city(old_name.as_str(), new_name.as_str())?
        }
        Commands::AddRoad { city1, city2, cost } => {
            Command::add_road(city1.as_str(), city2.as_str(), *cost)
        }
        Commands::RemoveRoad { city1, city2, cost } => {
            Command::remove_road(city1.as_str(), city2.as_str(), *cost)
        }
        Commands::UpdateRoad {
            city1,
            city2,
            old_cost,
            new_cost,
        } => {
            if old_cost == new_cost {
                bail!("old and new cost are both {old_cost}, nothing to update");
            }
            Command::update_road(city1.as_str(), city2.as_str(), *old_cost, *new_cost)
        }
        Commands::Undo => {
            let result = history.undo();
            keep_drop(history, result, cli, config)?;
            let undone = history.redo_stack().last().map(ToString::to_string);
            return Ok(format!("undone: {}", undone.unwrap_or_default()));
        }
        Commands::Redo => {
            let result = history.redo();
            keep_drop(history, result, cli, config)?;
            let redone = history.undo_stack().last().map(ToString::to_string);
            return Ok(format!("redone: {}", redone.unwrap_or_default()));
        }
        Commands::Seek { index } => {
            history.seek(*index)?;
            return Ok(format!(
                "at snapshot {index} of {}",
                history.timeline().len()
            ));
        }
        Commands::Show { json } => return show(history, *json),
        Commands::History => return Ok(timeline(history)),
        Commands::Migrate { output } => {
            let target = output.as_deref().unwrap_or(cli.file.as_path());
            save(history, target, config)?;
            return Ok(format!("wrote {}", target.display()));
        }
    };

    let summary = edit.to_string();
    history.execute(edit)?;
    Ok(summary)
}

/// A failed undo or redo still drops its command, so the file must see that
fn keep_drop(
    history: &History,
    result: Result<(), HistoryError>,
    cli: &Cli,
    config: &HistoryConfig,
) -> Result<()> {
    let Err(e) = result else {
        return Ok(());
    };
    if let Some(command) = e.dropped_command() {
        warn!(%command, "saving history without the dropped command");
        save(history, &cli.file, config)?;
    }
    Err(e.into())
}

fn show(history: &History, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(history.map())?);
    }

    let mut out = String::new();
    for city in history.cities() {
        let roads = history.roads_from(&city);
        if roads.is_empty() {
            let _ = writeln!(out, "{city}: (no roads)");
            continue;
        }
        let listed: Vec<String> = roads
            .iter()
            .map(|(neighbor, costs)| format!("{neighbor} {costs:?}"))
            .collect();
        let _ = writeln!(out, "{city}: {}", listed.join(", "));
    }
    if out.is_empty() {
        out.push_str("(empty map)\n");
    }
    Ok(out.trim_end().to_string())
}

fn timeline(history: &History) -> String {
    let mut out = String::new();
    for (index, snapshot) in history.timeline().iter().enumerate() {
        let marker = if index == history.cursor() { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {index:>3}  cities={} roads={} undo={} redo={}",
            snapshot.map().city_count(),
            snapshot.map().road_count(),
            snapshot.undo_stack().len(),
            snapshot.redo_stack().len(),
        );
    }
    out.trim_end().to_string()
}

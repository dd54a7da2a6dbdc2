// Entry point and high-level CLI flow.
//
// The binary is the presentation side of the hotspot pipeline:
// - Option [1] loads and cleans the CSV, printing diagnostics.
// - Option [2] picks the state filter.
// - Options [3] and [4] print the interactive and static views.
// - Option [5] exports the current view, [6] drops the cached file.
// With `--batch` the views are printed once and the program exits.
mod aggregate;
mod cache;
mod clean;
mod config;
mod error;
mod filter;
mod loader;
mod output;
mod types;
mod util;
mod view;

use anyhow::{anyhow, Context};
use clap::Parser;
use config::Config;
use filter::StateSelection;
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::error;
use tracing_subscriber::EnvFilter;
use types::{DashboardView, Hotspot};

// Cleaned records and the current selection, so interactions only recompute
// the filter and aggregates.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    data: Option<Arc<Vec<Hotspot>>>,
    selection: StateSelection,
}

fn app_state() -> std::sync::MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Read a single trimmed line after printing `prompt`. `None` once the input
/// is closed or unreadable.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    read_line_from(&mut io::stdin().lock(), prompt)
}

/// Load (or fetch from cache) and clean the dataset.
fn handle_load(path: &Path) -> anyhow::Result<()> {
    if cache::is_loaded() {
        println!("Using the dataset already in memory.");
    }
    let raw = cache::load(path)?;
    let cleaned = clean::clean(&raw.rows);
    println!(
        "Processing dataset... ({} rows loaded, {} kept after cleaning)",
        util::format_int(raw.report.total_rows),
        util::format_int(cleaned.report.kept_rows())
    );
    if raw.report.blank_extra_rows > 0 {
        println!(
            "Note: {} rows have blank cells in other columns and count as incomplete.",
            util::format_int(raw.report.blank_extra_rows)
        );
    }
    let r = &cleaned.report;
    println!(
        "Dropped: {} incomplete ({} unreadable dates), {} without rain-day count, {} without fire risk.\n",
        util::format_int(r.dropped_missing),
        util::format_int(r.unparsed_dates),
        util::format_int(r.dropped_rain_sentinel),
        util::format_int(r.dropped_risk_sentinel)
    );
    app_state().data = Some(Arc::new(cleaned.records));
    Ok(())
}

fn loaded_data() -> anyhow::Result<Arc<Vec<Hotspot>>> {
    app_state()
        .data
        .clone()
        .ok_or_else(|| anyhow!("no data loaded, load the CSV file first (option 1)"))
}

fn current_view() -> anyhow::Result<DashboardView> {
    let data = loaded_data()?;
    let selection = app_state().selection.clone();
    Ok(view::render(&data, &selection))
}

fn handle_select_state() -> anyhow::Result<()> {
    let data = loaded_data()?;
    let options = filter::state_options(&data);
    for (i, opt) in options.iter().enumerate() {
        println!("[{i}] {opt}");
    }
    let choice = read_line("Selecione um estado: ").ok_or_else(|| anyhow!("no state chosen"))?;
    let selection = match choice.parse::<usize>() {
        Ok(i) => options
            .get(i)
            .map(|label| StateSelection::parse(label))
            .ok_or_else(|| anyhow!("no state option {i}"))?,
        Err(_) => StateSelection::parse(&choice),
    };
    println!("Filtro: {selection}\n");
    app_state().selection = selection;
    Ok(())
}

fn handle_export(dir: &Path) -> anyhow::Result<()> {
    let view = current_view()?;
    let files = output::export(dir, &view)
        .with_context(|| format!("exporting to {}", dir.display()))?;
    for f in files {
        println!("Wrote {}", f.display());
    }
    println!();
    Ok(())
}

fn run_batch(config: &Config) -> anyhow::Result<()> {
    handle_load(&config.data)?;
    let view = current_view()?;
    output::print_interactive(&view);
    output::print_static(&view);
    if let Some(dir) = &config.export {
        handle_export(dir)?;
    }
    Ok(())
}

fn run_menu(config: &Config) {
    loop {
        println!("Dashboard de Focos de Calor no Brasil");
        println!("[1] Load the file");
        println!("[2] Select state ({})", app_state().selection);
        println!("[3] Interactive view");
        println!("[4] Static view");
        println!("[5] Export view");
        println!("[6] Reload the file");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("\nInput closed, exiting the program.");
            break;
        };
        let result = match choice.as_str() {
            "1" => handle_load(&config.data),
            "2" => handle_select_state(),
            "3" => current_view().map(|v| output::print_interactive(&v)),
            "4" => current_view().map(|v| output::print_static(&v)),
            "5" => {
                let dir = config.export.clone().unwrap_or_else(|| "dashboard_export".into());
                handle_export(&dir)
            }
            "6" => {
                cache::clear();
                handle_load(&config.data)
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("{e:#}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = Config::parse();
    if let Some(state) = &config.state {
        app_state().selection = StateSelection::parse(state);
    }

    if config.batch {
        return run_batch(&config).context("rendering dashboard");
    }
    run_menu(&config);
    Ok(())
}

use clap::Parser;
use std::path::PathBuf;

/// Terminal dashboard for INPE fire hotspot detections in Brazil.
#[derive(Debug, Clone, Parser)]
#[command(name = "hotspot_dashboard", version, about)]
pub struct Config {
    /// Hotspot CSV (INPE "focos de calor" export).
    #[arg(long, env = "HOTSPOT_DATA", default_value = "focos_br_todos-sats_2024.csv")]
    pub data: PathBuf,

    /// Initial state filter; omit for all states.
    #[arg(long)]
    pub state: Option<String>,

    /// Directory to export the rendered dashboard to.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Render once and exit instead of opening the menu.
    #[arg(long)]
    pub batch: bool,
}

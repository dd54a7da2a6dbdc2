use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Columns that must be present in the source header.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "data_pas",
    "estado",
    "municipio",
    "bioma",
    "latitude",
    "longitude",
    "numero_dias_sem_chuva",
    "risco_fogo",
    "frp",
];

/// Reserved value meaning "unknown" in `numero_dias_sem_chuva` and `risco_fogo`.
pub const SENTINEL: f64 = -999.0;

/// One CSV row exactly as it appears in the source. Every cell is kept as
/// optional text; typing happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "data_pas")]
    pub data_pas: Option<String>,
    #[serde(rename = "estado")]
    pub estado: Option<String>,
    #[serde(rename = "municipio")]
    pub municipio: Option<String>,
    #[serde(rename = "bioma")]
    pub bioma: Option<String>,
    #[serde(rename = "latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "numero_dias_sem_chuva")]
    pub numero_dias_sem_chuva: Option<String>,
    #[serde(rename = "risco_fogo")]
    pub risco_fogo: Option<String>,
    #[serde(rename = "frp")]
    pub frp: Option<String>,
}

/// A loaded but uncleaned detection. `None` means the cell was empty or
/// could not be read as the expected type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawHotspot {
    pub detected_at: Option<String>,
    pub state: Option<String>,
    pub municipality: Option<String>,
    pub biome: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub days_without_rain: Option<f64>,
    pub fire_risk: Option<f64>,
    pub frp: Option<f64>,
    /// Some column outside the model (other than `frp`) was blank.
    pub blank_extra_cell: bool,
}

/// A cleaned detection. Only `frp` may be absent, and neither sentinel
/// survives into `days_without_rain` or `fire_risk`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub detected_at: NaiveDateTime,
    /// 1..=12
    pub month: u32,
    /// 0..=6, Monday is 0.
    pub day_of_week: u32,
    pub state: String,
    pub municipality: String,
    pub biome: String,
    pub latitude: f64,
    pub longitude: f64,
    pub days_without_rain: f64,
    pub fire_risk: f64,
    pub frp: Option<f64>,
}

impl From<&Hotspot> for RawHotspot {
    fn from(h: &Hotspot) -> Self {
        RawHotspot {
            detected_at: Some(h.detected_at.format(crate::util::DATETIME_FORMAT).to_string()),
            state: Some(h.state.clone()),
            municipality: Some(h.municipality.clone()),
            biome: Some(h.biome.clone()),
            latitude: Some(h.latitude),
            longitude: Some(h.longitude),
            days_without_rain: Some(h.days_without_rain),
            fire_risk: Some(h.fire_risk),
            frp: h.frp,
            blank_extra_cell: false,
        }
    }
}

/// One (key, count) entry rendered as a table row.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CountRow {
    #[serde(rename = "chave")]
    #[tabled(rename = "Chave")]
    pub key: String,
    #[serde(rename = "total_focos")]
    #[tabled(rename = "Número de focos")]
    pub total: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthRow {
    #[serde(rename = "mes")]
    #[tabled(rename = "Mês")]
    pub month: u32,
    #[serde(rename = "total_focos")]
    #[tabled(rename = "Número de focos")]
    pub total: usize,
}

/// The preview table of the interactive view.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct PreviewRow {
    #[serde(rename = "data_pas")]
    #[tabled(rename = "data_pas")]
    pub data_pas: String,
    #[serde(rename = "municipio")]
    #[tabled(rename = "municipio")]
    pub municipio: String,
    #[serde(rename = "bioma")]
    #[tabled(rename = "bioma")]
    pub bioma: String,
    #[serde(rename = "estado")]
    #[tabled(rename = "estado")]
    pub estado: String,
}

/// A point of the geographic scatter.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MapPoint {
    #[tabled(rename = "latitude")]
    pub latitude: f64,
    #[tabled(rename = "longitude")]
    pub longitude: f64,
    #[serde(rename = "municipio")]
    #[tabled(rename = "municipio")]
    pub municipio: String,
    #[serde(rename = "bioma")]
    #[tabled(rename = "bioma")]
    pub bioma: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InteractiveView {
    pub total_focos: usize,
    pub total_focos_display: String,
    /// `None` when the filtered view is empty.
    pub bioma_mais_afetado: Option<String>,
    pub mapa: Vec<MapPoint>,
    pub focos_por_mes: Vec<MonthRow>,
    pub focos_por_dia_semana: Vec<CountRow>,
    pub amostra: Vec<PreviewRow>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StaticView {
    pub focos_por_bioma: Vec<CountRow>,
    pub top_estados: Vec<CountRow>,
    pub top_municipios: Vec<CountRow>,
}

/// Everything the presentation layer needs for one interaction.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardView {
    pub estado_selecionado: String,
    pub interativo: InteractiveView,
    pub estatico: StaticView,
}

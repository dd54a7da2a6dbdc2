use crate::types::{Hotspot, RawHotspot, SENTINEL};
use crate::util::parse_datetime_safe;
use chrono::{Datelike, NaiveDateTime};
use tracing::info;

/// How many rows each cleaning step removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub unparsed_dates: usize,
    pub dropped_missing: usize,
    pub dropped_rain_sentinel: usize,
    pub dropped_risk_sentinel: usize,
}

impl CleanReport {
    pub fn kept_rows(&self) -> usize {
        self.input_rows
            - self.dropped_missing
            - self.dropped_rain_sentinel
            - self.dropped_risk_sentinel
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cleaned {
    pub records: Vec<Hotspot>,
    pub report: CleanReport,
}

/// A row after date parsing and calendar derivation, before any drop.
struct Derived<'a> {
    raw: &'a RawHotspot,
    detected_at: Option<NaiveDateTime>,
    month: Option<u32>,
    day_of_week: Option<u32>,
}

fn derive(raw: &RawHotspot) -> Derived<'_> {
    let detected_at = parse_datetime_safe(raw.detected_at.as_deref());
    Derived {
        raw,
        detected_at,
        month: detected_at.map(|dt| dt.month()),
        day_of_week: detected_at.map(|dt| dt.weekday().num_days_from_monday()),
    }
}

/// Every field except `frp` must be present, including source columns the
/// record does not model; one gap drops the whole row.
fn complete(d: Derived<'_>) -> Option<Hotspot> {
    let raw = d.raw;
    if raw.blank_extra_cell {
        return None;
    }
    Some(Hotspot {
        detected_at: d.detected_at?,
        month: d.month?,
        day_of_week: d.day_of_week?,
        state: raw.state.clone()?,
        municipality: raw.municipality.clone()?,
        biome: raw.biome.clone()?,
        latitude: raw.latitude?,
        longitude: raw.longitude?,
        days_without_rain: raw.days_without_rain?,
        fire_risk: raw.fire_risk?,
        frp: raw.frp,
    })
}

/// Turn loaded rows into analysis-ready records.
///
/// Steps, in order: parse `data_pas`, derive month and weekday, drop rows with
/// any missing field other than `frp`, drop `numero_dias_sem_chuva == -999`,
/// drop `risco_fogo == -999`. Input order is preserved.
pub fn clean(raw: &[RawHotspot]) -> Cleaned {
    let mut report = CleanReport {
        input_rows: raw.len(),
        ..CleanReport::default()
    };

    let derived: Vec<Derived<'_>> = raw.iter().map(derive).collect();
    report.unparsed_dates = derived
        .iter()
        .filter(|d| d.raw.detected_at.is_some() && d.detected_at.is_none())
        .count();

    let complete_rows: Vec<Hotspot> = derived.into_iter().filter_map(complete).collect();
    report.dropped_missing = raw.len() - complete_rows.len();

    let before = complete_rows.len();
    let rain_ok: Vec<Hotspot> = complete_rows
        .into_iter()
        .filter(|h| h.days_without_rain != SENTINEL)
        .collect();
    report.dropped_rain_sentinel = before - rain_ok.len();

    let before = rain_ok.len();
    let records: Vec<Hotspot> = rain_ok
        .into_iter()
        .filter(|h| h.fire_risk != SENTINEL)
        .collect();
    report.dropped_risk_sentinel = before - records.len();

    info!(
        input = report.input_rows,
        kept = records.len(),
        unparsed_dates = report.unparsed_dates,
        dropped_missing = report.dropped_missing,
        dropped_rain_sentinel = report.dropped_rain_sentinel,
        dropped_risk_sentinel = report.dropped_risk_sentinel,
        "hotspot records cleaned"
    );
    Cleaned { records, report }
}

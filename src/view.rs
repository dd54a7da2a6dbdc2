use crate::aggregate::{
    group_count, group_count_sorted_desc, monthly_series, most_frequent, sample, top_n, total_count,
    GroupCount, GroupField, GroupKey, MAP_SAMPLE_MAX, MAP_SAMPLE_SEED, TOP_N,
};
use crate::filter::{filter, StateSelection, View};
use crate::types::{
    CountRow, DashboardView, Hotspot, InteractiveView, MapPoint, MonthRow, PreviewRow, StaticView,
};
use crate::util::{format_int, DATETIME_FORMAT};

/// Rows shown in the interactive preview table.
pub const PREVIEW_ROWS: usize = 20;

const WEEKDAYS: [&str; 7] = [
    "segunda", "terça", "quarta", "quinta", "sexta", "sábado", "domingo",
];

fn count_rows(gcs: Vec<GroupCount<'_>>) -> Vec<CountRow> {
    gcs.into_iter()
        .map(|gc| CountRow {
            key: gc.key.to_string(),
            total: gc.count,
        })
        .collect()
}

fn interactive(view: &View<'_>) -> InteractiveView {
    let total = total_count(view);
    InteractiveView {
        total_focos: total,
        total_focos_display: format_int(total),
        bioma_mais_afetado: most_frequent(view, GroupField::Biome)
            .ok()
            .map(|k| k.to_string()),
        mapa: sample(view, MAP_SAMPLE_MAX, MAP_SAMPLE_SEED)
            .into_iter()
            .map(|h| MapPoint {
                latitude: h.latitude,
                longitude: h.longitude,
                municipio: h.municipality.clone(),
                bioma: h.biome.clone(),
            })
            .collect(),
        focos_por_mes: monthly_series(view)
            .into_iter()
            .map(|(month, total)| MonthRow { month, total })
            .collect(),
        focos_por_dia_semana: group_count(view, GroupField::DayOfWeek)
            .into_iter()
            .map(|gc| CountRow {
                key: match gc.key {
                    GroupKey::Number(d) => WEEKDAYS
                        .get(d as usize)
                        .copied()
                        .unwrap_or("?")
                        .to_string(),
                    GroupKey::Text(s) => s.to_string(),
                },
                total: gc.count,
            })
            .collect(),
        amostra: view
            .iter()
            .take(PREVIEW_ROWS)
            .map(|h| PreviewRow {
                data_pas: h.detected_at.format(DATETIME_FORMAT).to_string(),
                municipio: h.municipality.clone(),
                bioma: h.biome.clone(),
                estado: h.state.clone(),
            })
            .collect(),
    }
}

fn static_rankings(view: &View<'_>) -> StaticView {
    StaticView {
        focos_por_bioma: count_rows(group_count_sorted_desc(view, GroupField::Biome)),
        top_estados: count_rows(top_n(view, GroupField::State, TOP_N)),
        top_municipios: count_rows(top_n(view, GroupField::Municipality, TOP_N)),
    }
}

/// Build everything the dashboard shows for one selection.
///
/// The interactive part follows the state filter; the static rankings always
/// cover the whole cleaned dataset. An empty selection renders zero counts,
/// no biome and empty tables.
pub fn render(data: &[Hotspot], selection: &StateSelection) -> DashboardView {
    let filtered = filter(data, selection);
    DashboardView {
        estado_selecionado: selection.to_string(),
        interativo: interactive(&filtered),
        estatico: static_rankings(&View::all(data)),
    }
}

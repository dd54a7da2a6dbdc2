// Group-by counts and rankings over a filtered view.
//
// Every function here is pure: it borrows the view and returns a fresh
// result. Keys borrow from the records, so nothing is copied while counting.
use crate::error::AggregateError;
use crate::filter::View;
use crate::types::Hotspot;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;

/// Number of entries in the state and municipality rankings.
pub const TOP_N: usize = 10;
/// Upper bound on points sent to the map.
pub const MAP_SAMPLE_MAX: usize = 100_000;
pub const MAP_SAMPLE_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupField {
    State,
    Municipality,
    Biome,
    Month,
    DayOfWeek,
}

impl GroupField {
    /// Source column name of the field.
    pub fn column(self) -> &'static str {
        match self {
            GroupField::State => "estado",
            GroupField::Municipality => "municipio",
            GroupField::Biome => "bioma",
            GroupField::Month => "mes",
            GroupField::DayOfWeek => "dia_semana",
        }
    }

    fn key(self, h: &Hotspot) -> GroupKey<'_> {
        match self {
            GroupField::State => GroupKey::Text(&h.state),
            GroupField::Municipality => GroupKey::Text(&h.municipality),
            GroupField::Biome => GroupKey::Text(&h.biome),
            GroupField::Month => GroupKey::Number(h.month),
            GroupField::DayOfWeek => GroupKey::Number(h.day_of_week),
        }
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A grouping key. Numeric keys order numerically, text keys lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey<'a> {
    Number(u32),
    Text(&'a str),
}

impl fmt::Display for GroupKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Number(n) => write!(f, "{n}"),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCount<'a> {
    pub key: GroupKey<'a>,
    pub count: usize,
}

pub fn total_count(view: &View<'_>) -> usize {
    view.len()
}

/// Counts per distinct value of `field`, in ascending key order.
pub fn group_count<'a>(view: &View<'a>, field: GroupField) -> Vec<GroupCount<'a>> {
    let mut counts: BTreeMap<GroupKey<'a>, usize> = BTreeMap::new();
    for h in view.iter() {
        *counts.entry(field.key(h)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect()
}

/// Counts sorted by count, highest first. Equal counts keep ascending key
/// order.
pub fn group_count_sorted_desc<'a>(view: &View<'a>, field: GroupField) -> Vec<GroupCount<'a>> {
    let mut counts = group_count(view, field);
    // Stable sort over key-ordered input.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The `n` most frequent values; fewer when the view has fewer distinct ones.
pub fn top_n<'a>(view: &View<'a>, field: GroupField, n: usize) -> Vec<GroupCount<'a>> {
    let mut counts = group_count_sorted_desc(view, field);
    counts.truncate(n);
    counts
}

/// The value with the highest count. Among equally frequent values the
/// smallest key wins.
pub fn most_frequent<'a>(
    view: &View<'a>,
    field: GroupField,
) -> Result<GroupKey<'a>, AggregateError> {
    group_count_sorted_desc(view, field)
        .first()
        .map(|gc| gc.key)
        .ok_or(AggregateError::EmptyView { field })
}

/// Detections per month, January first. Months without detections are
/// absent rather than zero.
pub fn monthly_series(view: &View<'_>) -> Vec<(u32, usize)> {
    group_count(view, GroupField::Month)
        .into_iter()
        .filter_map(|gc| match gc.key {
            GroupKey::Number(month) => Some((month, gc.count)),
            GroupKey::Text(_) => None,
        })
        .collect()
}

/// Draw `min(max_n, view.len())` distinct records with a seeded RNG. The same
/// view and seed always produce the same records in the same order.
pub fn sample<'a>(view: &View<'a>, max_n: usize, seed: u64) -> Vec<&'a Hotspot> {
    if view.is_empty() {
        return Vec::new();
    }
    let amount = max_n.min(view.len());
    let mut rng = StdRng::seed_from_u64(seed);
    let records = view.records();
    rand::seq::index::sample(&mut rng, records.len(), amount)
        .into_iter()
        .map(|i| records[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{clean, tests::raw};
    use crate::filter::{filter, tests::sp_mg, StateSelection};
    use crate::types::RawHotspot;

    fn counts<'a>(gcs: &[GroupCount<'a>]) -> Vec<(String, usize)> {
        gcs.iter().map(|gc| (gc.key.to_string(), gc.count)).collect()
    }

    #[test]
    fn states_ranked_by_count() {
        let data = sp_mg();
        let view = View::all(&data);
        assert_eq!(
            counts(&group_count_sorted_desc(&view, GroupField::State)),
            vec![("SP".to_string(), 3), ("MG".to_string(), 2)]
        );
    }

    #[test]
    fn group_totals_match_total_count() {
        let data = sp_mg();
        for selection in [StateSelection::All, StateSelection::State("MG".into())] {
            let view = filter(&data, &selection);
            for field in [
                GroupField::State,
                GroupField::Municipality,
                GroupField::Biome,
                GroupField::Month,
                GroupField::DayOfWeek,
            ] {
                let sum: usize = group_count(&view, field).iter().map(|gc| gc.count).sum();
                assert_eq!(sum, total_count(&view), "field {field}");
            }
        }
    }

    #[test]
    fn grouped_order_is_ascending_by_key() {
        let data = sp_mg();
        let view = View::all(&data);
        assert_eq!(
            counts(&group_count(&view, GroupField::Municipality)),
            vec![
                ("CAMPINAS".to_string(), 2),
                ("SOROCABA".to_string(), 1),
                ("UBERABA".to_string(), 1),
                ("UBERLÂNDIA".to_string(), 1),
            ]
        );
    }

    #[test]
    fn ties_keep_key_order_when_sorted() {
        let data = sp_mg();
        let view = View::all(&data);
        let ranked = counts(&group_count_sorted_desc(&view, GroupField::Municipality));
        assert_eq!(ranked[0], ("CAMPINAS".to_string(), 2));
        assert_eq!(
            ranked[1..].iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            vec!["SOROCABA", "UBERABA", "UBERLÂNDIA"]
        );
    }

    #[test]
    fn top_n_returns_fewer_when_fewer_distinct() {
        let data = sp_mg();
        let view = View::all(&data);
        assert_eq!(top_n(&view, GroupField::Municipality, TOP_N).len(), 4);
        assert_eq!(top_n(&view, GroupField::Municipality, 2).len(), 2);
    }

    #[test]
    fn most_frequent_prefers_smallest_key_on_tie() {
        let data = sp_mg();
        // Biomes: 3 Cerrado, 2 Mata Atlântica.
        assert_eq!(
            most_frequent(&View::all(&data), GroupField::Biome),
            Ok(GroupKey::Text("Cerrado"))
        );
        // MG alone: both towns once.
        let mg = filter(&data, &StateSelection::State("MG".into()));
        assert_eq!(
            most_frequent(&mg, GroupField::Municipality),
            Ok(GroupKey::Text("UBERABA"))
        );
    }

    #[test]
    fn empty_view_has_no_mode() {
        let data = sp_mg();
        let empty = filter(&data, &StateSelection::State("RR".into()));
        assert_eq!(total_count(&empty), 0);
        assert_eq!(
            most_frequent(&empty, GroupField::Biome),
            Err(AggregateError::EmptyView {
                field: GroupField::Biome
            })
        );
        assert!(group_count(&empty, GroupField::Biome).is_empty());
        assert!(monthly_series(&empty).is_empty());
        assert!(sample(&empty, MAP_SAMPLE_MAX, MAP_SAMPLE_SEED).is_empty());
    }

    #[test]
    fn monthly_series_is_sorted_and_sparse() {
        let data = sp_mg();
        assert_eq!(monthly_series(&View::all(&data)), vec![(2, 1), (8, 2), (9, 2)]);
    }

    #[test]
    fn months_sort_numerically() {
        let data = clean(&[
            raw("SP", "A", "Cerrado", "2024-10-01 00:00:00"),
            raw("SP", "A", "Cerrado", "2024-02-01 00:00:00"),
        ])
        .records;
        assert_eq!(monthly_series(&View::all(&data)), vec![(2, 1), (10, 1)]);
    }

    #[test]
    fn sample_is_deterministic_and_without_replacement() {
        let rows: Vec<RawHotspot> = (0..50)
            .map(|i| raw("SP", &format!("M{i:02}"), "Cerrado", "2024-03-01 00:00:00"))
            .collect();
        let data = clean(&rows).records;
        let view = View::all(&data);

        let a = sample(&view, 20, MAP_SAMPLE_SEED);
        let b = sample(&view, 20, MAP_SAMPLE_SEED);
        assert_eq!(a.len(), 20);
        assert!(a.iter().zip(&b).all(|(x, y)| std::ptr::eq(*x, *y)));

        let mut towns: Vec<&str> = a.iter().map(|h| h.municipality.as_str()).collect();
        towns.sort_unstable();
        towns.dedup();
        assert_eq!(towns.len(), 20);

        assert_eq!(sample(&view, MAP_SAMPLE_MAX, MAP_SAMPLE_SEED).len(), 50);
    }
}

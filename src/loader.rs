use crate::error::LoadError;
use crate::types::{RawHotspot, RawRow, REQUIRED_COLUMNS};
use crate::util::{is_missing_cell, non_empty, parse_f64_safe};
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Rows with a blank cell in a column the dashboard does not model.
    pub blank_extra_rows: usize,
}

/// The loaded, uncleaned source table.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub rows: Vec<RawHotspot>,
    pub report: LoadReport,
}

/// Read every row of the hotspot CSV at `path`.
///
/// Header names are matched after trimming, extra columns are kept only as a
/// "has a blank cell" flag, and column order does not matter. Short rows are
/// padded with blanks. Any row that cannot be read (bad encoding, more fields
/// than the header) fails the whole load, as does a missing required column.
pub fn load_raw<P: AsRef<Path>>(path: P) -> Result<RawDataset, LoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading hotspot CSV");
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }
    let extra_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED_COLUMNS.contains(h))
        .map(|(i, _)| i)
        .collect();
    if !extra_columns.is_empty() {
        debug!(count = extra_columns.len(), "source has extra columns");
    }

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let mut record = result.map_err(|source| LoadError::Row { row, source })?;
        if record.len() > headers.len() {
            return Err(LoadError::FieldCount {
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }
        while record.len() < headers.len() {
            record.push_field("");
        }

        let raw: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|source| LoadError::Row { row, source })?;
        let blank_extra_cell = extra_columns
            .iter()
            .any(|&c| is_missing_cell(record.get(c).unwrap_or("")));
        if blank_extra_cell {
            report.blank_extra_rows += 1;
        }
        rows.push(to_raw_hotspot(raw, blank_extra_cell));
    }

    report.total_rows = rows.len();
    info!(
        rows = report.total_rows,
        blank_extra_rows = report.blank_extra_rows,
        "hotspot CSV loaded"
    );
    Ok(RawDataset { rows, report })
}

fn to_raw_hotspot(row: RawRow, blank_extra_cell: bool) -> RawHotspot {
    let text = |s: Option<String>| non_empty(s.as_deref()).map(str::to_string);
    RawHotspot {
        latitude: parse_f64_safe(row.latitude.as_deref()),
        longitude: parse_f64_safe(row.longitude.as_deref()),
        days_without_rain: parse_f64_safe(row.numero_dias_sem_chuva.as_deref()),
        fire_risk: parse_f64_safe(row.risco_fogo.as_deref()),
        frp: parse_f64_safe(row.frp.as_deref()),
        detected_at: text(row.data_pas),
        state: text(row.estado),
        municipality: text(row.municipio),
        biome: text(row.bioma),
        blank_extra_cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn reads_rows_with_extra_and_reordered_columns() {
        let f = csv_file(
            "id,estado,satelite,data_pas,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
             1,SP,AQUA,2024-08-15 17:20:00,CAMPINAS,Mata Atlântica,-22.9,-47.06,12,0.8,3.4\n\
             2,MG,NOAA-20,2024-09-01 04:10:00,UBERABA,Cerrado,-19.7,-47.9,-999,1,\n",
        );
        let data = load_raw(f.path()).unwrap();
        assert_eq!(
            data.report,
            LoadReport {
                total_rows: 2,
                blank_extra_rows: 0
            }
        );
        assert_eq!(data.rows.len(), 2);

        let first = &data.rows[0];
        assert_eq!(first.state.as_deref(), Some("SP"));
        assert_eq!(first.detected_at.as_deref(), Some("2024-08-15 17:20:00"));
        assert_eq!(first.frp, Some(3.4));

        let second = &data.rows[1];
        assert_eq!(second.days_without_rain, Some(-999.0));
        assert!(!second.blank_extra_cell);
        assert_eq!(second.fire_risk, Some(1.0));
        assert_eq!(second.frp, None);
    }

    #[test]
    fn blank_and_unreadable_cells_become_missing() {
        let f = csv_file(
            "data_pas,estado,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
             ontem,  ,X,Cerrado,n/a,-47.9,3,0.2,1\n",
        );
        let row = &load_raw(f.path()).unwrap().rows[0];
        assert_eq!(row.detected_at.as_deref(), Some("ontem"));
        assert_eq!(row.state, None);
        assert_eq!(row.latitude, None);
        assert_eq!(row.longitude, Some(-47.9));
    }

    #[test]
    fn blank_extra_column_is_flagged_but_blank_frp_is_not() {
        let f = csv_file(
            "id,data_pas,estado,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
             ,2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,12,0.8,3.4\n\
             7,2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,12,0.8,\n\
             NaN,2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,12,0.8,1\n",
        );
        let data = load_raw(f.path()).unwrap();
        let flags: Vec<bool> = data.rows.iter().map(|r| r.blank_extra_cell).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(data.report.blank_extra_rows, 2);
        // Only the row with a blank `frp` survives cleaning.
        let kept = crate::clean::clean(&data.rows).records;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].frp, None);
    }

    #[test]
    fn short_rows_are_padded_with_blanks() {
        let f = csv_file(
            "data_pas,estado,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
             2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,3.5\n",
        );
        let row = &load_raw(f.path()).unwrap().rows[0];
        assert_eq!(row.days_without_rain, Some(3.5));
        assert_eq!(row.fire_risk, None);
        assert_eq!(row.frp, None);
    }

    #[test]
    fn long_rows_fail_the_load() {
        let f = csv_file(
            "data_pas,estado,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
             2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,3,0.8,1,extra\n",
        );
        match load_raw(f.path()) {
            Err(LoadError::FieldCount {
                row,
                expected,
                found,
            }) => assert_eq!((row, expected, found), (1, 9, 10)),
            other => panic!("expected FieldCount, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_rows_fail_the_load() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(
            b"data_pas,estado,municipio,bioma,latitude,longitude,numero_dias_sem_chuva,risco_fogo,frp\n\
              2024-08-15 17:20:00,SP,CAMPINAS,Cerrado,-22.9,-47.06,3,0.8,1\n\
              2024-08-16 10:00:00,PA,ALTAMIRA,Amaz\xf4nia,-3.2,-52.2,4,0.9,10\n",
        )
        .unwrap();
        f.flush().unwrap();
        match load_raw(f.path()) {
            Err(LoadError::Row { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected a row error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_columns_are_all_reported() {
        let f = csv_file("data_pas,estado,municipio,latitude,longitude,frp\n");
        match load_raw(f.path()) {
            Err(LoadError::MissingColumns(cols)) => assert_eq!(
                cols,
                vec!["bioma", "numero_dias_sem_chuva", "risco_fogo"]
            ),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_source_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_raw(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }
}

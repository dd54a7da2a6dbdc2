use crate::types::DashboardView;
use crate::util::format_int;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use thiserror::Error;

/// Map points printed to the console; the full sample goes to the export.
const MAP_PREVIEW_ROWS: usize = 5;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot encode dashboard JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print a titled markdown table of at most `max_rows` rows.
fn print_table<T: Tabled>(title: &str, rows: &[T], max_rows: usize) {
    println!("{title}\n");
    if rows.is_empty() {
        println!("(sem dados)\n");
        return;
    }
    let table = Table::new(rows.iter().take(max_rows))
        .with(Style::markdown())
        .to_string();
    println!("{table}\n");
}

pub fn print_interactive(view: &DashboardView) {
    let i = &view.interativo;
    println!("Dados interativos ({})\n", view.estado_selecionado);
    println!("Total de focos: {}", i.total_focos_display);
    println!(
        "Bioma mais afetado: {}\n",
        i.bioma_mais_afetado.as_deref().unwrap_or("sem dados")
    );

    print_table(
        &format!(
            "Distribuição geográfica dos focos de calor ({} pontos amostrados)",
            format_int(i.mapa.len())
        ),
        &i.mapa,
        MAP_PREVIEW_ROWS,
    );
    print_table("Distribuição temporal dos focos por mês", &i.focos_por_mes, 12);
    print_table("Focos por dia da semana", &i.focos_por_dia_semana, 7);
    print_table("Amostra dos dados filtrados", &i.amostra, i.amostra.len());
}

pub fn print_static(view: &DashboardView) {
    let s = &view.estatico;
    print_table(
        "Distribuição dos focos de queimadas por bioma",
        &s.focos_por_bioma,
        s.focos_por_bioma.len(),
    );
    print_table(
        "Top 10 estados com maior número de focos de queimadas",
        &s.top_estados,
        s.top_estados.len(),
    );
    print_table(
        "Top 10 municípios com maior frequência de focos de calor",
        &s.top_municipios,
        s.top_municipios.len(),
    );
}

/// Collects the files of one export so the caller can list them.
struct ExportDir<'a> {
    dir: &'a Path,
    written: Vec<PathBuf>,
}

impl ExportDir<'_> {
    fn table<T: Serialize>(&mut self, name: &str, rows: &[T]) -> Result<(), ExportError> {
        let path = self.dir.join(name);
        let csv_err = |source| ExportError::Csv {
            path: path.clone(),
            source,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        for r in rows {
            wtr.serialize(r).map_err(csv_err)?;
        }
        wtr.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }

    fn json<T: Serialize>(&mut self, name: &str, value: &T) -> Result<(), ExportError> {
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, body).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        self.written.push(path);
        Ok(())
    }
}

/// Write the rendered view as `dashboard.json` plus one CSV per table and
/// return the written paths.
pub fn export(dir: &Path, view: &DashboardView) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let i = &view.interativo;
    let s = &view.estatico;

    let mut out = ExportDir {
        dir,
        written: Vec::new(),
    };
    out.json("dashboard.json", view)?;
    out.table("mapa.csv", &i.mapa)?;
    out.table("focos_por_mes.csv", &i.focos_por_mes)?;
    out.table("focos_por_dia_semana.csv", &i.focos_por_dia_semana)?;
    out.table("amostra.csv", &i.amostra)?;
    out.table("focos_por_bioma.csv", &s.focos_por_bioma)?;
    out.table("top_estados.csv", &s.top_estados)?;
    out.table("top_municipios.csv", &s.top_municipios)?;
    Ok(out.written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{tests::sp_mg, StateSelection};
    use crate::view::render;

    #[test]
    fn export_writes_json_and_tables() {
        let data = sp_mg();
        let view = render(&data, &StateSelection::State("MG".into()));
        let dir = tempfile::tempdir().unwrap();
        let files = export(dir.path(), &view).unwrap();
        assert_eq!(files.len(), 8);
        assert!(files.iter().all(|f| f.exists()));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("dashboard.json")).unwrap())
                .unwrap();
        assert_eq!(json["interativo"]["total_focos"], 2);
        assert_eq!(json["interativo"]["bioma_mais_afetado"], "Cerrado");

        let estados = std::fs::read_to_string(dir.path().join("top_estados.csv")).unwrap();
        assert_eq!(estados, "chave,total_focos\nSP,3\nMG,2\n");
    }

    #[test]
    fn export_into_a_file_path_fails() {
        let data = sp_mg();
        let view = render(&data, &StateSelection::All);
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = export(file.path(), &view).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}

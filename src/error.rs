use thiserror::Error;

use crate::aggregate::GroupField;

/// Failure to produce the raw dataset. Fatal: nothing can be rendered.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read CSV header: {0}")]
    Read(#[from] csv::Error),
    #[error("failed to read data row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
    #[error("data row {row} has {found} fields, the header has {expected}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no records to aggregate by {field}")]
    EmptyView { field: GroupField },
}

use mubi_export_sources::FetchError;
use std::path::PathBuf;
use thiserror::Error;

/// A schema names a source column the record does not carry.
///
/// Flattened records always hold the full column set, so this signals a
/// mismatch between a schema and the flattener rather than bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema references column '{column}' which the record does not have")]
    MissingColumn { column: String },
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

use mubi_export_models::{Dataset, ExportSchema, FlatRecord, SchemaKind};
use mubi_export_sources::ListSource;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::error::ExportError;
use crate::flatten::flatten;
use crate::mapping::map_records;
use crate::writer::write_csv;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub user_id: String,
    pub output_dir: PathBuf,
    /// Also write the Letterboxd-compatible files
    pub letterboxd: bool,
}

impl ExportOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            output_dir: PathBuf::from("."),
            letterboxd: false,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_letterboxd(mut self, letterboxd: bool) -> Self {
        self.letterboxd = letterboxd;
        self
    }

    /// Schemas written for every data set, native first
    pub fn schema_kinds(&self) -> Vec<SchemaKind> {
        if self.letterboxd {
            vec![SchemaKind::Native, SchemaKind::Letterboxd]
        } else {
            vec![SchemaKind::Native]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub kind: SchemaKind,
    pub rows: usize,
}

/// Result of exporting one data set
#[derive(Debug)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    pub items_fetched: usize,
    pub written: Vec<WrittenFile>,
    pub errors: Vec<ExportError>,
}

impl DatasetOutcome {
    fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            items_fetched: 0,
            written: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ExportReport {
    pub outcomes: Vec<DatasetOutcome>,
    pub duration: Duration,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DatasetOutcome::is_success)
    }

    pub fn written_files(&self) -> impl Iterator<Item = &WrittenFile> {
        self.outcomes.iter().flat_map(|o| o.written.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Dataset, &ExportError)> {
        self.outcomes
            .iter()
            .flat_map(|o| o.errors.iter().map(move |e| (o.dataset, e)))
    }
}

/// Progress notifications emitted while exporting
#[derive(Debug)]
pub enum ExportProgress<'a> {
    Started(Dataset),
    Finished(&'a DatasetOutcome),
}

/// Drives fetch → flatten → map → write for the watchlist and ratings
pub struct Exporter<'a> {
    source: &'a dyn ListSource,
    options: ExportOptions,
}

impl<'a> Exporter<'a> {
    pub fn new(source: &'a dyn ListSource, options: ExportOptions) -> Self {
        Self { source, options }
    }

    pub fn output_path(&self, dataset: Dataset, kind: SchemaKind) -> PathBuf {
        self.options
            .output_dir
            .join(dataset.file_name(&self.options.user_id, kind))
    }

    pub async fn run(&self) -> ExportReport {
        self.run_with_progress(|_| {}).await
    }

    /// Export both data sets in order. A failure in one does not stop the other.
    pub async fn run_with_progress<F>(&self, mut on_progress: F) -> ExportReport
    where
        F: FnMut(ExportProgress<'_>),
    {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(Dataset::ALL.len());

        for dataset in Dataset::ALL {
            on_progress(ExportProgress::Started(dataset));
            let outcome = self.export_dataset(dataset).await;
            on_progress(ExportProgress::Finished(&outcome));
            outcomes.push(outcome);
        }

        ExportReport {
            outcomes,
            duration: start.elapsed(),
        }
    }

    pub async fn export_dataset(&self, dataset: Dataset) -> DatasetOutcome {
        let mut outcome = DatasetOutcome::new(dataset);
        info!("Fetching {} from {}", dataset, self.source.source_name());

        let items = match self.source.fetch_all(dataset).await {
            Ok(items) => items,
            Err(e) => {
                error!(dataset = %dataset, "Failed to fetch {}: {}", dataset, e);
                outcome.errors.push(e.into());
                return outcome;
            }
        };
        outcome.items_fetched = items.len();
        info!("Got {} {} items", items.len(), dataset);

        // Items are dropped once flattened
        let records: Vec<FlatRecord> = items.iter().map(|item| flatten(dataset, item)).collect();
        drop(items);

        for kind in self.options.schema_kinds() {
            match self.write_schema(dataset, kind, &records) {
                Ok(file) => outcome.written.push(file),
                Err(e) => {
                    error!(dataset = %dataset, kind = ?kind, "Failed to export {}: {}", dataset, e);
                    outcome.errors.push(e);
                }
            }
        }

        outcome
    }

    fn write_schema(
        &self,
        dataset: Dataset,
        kind: SchemaKind,
        records: &[FlatRecord],
    ) -> Result<WrittenFile, ExportError> {
        let schema = ExportSchema::for_dataset(dataset, kind);
        let mapped = map_records(records, &schema)?;
        let path = self.output_path(dataset, kind);
        debug!("Writing {} {:?} rows to {}", mapped.len(), kind, path.display());

        let rows = write_csv(&path, &schema.output_columns(), &mapped)?;
        Ok(WrittenFile {
            path,
            kind: schema.kind(),
            rows,
        })
    }
}

use indicatif::{ProgressBar, ProgressStyle};
use mubi_export_core::DatasetOutcome;
use mubi_export_models::Dataset;
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while data sets are fetched; falls back to tracing when
/// stderr is not a terminal.
pub struct ExportUI {
    spinner: Option<ProgressBar>,
}

impl ExportUI {
    pub fn new(enabled: bool) -> Self {
        let interactive = enabled && std::io::stderr().is_terminal();

        let spinner = interactive.then(|| {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
            {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner
        });

        if spinner.is_none() {
            tracing::debug!(operation = "ui_init", mode = "non_interactive", "Progress spinner disabled");
        }

        Self { spinner }
    }

    pub fn dataset_started(&self, dataset: Dataset) {
        let msg = format!("Fetching {}...", dataset);
        match &self.spinner {
            Some(spinner) => spinner.set_message(msg),
            None => tracing::info!(operation = "progress", dataset = %dataset, "{}", msg),
        }
    }

    pub fn dataset_finished(&self, outcome: &DatasetOutcome) {
        let msg = if outcome.is_success() {
            format!("{}: {} items exported", outcome.dataset, outcome.items_fetched)
        } else {
            format!("{}: failed", outcome.dataset)
        };

        match &self.spinner {
            Some(spinner) => spinner.println(msg),
            None => tracing::info!(
                operation = "progress",
                dataset = %outcome.dataset,
                success = outcome.is_success(),
                "{}",
                msg
            ),
        }
    }

    pub fn finish(&self) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }
    }
}

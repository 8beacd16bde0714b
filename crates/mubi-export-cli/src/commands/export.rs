use anyhow::Context;
use color_eyre::eyre::eyre;
use mubi_export_config::{Config, PathManager};
use mubi_export_core::{ExportOptions, ExportProgress, ExportReport, Exporter};
use mubi_export_sources::{ClientOptions, MubiClient};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info};

use super::export_ui::ExportUI;
use crate::output::{Output, OutputFormat};

/// Everything the `mubi-export` invocation can override
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub user_id: String,
    pub token: Option<String>,
    pub per_page: Option<u32>,
    pub country: Option<String>,
    pub letterboxd: bool,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl ExportArgs {
    /// Config file (or defaults) with command-line overrides applied, validated
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let default_path = match self.config {
            Some(_) => None,
            None => PathManager::new().ok().map(|paths| paths.config_file()),
        };
        let mut config = Config::load(self.config.as_deref(), default_path.as_deref())?;

        if let Some(per_page) = self.per_page {
            config.export.per_page = per_page;
        }
        if let Some(country) = &self.country {
            config.export.country = country.trim().to_uppercase();
        }
        if let Some(output_dir) = &self.output_dir {
            config.export.output_dir = output_dir.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// User ids end up in the request path and the output file names, so only
/// ASCII letters, digits, `_` and `-` are accepted.
pub fn parse_user_id(value: &str) -> Result<String, String> {
    let user_id = value.trim();
    if user_id.is_empty() {
        return Err("user_id cannot be empty".to_string());
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(format!(
            "Invalid user_id '{}': only letters, digits, '_' and '-' are allowed",
            user_id
        ));
    }
    Ok(user_id.to_string())
}

/// Run both exports. Returns whether every data set succeeded.
pub async fn run_export(args: ExportArgs, output: &Output) -> color_eyre::Result<bool> {
    let user_id = parse_user_id(&args.user_id).map_err(|e| eyre!(e))?;

    let config = args.resolve_config().map_err(|e| eyre!("{:#}", e))?;
    debug!(
        per_page = config.export.per_page,
        country = %config.export.country,
        base_url = %config.api.base_url,
        "Resolved configuration"
    );

    let output_dir = config.export.output_dir.clone();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))
        .map_err(|e| eyre!("{:#}", e))?;

    let client = MubiClient::new(ClientOptions::from_config(
        &config,
        user_id.clone(),
        args.token.clone(),
        args.debug,
    ))?;

    let options = ExportOptions::new(user_id.clone())
        .with_output_dir(output_dir)
        .with_letterboxd(args.letterboxd);

    info!(user_id = %user_id, letterboxd = args.letterboxd, "Starting export");

    let ui = ExportUI::new(output.format() == OutputFormat::Human && !output.is_quiet());
    let report = Exporter::new(&client, options)
        .run_with_progress(|event| match event {
            ExportProgress::Started(dataset) => ui.dataset_started(dataset),
            ExportProgress::Finished(outcome) => ui.dataset_finished(outcome),
        })
        .await;
    ui.finish();

    print_summary(&report, output);
    Ok(report.is_success())
}

fn print_summary(report: &ExportReport, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            for file in report.written_files() {
                output.success(format!("{} ({} rows)", file.path.display(), file.rows));
            }
            for (dataset, error) in report.failures() {
                output.error(format!("{} failed: {}", dataset, error));
            }
            if report.is_success() {
                output.info(format!(
                    "Export finished in {:.1}s",
                    report.duration.as_secs_f64()
                ));
            } else {
                output.warn("Export finished with errors");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&summary_json(report));
            if output.is_quiet() {
                for (dataset, error) in report.failures() {
                    output.error(format!("{} failed: {}", dataset, error));
                }
            }
        }
    }
}

fn summary_json(report: &ExportReport) -> Value {
    let datasets: Vec<Value> = report
        .outcomes
        .iter()
        .map(|outcome| {
            json!({
                "dataset": outcome.dataset,
                "items": outcome.items_fetched,
                "success": outcome.is_success(),
                "files": outcome.written,
                "errors": outcome.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "type": "summary",
        "success": report.is_success(),
        "duration_ms": report.duration.as_millis() as u64,
        "datasets": datasets,
    })
}

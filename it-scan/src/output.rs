use crate::processing::{ChannelResult, Exclusion, ScanReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use it_curve::PipelineParameters;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

/// Everything written for one scan.
#[derive(Serialize)]
pub(crate) struct RunSummary<'a> {
    pub(crate) scan_tag: &'a str,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) data_path: &'a Path,
    pub(crate) parameters: &'a PipelineParameters,
    pub(crate) deny_list: &'a [String],
    pub(crate) excluded: &'a [Exclusion],
    pub(crate) sensors: Vec<&'a ChannelResult>,
}

impl<'a> RunSummary<'a> {
    pub(crate) fn new(
        scan_tag: &'a str,
        data_path: &'a Path,
        parameters: &'a PipelineParameters,
        deny_list: &'a [String],
        report: &'a ScanReport,
    ) -> Self {
        Self {
            scan_tag,
            generated_at: Utc::now(),
            data_path,
            parameters,
            deny_list,
            excluded: &report.excluded,
            sensors: report.results.values().collect(),
        }
    }
}

pub(crate) fn results_path(output_dir: &Path, scan_tag: &str) -> PathBuf {
    output_dir.join(format!("it_curves_{scan_tag}.json"))
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub(crate) fn write_results(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)
        .with_context(|| format!("Cannot write results to {}", path.display()))?;
    writer.flush()?;
    info!("Results for {} sensors written", summary.sensors.len());
    Ok(())
}

/// Writes the current state of every metric in the Prometheus text format.
pub(crate) fn write_metrics(path: &Path, handle: &PrometheusHandle) -> Result<()> {
    std::fs::write(path, handle.render())
        .with_context(|| format!("Cannot write metrics to {}", path.display()))
}

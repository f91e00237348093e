mod decoder;
mod output;
mod parameters;
mod processing;

use anyhow::{Result, bail};
use clap::Parser;
use decoder::{DecodeOptions, DecodedScan, FileKind, decode_directory};
use it_curve::{ChannelPipeline, PipelineParameters};
use itscan_common::{
    Seconds, init_tracer,
    metrics::{
        component_info_metric, describe_scan_metrics,
        failures::{self, FailureKind},
        names::FAILURES,
    },
    parse_time_of_day,
    tracer::TracerOptions,
};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use output::{RunSummary, results_path, write_metrics, write_results};
use parameters::PipelineArgs;
use processing::process_channels;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, level_filters::LevelFilter, warn};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Directory holding the archive's CSV exports.
    #[clap(env = "ITSCAN_DATA_PATH")]
    data_path: PathBuf,

    /// Glob pattern, relative to the data directory, selecting the files to read.
    #[clap(long, default_value = "*")]
    pattern: String,

    /// Directory the results are written to.
    #[clap(long, env = "ITSCAN_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Time of day (hh:mm:ss) the scan started, earlier samples are ignored.
    #[clap(long, value_parser = parse_time_of_day)]
    scan_start: Option<Seconds>,

    /// Sensor labels left out of the scan.
    #[clap(long, value_delimiter = ',', default_value = "PU02_AT,PU01_AB")]
    deny: Vec<String>,

    /// Fail the run if any sensor has no plateaus. Results for the other sensors are still written.
    #[clap(long)]
    strict: bool,

    /// If set, a snapshot of the run's metrics is written to this file in the Prometheus text format.
    #[clap(long)]
    metrics_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let _tracer = init_tracer!(TracerOptions {
        default_level: args.log_level,
        ..Default::default()
    });
    debug!("Args: {:?}", args);

    let metrics_handle = args
        .metrics_file
        .as_ref()
        .map(|_| PrometheusBuilder::new().install_recorder())
        .transpose()?;
    describe_scan_metrics();
    component_info_metric("it-scan");

    let result = run(&args).await;
    if let Err(e) = &result {
        error!("{e:#}");
    }
    if let (Some(path), Some(handle)) = (&args.metrics_file, &metrics_handle) {
        write_metrics_file(path, handle);
    }
    result
}

fn write_metrics_file(path: &Path, handle: &PrometheusHandle) {
    if let Err(e) = write_metrics(path, handle) {
        warn!("{e:#}");
    }
}

/// Decodes both kinds of file concurrently.
async fn decode(args: &Cli) -> Result<(DecodedScan, DecodedScan)> {
    let options = DecodeOptions {
        pattern: args.pattern.clone(),
        scan_start: args.scan_start,
    };
    let spawn_decoder = |kind: FileKind| {
        let data_path = args.data_path.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || decode_directory(&data_path, kind, &options))
    };

    let (temperatures, currents) = tokio::try_join!(
        spawn_decoder(FileKind::Temperature),
        spawn_decoder(FileKind::HvCurrent)
    )?;
    let decoded = temperatures.and_then(|temperatures| Ok((temperatures, currents?)));
    if decoded.is_err() {
        counter!(FAILURES, &[failures::get_label(FailureKind::DecodeFailed)]).increment(1);
    }
    Ok(decoded?)
}

async fn run(args: &Cli) -> Result<()> {
    let (temperatures, currents) = decode(args).await?;
    for scan in [&temperatures, &currents] {
        debug!("{} files: {:?}", scan.kind, scan.files);
    }
    // The current readings date the scan; temperatures are only a fallback.
    let scan_tag = currents
        .scan_tag
        .clone()
        .or_else(|| temperatures.scan_tag.clone())
        .unwrap_or_else(|| "unknown".to_owned());
    info!("Scan {scan_tag}");

    let parameters = PipelineParameters::from(&args.pipeline);
    let pipeline = ChannelPipeline::new(parameters);
    let report = tokio::task::block_in_place(|| {
        process_channels(&pipeline, &temperatures.store, currents.store, &args.deny)
    });

    let summary = RunSummary::new(
        &scan_tag,
        &args.data_path,
        pipeline.parameters(),
        &args.deny,
        &report,
    );
    let path = results_path(&args.output_dir, &scan_tag);
    if let Err(e) = write_results(&path, &summary) {
        counter!(FAILURES, &[failures::get_label(FailureKind::FileWriteFailed)]).increment(1);
        return Err(e);
    }

    let without_plateaus = report.without_plateaus();
    if args.strict && !without_plateaus.is_empty() {
        counter!(FAILURES, &[failures::get_label(FailureKind::NoPlateaus)]).increment(1);
        bail!(
            "No plateaus found for {} sensors: {}",
            without_plateaus.len(),
            without_plateaus.join(", ")
        );
    }
    Ok(())
}

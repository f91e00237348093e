//! Command line parameters of each stage of the curve pipeline.
use clap::{Args, ValueEnum};
use it_curve::{
    BranchKind, CorrelationParameters, CurveParameters, MergeParameters, PipelineParameters,
    PlateauParameters, Polarity,
};
use itscan_common::{Real, Seconds};

/// Encapsulates the parameters of the plateau detector.
#[derive(Debug, Clone, Args)]
pub(crate) struct PlateauArgs {
    /// Largest deviation from the first sample of a run, in °C, for a sample to extend the run.
    #[clap(long, default_value = "0.3")]
    pub(crate) max_delta: Real,

    /// A run must contain more samples than this to become a plateau.
    #[clap(long, default_value = "10")]
    pub(crate) min_run_length: usize,

    /// After a plateau is found, the search resumes this many seconds after the sample that ended it.
    #[clap(long, default_value = "90")]
    pub(crate) leap: Seconds,
}

/// Encapsulates the parameters used to merge plateaus caused by oscillations of the cooling plant.
#[derive(Debug, Clone, Args)]
pub(crate) struct MergeArgs {
    /// Plateaus whose means round to the same multiple of this, in °C, are merged.
    #[clap(long, default_value = "1.0")]
    pub(crate) resolution: Real,

    /// Plateaus separated by more than this many seconds are never merged.
    #[clap(long, default_value = "600")]
    pub(crate) max_gap: Seconds,

    /// Plateaus lasting fewer seconds than this are discarded.
    #[clap(long, default_value = "0")]
    pub(crate) min_duration: Seconds,
}

/// Which side of the warmest plateau is used to build the curve.
#[derive(Default, Debug, Clone, Copy, ValueEnum)]
pub(crate) enum BranchArg {
    /// Plateaus up to and including the warmest one.
    #[default]
    Rising,
    /// Plateaus from the warmest one onwards.
    Falling,
}

impl From<BranchArg> for BranchKind {
    fn from(value: BranchArg) -> Self {
        match value {
            BranchArg::Rising => BranchKind::Rising,
            BranchArg::Falling => BranchKind::Falling,
        }
    }
}

/// Encapsulates the parameters used to pair plateaus with currents.
#[derive(Debug, Clone, Args)]
pub(crate) struct CorrelationArgs {
    /// Plateaus colder than this, in whole °C, are ignored.
    #[clap(long, default_value = "-30", allow_negative_numbers = true)]
    pub(crate) min_temperature: Real,

    /// Correlate every plateau regardless of temperature.
    #[clap(long, conflicts_with = "min_temperature")]
    pub(crate) no_temperature_floor: bool,

    /// The branch of the scan the curve is built from.
    #[clap(long, value_enum, default_value_t)]
    pub(crate) branch: BranchArg,
}

/// Defines the sign convention of the HV supplies' current readings.
#[derive(Default, Debug, Clone, Copy, ValueEnum)]
pub(crate) enum PolarityArg {
    /// Leakage registers as a positive current.
    #[default]
    Positive,
    /// Leakage registers as a negative current.
    Negative,
}

impl From<PolarityArg> for Polarity {
    fn from(value: PolarityArg) -> Self {
        match value {
            PolarityArg::Positive => Polarity::Positive,
            PolarityArg::Negative => Polarity::Negative,
        }
    }
}

/// Encapsulates the parameters of the curve filter.
#[derive(Debug, Clone, Args)]
pub(crate) struct CurveArgs {
    /// Currents smaller in magnitude than this, in mA, are treated as artifacts.
    #[clap(long, default_value = "0.01")]
    pub(crate) leakage_threshold: Real,

    /// The curve ends before the first drop in current larger than this percentage.
    #[clap(long, default_value = "7")]
    pub(crate) max_drop_percent: Real,

    #[clap(long, value_enum, default_value_t)]
    pub(crate) polarity: PolarityArg,

    /// Keep points whose current repeats an earlier point's.
    #[clap(long)]
    pub(crate) keep_duplicate_currents: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct PipelineArgs {
    #[command(flatten)]
    pub(crate) plateau: PlateauArgs,

    #[command(flatten)]
    pub(crate) merge: MergeArgs,

    #[command(flatten)]
    pub(crate) correlation: CorrelationArgs,

    #[command(flatten)]
    pub(crate) curve: CurveArgs,
}

impl From<&PipelineArgs> for PipelineParameters {
    fn from(args: &PipelineArgs) -> Self {
        PipelineParameters {
            plateau: PlateauParameters {
                max_delta: args.plateau.max_delta,
                min_run_length: args.plateau.min_run_length,
                leap: args.plateau.leap,
            },
            merge: MergeParameters {
                resolution: args.merge.resolution,
                max_gap: args.merge.max_gap,
                min_duration: args.merge.min_duration,
            },
            correlation: CorrelationParameters {
                min_temperature: (!args.correlation.no_temperature_floor)
                    .then_some(args.correlation.min_temperature),
                branch: args.correlation.branch.into(),
            },
            curve: CurveParameters {
                leakage_threshold: args.curve.leakage_threshold,
                max_drop_percent: args.curve.max_drop_percent,
                polarity: args.curve.polarity.into(),
                dedup_currents: !args.curve.keep_duplicate_currents,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        pipeline: PipelineArgs,
    }

    #[test]
    fn defaults_match_the_library() {
        let harness = Harness::parse_from(["it-scan"]);
        assert_eq!(
            PipelineParameters::from(&harness.pipeline),
            PipelineParameters::default()
        );
    }

    #[test]
    fn overrides() {
        let harness = Harness::parse_from([
            "it-scan",
            "--min-temperature",
            "-25",
            "--branch",
            "falling",
            "--polarity",
            "negative",
            "--keep-duplicate-currents",
            "--leap",
            "0",
        ]);
        let parameters = PipelineParameters::from(&harness.pipeline);
        assert_eq!(parameters.correlation.min_temperature, Some(-25.0));
        assert_eq!(parameters.correlation.branch, BranchKind::Falling);
        assert_eq!(parameters.curve.polarity, Polarity::Negative);
        assert!(!parameters.curve.dedup_currents);
        assert_eq!(parameters.plateau.leap, 0);
    }

    #[test]
    fn temperature_floor_can_be_removed() {
        let harness = Harness::parse_from(["it-scan", "--no-temperature-floor"]);
        let parameters = PipelineParameters::from(&harness.pipeline);
        assert_eq!(parameters.correlation.min_temperature, None);
    }
}

use crate::{
    branch::{BranchSplit, split_branches},
    correlation::{AlignedPoint, CorrelationParameters, Correlator},
    curve::{Curve, CurveFilter, CurveParameters},
    error::{CurveError, CurveResult},
    plateau::{MergeParameters, OscillationMerger, Plateau, PlateauFilter, PlateauParameters},
    series::TimeSeries,
};
use serde::Serialize;
use tracing::{Span, info, instrument};

/// Every parameter of the per-channel pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PipelineParameters {
    pub plateau: PlateauParameters,
    pub merge: MergeParameters,
    pub correlation: CorrelationParameters,
    pub curve: CurveParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelOutcome {
    pub plateaus: Vec<Plateau>,
    pub branches: BranchSplit,
    pub aligned: Vec<AlignedPoint>,
    pub curve: Curve,
}

/// Turns the temperature and current series of one sensor into its IT curve.
#[derive(Clone, Debug, Default)]
pub struct ChannelPipeline {
    parameters: PipelineParameters,
    merger: OscillationMerger,
    correlator: Correlator,
    filter: CurveFilter,
}

impl ChannelPipeline {
    pub fn new(parameters: PipelineParameters) -> Self {
        Self {
            merger: OscillationMerger::new(parameters.merge.clone()),
            correlator: Correlator::new(parameters.correlation.clone()),
            filter: CurveFilter::new(parameters.curve.clone()),
            parameters,
        }
    }

    pub fn parameters(&self) -> &PipelineParameters {
        &self.parameters
    }

    /// Both series must carry the same (resolved) channel name.
    #[instrument(skip_all, fields(
        channel = temperature.channel(),
        temperature_samples = temperature.len(),
        current_samples = current.len(),
        plateaus,
        points
    ))]
    pub fn run(&self, temperature: &TimeSeries, current: &TimeSeries) -> CurveResult<ChannelOutcome> {
        if temperature.channel() != current.channel() {
            return Err(CurveError::ChannelMismatch {
                temperature: temperature.channel().to_owned(),
                current: current.channel().to_owned(),
            });
        }
        let channel = temperature.channel();

        let candidates = temperature.plateaus(&self.parameters.plateau).collect();
        let plateaus = self.merger.merge(candidates);
        Span::current().record("plateaus", plateaus.len());

        let branches = split_branches(channel, &plateaus)?;
        let branch = branches.branch(self.correlator.parameters().branch);
        let aligned = self.correlator.correlate(&branch.plateaus, current);
        let curve = self.filter.filter(channel, aligned.clone());
        Span::current().record("points", curve.points.len());

        info!(
            "{} plateaus, {} aligned points, {} curve points",
            plateaus.len(),
            aligned.len(),
            curve.points.len()
        );
        Ok(ChannelOutcome {
            plateaus,
            branches,
            aligned,
            curve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::series_from;
    use assert_approx_eq::assert_approx_eq;

    /// Holds at -30, -20, -10 and back to -20, 20 samples of 30 s each.
    fn temperature() -> TimeSeries {
        let holds = [-30.0, -20.0, -10.0, -20.0];
        let data: Vec<_> = holds
            .iter()
            .enumerate()
            .flat_map(|(h, &value)| (0..20).map(move |i| ((h as u32 * 20 + i) * 30, value)))
            .collect();
        series_from("VL01_CT", &data)
    }

    /// Doubles roughly every ten degrees.
    fn current() -> TimeSeries {
        let data: Vec<_> = (0..80)
            .map(|i: u32| {
                let level = match i / 20 {
                    0 => 0.05,
                    1 => 0.1,
                    2 => 0.2,
                    _ => 0.1,
                };
                (i * 30 + 15, level)
            })
            .collect();
        series_from("VL01_CT", &data)
    }

    fn pipeline() -> ChannelPipeline {
        ChannelPipeline::new(PipelineParameters {
            plateau: PlateauParameters {
                leap: 0,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn full_scan() {
        let outcome = pipeline().run(&temperature(), &current()).unwrap();
        assert_eq!(outcome.plateaus.len(), 4);
        assert_eq!(outcome.branches.rising.plateaus.len(), 3);
        assert_eq!(outcome.branches.falling.plateaus.len(), 2);
        assert_eq!(outcome.aligned.len(), 3);

        let currents: Vec<_> = outcome.curve.points.iter().map(|p| p.current).collect();
        assert_eq!(currents.len(), 3);
        assert_approx_eq!(currents[0], 0.05);
        assert_approx_eq!(currents[1], 0.1);
        assert_approx_eq!(currents[2], 0.2);
    }

    #[test]
    fn falling_branch() {
        let pipeline = ChannelPipeline::new(PipelineParameters {
            plateau: PlateauParameters {
                leap: 0,
                ..Default::default()
            },
            correlation: CorrelationParameters {
                branch: crate::BranchKind::Falling,
                ..Default::default()
            },
            ..Default::default()
        });
        let outcome = pipeline.run(&temperature(), &current()).unwrap();
        assert_eq!(outcome.aligned.len(), 2);
        assert_approx_eq!(outcome.aligned[0].temperature, -10.0);
    }

    #[test]
    fn flat_noise_has_no_plateaus() {
        let data: Vec<_> = (0..40)
            .map(|i| (i * 30, if i % 2 == 0 { -30.0 } else { -20.0 }))
            .collect();
        let temperature = series_from("VL01_CT", &data);
        assert_eq!(
            pipeline().run(&temperature, &current()),
            Err(CurveError::NoPlateaus {
                channel: "VL01_CT".to_owned()
            })
        );
    }

    #[test]
    fn mismatched_channels() {
        let current = current().with_channel("VL02_CT");
        assert!(matches!(
            pipeline().run(&temperature(), &current),
            Err(CurveError::ChannelMismatch { .. })
        ));
    }
}

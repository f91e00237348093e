use it_curve::{
    AlignedPoint, Correlator, CurveFilter, CurveParameters, MergeParameters, OscillationMerger,
    Plateau, PlateauFilter, PlateauParameters, Sample, TimeSeries, Window, split_branches,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

/// A temperature series built from holds at whole degrees with small noise.
fn temperature_strategy() -> impl Strategy<Value = TimeSeries> {
    prop::collection::vec(
        (
            -40i32..20,
            1usize..40,
            prop::collection::vec(-0.1f64..0.1, 40),
        ),
        0..12,
    )
    .prop_flat_map(|holds| {
        let samples = holds
            .into_iter()
            .flat_map(|(level, length, noise)| {
                noise
                    .into_iter()
                    .take(length)
                    .map(move |n| level as f64 + n)
            })
            .collect::<Vec<_>>();
        (Just(samples), 1u32..60)
    })
    .prop_map(|(values, step)| {
        let samples = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Sample::new(i as u32 * step, value))
            .collect();
        TimeSeries::new("VL01_CT", samples)
    })
}

fn current_strategy() -> impl Strategy<Value = TimeSeries> {
    prop::collection::vec((0u32..20_000, 0.0f64..2.0), 0..300).prop_map(|data| {
        TimeSeries::new(
            "VL01_CT",
            data.into_iter().map(Sample::from).collect(),
        )
    })
}

fn plateau_parameters_strategy() -> impl Strategy<Value = PlateauParameters> {
    (0.05f64..1.0, 0usize..15, 0u32..200).prop_map(|(max_delta, min_run_length, leap)| {
        PlateauParameters {
            max_delta,
            min_run_length,
            leap,
        }
    })
}

fn points_strategy() -> impl Strategy<Value = Vec<AlignedPoint>> {
    prop::collection::vec(-1.0f64..1.0, 0..40).prop_map(|currents| {
        currents
            .into_iter()
            .enumerate()
            .map(|(i, current)| AlignedPoint {
                temperature: i as f64,
                current,
                window: Window {
                    start: i as u32 * 100,
                    end: i as u32 * 100 + 50,
                },
                samples: 1,
            })
            .collect()
    })
}

fn detect_and_merge(series: &TimeSeries, parameters: &PlateauParameters) -> Vec<Plateau> {
    let candidates = series.plateaus(parameters).collect();
    OscillationMerger::new(MergeParameters::default()).merge(candidates)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn candidates_are_long_ordered_and_disjoint(
        series in temperature_strategy(),
        parameters in plateau_parameters_strategy(),
    ) {
        let candidates: Vec<_> = series.plateaus(&parameters).collect();
        for plateau in &candidates {
            prop_assert!(plateau.samples > parameters.min_run_length);
            prop_assert_eq!(plateau.duration, plateau.end - plateau.start);
        }
        for pair in candidates.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn merging_is_idempotent(
        series in temperature_strategy(),
        parameters in plateau_parameters_strategy(),
    ) {
        let merger = OscillationMerger::new(MergeParameters::default());
        let once = detect_and_merge(&series, &parameters);
        prop_assert_eq!(merger.merge(once.clone()), once);
    }

    #[test]
    fn peak_is_shared_by_both_branches(
        series in temperature_strategy(),
        parameters in plateau_parameters_strategy(),
    ) {
        let plateaus = detect_and_merge(&series, &parameters);
        match split_branches("VL01_CT", &plateaus) {
            Ok(split) => {
                let peak = split.rising.plateaus.last();
                prop_assert_eq!(peak, split.falling.plateaus.first());
                let max = plateaus.iter().map(|p| p.mean).fold(f64::NEG_INFINITY, f64::max);
                prop_assert_eq!(peak.map(|p| p.mean), Some(max));
                prop_assert_eq!(
                    split.rising.plateaus.len() + split.falling.plateaus.len(),
                    plateaus.len() + 1
                );
            }
            Err(_) => prop_assert!(plateaus.is_empty()),
        }
    }

    #[test]
    fn correlation_never_invents_points(
        series in temperature_strategy(),
        current in current_strategy(),
    ) {
        let plateaus = detect_and_merge(&series, &PlateauParameters::default());
        let points = Correlator::default().correlate(&plateaus, &current);
        prop_assert!(points.len() <= plateaus.len());
        for point in &points {
            prop_assert!(point.samples > 0);
            prop_assert!(point.window.start <= point.window.end);
        }
    }

    #[test]
    fn curve_is_ordered_and_above_threshold(points in points_strategy()) {
        let parameters = CurveParameters::default();
        let curve = CurveFilter::new(parameters.clone()).filter("VL01_CT", points.clone());
        for point in &curve.points {
            prop_assert!(point.current.abs() >= parameters.leakage_threshold);
        }
        for pair in curve.points.windows(2) {
            prop_assert!(pair[0].current.abs() <= pair[1].current.abs());
            if pair[1].current < pair[0].current {
                let drop = 100.0 * (pair[1].current - pair[0].current).abs() / pair[0].current.abs();
                prop_assert!(drop <= parameters.max_drop_percent);
            }
        }
        prop_assert_eq!(curve.points.len() + curve.removed.total(), points.len());
    }

    #[test]
    fn positive_currents_give_a_non_decreasing_curve(
        currents in prop::collection::vec(0.0f64..1.0, 0..40),
    ) {
        let points = currents
            .into_iter()
            .enumerate()
            .map(|(i, current)| AlignedPoint {
                temperature: i as f64,
                current,
                window: Window { start: 0, end: 1 },
                samples: 1,
            })
            .collect();
        let curve = CurveFilter::default().filter("VL01_CT", points);
        prop_assert_eq!(curve.removed.monotonicity, 0);
        for pair in curve.points.windows(2) {
            prop_assert!(pair[0].current <= pair[1].current);
        }
    }
}

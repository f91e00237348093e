use crate::{branch::BranchKind, plateau::Plateau, series::TimeSeries};
use itscan_common::{Real, Seconds};
use serde::Serialize;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelationParameters {
    /// Plateaus colder than this, compared in whole degrees, are not correlated.
    pub min_temperature: Option<Real>,
    pub branch: BranchKind,
}

impl Default for CorrelationParameters {
    fn default() -> Self {
        Self {
            min_temperature: Some(-30.0),
            branch: BranchKind::Rising,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Window {
    pub start: Seconds,
    pub end: Seconds,
}

/// A plateau temperature paired with the mean current drawn while it was held.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlignedPoint {
    pub temperature: Real,
    pub current: Real,
    pub window: Window,
    pub samples: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Correlator {
    parameters: CorrelationParameters,
}

impl Correlator {
    pub fn new(parameters: CorrelationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &CorrelationParameters {
        &self.parameters
    }

    fn is_too_cold(&self, plateau: &Plateau) -> bool {
        self.parameters
            .min_temperature
            .is_some_and(|min| plateau.mean.trunc() < min)
    }

    /// Averages `current` over each plateau's `[start, end)` window.
    ///
    /// Windows holding no current samples yield no point, so the result is never longer
    /// than `plateaus`.
    pub fn correlate(&self, plateaus: &[Plateau], current: &TimeSeries) -> Vec<AlignedPoint> {
        plateaus
            .iter()
            .filter(|plateau| !self.is_too_cold(plateau))
            .filter_map(|plateau| {
                let window = current.window(plateau.start, plateau.end);
                if window.is_empty() {
                    trace!("No current samples during {plateau}");
                    return None;
                }
                let current = window.iter().map(|s| s.value).sum::<Real>() / window.len() as Real;
                Some(AlignedPoint {
                    temperature: plateau.mean,
                    current,
                    window: Window {
                        start: plateau.start,
                        end: plateau.end,
                    },
                    samples: window.len(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::series_from;
    use assert_approx_eq::assert_approx_eq;

    fn plateau(mean: Real, start: Seconds, end: Seconds) -> Plateau {
        Plateau {
            channel: "VL01_CT".to_owned(),
            value: mean,
            mean,
            start,
            end,
            duration: end - start,
            samples: 20,
        }
    }

    #[test]
    fn mean_of_window() {
        let current = series_from("VL01_CT", &[(5, 0.5), (10, 0.05), (15, 0.07), (20, 0.9)]);
        let points = Correlator::default().correlate(&[plateau(-20.0, 10, 20)], &current);
        assert_eq!(points.len(), 1);
        assert_approx_eq!(points[0].current, 0.06);
        assert_approx_eq!(points[0].temperature, -20.0);
        assert_eq!(points[0].samples, 2);
        assert_eq!(points[0].window, Window { start: 10, end: 20 });
    }

    #[test]
    fn empty_window_yields_no_point() {
        let current = series_from("VL01_CT", &[(0, 0.5), (100, 0.6)]);
        let points = Correlator::default().correlate(
            &[plateau(-20.0, 10, 20), plateau(-10.0, 90, 110)],
            &current,
        );
        assert_eq!(points.len(), 1);
        assert_approx_eq!(points[0].current, 0.6);
    }

    #[test]
    fn cold_plateaus_are_skipped() {
        let current = series_from("VL01_CT", &[(10, 0.1), (30, 0.2), (50, 0.3)]);
        let plateaus = [
            plateau(-31.0, 0, 20),
            plateau(-30.9, 20, 40),
            plateau(-29.0, 40, 60),
        ];
        let points = Correlator::default().correlate(&plateaus, &current);
        assert_eq!(points.len(), 2);
        assert_approx_eq!(points[0].temperature, -30.9);

        let unbounded = Correlator::new(CorrelationParameters {
            min_temperature: None,
            ..Default::default()
        });
        assert_eq!(unbounded.correlate(&plateaus, &current).len(), 3);
    }

    #[test]
    fn no_plateaus() {
        let current = series_from("VL01_CT", &[(10, 0.1)]);
        assert!(Correlator::default().correlate(&[], &current).is_empty());
    }
}

use super::{MergeParameters, Plateau};
use tracing::{debug, instrument};

/// Collapses the repeated plateaus produced by a plant oscillating around one setpoint.
#[derive(Clone, Debug, Default)]
pub struct OscillationMerger {
    parameters: MergeParameters,
}

impl OscillationMerger {
    pub fn new(parameters: MergeParameters) -> Self {
        Self { parameters }
    }

    fn is_admissible(&self, plateau: &Plateau) -> bool {
        plateau.samples >= 2 && plateau.duration >= self.parameters.min_duration
    }

    fn is_same_hold(&self, top: &Plateau, candidate: &Plateau) -> bool {
        top.merge_key(self.parameters.resolution) == candidate.merge_key(self.parameters.resolution)
            && candidate.start.saturating_sub(top.end) <= self.parameters.max_gap
    }

    /// Merges the candidates of one channel. Applying this twice gives the same result as once.
    #[instrument(skip_all, fields(candidates = candidates.len(), merged))]
    pub fn merge(&self, mut candidates: Vec<Plateau>) -> Vec<Plateau> {
        candidates.sort_by_key(|p| p.start);

        let mut stack: Vec<Plateau> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !self.is_admissible(&candidate) {
                debug!("Discarding {candidate}");
                continue;
            }
            match stack.last_mut() {
                Some(top) if self.is_same_hold(top, &candidate) => {
                    if candidate.duration > top.duration {
                        debug!("Replacing {top} with {candidate}");
                        *top = candidate;
                    } else {
                        debug!("Dropping {candidate} in favour of {top}");
                    }
                }
                _ => stack.push(candidate),
            }
        }

        tracing::Span::current().record("merged", stack.len());
        stack
    }
}

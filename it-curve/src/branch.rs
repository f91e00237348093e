use crate::{
    error::{CurveError, CurveResult},
    plateau::Plateau,
};
use serde::Serialize;
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    /// From the first plateau up to the warmest one.
    #[default]
    Rising,
    /// From the warmest plateau to the last one.
    Falling,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Branch {
    pub kind: BranchKind,
    pub plateaus: Vec<Plateau>,
}

/// The two halves of a temperature scan, sharing the warmest plateau.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BranchSplit {
    pub rising: Branch,
    pub falling: Branch,
}

impl BranchSplit {
    pub fn branch(&self, kind: BranchKind) -> &Branch {
        match kind {
            BranchKind::Rising => &self.rising,
            BranchKind::Falling => &self.falling,
        }
    }

    /// The plateau with the maximal mean.
    pub fn peak(&self) -> Option<&Plateau> {
        self.falling.plateaus.first()
    }
}

/// Splits time-ordered plateaus at the first occurrence of the maximal mean.
pub fn split_branches(channel: &str, plateaus: &[Plateau]) -> CurveResult<BranchSplit> {
    let peak = plateaus
        .iter()
        .enumerate()
        .reduce(|best, next| if next.1.mean > best.1.mean { next } else { best })
        .map(|(index, _)| index)
        .ok_or_else(|| CurveError::NoPlateaus {
            channel: channel.to_owned(),
        })?;

    let (before, after) = plateaus.split_at(peak);
    let rising = before.iter().chain(after.first()).cloned().collect();
    Ok(BranchSplit {
        rising: Branch {
            kind: BranchKind::Rising,
            plateaus: rising,
        },
        falling: Branch {
            kind: BranchKind::Falling,
            plateaus: after.to_vec(),
        },
    })
}

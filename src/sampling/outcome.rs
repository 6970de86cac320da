use super::*;
use crate::Failure;

/// What happened to one spatial unit.
#[derive(Debug)]
pub enum Outcome {
    /// Fewer usable images than the minimum; nothing was embedded or clustered.
    Unusable { candidates: usize },
    /// Embedding failed under the strict policy; the unit contributes nothing.
    Failed { failure: Failure },
    /// One representative per non-empty cluster, in ascending cluster order.
    /// `clamped` is set when k had to shrink to the candidate count.
    Sampled {
        samples: Vec<RepresentativeSample>,
        clamped: bool,
    },
}

impl Outcome {
    /// Representatives produced, empty for every skip path.
    pub fn samples(&self) -> &[RepresentativeSample] {
        match self {
            Self::Sampled { samples, .. } => samples.as_slice(),
            _ => &[],
        }
    }
    pub fn is_sampled(&self) -> bool {
        matches!(self, Self::Sampled { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unusable { candidates } => write!(f, "unusable ({} candidates)", candidates),
            Self::Failed { failure } => write!(f, "failed ({})", failure),
            Self::Sampled { samples, clamped: false } => write!(f, "sampled {}", samples.len()),
            Self::Sampled { samples, clamped: true } => {
                write!(f, "sampled {} (k clamped)", samples.len())
            }
        }
    }
}

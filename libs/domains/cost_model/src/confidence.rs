use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ts_rs::TS;
use utoipa::ToSchema;

/// Ordered confidence level: `Low < Medium < High`.
///
/// Propagation across a set of sources always takes the minimum, per spec
/// property 9 (`overall_confidence = min(per-resource confidences)`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
    TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Minimum confidence across a non-empty set of sources. An empty set has
    /// no sources to be confident about and is treated as `Low`.
    pub fn min_of(levels: impl IntoIterator<Item = Confidence>) -> Confidence {
        levels.into_iter().min().unwrap_or(Confidence::Low)
    }

    pub fn min(self, other: Confidence) -> Confidence {
        std::cmp::min(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_low_medium_high() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn min_of_picks_lowest() {
        let levels = [Confidence::High, Confidence::Medium, Confidence::High];
        assert_eq!(Confidence::min_of(levels), Confidence::Medium);
    }

    #[test]
    fn min_of_empty_is_low() {
        assert_eq!(Confidence::min_of(std::iter::empty()), Confidence::Low);
    }
}

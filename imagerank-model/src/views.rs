use crate::error::ModelError;
use std::fmt;

/// Number of recorded detail views for one image.
///
/// Values returned by a view increment are always at least one; a never-viewed
/// image reads as [`ViewCount::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ViewCount(pub u64);

impl ViewCount {
    pub const ZERO: ViewCount = ViewCount(0);

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Converts the signed integer a store hands back, rejecting negatives.
    pub fn from_store(raw: i64) -> Result<Self, ModelError> {
        u64::try_from(raw).map(ViewCount).map_err(|_| {
            ModelError::InvalidCount(format!(
                "view counter cannot be negative (got {raw})"
            ))
        })
    }
}

impl From<u64> for ViewCount {
    fn from(value: u64) -> Self {
        ViewCount(value)
    }
}

impl fmt::Display for ViewCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_store_values_are_rejected() {
        assert_eq!(ViewCount::from_store(3).unwrap(), ViewCount(3));
        assert!(ViewCount::from_store(-1).is_err());
    }
}

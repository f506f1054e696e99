//! How many agents may share one grid cell.

/// Per-model cell capacity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapacityPolicy {
    /// At most one agent per cell.
    #[default]
    Exclusive,
    /// Any number of agents, or at most `max` when set.
    Shared { max: Option<usize> },
}

impl CapacityPolicy {
    /// Unlimited co-location.
    pub const UNLIMITED: CapacityPolicy = CapacityPolicy::Shared { max: None };

    /// Maximum occupants per cell, `None` for unlimited.
    #[inline]
    pub fn limit(self) -> Option<usize> {
        match self {
            CapacityPolicy::Exclusive => Some(1),
            CapacityPolicy::Shared { max } => max,
        }
    }

    /// Whether a cell currently holding `occupants` agents can take one more.
    #[inline]
    pub fn admits(self, occupants: usize) -> bool {
        self.limit().is_none_or(|max| occupants < max)
    }
}

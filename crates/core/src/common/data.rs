//! Memory access and cycle activity definitions.

use serde::{Deserialize, Serialize};

/// Direction of a memory reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Memory read.
    Load,
    /// Memory write.
    Store,
}

impl AccessType {
    /// Returns `true` for loads.
    #[inline]
    pub const fn is_load(self) -> bool {
        matches!(self, Self::Load)
    }
}

/// Activity of one memory cycle.
///
/// The discriminants are the row/column indices of the activity transition matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActivityState {
    /// No memory reference occurred in this cycle.
    #[default]
    Inactive = 0,
    /// A memory reference occurred in this cycle.
    Active = 1,
}

impl ActivityState {
    /// Index of this state in the transition matrix.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps a boolean activity flag to a state.
    #[inline]
    pub const fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// One synthesized memory reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessRecord {
    /// Cycle number at which the reference occurs (inactive cycles consume numbers too).
    pub cycle: u64,
    /// Load or store.
    pub kind: AccessType,
    /// Full byte address (block base OR word offset).
    pub address: u64,
}

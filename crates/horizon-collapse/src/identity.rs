//! Item identity and the tri-state expansion signal.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// The key a group uses to address one item.
///
/// Either an explicit name given to the item, or the item's ordinal position
/// in its group. Ordinals are represented as numbers, so an explicit numeric
/// name compares equal to the same ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    /// A numeric name, or an ordinal position.
    Number(i64),
    /// A textual name.
    Text(String),
}

impl Identity {
    /// The identity an unnamed item gets at ordinal `index`.
    pub fn from_index(index: usize) -> Self {
        Self::Number(index as i64)
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Identity {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// An opaque, process-unique handle for one item.
///
/// This is what an item hands to [`Registry::register`](crate::Registry::register)
/// so the registry can later report the item's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    /// Allocate a new key.
    pub fn next() -> Self {
        Self(NEXT_ITEM_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this key.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique item keys.
static NEXT_ITEM_KEY: AtomicU64 = AtomicU64::new(1);

/// Whether an item's group currently considers it expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expansion {
    /// No registry is attached, or no sample has been taken yet.
    #[default]
    Unknown,
    /// The group reports the item collapsed.
    Collapsed,
    /// The group reports the item expanded.
    Expanded,
}

impl Expansion {
    /// `true` only for [`Expansion::Expanded`].
    pub fn is_expanded(self) -> bool {
        self == Self::Expanded
    }

    /// `true` for [`Expansion::Unknown`].
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }

    /// The known boolean value, if any.
    pub fn known(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Collapsed => Some(false),
            Self::Expanded => Some(true),
        }
    }
}

impl From<bool> for Expansion {
    fn from(expanded: bool) -> Self {
        if expanded {
            Self::Expanded
        } else {
            Self::Collapsed
        }
    }
}

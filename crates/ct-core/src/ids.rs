//! Typed ids for households, persons and zones.
//!
//! Household and person ids come straight from the synthetic population files
//! and are *not* dense indices; use the store's position (`usize`) for
//! indexing and keep the ids for stream seeds and output.
//! Zone ids are 1-based as in the zonal data; `0` never names a zone.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Newtype over an id as it appears in the input files.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Placeholder for "not chosen yet".
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        /// Parses the bare number, as written in property lists.
        impl FromStr for $name {
            type Err = ParseIntError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map($name)
            }
        }
    };
}

typed_id! {
    /// Household id as read from the population file.  Also keys the
    /// household's random stream.
    pub struct HouseholdId(u32);
}

typed_id! {
    /// Person id, unique across the whole population.
    pub struct PersonId(u32);
}

typed_id! {
    /// Traffic analysis zone, 1-based.
    pub struct ZoneId(u32);
}

impl ZoneId {
    /// `true` for a real zone (neither `0` nor the sentinel).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0 && self != Self::INVALID
    }
}

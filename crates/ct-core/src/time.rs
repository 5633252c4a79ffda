//! The modeled day: whole hours from 05:00 through 23:00.
//!
//! Hour 5 collects everything departing before 06:00 and hour 23 everything
//! after 23:00, so the day has [`NUM_HOURS`] slots.  Time-of-day models
//! choose among (start hour, end hour) pairs with `start <= end`; the
//! standard set enumerates all 190 of them, ordered by start then end, which
//! is the alternative order the departure/duration equations are written in.

use std::fmt;

/// First modeled hour.
pub const FIRST_HOUR: u8 = 5;

/// Last modeled hour (inclusive).
pub const LAST_HOUR: u8 = 23;

/// Number of hour slots in a person's day.
pub const NUM_HOURS: usize = (LAST_HOUR - FIRST_HOUR + 1) as usize;

/// Slot index of `hour`, or `None` outside the modeled day.
#[inline]
pub fn hour_slot(hour: u8) -> Option<usize> {
    (FIRST_HOUR..=LAST_HOUR)
        .contains(&hour)
        .then(|| (hour - FIRST_HOUR) as usize)
}

// ── TodAlternatives ───────────────────────────────────────────────────────────

/// An ordered set of (start, end) hour alternatives offered to a
/// time-of-day choice.
///
/// Alternatives are 0-based here; utility pages number them from 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodAlternatives {
    starts: Vec<u8>,
    ends:   Vec<u8>,
}

impl TodAlternatives {
    /// All `start <= end` pairs over the modeled day (190 alternatives).
    pub fn standard() -> Self {
        let mut starts = Vec::with_capacity(NUM_HOURS * (NUM_HOURS + 1) / 2);
        let mut ends = Vec::with_capacity(starts.capacity());
        for start in FIRST_HOUR..=LAST_HOUR {
            for end in start..=LAST_HOUR {
                starts.push(start);
                ends.push(end);
            }
        }
        Self { starts, ends }
    }

    /// Build from explicit parallel vectors.  Pairs with `start > end` or
    /// hours outside the day are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let (starts, ends) = pairs
            .into_iter()
            .filter(|&(s, e)| s <= e && hour_slot(s).is_some() && hour_slot(e).is_some())
            .unzip();
        Self { starts, ends }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn starts(&self) -> &[u8] {
        &self.starts
    }

    pub fn ends(&self) -> &[u8] {
        &self.ends
    }

    /// `(start, end)` of alternative `alt`.
    #[inline]
    pub fn get(&self, alt: usize) -> Option<(u8, u8)> {
        Some((*self.starts.get(alt)?, *self.ends.get(alt)?))
    }

    /// Index of the `(start, end)` pair, if offered.
    pub fn index_of(&self, start: u8, end: u8) -> Option<usize> {
        self.starts
            .iter()
            .zip(&self.ends)
            .position(|(&s, &e)| s == start && e == end)
    }
}

impl Default for TodAlternatives {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for TodAlternatives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} departure/duration alternatives", self.len())
    }
}

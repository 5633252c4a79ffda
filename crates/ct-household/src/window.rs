//! Per-person hour-slot schedule.
//!
//! # Slot states
//!
//! | State      | Meaning                                                      |
//! |------------|--------------------------------------------------------------|
//! | `Free`     | nothing scheduled                                            |
//! | `Middle`   | strictly inside a tour; never shared                         |
//! | `Start`    | first hour of a tour                                         |
//! | `End`      | last hour of a tour                                          |
//! | `Boundary` | end of one tour and start of the next, or a one-hour tour    |
//!
//! Two tours may share a boundary hour (one arrives home, the next leaves in
//! the same hour) but their interior hours never overlap.  That is the only
//! kind of sharing [`TimeWindow::is_available`] admits; the one way to get
//! overlapping interiors is the no-window fallback in the time-of-day models,
//! which claims whatever the draw picked.

use ct_core::{FIRST_HOUR, LAST_HOUR, NUM_HOURS, TodAlternatives, hour_slot};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Slot {
    #[default]
    Free     = 0,
    Middle   = 1,
    Start    = 2,
    End      = 3,
    Boundary = 4,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    slots: [Slot; NUM_HOURS],
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self { slots: [Slot::Free; NUM_HOURS] }
    }
}

impl TimeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free every slot.
    pub fn reset_all(&mut self) {
        self.slots = [Slot::Free; NUM_HOURS];
    }

    /// A window where only `start..=end` is open, every other hour sits
    /// inside a tour.  At-work subtours are scheduled against one of these.
    pub fn within(start: u8, end: u8) -> Self {
        let mut slots = [Slot::Middle; NUM_HOURS];
        for h in start.max(FIRST_HOUR)..=end.min(LAST_HOUR) {
            if let Some(i) = hour_slot(h) {
                slots[i] = Slot::Free;
            }
        }
        Self { slots }
    }

    /// Free the slots `start..=end`, clamped to the modeled day.
    pub fn reset(&mut self, start: u8, end: u8) {
        for h in start.max(FIRST_HOUR)..=end.min(LAST_HOUR) {
            if let Some(i) = hour_slot(h) {
                self.slots[i] = Slot::Free;
            }
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// `None` outside the modeled day.
    pub fn get(&self, hour: u8) -> Option<Slot> {
        hour_slot(hour).map(|i| self.slots[i])
    }

    /// Mark `start..=end` as used by a tour.  Returns `false`, leaving the
    /// window untouched, when the pair is not a tour within the modeled day.
    pub fn claim(&mut self, start: u8, end: u8) -> bool {
        let (Some(s), Some(e)) = (hour_slot(start), hour_slot(end)) else {
            return false;
        };
        if s > e {
            return false;
        }
        if s == e {
            self.slots[s] = Slot::Boundary;
        } else {
            self.slots[s] = match self.slots[s] {
                Slot::End  => Slot::Boundary,
                Slot::Free => Slot::Start,
                other      => other,
            };
            self.slots[e] = match self.slots[e] {
                Slot::Start => Slot::Boundary,
                Slot::Free  => Slot::End,
                other       => other,
            };
        }
        for h in s + 1..e {
            self.slots[h] = Slot::Middle;
        }
        true
    }

    /// Can a tour run from `start` to `end` without overlapping the interior
    /// of anything already scheduled?  Never for hours outside the day.
    pub fn is_available(&self, start: u8, end: u8) -> bool {
        let (Some(s), Some(e)) = (hour_slot(start), hour_slot(end)) else {
            return false;
        };
        if s > e {
            return false;
        }
        match self.slots[s] {
            Slot::Middle => return false,
            Slot::Start if s != e => return false,
            _ => {}
        }
        match self.slots[e] {
            Slot::Middle => return false,
            Slot::End if s != e => return false,
            _ => {}
        }
        self.slots[s + 1..e.max(s + 1)].iter().all(|&x| x == Slot::Free)
    }

    /// Availability of every alternative in `alts`, in order.
    pub fn availability(&self, alts: &TodAlternatives) -> Vec<bool> {
        alts.starts()
            .iter()
            .zip(alts.ends())
            .map(|(&s, &e)| self.is_available(s, e))
            .collect()
    }

    /// `true` if `hour` is where an earlier tour ends.
    pub fn is_previous_arrival(&self, hour: u8) -> bool {
        matches!(self.get(hour), Some(Slot::End | Slot::Boundary))
    }

    /// `true` if `hour` is where an earlier tour starts.
    pub fn is_previous_departure(&self, hour: u8) -> bool {
        matches!(self.get(hour), Some(Slot::Start | Slot::Boundary))
    }

    /// Anything but the middle of a tour can still host an activity.
    pub fn is_hour_available(&self, hour: u8) -> bool {
        self.get(hour).is_some_and(|s| s != Slot::Middle)
    }

    /// Count of hours not inside a tour.
    pub fn available_hours(&self) -> usize {
        self.slots.iter().filter(|&&x| x != Slot::Middle).count()
    }

    /// Hours available to both `self` and `other`.
    pub fn overlap_hours(&self, other: &TimeWindow) -> usize {
        self.slots
            .iter()
            .zip(&other.slots)
            .filter(|&(&a, &b)| a != Slot::Middle && b != Slot::Middle)
            .count()
    }
}

// ── Residual windows ──────────────────────────────────────────────────────────

/// Free hours around a person's mandatory and joint tours, consumed by the
/// non-mandatory frequency model.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ResidualWindows {
    pub before_first: u8,
    pub between:      u8,
    pub after_last:   u8,
}

impl ResidualWindows {
    /// Compute from `(start, end)` pairs of the tours already scheduled.
    ///
    /// The first tour's start hour and the last tour's end hour count as
    /// available (a tour can leave or arrive in them).  With no tours every
    /// window is the whole day.
    pub fn compute(window: &TimeWindow, tours: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let mut first: Option<(u8, u8)> = None;
        let mut last: Option<(u8, u8)> = None;
        for (start, end) in tours {
            if first.is_none_or(|(fs, _)| start < fs) {
                first = Some((start, end));
            }
            if last.is_none_or(|(_, le)| end > le) {
                last = Some((start, end));
            }
        }
        match (first, last) {
            (Some((first_start, first_end)), Some((last_start, last_end))) => Self {
                before_first: first_start - FIRST_HOUR + 1,
                after_last:   LAST_HOUR - last_end + 1,
                between:      (first_end..=last_start)
                    .filter(|&h| window.is_hour_available(h))
                    .count() as u8,
            },
            _ => Self {
                before_first: NUM_HOURS as u8,
                between:      NUM_HOURS as u8,
                after_last:   NUM_HOURS as u8,
            },
        }
    }
}

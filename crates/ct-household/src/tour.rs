//! Tours and the stops on them.

use ct_core::{TourCategory, TourPurpose, ZoneId};

/// A zone plus its walk-access sub-zone.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Location {
    pub zone:    ZoneId,
    pub subzone: u8,
}

impl Location {
    pub fn new(zone: ZoneId, subzone: u8) -> Self {
        Self { zone, subzone }
    }
}

/// Who takes part in a joint tour.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum JointComposition {
    Adults,
    Children,
    Mixed,
}

/// One half-tour stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub purpose:      TourPurpose,
    pub inbound:      bool,
    pub origin:       ZoneId,
    /// Set by stop location choice.
    pub destination:  Option<ZoneId>,
    pub depart_hour:  u8,
    pub trip_mode:    Option<u8>,
    pub parking_zone: Option<ZoneId>,
}

impl Stop {
    pub fn new(purpose: TourPurpose, inbound: bool, origin: ZoneId, depart_hour: u8) -> Self {
        Self {
            purpose,
            inbound,
            origin,
            destination:  None,
            depart_hour,
            trip_mode:    None,
            parking_zone: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tour {
    /// Position within the owner's list for this category.
    pub id:           u16,
    pub category:     TourCategory,
    pub purpose:      TourPurpose,
    /// Person number of the tour maker; for joint tours the first participant.
    pub person_num:   u8,
    pub origin:       ZoneId,
    pub destination:  Option<Location>,
    /// `(start hour, end hour)` once time of day has been chosen.
    pub hours:        Option<(u8, u8)>,
    pub mode:         Option<u8>,
    /// Joint tours only.
    pub participants: Vec<u8>,
    pub composition:  Option<JointComposition>,
    /// At-work subtours only: index of the parent tour in the work tour list.
    pub parent_tour:  Option<u16>,
    pub outbound:     Vec<Stop>,
    pub inbound:      Vec<Stop>,
}

impl Tour {
    pub fn new(
        id:         u16,
        category:   TourCategory,
        purpose:    TourPurpose,
        person_num: u8,
        origin:     ZoneId,
    ) -> Self {
        Self {
            id,
            category,
            purpose,
            person_num,
            origin,
            destination:  None,
            hours:        None,
            mode:         None,
            participants: Vec::new(),
            composition:  None,
            parent_tour:  None,
            outbound:     Vec::new(),
            inbound:      Vec::new(),
        }
    }

    pub fn start_hour(&self) -> Option<u8> {
        self.hours.map(|(s, _)| s)
    }

    pub fn end_hour(&self) -> Option<u8> {
        self.hours.map(|(_, e)| e)
    }

    pub fn destination_zone(&self) -> Option<ZoneId> {
        self.destination.map(|l| l.zone)
    }

    pub fn has_participant(&self, person_num: u8) -> bool {
        self.participants.contains(&person_num)
    }

    /// Drop everything stop frequency and stop location produced.
    pub fn clear_stops(&mut self) {
        self.outbound.clear();
        self.inbound.clear();
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.outbound.iter().chain(&self.inbound)
    }
}

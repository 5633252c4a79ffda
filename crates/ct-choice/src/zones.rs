//! Zones, walk sub-zones and the destination alternative index.
//!
//! Destination choice alternatives enumerate every `(zone, sub-zone)` pair:
//! alternative `a` (0-based) is zone `a / S + 1`, sub-zone `a % S`, where
//! `S` is the number of sub-zones per zone.

use ct_core::ZoneId;
use ct_household::Location;
use rustc_hash::FxHashSet;

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneSystem {
    num_zones:     u32,
    num_subzones:  u8,
    parking_zones: FxHashSet<ZoneId>,
}

impl ZoneSystem {
    /// Zones are numbered `1..=num_zones`.  `num_subzones` is at least 1.
    pub fn new(num_zones: u32, num_subzones: u8) -> Self {
        Self {
            num_zones,
            num_subzones:  num_subzones.max(1),
            parking_zones: FxHashSet::default(),
        }
    }

    /// Zones where an auto trip must choose a parking location.
    pub fn with_parking_zones(mut self, zones: impl IntoIterator<Item = ZoneId>) -> Self {
        self.parking_zones = zones.into_iter().filter(|z| self.contains(*z)).collect();
        self
    }

    pub fn num_zones(&self) -> u32 {
        self.num_zones
    }

    pub fn num_subzones(&self) -> u8 {
        self.num_subzones
    }

    /// Size of the destination choice set.
    pub fn num_alternatives(&self) -> usize {
        self.num_zones as usize * self.num_subzones as usize
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        zone.is_valid() && zone.0 <= self.num_zones
    }

    pub fn zones(&self) -> impl Iterator<Item = ZoneId> {
        (1..=self.num_zones).map(ZoneId)
    }

    pub fn alternative(&self, location: Location) -> Option<usize> {
        if !self.contains(location.zone) || location.subzone >= self.num_subzones {
            return None;
        }
        Some((location.zone.0 as usize - 1) * self.num_subzones as usize + location.subzone as usize)
    }

    pub fn location(&self, alt: usize) -> Option<Location> {
        if alt >= self.num_alternatives() {
            return None;
        }
        let s = self.num_subzones as usize;
        Some(Location::new(ZoneId((alt / s) as u32 + 1), (alt % s) as u8))
    }

    pub fn is_parking_zone(&self, zone: ZoneId) -> bool {
        self.parking_zones.contains(&zone)
    }

    /// Parking zones in ascending order.
    pub fn parking_zones(&self) -> Vec<ZoneId> {
        let mut zones: Vec<ZoneId> = self.parking_zones.iter().copied().collect();
        zones.sort_unstable();
        zones
    }
}

//! Splitting the household store into packets.

use std::fmt;
use std::ops::Range;

use ct_household::HouseholdStore;
use log::info;

use crate::{ExecConfig, ExecError, ExecResult};

/// Half-open `[start, end)` range of household store indices.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Packet {
    pub start: usize,
    pub end:   usize,
}

impl Packet {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Contiguous packets covering `[0, total)`.
///
/// Packets hold `packet_size` households except the last, which absorbs
/// the remainder whenever fewer than `packet_size - 1` households would be
/// left after it.  A size of zero gives one packet.
///
/// ```text
/// partition(20, 7)  →  [0,7) [7,14) [14,20)
/// partition(15, 7)  →  [0,7) [7,15)
/// ```
pub fn partition(total: usize, packet_size: usize) -> Vec<Packet> {
    partition_from(0, total, packet_size)
}

fn partition_from(mut start: usize, total: usize, packet_size: usize) -> Vec<Packet> {
    if start >= total {
        return Vec::new();
    }
    if packet_size == 0 {
        return vec![Packet::new(start, total)];
    }
    let mut packets = Vec::new();
    while start < total {
        let mut end = start + packet_size;
        if end >= total || end + packet_size > total + 1 {
            end = total;
        }
        packets.push(Packet::new(start, end));
        start = end;
    }
    packets
}

// ── PartitionPlan ─────────────────────────────────────────────────────────────

/// Packets for one pass over the store, in submission order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PartitionPlan {
    packets:        Vec<Packet>,
    initialization: usize,
}

impl PartitionPlan {
    /// Plan a pass over `store`.
    ///
    /// `Run.This.Household.Only` gives a single one-household packet.
    /// Otherwise, when they do not already cover the whole store,
    /// `Num.Initialization.Packets` small packets of
    /// `Initialization.Packet.Size` households go first (they warm up one
    /// worker each before the big packets arrive), then regular packets.
    pub fn new(store: &HouseholdStore, config: &ExecConfig) -> ExecResult<Self> {
        let total = store.len();
        if let Some(id) = config.only_household {
            let index = store.position(id).ok_or_else(|| {
                ExecError::Config(format!("{} of {} is not in the household store", id, ExecConfig::ONLY_HOUSEHOLD_KEY))
            })?;
            info!("running household {id} (index {index}) only");
            return Ok(Self { packets: vec![Packet::new(index, index + 1)], initialization: 0 });
        }

        let init_total = config.init_packets * config.init_packet_size;
        let mut packets = Vec::new();
        let mut start = 0;
        if init_total > 0 && init_total < total {
            for _ in 0..config.init_packets {
                packets.push(Packet::new(start, start + config.init_packet_size));
                start += config.init_packet_size;
            }
        }
        let initialization = packets.len();
        packets.extend(partition_from(start, total, config.packet_size));
        Ok(Self { packets, initialization })
    }

    /// A plan over exactly these packets.
    pub fn from_packets(packets: Vec<Packet>) -> Self {
        Self { packets, initialization: 0 }
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.packets.iter().map(Packet::range).collect()
    }

    /// Count of leading initialization packets.
    pub fn initialization_packets(&self) -> usize {
        self.initialization
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn households(&self) -> usize {
        self.packets.iter().map(Packet::len).sum()
    }
}

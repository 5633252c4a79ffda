//! Execution settings.

use ct_core::{HouseholdId, PropertyMap};
use serde::{Deserialize, Serialize};

use crate::{ExecError, ExecResult};

/// Which executor runs the packets.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// A thread pool in this process, working on the store in place.
    #[default]
    Local,
    /// Worker threads fed packet messages through a task queue; households
    /// travel to the worker and back.
    Distributed,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    pub strategy:         Strategy,
    /// Households per regular packet; 0 means one packet for everything.
    pub packet_size:      usize,
    /// Worker count; 0 means one per available core.
    pub num_threads:      usize,
    pub init_packets:     usize,
    pub init_packet_size: usize,
    pub only_household:   Option<HouseholdId>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            strategy:         Strategy::Local,
            packet_size:      1000,
            num_threads:      0,
            init_packets:     0,
            init_packet_size: 0,
            only_household:   None,
        }
    }
}

impl ExecConfig {
    pub const STRATEGY_KEY:         &'static str = "Execution.Strategy";
    pub const PACKET_SIZE_KEY:      &'static str = "Packet.Size";
    pub const NUM_THREADS_KEY:      &'static str = "Num.Threads";
    pub const INIT_PACKETS_KEY:     &'static str = "Num.Initialization.Packets";
    pub const INIT_PACKET_SIZE_KEY: &'static str = "Initialization.Packet.Size";
    pub const ONLY_HOUSEHOLD_KEY:   &'static str = "Run.This.Household.Only";

    pub fn from_properties(props: &PropertyMap) -> ExecResult<Self> {
        let d = Self::default();
        let strategy = match props.get(Self::STRATEGY_KEY).map(str::trim) {
            None | Some("") => d.strategy,
            Some(s) if s.eq_ignore_ascii_case("local") => Strategy::Local,
            Some(s) if s.eq_ignore_ascii_case("distributed") => Strategy::Distributed,
            Some(other) => {
                return Err(ExecError::Config(format!(
                    "{} must be `local` or `distributed`, got {other:?}",
                    Self::STRATEGY_KEY
                )));
            }
        };
        // Any negative id means "all households".
        let only = props.get_f64(Self::ONLY_HOUSEHOLD_KEY, -1.0)?;
        Ok(Self {
            strategy,
            packet_size:      props.get_usize(Self::PACKET_SIZE_KEY, d.packet_size)?,
            num_threads:      props.get_usize(Self::NUM_THREADS_KEY, d.num_threads)?,
            init_packets:     props.get_usize(Self::INIT_PACKETS_KEY, d.init_packets)?,
            init_packet_size: props.get_usize(Self::INIT_PACKET_SIZE_KEY, d.init_packet_size)?,
            only_household:   (only >= 0.0).then(|| HouseholdId(only as u32)),
        })
    }

    /// `num_threads`, with 0 resolved to the machine's parallelism.
    pub fn worker_count(&self) -> usize {
        if self.num_threads > 0 {
            return self.num_threads;
        }
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }
}

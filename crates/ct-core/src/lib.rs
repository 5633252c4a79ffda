//! `ct-core` — foundational types for the household choice-model runner.
//!
//! Every other `ct-*` crate depends on this one.  It has no `ct-*`
//! dependencies and only `rand`, `thiserror` and `log` externally (plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`ids`]       | `HouseholdId`, `PersonId`, `ZoneId`                          |
//! | [`rng`]       | `RandomStreamManager`, `RandomStream` (counted, rewindable)  |
//! | [`time`]      | modeled hours, `TodAlternatives`                             |
//! | [`purpose`]   | `PersonType`, `TourCategory`, `TourPurpose`, `DcPurpose`     |
//! | [`stage`]     | `Stage` (pipeline order, run flags), `Checkpoints`           |
//! | [`config`]    | `PropertyMap`                                                |
//! | [`error`]     | `CoreError`, `CoreResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, purposes and stages;  |
//! |         | required by `ct-shadow` snapshots.                           |

pub mod config;
pub mod error;
pub mod ids;
pub mod purpose;
pub mod rng;
pub mod stage;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PropertyMap;
pub use error::{CoreError, CoreResult};
pub use ids::{HouseholdId, PersonId, ZoneId};
pub use purpose::{DcPurpose, PersonType, TourCategory, TourPurpose, income_segment};
pub use rng::{RandomStream, RandomStreamManager};
pub use stage::{Checkpoints, Stage};
pub use time::{FIRST_HOUR, LAST_HOUR, NUM_HOURS, TodAlternatives, hour_slot};

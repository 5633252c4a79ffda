//! `ct-shadow` — shadow pricing of usual work and school locations.
//!
//! ```text
//! origins ─► ShadowPriceTable::balance ─► sizes
//!                                          │
//!     ┌────────────────────────────────────┘
//!     ▼
//!   pass (usual location only) ─► LocationTally per packet ─► merge
//!     ─► MaxDiffReport ─► update prices ─► sizes ─► <stem>_<iter>.csv/.json
//! ```
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`config`]  | `ShadowConfig`                                        |
//! | [`tally`]   | `LocationTally`                                       |
//! | [`table`]   | `ShadowPriceTable`, `PurposePrices`                   |
//! | [`report`]  | `MaxDiffReport`, difference buckets, per-purpose max  |
//! | [`persist`] | per-iteration CSV and JSON files, restore             |
//! | [`solver`]  | `ShadowPriceSolver`, `IterationOutcome`               |
//! | [`error`]   | `ShadowError`, `ShadowResult<T>`                      |

pub mod config;
pub mod error;
pub mod persist;
pub mod report;
pub mod solver;
pub mod table;
pub mod tally;

#[cfg(test)]
mod tests;

pub use config::ShadowConfig;
pub use error::{ShadowError, ShadowResult};
pub use persist::{ShadowSnapshot, iteration_from_path, iteration_path};
pub use report::{DELTA_LIMITS, Frequencies, MaxDiffReport, PurposeDiff, RangeReport, SIZE_LIMITS};
pub use solver::{IterationOutcome, ShadowPriceSolver};
pub use table::{PurposePrices, ShadowPriceTable};
pub use tally::LocationTally;

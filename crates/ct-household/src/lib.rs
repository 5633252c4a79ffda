//! `ct-household` — household state for the choice-model runner.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`household`] | `Household`, `TourKey`, `WindowSummary`                    |
//! | [`person`]    | `Person`, `ActivityPattern`                                |
//! | [`tour`]      | `Tour`, `Stop`, `Location`, `JointComposition`             |
//! | [`window`]    | `TimeWindow` (per-person hour slots), `ResidualWindows`    |
//! | [`store`]     | `HouseholdStore` with disjoint per-packet slices           |
//! | [`loader`]    | CSV population loader                                      |
//! | [`error`]     | `HouseholdError`, `HouseholdResult<T>`                     |
//!
//! # Ownership
//!
//! A household owns its persons and its joint tours; a person owns its
//! individual tours.  Persons refer back to their household by id only.
//! During a pass each household is borrowed mutably by exactly one worker.

pub mod error;
pub mod household;
pub mod loader;
pub mod person;
pub mod store;
pub mod tour;
pub mod window;


pub use error::{HouseholdError, HouseholdResult};
pub use household::{Household, TourKey, WindowSummary};
pub use loader::{load_population_csv, load_population_reader};
pub use person::{ActivityPattern, Person};
pub use store::HouseholdStore;
pub use tour::{JointComposition, Location, Stop, Tour};
pub use window::{ResidualWindows, Slot, TimeWindow};

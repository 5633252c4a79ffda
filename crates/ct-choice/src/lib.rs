//! `ct-choice` — discrete-choice sub-models for one household at a time.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                       |
//! |-----------------|----------------------------------------------------------------|
//! | [`engine`]      | `UtilityEngine` trait, `ModelPage`, `TableEngine`              |
//! | [`dmu`]         | `Dmu<'a>` decision-making unit, `TourContext`                  |
//! | [`logit`]       | `LogitChoice` — probabilities, logsum, Monte Carlo choice      |
//! | [`zones`]       | `ZoneSystem` and the (zone, sub-zone) alternative index        |
//! | [`size`]        | `SizeTerms` per destination purpose                            |
//! | [`sample`]      | sample of alternatives, `SoaCache`                             |
//! | [`diagnostics`] | `Diagnostics` counters merged per pass                         |
//! | [`context`]     | `ModelInputs`, `ChoiceSettings`, `ChoiceContext<'a>`           |
//! | [`model`]       | `ChoiceSubModel` trait                                         |
//! | [`models`]      | the 21 concrete sub-models and [`sub_model`]                   |
//! | [`error`]       | `ChoiceError`, `ChoiceResult<T>`                               |
//!
//! # Design notes
//!
//! Sub-models are stateless and shared by all workers.  Per-worker mutable
//! state (the engine instance, the sample-of-alternatives cache, the
//! diagnostic counters) is handed in through [`ChoiceContext`]; pass-wide
//! read-only data through [`ModelInputs`].  The only per-household state is
//! the household itself, including its random stream, so a household's
//! results never depend on which worker ran it.

pub mod context;
pub mod diagnostics;
pub mod dmu;
pub mod engine;
pub mod error;
pub mod logit;
pub mod model;
pub mod models;
pub mod sample;
pub mod size;
pub mod zones;


pub use context::{ChoiceContext, ChoiceSettings, ModelInputs};
pub use diagnostics::{Diagnostics, JointIneligible};
pub use dmu::{Dmu, TourContext};
pub use engine::{ModelPage, TableEngine, UtilityEngine};
pub use error::{ChoiceError, ChoiceResult};
pub use logit::LogitChoice;
pub use model::ChoiceSubModel;
pub use models::sub_model;
pub use models::time_of_day::no_window_fallback;
pub use sample::{DestinationSample, SoaCache, SoaProbabilities};
pub use size::SizeTerms;
pub use zones::ZoneSystem;

//! `ct-pipeline` — sequencing the household sub-models.
//!
//! ```text
//! for household in packet:
//!   ① Restart  — (only with a restart point) clear results from the point
//!                on, rebuild windows, rewind the random stream.
//!   ② Stages   — ao, fp, cdap, imtf, imtod, immc, jtf, jtl, jtod, jmc,
//!                inmtf, inmtl, inmtod, inmmc, awf, awl, awtod, awmc, stf,
//!                stl; each only if its run flag is on.
//!   ③ Record   — the stream's draw count after every stage.
//! ```
//!
//! | Module           | Contents                                            |
//! |------------------|-----------------------------------------------------|
//! | [`flags`]        | `RunFlags` and prerequisite validation              |
//! | [`restart`]      | `RestartPoint`, the `Restart.From` property         |
//! | [`orchestrator`] | `PipelineOrchestrator`, `PipelineBuilder`           |
//! | [`observer`]     | `PipelineObserver`, `NoopObserver`, `StageTimings`  |
//! | [`error`]        | `PipelineError`, `PipelineResult<T>`                |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let pipeline = PipelineBuilder::new(RunFlags::from_properties(&props)?)
//!     .restart(RestartPoint::from_properties(&props)?)
//!     .build()?;
//! pipeline.apply(&mut household, &mut cx, &mut NoopObserver)?;
//! ```

pub mod error;
pub mod flags;
pub mod observer;
pub mod orchestrator;
pub mod restart;

#[cfg(test)]
mod tests;

pub use error::{PipelineError, PipelineResult};
pub use flags::RunFlags;
pub use observer::{NoopObserver, PipelineObserver, StageTimings};
pub use orchestrator::{PipelineBuilder, PipelineOrchestrator};
pub use restart::{RESTART_KEY, RESTART_STAGES, RestartPoint};

//! `ct-exec` — running the household pipeline over the whole store.
//!
//! ```text
//! HouseholdStore ──PartitionPlan──► [init packets][packet][packet]…
//!                                          │
//!                   ┌──────────────────────┴─────────────────────┐
//!             LocalExecutor                           DistributedExecutor
//!         (thread pool, in place)            (task queue, households travel)
//!                   └──────────────────────┬─────────────────────┘
//!                                          ▼
//!            WorkerContext: engine + SOA cache, reused across packets
//! ```
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`partition`]   | `Packet`, `partition`, `PartitionPlan`                   |
//! | [`config`]      | `ExecConfig`, `Strategy`                                 |
//! | [`worker`]      | `EngineFactory`, `PassJob`, `WorkerContext`, `PassReport`|
//! | [`executor`]    | `Executor` trait, `PassOutput`, `AnyExecutor`            |
//! | [`local`]       | `LocalExecutor`                                          |
//! | [`distributed`] | `DistributedExecutor`                                    |
//! | [`error`]       | `ExecError`, `ExecResult<T>`                             |
//!
//! # Feature flags
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | *(default)* `LocalExecutor` runs packets on a Rayon pool   |

pub mod config;
pub mod distributed;
pub mod error;
pub mod executor;
pub mod local;
pub mod partition;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{ExecConfig, Strategy};
pub use distributed::DistributedExecutor;
pub use error::{ExecError, ExecResult};
pub use executor::{AnyExecutor, Executor, PassOutput};
pub use local::LocalExecutor;
pub use partition::{Packet, PartitionPlan, partition};
pub use worker::{EngineFactory, PassJob, PassReport, SharedEngineFactory, WorkerContext};

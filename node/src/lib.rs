//! The distributed driver of the colony: bootstrap, collectives and the
//! per-process worker runtime.

pub mod bootstrap;
pub mod collective;
pub mod error;
mod local;
pub mod plan;
pub mod worker;

pub use bootstrap::Enrollment;
pub use collective::{Collective, Hub, Spoke};
pub use error::{NodeErr, Result};
pub use local::launch_local;
pub use plan::RunPlan;
pub use worker::{RoundReport, RunSummary, Worker};

//! The backend dispatcher: provider registry, unified device
//! namespace, auto-selection policies, and concurrent job tracking.
//!
//! This crate owns no algorithmic logic of its own — circuits come from
//! `qcore-ir`, simulation and math kernels from `qcore-sim`/`qcore-kernels`,
//! and device access from `qcore-hal`'s `Provider` implementations. What
//! lives here is purely the orchestration layer: one entry point
//! (`Dispatcher`) through which every provider is
//! registered, every device discovered, and every job submitted, polled,
//! awaited, and cancelled.

pub mod dispatcher;
pub mod job;
pub mod policy;

pub use dispatcher::{BenchmarkRun, Dispatcher, MAX_INFLIGHT_JOBS};
pub use job::{Job, JobState};
pub use policy::{auto_select, Policy};

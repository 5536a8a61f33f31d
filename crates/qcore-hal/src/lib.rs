//! Hardware abstraction layer for the quantum execution core.
//!
//! This crate defines the [`Provider`] contract every backend —
//! in-process simulator, cloud-hosted simulator, real QPU — implements, and
//! the supporting types ([`DeviceInfo`], [`ProviderState`], [`JobHandle`],
//! [`NativeCircuit`]) that cross the boundary between a provider and the
//! dispatcher in `qcore-sched`. It defines no provider implementations of
//! its own — those live in `qcore-adapter-sim` and `qcore-adapter-remote`.
//!
//! # Implementing a provider
//!
//! ```ignore
//! use qcore_hal::{Provider, DeviceInfo, Credentials, JobHandle, JobResult, JobState, NativeCircuit};
//! use qcore_ir::Circuit;
//! use qcore_types::{CoreResult, DeviceName};
//!
//! struct MyProvider;
//!
//! impl Provider for MyProvider {
//!     fn tag(&self) -> &str { "my-provider" }
//!     fn initialize(&mut self, credentials: Credentials) -> CoreResult<()> { Ok(()) }
//!     fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> { Ok(vec![]) }
//!     fn submit(&self, device: &DeviceName, circuit: &Circuit, shots: u32) -> CoreResult<JobHandle> {
//!         todo!()
//!     }
//!     fn poll(&self, handle: &JobHandle) -> CoreResult<(JobState, Option<JobResult>)> { todo!() }
//!     fn cancel(&self, handle: &JobHandle) -> CoreResult<bool> { Ok(false) }
//!     fn translate(&self, circuit: &Circuit, device: &DeviceInfo) -> CoreResult<NativeCircuit> { todo!() }
//! }
//! ```

pub mod capability;
pub mod device;
pub mod job;
pub mod provider;
pub mod registry;

pub use capability::{transmon_native_gate_set, universal_gate_set};
pub use device::{Credentials, DeviceInfo, DeviceKind, ProviderState};
pub use job::{JobHandle, JobResult, JobState};
pub use provider::{NativeCircuit, Provider};
pub use registry::ProviderRegistry;

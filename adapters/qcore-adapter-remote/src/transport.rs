//! The wire-level seam a `RemoteProvider` talks through.
//!
//! Splitting transport out from the `Provider` impl is what lets
//! `RemoteProvider` serve both `RemoteSimulator` and `RemoteHardware`
//! devices with one implementation, and lets tests exercise the retry and
//! error-mapping logic without a real network call.

use qcore_types::{CoreResult, DeviceName};
use serde::{Deserialize, Serialize};

use qcore_hal::{DeviceKind, JobResult, JobState};

/// One device as reported by a remote service's device-listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDevice {
    pub name: String,
    pub kind: RemoteDeviceKind,
    pub qubits: u32,
    pub operational: bool,
    pub pending_jobs: u32,
    pub description: String,
    pub features: Vec<String>,
}

/// Wire representation of [`DeviceKind`], excluding `LocalSimulator` — no
/// remote service ever reports that kind (it's `LocalSimulator` that's
/// always in-process).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RemoteDeviceKind {
    Simulator,
    Hardware,
}

impl From<RemoteDeviceKind> for DeviceKind {
    fn from(kind: RemoteDeviceKind) -> Self {
        match kind {
            RemoteDeviceKind::Simulator => DeviceKind::RemoteSimulator,
            RemoteDeviceKind::Hardware => DeviceKind::Hardware,
        }
    }
}

/// The outcome of a remote status query for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStatus {
    pub state: JobState,
    pub result: Option<JobResult>,
}

/// The transport a [`crate::provider::RemoteProvider`] is generic over.
/// Implemented by `HttpTransport` for real services and by an in-memory
/// double in tests.
pub trait RemoteTransport: Send + Sync {
    /// List devices this remote service currently exposes.
    fn list_devices(&self) -> CoreResult<Vec<RemoteDevice>>;

    /// Submit `circuit_payload` (the provider's serialised native circuit)
    /// to `device` for `shots` shots. Returns a remote-assigned job id.
    fn submit_job(&self, device: &DeviceName, circuit_payload: &[u8], shots: u32) -> CoreResult<String>;

    /// Query a previously submitted job's state. Never mutates remote state.
    fn job_status(&self, remote_job_id: &str) -> CoreResult<RemoteStatus>;

    /// Request cancellation; `true` if it took effect before completion.
    fn cancel_job(&self, remote_job_id: &str) -> CoreResult<bool>;
}

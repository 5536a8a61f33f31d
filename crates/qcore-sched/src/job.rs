//! The dispatcher's job record (`Job`, `JobState`).

use std::sync::Arc;
use std::time::Instant;

use qcore_hal::{JobHandle, JobResult};
pub use qcore_hal::JobState;
use qcore_ir::Circuit;
use qcore_types::{DeviceName, ErrorKind, JobId};

/// A job as tracked by the dispatcher, from submission through a terminal
/// state. Distinct from `qcore_hal::JobHandle`, which is the opaque
/// provider-side ticket a `Job` wraps once its worker has called
/// `Provider::submit`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Monotonically increasing submission order, independent of `id`
    /// (a `Uuid` has no inherent ordering).
    pub sequence: u64,
    pub circuit: Arc<Circuit>,
    pub device: DeviceName,
    pub shots: u32,
    pub state: JobState,
    /// Set once the worker handling this job has called `Provider::submit`.
    /// `None` while `state` is `Pending`/`Queued` and briefly during
    /// `Running` before the provider acknowledges the submission.
    pub provider_handle: Option<JobHandle>,
    pub submitted_at: Instant,
    pub finished_at: Option<Instant>,
    pub result: Option<JobResult>,
    pub error: Option<ErrorKind>,
}

impl Job {
    pub fn new(id: JobId, sequence: u64, circuit: Arc<Circuit>, device: DeviceName, shots: u32) -> Self {
        Self {
            id,
            sequence,
            circuit,
            device,
            shots,
            state: JobState::Pending,
            provider_handle: None,
            submitted_at: Instant::now(),
            finished_at: None,
            result: None,
            error: None,
        }
    }
}

//! The provider contract: one capability set every backend — local
//! simulator, remote simulator, remote hardware — is implemented against.
//!
//! This trait is synchronous: the dispatcher's concurrency model rests on
//! `std::thread` plus a locked job table, not an async runtime, so a
//! provider call is just a blocking function call made from one of the
//! dispatcher's worker threads.

use qcore_ir::Circuit;
use qcore_types::{CoreResult, DeviceName};

use crate::device::{Credentials, DeviceInfo};
use crate::job::{JobHandle, JobResult, JobState};

/// A provider-native encoding of a circuit, produced by `translate`. Its
/// contents are opaque to the dispatcher — only the owning provider's
/// `submit` ever interprets the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeCircuit(pub Vec<u8>);

/// The capability set every quantum backend — local, remote-simulated, or
/// real hardware — implements.
///
/// Contract rules callers may rely on:
/// - `initialize` is idempotent; calling it again with new credentials
///   re-initialises rather than erroring.
/// - `submit` is non-blocking: it acknowledges the job without waiting for
///   results.
/// - `poll` is pure observation and must never mutate server-side state.
/// - `cancel` is best-effort; its `bool` reports whether cancellation beat
///   completion.
/// - `translate` validates the circuit against the device's capability set
///   and fails with `UnsupportedGate` before any remote call is made.
pub trait Provider: Send + Sync {
    /// A short, stable identifier for this provider family (e.g. `"local"`).
    fn tag(&self) -> &str;

    /// (Re-)initialise with the given credentials. Idempotent.
    fn initialize(&mut self, credentials: Credentials) -> CoreResult<()>;

    /// Devices this provider currently knows about.
    fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>>;

    /// Submit `circuit` to `device` for `shots` shots. Returns as soon as
    /// the job is acknowledged; never blocks for completion.
    fn submit(&self, device: &DeviceName, circuit: &Circuit, shots: u32) -> CoreResult<JobHandle>;

    /// Observe the current state of a job, and its result if terminal and
    /// successful. Must not mutate provider-side state.
    fn poll(&self, handle: &JobHandle) -> CoreResult<(JobState, Option<JobResult>)>;

    /// Best-effort cancellation; `true` if the job did not reach a terminal
    /// state before the cancellation took effect.
    fn cancel(&self, handle: &JobHandle) -> CoreResult<bool>;

    /// Validate `circuit` against `device`'s capability set and lower it to
    /// this provider's native representation.
    fn translate(&self, circuit: &Circuit, device: &DeviceInfo) -> CoreResult<NativeCircuit>;
}

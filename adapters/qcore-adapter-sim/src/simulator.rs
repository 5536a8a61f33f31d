//! `LocalSimulator`: the reference `Provider` implementation, wrapping
//! `qcore-sim` in-process.
//!
//! Submission completes synchronously: there is no remote round trip to
//! defer, so `submit` runs the simulation inline and the job is already
//! `Completed` by the time the caller gets its `JobHandle` back. `poll` is
//! then a pure job-table lookup, never re-running anything.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use qcore_hal::{
    universal_gate_set, Credentials, DeviceInfo, DeviceKind, JobHandle, JobResult, JobState, NativeCircuit, Provider,
};
use qcore_ir::Circuit;
use qcore_sim::{simulate, MAX_SIM_QUBITS};
use qcore_types::{CoreResult, DeviceName, ErrorKind};

struct CompletedJob {
    state: JobState,
    result: Option<JobResult>,
}

/// An in-process state-vector simulator, exposed as a single `local-sim-0`
/// device capped at [`MAX_SIM_QUBITS`] (simulator ceiling).
pub struct LocalSimulator {
    device: DeviceInfo,
    jobs: Mutex<FxHashMap<String, CompletedJob>>,
    next_handle: AtomicU64,
}

impl LocalSimulator {
    pub fn new() -> Self {
        let device = DeviceInfo::new("local-sim-0", "local", DeviceKind::LocalSimulator, MAX_SIM_QUBITS)
            .with_capabilities(universal_gate_set())
            .with_description("in-process state-vector simulator");
        Self {
            device,
            jobs: Mutex::new(FxHashMap::default()),
            next_handle: AtomicU64::new(0),
        }
    }
}

impl Default for LocalSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for LocalSimulator {
    fn tag(&self) -> &str {
        "local"
    }

    fn initialize(&mut self, _credentials: Credentials) -> CoreResult<()> {
        Ok(())
    }

    fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> {
        Ok(vec![self.device.clone()])
    }

    #[instrument(skip(self, circuit), fields(width = circuit.width(), shots))]
    fn submit(&self, device: &DeviceName, circuit: &Circuit, shots: u32) -> CoreResult<JobHandle> {
        if device != &self.device.name {
            return Err(ErrorKind::DeviceNotFound(device.to_string()));
        }
        let _native = self.translate(circuit, &self.device)?;

        let mut rng = StdRng::from_entropy();
        let outcome = simulate(circuit, shots, &mut rng)?;
        debug!(shots, counts = outcome.counts.len(), "simulation completed inline");

        let handle_id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let handle = JobHandle::new(format!("local-{handle_id}"));
        self.jobs.lock().unwrap().insert(
            handle.0.clone(),
            CompletedJob {
                state: JobState::Completed,
                result: Some(JobResult {
                    counts: outcome.counts,
                    shots_executed: outcome.shots,
                    execution_time_ms: 0,
                    raw_metadata: None,
                }),
            },
        );
        Ok(handle)
    }

    fn poll(&self, handle: &JobHandle) -> CoreResult<(JobState, Option<JobResult>)> {
        self.jobs
            .lock()
            .unwrap()
            .get(&handle.0)
            .map(|j| (j.state, j.result.clone()))
            .ok_or_else(|| ErrorKind::InvalidArgument(format!("unknown job handle: {handle}")))
    }

    fn cancel(&self, _handle: &JobHandle) -> CoreResult<bool> {
        // Submission is synchronous and already complete by the time a
        // caller could observe the handle, so there is never anything left
        // to cancel.
        Ok(false)
    }

    fn translate(&self, circuit: &Circuit, device: &DeviceInfo) -> CoreResult<NativeCircuit> {
        circuit.validate_against(&device.capabilities)?;
        if circuit.width() > MAX_SIM_QUBITS {
            return Err(ErrorKind::CircuitTooLarge);
        }
        Ok(NativeCircuit(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_state_splits_between_00_and_11() {
        let provider = LocalSimulator::new();
        let circuit = Circuit::bell();
        let handle = provider.submit(&provider.device.name.clone(), &circuit, 1000).unwrap();
        let (state, result) = provider.poll(&handle).unwrap();
        assert_eq!(state, JobState::Completed);
        let result = result.unwrap();
        let c00 = result.counts.get("00").copied().unwrap_or(0);
        let c11 = result.counts.get("11").copied().unwrap_or(0);
        assert_eq!(c00 + c11, 1000);
    }

    #[test]
    fn submit_to_unknown_device_name_fails() {
        let provider = LocalSimulator::new();
        let circuit = Circuit::bell();
        let err = provider.submit(&DeviceName::new("not-this-one"), &circuit, 10).unwrap_err();
        assert!(matches!(err, ErrorKind::DeviceNotFound(_)));
    }

    #[test]
    fn circuit_wider_than_simulator_ceiling_is_rejected() {
        let provider = LocalSimulator::new();
        let circuit = Circuit::new("big", MAX_SIM_QUBITS + 1, 0);
        let err = provider.submit(&provider.device.name.clone(), &circuit, 10).unwrap_err();
        assert_eq!(err, ErrorKind::CircuitTooLarge);
    }

    #[test]
    fn cancel_after_synchronous_completion_reports_false() {
        let provider = LocalSimulator::new();
        let circuit = Circuit::bell();
        let handle = provider.submit(&provider.device.name.clone(), &circuit, 10).unwrap();
        assert!(!provider.cancel(&handle).unwrap());
    }

    #[test]
    fn poll_unknown_handle_is_invalid_argument() {
        let provider = LocalSimulator::new();
        let err = provider.poll(&JobHandle::new("nope")).unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidArgument(_)));
    }
}

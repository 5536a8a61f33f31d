//! Black-box coverage of the dispatcher's concurrency model: submitting a
//! job against a real in-process simulator, an offline device, and a
//! multi-provider auto-select/benchmark sweep, plus a property test of
//! `poll`'s terminal-state monotonicity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use qcore_adapter_sim::LocalSimulator;
use qcore_hal::{Credentials, DeviceInfo, DeviceKind, JobHandle, JobResult, JobState as ProviderJobState, NativeCircuit, Provider};
use qcore_ir::Circuit;
use qcore_sched::{Dispatcher, JobState, Policy};
use qcore_types::{CoreResult, DeviceName, ErrorKind};

// ========== mock providers ==========

/// A provider whose one device always reports offline, so `submit` fails
/// with `DeviceOffline` before any job handle is ever created.
struct OfflineProvider {
    device: DeviceInfo,
}

impl OfflineProvider {
    fn new(name: &str, qubits: u32) -> Self {
        Self {
            device: DeviceInfo::new(name, "offline-hw", DeviceKind::Hardware, qubits).with_operational(false),
        }
    }
}

impl Provider for OfflineProvider {
    fn tag(&self) -> &str {
        "offline-hw"
    }
    fn initialize(&mut self, _credentials: Credentials) -> CoreResult<()> {
        Ok(())
    }
    fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> {
        Ok(vec![self.device.clone()])
    }
    fn submit(&self, device: &DeviceName, _circuit: &Circuit, _shots: u32) -> CoreResult<JobHandle> {
        Err(ErrorKind::DeviceOffline(device.to_string()))
    }
    fn poll(&self, _handle: &JobHandle) -> CoreResult<(ProviderJobState, Option<JobResult>)> {
        unreachable!("submit always fails for this device, so no handle is ever polled")
    }
    fn cancel(&self, _handle: &JobHandle) -> CoreResult<bool> {
        Ok(false)
    }
    fn translate(&self, _circuit: &Circuit, _device: &DeviceInfo) -> CoreResult<NativeCircuit> {
        Ok(NativeCircuit(Vec::new()))
    }
}

/// A provider whose device reports `Running` for `delay_polls` polls before
/// completing, so a test can observe a job mid-flight rather than already
/// terminal by the time it first polls.
struct DelayedProvider {
    tag: String,
    device: DeviceInfo,
    delay_polls: u32,
    polls_seen: Mutex<HashMap<String, u32>>,
    next_handle: AtomicU32,
}

impl DelayedProvider {
    fn new(name: &str, qubits: u32, delay_polls: u32) -> Self {
        Self::with_kind(name, DeviceKind::RemoteSimulator, qubits, delay_polls)
    }

    fn with_kind(name: &str, kind: DeviceKind, qubits: u32, delay_polls: u32) -> Self {
        let tag = format!("delayed-{name}");
        Self {
            device: DeviceInfo::new(name, tag.clone(), kind, qubits),
            tag,
            delay_polls,
            polls_seen: Mutex::new(HashMap::new()),
            next_handle: AtomicU32::new(0),
        }
    }
}

impl Provider for DelayedProvider {
    fn tag(&self) -> &str {
        &self.tag
    }
    fn initialize(&mut self, _credentials: Credentials) -> CoreResult<()> {
        Ok(())
    }
    fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> {
        Ok(vec![self.device.clone()])
    }
    fn submit(&self, _device: &DeviceName, _circuit: &Circuit, _shots: u32) -> CoreResult<JobHandle> {
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let handle = JobHandle::new(format!("delayed-{id}"));
        self.polls_seen.lock().unwrap().insert(handle.0.clone(), 0);
        Ok(handle)
    }
    fn poll(&self, handle: &JobHandle) -> CoreResult<(ProviderJobState, Option<JobResult>)> {
        let mut seen = self.polls_seen.lock().unwrap();
        let count = seen.entry(handle.0.clone()).or_insert(0);
        *count += 1;
        if *count > self.delay_polls {
            Ok((
                ProviderJobState::Completed,
                Some(JobResult {
                    counts: [("0".to_string(), 1)].into_iter().collect(),
                    shots_executed: 1,
                    execution_time_ms: 1,
                    raw_metadata: None,
                }),
            ))
        } else {
            Ok((ProviderJobState::Running, None))
        }
    }
    fn cancel(&self, _handle: &JobHandle) -> CoreResult<bool> {
        Ok(false)
    }
    fn translate(&self, _circuit: &Circuit, _device: &DeviceInfo) -> CoreResult<NativeCircuit> {
        Ok(NativeCircuit(Vec::new()))
    }
}

// ========== helpers ==========

fn dispatcher_with_local_simulator() -> Dispatcher {
    let dispatcher = Dispatcher::with_worker_count(2);
    dispatcher
        .register_provider(Box::new(LocalSimulator::new()), Credentials::default())
        .expect("registering local simulator");
    dispatcher
}

// ============================================================
// Bell-state end-to-end on the local simulator.
// ============================================================

#[test]
fn bell_state_job_completes_with_counts_split_between_00_and_11() {
    let dispatcher = dispatcher_with_local_simulator();
    let device = dispatcher.list_all_devices()[0].name.clone();
    let circuit = Arc::new(Circuit::bell());

    let id = dispatcher.submit(circuit, device, 1024).unwrap();
    let job = dispatcher.await_result(id, Duration::from_secs(5)).unwrap();

    assert_eq!(job.state, JobState::Completed);
    let result = job.result.expect("completed job carries a result");
    assert_eq!(result.shots_executed, 1024);
    let c00 = result.counts.get("00").copied().unwrap_or(0);
    let c11 = result.counts.get("11").copied().unwrap_or(0);
    assert_eq!(c00 + c11, 1024, "every shot lands on 00 or 11");
    assert_eq!(result.counts.get("01").copied().unwrap_or(0), 0);
    assert_eq!(result.counts.get("10").copied().unwrap_or(0), 0);
}

// ============================================================
// Offline-device scenario: submission to a non-operational device fails
// fast, and `await_result` surfaces the failure rather than timing out.
// ============================================================

#[test]
fn submitting_to_an_offline_device_fails_within_one_poll() {
    let dispatcher = Dispatcher::with_worker_count(2);
    let provider = OfflineProvider::new("hw-offline-0", 5);
    let device = provider.device.name.clone();
    dispatcher
        .register_provider(Box::new(provider), Credentials::default())
        .expect("registering offline-hardware provider");

    let circuit = Arc::new(Circuit::new("probe", 2, 2));
    let id = dispatcher.submit(circuit, device, 10).unwrap();
    let job = dispatcher.await_result(id, Duration::from_secs(1)).unwrap();

    assert_eq!(job.state, JobState::Failed);
    assert!(matches!(job.error, Some(ErrorKind::DeviceOffline(_))));
    assert!(job.result.is_none());
}

// ============================================================
// Auto-select scenario: a Development policy prefers the local simulator
// over a lightly-loaded but nominally eligible remote device.
// ============================================================

#[test]
fn auto_select_development_prefers_local_simulator_over_remote_hardware() {
    let dispatcher = dispatcher_with_local_simulator();
    let hardware = DelayedProvider::with_kind("hw-remote-0", DeviceKind::Hardware, 5, 0);
    let hw_name = hardware.device.name.clone();
    dispatcher
        .register_provider(Box::new(hardware), Credentials::default())
        .expect("registering remote hardware");

    let circuit = Circuit::new("probe", 4, 4);
    let selected = dispatcher.auto_select(&circuit, Policy::Development).unwrap();

    assert_ne!(selected, hw_name);
    assert_eq!(selected, DeviceName::new("local-sim-0"));
}

// ============================================================
// Benchmark scenario: a narrow device is excluded from the sweep, not
// reported as a failed run.
// ============================================================

#[test]
fn benchmark_sweep_excludes_a_device_too_narrow_for_the_circuit_but_runs_the_rest() {
    let dispatcher = Dispatcher::with_worker_count(3);
    let narrow = DelayedProvider::new("narrow-hw", 4, 0);
    let wide_a = DelayedProvider::new("wide-a", 8, 0);
    let wide_b = DelayedProvider::new("wide-b", 8, 0);
    let names = [narrow.device.name.clone(), wide_a.device.name.clone(), wide_b.device.name.clone()];
    dispatcher.register_provider(Box::new(narrow), Credentials::default()).unwrap();
    dispatcher.register_provider(Box::new(wide_a), Credentials::default()).unwrap();
    dispatcher.register_provider(Box::new(wide_b), Credentials::default()).unwrap();

    let circuit = Circuit::new("sweep", 6, 6);
    let runs = dispatcher.benchmark(&circuit, 10, &names);

    assert_eq!(runs.len(), 2, "the 4-qubit device is excluded, not reported as a failure");
    assert!(runs.iter().all(|r| r.success));
    assert!(runs.iter().all(|r| r.device != DeviceName::new("narrow-hw")));
}

// ============================================================
// Dispatcher monotonicity: once `poll` observes a terminal state for a job,
// every later `poll` of the same job observes that same terminal state.
// ============================================================

proptest! {
    #[test]
    fn poll_never_regresses_from_terminal_back_to_non_terminal(delay_polls in 0_u32..4, shots in 1_u32..50) {
        let dispatcher = Dispatcher::with_worker_count(2);
        let provider = DelayedProvider::new("mono-0", 4, delay_polls);
        let device = provider.device.name.clone();
        dispatcher.register_provider(Box::new(provider), Credentials::default()).unwrap();

        let circuit = Arc::new(Circuit::new("mono", 2, 2));
        let id = dispatcher.submit(circuit, device, shots).unwrap();

        let first_terminal = dispatcher.await_result(id, Duration::from_secs(5)).unwrap();
        prop_assert!(first_terminal.state.is_terminal());

        for _ in 0..5 {
            let observed = dispatcher.poll(id).unwrap();
            prop_assert_eq!(observed.state, first_terminal.state);
        }
    }
}

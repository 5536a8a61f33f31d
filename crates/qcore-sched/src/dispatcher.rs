//! The backend dispatcher: the single entry point owning the
//! provider registry, the unified device namespace, and the job table.
//!
//! Every provider call here is synchronous, so concurrency comes from a
//! fixed pool of worker threads pulling submitted job IDs off an `mpsc`
//! channel rather than from spawned async tasks. The job table is a single
//! `Mutex<HashMap<JobId, Job>>`, never held across a provider
//! call, so every worker iteration locks only long enough to read or write
//! a `Job`'s state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use qcore_hal::{DeviceInfo, JobResult, JobState as ProviderJobState, Provider};
use qcore_ir::Circuit;
use qcore_types::{CoreResult, DeviceName, ErrorKind, JobId, ProviderTag};

use crate::job::{Job, JobState};
use crate::policy::{auto_select, Policy};

/// Hard cap on non-terminal jobs tracked at once.
pub const MAX_INFLIGHT_JOBS: usize = 1024;

/// Poll-loop backoff bounds for a worker waiting on a provider's job to
/// finish.
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(5);
const MAX_PROVIDER_RETRIES: u32 = 5;

/// The outcome of one device's run in a `benchmark` sweep (`BenchmarkRun`).
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRun {
    pub device: DeviceName,
    pub circuit_fingerprint: String,
    pub execution_time_ms: u64,
    pub success: bool,
    pub error: Option<String>,
}

struct RegisteredProvider {
    tag: ProviderTag,
    provider: Box<dyn Provider>,
}

struct Shared {
    providers: Mutex<Vec<RegisteredProvider>>,
    devices: Mutex<HashMap<DeviceName, (ProviderTag, DeviceInfo)>>,
    jobs: Mutex<HashMap<JobId, Job>>,
    jobs_cv: Condvar,
    work_rx: Mutex<mpsc::Receiver<JobId>>,
    work_tx: Mutex<Option<mpsc::Sender<JobId>>>,
    sequence: AtomicU64,
    shutting_down: std::sync::atomic::AtomicBool,
}

/// The dispatcher: provider registry, unified device namespace, and a
/// worker pool that drives submitted jobs to a terminal state.
pub struct Dispatcher {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Build a dispatcher with a worker pool sized to the available
    /// parallelism ("a fixed-size worker pool, size ≈ cores").
    pub fn new() -> Self {
        let worker_count = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self::with_worker_count(worker_count)
    }

    pub fn with_worker_count(worker_count: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Shared {
            providers: Mutex::new(Vec::new()),
            devices: Mutex::new(HashMap::new()),
            jobs: Mutex::new(HashMap::new()),
            jobs_cv: Condvar::new(),
            work_rx: Mutex::new(rx),
            work_tx: Mutex::new(Some(tx)),
            sequence: AtomicU64::new(0),
            shutting_down: std::sync::atomic::AtomicBool::new(false),
        });

        let workers = (0..worker_count.max(1))
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("qcore-dispatch-{i}"))
                    .spawn(move || worker_loop(shared))
                    .expect("spawning dispatcher worker thread")
            })
            .collect();

        Self { shared, workers }
    }

    /// Register a provider instance under its own `Provider::tag`,
    /// initialise it with `credentials`, and merge its devices into the
    /// unified namespace.
    pub fn register_provider(
        &self,
        mut provider: Box<dyn Provider>,
        credentials: qcore_hal::Credentials,
    ) -> CoreResult<()> {
        provider.initialize(credentials)?;
        let devices = provider.list_devices()?;
        let tag = ProviderTag::new(provider.tag().to_string());

        let mut device_table = self.shared.devices.lock().unwrap();
        for device in devices {
            device_table.insert(device.name.clone(), (tag.clone(), device));
        }
        drop(device_table);

        self.shared.providers.lock().unwrap().push(RegisteredProvider { tag, provider });
        Ok(())
    }

    /// All devices across every registered provider, sorted by name.
    pub fn list_all_devices(&self) -> Vec<DeviceInfo> {
        let devices = self.shared.devices.lock().unwrap();
        let mut out: Vec<DeviceInfo> = devices.values().map(|(_, d)| d.clone()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Look up one device by name.
    pub fn select_device(&self, name: &DeviceName) -> CoreResult<DeviceInfo> {
        self.shared
            .devices
            .lock()
            .unwrap()
            .get(name)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| ErrorKind::DeviceNotFound(name.to_string()))
    }

    /// Pick a device for `circuit` under `policy`.
    pub fn auto_select(&self, circuit: &Circuit, policy: Policy) -> CoreResult<DeviceName> {
        let devices = self.list_all_devices();
        auto_select(&devices, circuit.width(), policy)
            .ok_or_else(|| ErrorKind::NoSuitableDevice(policy.to_string()))
    }

    /// Submit `circuit` to `device` for `shots` shots, returning the
    /// dispatcher-level job id immediately.
    pub fn submit(&self, circuit: Arc<Circuit>, device: DeviceName, shots: u32) -> CoreResult<JobId> {
        {
            let jobs = self.shared.jobs.lock().unwrap();
            let inflight = jobs.values().filter(|j| !j.state.is_terminal()).count();
            if inflight >= MAX_INFLIGHT_JOBS {
                return Err(ErrorKind::ResourceExhausted);
            }
        }
        if self.shared.devices.lock().unwrap().get(&device).is_none() {
            return Err(ErrorKind::DeviceNotFound(device.to_string()));
        }

        let id = JobId::new_v4();
        let sequence = self.shared.sequence.fetch_add(1, Ordering::SeqCst);
        let job = Job::new(id, sequence, circuit, device, shots);

        self.shared.jobs.lock().unwrap().insert(id, job);
        let sender = self.shared.work_tx.lock().unwrap();
        if let Some(sender) = sender.as_ref() {
            sender.send(id).expect("dispatcher worker channel closed while dispatcher alive");
        }
        Ok(id)
    }

    /// Observe a job's current state without blocking.
    pub fn poll(&self, id: JobId) -> CoreResult<Job> {
        self.shared
            .jobs
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ErrorKind::InvalidArgument(format!("job not found: {id}")))
    }

    /// Block until `id` reaches a terminal state or `timeout` elapses,
    /// via a condvar and `wait_timeout` rather than polling in a loop.
    pub fn await_result(&self, id: JobId, timeout: Duration) -> CoreResult<Job> {
        let deadline = Instant::now() + timeout;
        let mut jobs = self.shared.jobs.lock().unwrap();
        loop {
            match jobs.get(&id) {
                None => return Err(ErrorKind::InvalidArgument(format!("job not found: {id}"))),
                Some(job) if job.state.is_terminal() => return Ok(job.clone()),
                _ => {}
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ErrorKind::Timeout);
            }
            let (guard, result) = self.shared.jobs_cv.wait_timeout(jobs, remaining).unwrap();
            jobs = guard;
            if result.timed_out() {
                match jobs.get(&id) {
                    Some(job) if job.state.is_terminal() => return Ok(job.clone()),
                    Some(_) => return Err(ErrorKind::Timeout),
                    None => return Err(ErrorKind::InvalidArgument(format!("job not found: {id}"))),
                }
            }
        }
    }

    /// Request cancellation of `id`. Cooperative: a worker already
    /// mid-poll finishes that poll before honouring it.
    pub fn cancel(&self, id: JobId) -> CoreResult<bool> {
        let device_tag = {
            let jobs = self.shared.jobs.lock().unwrap();
            let job = jobs.get(&id).ok_or_else(|| ErrorKind::InvalidArgument(format!("job not found: {id}")))?;
            if job.state.is_terminal() {
                return Ok(false);
            }
            job.device.clone()
        };
        let handle = {
            let jobs = self.shared.jobs.lock().unwrap();
            jobs.get(&id).and_then(|j| j.provider_handle.clone())
        };
        let Some(handle) = handle else {
            // Never reached a provider; mark cancelled directly.
            let mut jobs = self.shared.jobs.lock().unwrap();
            if let Some(job) = jobs.get_mut(&id) {
                job.state = JobState::Cancelled;
                job.finished_at = Some(Instant::now());
            }
            self.shared.jobs_cv.notify_all();
            return Ok(true);
        };
        let cancelled = self.with_provider_for_device(&device_tag, |provider| provider.cancel(&handle))?;
        if cancelled {
            let mut jobs = self.shared.jobs.lock().unwrap();
            if let Some(job) = jobs.get_mut(&id) {
                job.state = JobState::Cancelled;
                job.finished_at = Some(Instant::now());
            }
            self.shared.jobs_cv.notify_all();
        }
        Ok(cancelled)
    }

    /// Run `circuit` once on every device in `devices` that is operational
    /// and wide enough to hold it, in parallel, and report timings sorted
    /// fastest-first with failures last. Devices too narrow, non-operational,
    /// or not found are silently excluded, not reported as failures.
    pub fn benchmark(&self, circuit: &Circuit, shots: u32, devices: &[DeviceName]) -> Vec<BenchmarkRun> {
        let fingerprint = hex_fingerprint(&circuit.fingerprint());
        let candidates: Vec<DeviceInfo> = devices
            .iter()
            .filter_map(|name| self.select_device(name).ok())
            .filter(|d| d.operational && d.qubits >= circuit.width())
            .collect();

        let results: Mutex<Vec<BenchmarkRun>> = Mutex::new(Vec::new());
        thread::scope(|scope| {
            for device in &candidates {
                let results = &results;
                let fingerprint = &fingerprint;
                scope.spawn(move || {
                    let started = Instant::now();
                    let outcome = self.run_one_benchmark(device, circuit, shots);
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    let run = match outcome {
                        Ok(()) => BenchmarkRun {
                            device: device.name.clone(),
                            circuit_fingerprint: fingerprint.clone(),
                            execution_time_ms: elapsed_ms,
                            success: true,
                            error: None,
                        },
                        Err(e) => BenchmarkRun {
                            device: device.name.clone(),
                            circuit_fingerprint: fingerprint.clone(),
                            execution_time_ms: elapsed_ms,
                            success: false,
                            error: Some(e.to_string()),
                        },
                    };
                    results.lock().unwrap().push(run);
                });
            }
        });

        let mut out = results.into_inner().unwrap();
        out.sort_by(|a, b| match (a.success, b.success) {
            (true, true) | (false, false) => a
                .execution_time_ms
                .cmp(&b.execution_time_ms)
                .then_with(|| a.device.cmp(&b.device)),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
        });
        out
    }

    fn run_one_benchmark(&self, device: &DeviceInfo, circuit: &Circuit, shots: u32) -> CoreResult<()> {
        let (tag, _) = {
            let devices = self.shared.devices.lock().unwrap();
            devices.get(&device.name).cloned().ok_or_else(|| ErrorKind::DeviceNotFound(device.name.to_string()))?
        };
        let handle = self.with_provider(&tag, |provider| provider.submit(&device.name, circuit, shots))?;
        let mut backoff = INITIAL_BACKOFF;
        loop {
            let (state, _result) = self.with_provider(&tag, |provider| provider.poll(&handle))?;
            if state.is_terminal() {
                return match state {
                    ProviderJobState::Completed => Ok(()),
                    ProviderJobState::Cancelled => Err(ErrorKind::Cancelled),
                    _ => Err(ErrorKind::ProviderUnavailable { retryable: false }),
                };
            }
            thread::sleep(backoff);
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    fn with_provider<F, T>(&self, tag: &ProviderTag, f: F) -> CoreResult<T>
    where
        F: FnOnce(&dyn Provider) -> CoreResult<T>,
    {
        let providers = self.shared.providers.lock().unwrap();
        let entry = providers
            .iter()
            .find(|p| &p.tag == tag)
            .ok_or_else(|| ErrorKind::ProviderUnavailable { retryable: false })?;
        f(entry.provider.as_ref())
    }

    fn with_provider_for_device<F, T>(&self, device: &DeviceName, f: F) -> CoreResult<T>
    where
        F: FnOnce(&dyn Provider) -> CoreResult<T>,
    {
        let tag = {
            let devices = self.shared.devices.lock().unwrap();
            devices.get(device).map(|(tag, _)| tag.clone()).ok_or_else(|| ErrorKind::DeviceNotFound(device.to_string()))?
        };
        self.with_provider(&tag, f)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the channel, cancels every non-terminal job, then shuts the
/// worker pool down before providers drop in registration order.
impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        {
            let mut jobs = self.shared.jobs.lock().unwrap();
            for job in jobs.values_mut() {
                if !job.state.is_terminal() {
                    job.state = JobState::Cancelled;
                    job.finished_at = Some(Instant::now());
                }
            }
        }
        self.shared.jobs_cv.notify_all();
        // Dropping the sender unblocks every worker's blocking `recv`.
        self.shared.work_tx.lock().unwrap().take();
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.join() {
                error!(?e, "dispatcher worker panicked");
            }
        }
        // `providers` drops here, in registration (push) order.
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let id = {
            let rx = shared.work_rx.lock().unwrap();
            rx.recv()
        };
        let Ok(id) = id else {
            return;
        };
        if shared.shutting_down.load(Ordering::SeqCst) {
            continue;
        }
        run_job(&shared, id);
    }
}

fn run_job(shared: &Arc<Shared>, id: JobId) {
    let (circuit, device, shots) = {
        let mut jobs = shared.jobs.lock().unwrap();
        let Some(job) = jobs.get_mut(&id) else { return };
        if job.state.is_terminal() {
            return;
        }
        job.state = JobState::Queued;
        (Arc::clone(&job.circuit), job.device.clone(), job.shots)
    };
    shared.jobs_cv.notify_all();

    let tag = {
        let devices = shared.devices.lock().unwrap();
        match devices.get(&device) {
            Some((tag, _)) => tag.clone(),
            None => {
                finish(shared, id, JobState::Failed, None, Some(ErrorKind::DeviceNotFound(device.to_string())));
                return;
            }
        }
    };

    let handle = match call_provider(shared, &tag, |p| p.submit(&device, &circuit, shots)) {
        Ok(handle) => handle,
        Err(e) => {
            finish(shared, id, JobState::Failed, None, Some(e));
            return;
        }
    };

    {
        let mut jobs = shared.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            job.state = JobState::Running;
            job.provider_handle = Some(handle.clone());
        }
    }
    shared.jobs_cv.notify_all();

    let mut backoff = INITIAL_BACKOFF;
    let mut retries = 0u32;
    loop {
        if job_cancel_requested(shared, id) {
            let _ = call_provider(shared, &tag, |p| p.cancel(&handle));
            finish(shared, id, JobState::Cancelled, None, None);
            return;
        }

        match call_provider(shared, &tag, |p| p.poll(&handle)) {
            Ok((ProviderJobState::Completed, result)) => {
                finish(shared, id, JobState::Completed, result, None);
                return;
            }
            Ok((ProviderJobState::Failed, _)) => {
                finish(shared, id, JobState::Failed, None, Some(ErrorKind::ProviderUnavailable { retryable: false }));
                return;
            }
            Ok((ProviderJobState::Cancelled, _)) => {
                finish(shared, id, JobState::Cancelled, None, None);
                return;
            }
            Ok(_) => {
                // Still pending/queued/running upstream; keep polling.
            }
            Err(e) if e.is_retryable() && retries < MAX_PROVIDER_RETRIES => {
                retries += 1;
                warn!(job = %id, retries, "retrying provider poll after transient error");
            }
            Err(e) => {
                finish(shared, id, JobState::Failed, None, Some(e));
                return;
            }
        }

        thread::sleep(backoff);
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

fn hex_fingerprint(bytes: &[u8; 32]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn job_cancel_requested(shared: &Arc<Shared>, id: JobId) -> bool {
    // Cancellation is expressed by `Dispatcher::cancel` flipping the job's
    // state directly once it has no provider handle yet; once a handle
    // exists, `cancel` calls the provider itself, so the worker only needs
    // to notice a state already moved to `Cancelled` out from under it.
    shared.jobs.lock().unwrap().get(&id).map(|j| j.state == JobState::Cancelled).unwrap_or(true)
}

fn call_provider<F, T>(shared: &Arc<Shared>, tag: &ProviderTag, f: F) -> CoreResult<T>
where
    F: FnOnce(&dyn Provider) -> CoreResult<T>,
{
    let providers = shared.providers.lock().unwrap();
    let entry = providers
        .iter()
        .find(|p| &p.tag == tag)
        .ok_or_else(|| ErrorKind::ProviderUnavailable { retryable: false })?;
    f(entry.provider.as_ref())
}

fn finish(shared: &Arc<Shared>, id: JobId, state: JobState, result: Option<JobResult>, error: Option<ErrorKind>) {
    {
        let mut jobs = shared.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            job.state = state;
            job.result = result;
            job.error = error;
            job.finished_at = Some(Instant::now());
        }
    }
    shared.jobs_cv.notify_all();
    debug!(job = %id, ?state, "job reached terminal state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcore_hal::{Credentials, DeviceInfo, DeviceKind, JobHandle as HalJobHandle};
    use std::sync::atomic::AtomicBool as StdAtomicBool;
    use std::sync::Mutex as StdMutex;

    struct ImmediateProvider {
        device: DeviceInfo,
        should_fail: StdAtomicBool,
        handles: StdMutex<HashMap<String, ProviderJobState>>,
    }

    impl ImmediateProvider {
        fn new(name: &str, qubits: u32) -> Self {
            Self {
                device: DeviceInfo::new(name, "immediate", DeviceKind::LocalSimulator, qubits),
                should_fail: StdAtomicBool::new(false),
                handles: StdMutex::new(HashMap::new()),
            }
        }
    }

    impl Provider for ImmediateProvider {
        fn tag(&self) -> &str {
            "immediate"
        }
        fn initialize(&mut self, _credentials: Credentials) -> CoreResult<()> {
            Ok(())
        }
        fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> {
            Ok(vec![self.device.clone()])
        }
        fn submit(&self, _device: &DeviceName, _circuit: &Circuit, _shots: u32) -> CoreResult<HalJobHandle> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(ErrorKind::ProviderUnavailable { retryable: false });
            }
            let handle = HalJobHandle::new(format!("h-{}", self.handles.lock().unwrap().len()));
            self.handles.lock().unwrap().insert(handle.0.clone(), ProviderJobState::Completed);
            Ok(handle)
        }
        fn poll(&self, handle: &HalJobHandle) -> CoreResult<(ProviderJobState, Option<JobResult>)> {
            let state = *self.handles.lock().unwrap().get(&handle.0).unwrap_or(&ProviderJobState::Failed);
            let result = if state == ProviderJobState::Completed {
                Some(JobResult {
                    counts: [("0".to_string(), 100)].into_iter().collect(),
                    shots_executed: 100,
                    execution_time_ms: 1,
                    raw_metadata: None,
                })
            } else {
                None
            };
            Ok((state, result))
        }
        fn cancel(&self, _handle: &HalJobHandle) -> CoreResult<bool> {
            Ok(false)
        }
        fn translate(&self, _circuit: &Circuit, _device: &DeviceInfo) -> CoreResult<qcore_hal::NativeCircuit> {
            Ok(qcore_hal::NativeCircuit(Vec::new()))
        }
    }

    fn dispatcher_with_immediate_device() -> (Dispatcher, DeviceName) {
        let dispatcher = Dispatcher::with_worker_count(2);
        let provider = ImmediateProvider::new("imm-0", 4);
        let name = provider.device.name.clone();
        dispatcher
            .register_provider(Box::new(provider), Credentials::default())
            .expect("registering immediate provider");
        (dispatcher, name)
    }

    #[test]
    fn submit_and_await_result_reaches_completed() {
        let (dispatcher, device) = dispatcher_with_immediate_device();
        let circuit = Arc::new(Circuit::new("bell", 2, 2));
        let id = dispatcher.submit(circuit, device, 100).unwrap();
        let job = dispatcher.await_result(id, Duration::from_secs(2)).unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert!(job.result.is_some());
    }

    #[test]
    fn poll_unknown_job_is_invalid_argument() {
        let dispatcher = Dispatcher::with_worker_count(1);
        let err = dispatcher.poll(JobId::new_v4()).unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn submit_to_unknown_device_is_device_not_found() {
        let dispatcher = Dispatcher::with_worker_count(1);
        let circuit = Arc::new(Circuit::new("c", 1, 1));
        let err = dispatcher.submit(circuit, DeviceName::new("nope"), 10).unwrap_err();
        assert!(matches!(err, ErrorKind::DeviceNotFound(_)));
    }

    #[test]
    fn benchmark_excludes_devices_too_narrow_for_the_circuit() {
        let (dispatcher, device) = dispatcher_with_immediate_device();
        let circuit = Arc::new(Circuit::new("wide", 10, 10));
        let runs = dispatcher.benchmark(&circuit, 10, &[device]);
        assert!(runs.is_empty());
    }

    #[test]
    fn benchmark_runs_on_wide_enough_operational_devices() {
        let (dispatcher, device) = dispatcher_with_immediate_device();
        let circuit = Arc::new(Circuit::new("bell", 2, 2));
        let runs = dispatcher.benchmark(&circuit, 10, &[device]);
        assert_eq!(runs.len(), 1);
        assert!(runs[0].success);
    }

    #[test]
    fn benchmark_ignores_devices_not_named_in_the_sweep_list() {
        let (dispatcher, _device) = dispatcher_with_immediate_device();
        let circuit = Arc::new(Circuit::new("bell", 2, 2));
        let runs = dispatcher.benchmark(&circuit, 10, &[DeviceName::new("not-registered")]);
        assert!(runs.is_empty());
    }

    #[test]
    fn benchmark_records_the_circuits_actual_fingerprint() {
        let (dispatcher, device) = dispatcher_with_immediate_device();
        let circuit = Arc::new(Circuit::new("bell", 2, 2));
        let expected = hex_fingerprint(&circuit.fingerprint());
        let runs = dispatcher.benchmark(&circuit, 10, &[device]);
        assert_eq!(runs[0].circuit_fingerprint, expected);
    }
}

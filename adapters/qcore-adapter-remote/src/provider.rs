//! `RemoteProvider`: one `Provider` implementation serving both
//! `RemoteSimulator` and `RemoteHardware` devices, generic over a
//! [`RemoteTransport`] so the HTTP specifics live in `http.rs` and tests can
//! swap in an in-memory double.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use qcore_hal::{Credentials, DeviceInfo, JobHandle, JobResult, JobState, NativeCircuit, Provider};
use qcore_ir::Circuit;
use qcore_types::{CoreResult, DeviceName, ErrorKind};

use crate::transport::RemoteTransport;

/// A `Provider` over any [`RemoteTransport`]. `tag` distinguishes sibling
/// remote providers registered under different names (e.g. two hardware
/// vendors) within the dispatcher's single registry.
pub struct RemoteProvider<T: RemoteTransport> {
    tag: String,
    transport: T,
    credentials: Mutex<Option<Credentials>>,
    devices: RwLock<HashMap<DeviceName, DeviceInfo>>,
    job_handles: Mutex<HashMap<String, String>>,
}

impl<T: RemoteTransport> RemoteProvider<T> {
    pub fn new(tag: impl Into<String>, transport: T) -> Self {
        Self {
            tag: tag.into(),
            transport,
            credentials: Mutex::new(None),
            devices: RwLock::new(HashMap::new()),
            job_handles: Mutex::new(HashMap::new()),
        }
    }

    fn device(&self, name: &DeviceName) -> CoreResult<DeviceInfo> {
        self.devices
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::DeviceNotFound(name.to_string()))
    }
}

impl<T: RemoteTransport> Provider for RemoteProvider<T> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn initialize(&mut self, credentials: Credentials) -> CoreResult<()> {
        *self.credentials.lock().unwrap() = Some(credentials);
        let remote_devices = self.transport.list_devices()?;
        let mut devices = self.devices.write().unwrap();
        devices.clear();
        for remote in remote_devices {
            let info = DeviceInfo::new(remote.name.clone(), self.tag.clone(), remote.kind.into(), remote.qubits)
                .with_operational(remote.operational)
                .with_pending_jobs(remote.pending_jobs)
                .with_description(remote.description)
                .with_features(remote.features);
            devices.insert(info.name.clone(), info);
        }
        Ok(())
    }

    fn list_devices(&self) -> CoreResult<Vec<DeviceInfo>> {
        Ok(self.devices.read().unwrap().values().cloned().collect())
    }

    fn submit(&self, device: &DeviceName, circuit: &Circuit, shots: u32) -> CoreResult<JobHandle> {
        let info = self.device(device)?;
        if !info.operational {
            return Err(ErrorKind::DeviceOffline(device.to_string()));
        }
        let native = self.translate(circuit, &info)?;
        let remote_id = self.transport.submit_job(device, &native.0, shots)?;

        let handle = JobHandle::new(format!("{}:{remote_id}", self.tag));
        self.job_handles.lock().unwrap().insert(handle.0.clone(), remote_id);
        Ok(handle)
    }

    fn poll(&self, handle: &JobHandle) -> CoreResult<(JobState, Option<JobResult>)> {
        let remote_id = self
            .job_handles
            .lock()
            .unwrap()
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| ErrorKind::InvalidArgument(format!("unknown job handle: {handle}")))?;
        let status = self.transport.job_status(&remote_id)?;
        Ok((status.state, status.result))
    }

    fn cancel(&self, handle: &JobHandle) -> CoreResult<bool> {
        let remote_id = self
            .job_handles
            .lock()
            .unwrap()
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| ErrorKind::InvalidArgument(format!("unknown job handle: {handle}")))?;
        self.transport.cancel_job(&remote_id)
    }

    fn translate(&self, circuit: &Circuit, device: &DeviceInfo) -> CoreResult<NativeCircuit> {
        circuit.validate_against(&device.capabilities)?;
        let bytes = serde_json::to_vec(circuit).map_err(|e| ErrorKind::InvalidCircuit(e.to_string()))?;
        Ok(NativeCircuit(bytes))
    }
}

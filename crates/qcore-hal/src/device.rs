//! Device and provider identity (`DeviceInfo`, `ProviderState`).

use std::collections::{HashMap, HashSet};

use qcore_types::{DeviceName, GateTag, ProviderTag};

/// What kind of device a [`DeviceInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// In-process state-vector simulator.
    LocalSimulator,
    /// Cloud-hosted simulator (possibly GPU/tensor-network accelerated).
    RemoteSimulator,
    /// A real QPU.
    Hardware,
}

/// A device as reported by a provider's `list_devices`, unified across
/// providers at the point of discovery ("duck-typed backend objects" ->
/// one `DeviceInfo` shape every provider translates into).
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    /// Globally unique across all registered providers.
    pub name: DeviceName,
    pub provider_tag: ProviderTag,
    pub kind: DeviceKind,
    pub qubits: u32,
    pub operational: bool,
    pub pending_jobs: u32,
    pub description: String,
    pub capabilities: HashSet<GateTag>,
    /// Free-form accelerator/feature tags a provider advertises (e.g.
    /// `"gpu"`, `"tensor-network"`) — the dispatcher's `Performance` and
    /// `Development` auto-select policies key off these.
    pub features: Vec<String>,
}

impl DeviceInfo {
    pub fn new(
        name: impl Into<DeviceName>,
        provider_tag: impl Into<ProviderTag>,
        kind: DeviceKind,
        qubits: u32,
    ) -> Self {
        Self {
            name: name.into(),
            provider_tag: provider_tag.into(),
            kind,
            qubits,
            operational: true,
            pending_jobs: 0,
            description: String::new(),
            capabilities: HashSet::new(),
            features: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: HashSet<GateTag>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_operational(mut self, operational: bool) -> Self {
        self.operational = operational;
        self
    }

    pub fn with_pending_jobs(mut self, pending_jobs: u32) -> Self {
        self.pending_jobs = pending_jobs;
        self
    }
}

/// Opaque credential material passed through unchanged to a provider's
/// `initialize` ("tokens, AWS profiles, subscription IDs... passed
/// through unchanged").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials(pub Vec<u8>);

impl Credentials {
    pub fn from_token(token: impl AsRef<str>) -> Self {
        Self(token.as_ref().as_bytes().to_vec())
    }
}

/// The dispatcher-visible state of a registered provider.
#[derive(Debug, Clone)]
pub struct ProviderState {
    pub tag: ProviderTag,
    pub display_name: String,
    pub connected: bool,
    pub devices: HashMap<DeviceName, DeviceInfo>,
    pub credentials: Option<Credentials>,
}

impl ProviderState {
    pub fn new(tag: impl Into<ProviderTag>, display_name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            display_name: display_name.into(),
            connected: false,
            devices: HashMap::new(),
            credentials: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_info_builder_sets_fields() {
        let device = DeviceInfo::new("local-sim-0", "local", DeviceKind::LocalSimulator, 20)
            .with_operational(false)
            .with_pending_jobs(3)
            .with_description("reference simulator");
        assert!(!device.operational);
        assert_eq!(device.pending_jobs, 3);
        assert_eq!(device.description, "reference simulator");
    }

    #[test]
    fn provider_state_starts_disconnected_with_no_devices() {
        let state = ProviderState::new("local", "Local Simulator");
        assert!(!state.connected);
        assert!(state.devices.is_empty());
    }
}

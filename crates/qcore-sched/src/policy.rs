//! Auto-selection policies.

use qcore_hal::{DeviceInfo, DeviceKind};
use qcore_types::DeviceName;

/// The intent behind an `auto_select` call, each with its own device
/// preference ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Fast local iteration: local simulator first, falling back to
    /// progressively more expensive remote resources.
    Development,
    /// Confidence before a real run: prefer under-loaded real hardware.
    Validation,
    /// Raw throughput: prefer accelerated remote simulation.
    Performance,
    /// The real thing: operational hardware meeting the qubit requirement.
    Production,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Policy::Development => "development",
            Policy::Validation => "validation",
            Policy::Performance => "performance",
            Policy::Production => "production",
        };
        write!(f, "{s}")
    }
}

fn is_accelerated(d: &DeviceInfo) -> bool {
    d.has_feature("gpu") || d.has_feature("tensor-network")
}

type Tier = fn(&DeviceInfo) -> bool;

fn tiers_for(policy: Policy) -> &'static [Tier] {
    match policy {
        Policy::Development => &[
            (|d| d.kind == DeviceKind::LocalSimulator) as Tier,
            |d| d.kind == DeviceKind::RemoteSimulator && is_accelerated(d),
            |d| d.kind == DeviceKind::RemoteSimulator,
            |d| d.kind == DeviceKind::Hardware,
        ],
        Policy::Validation => &[
            (|d| d.kind == DeviceKind::Hardware && d.pending_jobs < 5) as Tier,
            |d| d.kind == DeviceKind::RemoteSimulator,
            |d| d.kind == DeviceKind::LocalSimulator,
        ],
        Policy::Performance => &[
            (|d| d.kind == DeviceKind::RemoteSimulator && is_accelerated(d)) as Tier,
            |d| d.kind == DeviceKind::LocalSimulator,
            |d| d.kind == DeviceKind::Hardware,
        ],
        Policy::Production => &[(|d| d.kind == DeviceKind::Hardware) as Tier],
    }
}

/// Pick a device for `policy` among `devices`, restricted to those with
/// `qubits >= width` and `operational == true`. Within the first
/// matching preference tier, ties are broken by lowest `pending_jobs` then
/// lexicographic device name.
pub fn auto_select(devices: &[DeviceInfo], width: u32, policy: Policy) -> Option<DeviceName> {
    let eligible: Vec<&DeviceInfo> = devices.iter().filter(|d| d.operational && d.qubits >= width).collect();

    for tier in tiers_for(policy) {
        let mut candidates: Vec<&DeviceInfo> = eligible.iter().copied().filter(|d| tier(d)).collect();
        if candidates.is_empty() {
            continue;
        }
        candidates.sort_by(|a, b| a.pending_jobs.cmp(&b.pending_jobs).then_with(|| a.name.cmp(&b.name)));
        return Some(candidates[0].name.clone());
    }
    None
}

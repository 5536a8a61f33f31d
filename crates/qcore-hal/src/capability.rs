//! Capability-set helpers (`DeviceInfo.capabilities: Set<GateTag>`).
//!
//! A device's capability set is nothing more than the [`GateTag`]s it can
//! realise natively — `Circuit::validate_against` (in `qcore-ir`) already
//! does the membership check. This module only supplies the handful of
//! standard sets the reference provider implementations report.

use std::collections::HashSet;

use qcore_types::GateTag;

fn tags(names: &[&str]) -> HashSet<GateTag> {
    names.iter().map(|&n| GateTag::new(n)).collect()
}

/// The full gate set the simulator implements (closed set, minus
/// `Measure`/`Barrier` which are never capability-checked — see
/// `Circuit::validate_against`).
pub fn universal_gate_set() -> HashSet<GateTag> {
    tags(&["h", "x", "y", "z", "s", "t", "rx", "ry", "rz", "u3", "cx", "cz", "ccx"])
}

/// A reduced native set typical of a superconducting-transmon device:
/// single-qubit rotations plus one native two-qubit gate, with everything
/// else expected to arrive pre-transpiled.
pub fn transmon_native_gate_set() -> HashSet<GateTag> {
    tags(&["rz", "rx", "ry", "x", "cx"])
}

//! The closed set of gates a circuit may contain.

use serde::{Deserialize, Serialize};

use crate::qubit::{ClbitId, QubitId};
use qcore_types::GateTag;

/// A single circuit instruction. The set is closed: every provider-facing
/// translation and every simulator kernel matches on this enum exhaustively,
/// so adding a gate here is a breaking change to the whole workspace, not a
/// local one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard.
    H(QubitId),
    /// Pauli-X.
    X(QubitId),
    /// Pauli-Y.
    Y(QubitId),
    /// Pauli-Z.
    Z(QubitId),
    /// Phase gate S = sqrt(Z).
    S(QubitId),
    /// T = sqrt(S).
    T(QubitId),
    /// Rotation around X by `theta` radians.
    Rx(QubitId, f64),
    /// Rotation around Y by `theta` radians.
    Ry(QubitId, f64),
    /// Rotation around Z by `theta` radians.
    Rz(QubitId, f64),
    /// Controlled-X (CNOT), `(control, target)`.
    Cx(QubitId, QubitId),
    /// Controlled-Z, `(control, target)`.
    Cz(QubitId, QubitId),
    /// Toffoli, `(control_0, control_1, target)`.
    Ccx(QubitId, QubitId, QubitId),
    /// Universal single-qubit rotation U3(theta, phi, lambda).
    U3(QubitId, f64, f64, f64),
    /// Projective measurement of a qubit into a classical bit.
    Measure(QubitId, ClbitId),
    /// No-op scheduling hint; blocks instruction reordering across it but has
    /// no effect on the statevector.
    Barrier(Vec<QubitId>),
}

impl Gate {
    /// The capability tag this gate is checked against, e.g. `"h"`, `"cx"`.
    pub fn tag(&self) -> GateTag {
        GateTag::new(match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::T(_) => "t",
            Gate::Rx(..) => "rx",
            Gate::Ry(..) => "ry",
            Gate::Rz(..) => "rz",
            Gate::Cx(..) => "cx",
            Gate::Cz(..) => "cz",
            Gate::Ccx(..) => "ccx",
            Gate::U3(..) => "u3",
            Gate::Measure(..) => "measure",
            Gate::Barrier(_) => "barrier",
        })
    }

    /// The qubits this instruction touches, in the order they're named.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) | Gate::S(q) | Gate::T(q) => {
                vec![*q]
            }
            Gate::Rx(q, _) | Gate::Ry(q, _) | Gate::Rz(q, _) => vec![*q],
            Gate::U3(q, ..) => vec![*q],
            Gate::Cx(c, t) | Gate::Cz(c, t) => vec![*c, *t],
            Gate::Ccx(c0, c1, t) => vec![*c0, *c1, *t],
            Gate::Measure(q, _) => vec![*q],
            Gate::Barrier(qs) => qs.clone(),
        }
    }

    /// The classical bit this instruction writes to, if any.
    pub fn clbit(&self) -> Option<ClbitId> {
        match self {
            Gate::Measure(_, c) => Some(*c),
            _ => None,
        }
    }

    /// Whether this instruction is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self, Gate::Measure(..))
    }

    /// Whether this instruction is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self, Gate::Barrier(_))
    }
}

//! The quantum Fourier transform, and the single-qubit phase gate it's built
//! from (our closed [`qcore_ir::Gate`] set has no native phase or swap gate,
//! so both are synthesised from `U3`/`Cx` here).

use qcore_ir::{Circuit, QubitId};
use qcore_types::CoreResult;
use std::f64::consts::PI;

/// `diag(1, e^{i*lambda})` — realised as `U3(q, 0, 0, lambda)`, which at
/// `theta=0` collapses to exactly this diagonal.
pub(crate) fn phase(circuit: &mut Circuit, q: impl Into<QubitId>, lambda: f64) -> CoreResult<()> {
    let q = q.into();
    circuit.u3(q, 0.0, 0.0, lambda)?;
    Ok(())
}

/// `diag(1, 1, 1, e^{i*lambda})`, synthesised from two `Cx`s and three phase
/// gates (the standard controlled-phase-from-CNOT identity).
pub(crate) fn controlled_phase(
    circuit: &mut Circuit,
    control: impl Into<QubitId>,
    target: impl Into<QubitId>,
    lambda: f64,
) -> CoreResult<()> {
    let control = control.into();
    let target = target.into();
    phase(circuit, control, lambda / 2.0)?;
    circuit.cx(control, target)?;
    phase(circuit, target, -lambda / 2.0)?;
    circuit.cx(control, target)?;
    phase(circuit, target, lambda / 2.0)?;
    Ok(())
}

/// A SWAP, synthesised from three `Cx`s (no native swap gate).
pub(crate) fn swap(circuit: &mut Circuit, a: impl Into<QubitId>, b: impl Into<QubitId>) -> CoreResult<()> {
    let a = a.into();
    let b = b.into();
    circuit.cx(a, b)?;
    circuit.cx(b, a)?;
    circuit.cx(a, b)?;
    Ok(())
}

/// The `n`-qubit quantum Fourier transform: Hadamard + controlled-phase
/// rotations per qubit, then a bit-reversal swap network. Carries no
/// measurements.
pub fn qft(n: u32) -> CoreResult<Circuit> {
    let mut circuit = Circuit::new("qft", n, 0);
    apply_qft(&mut circuit, 0, n)?;
    Ok(circuit)
}

/// Apply the QFT to the `n` qubits starting at `offset` of an existing
/// circuit, so callers (e.g. Shor's period finding) can compose it with a
/// larger register.
pub fn apply_qft(circuit: &mut Circuit, offset: u32, n: u32) -> CoreResult<()> {
    for i in 0..n {
        circuit.h(offset + i)?;
        for j in (i + 1)..n {
            let k = j - i;
            let angle = PI / (1u64 << k) as f64;
            controlled_phase(circuit, offset + j, offset + i, angle)?;
        }
    }
    for i in 0..n / 2 {
        swap(circuit, offset + i, offset + n - 1 - i)?;
    }
    Ok(())
}

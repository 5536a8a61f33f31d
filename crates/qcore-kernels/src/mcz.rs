//! Multi-controlled X/Z, synthesised as a Toffoli ladder over borrowed
//! ancilla qubits (Barenco et al.'s "V-chain" construction) since our closed
//! gate set only has up to two-control Toffolis natively.

use qcore_ir::{Circuit, QubitId};
use qcore_types::{CoreResult, ErrorKind};

/// How many ancilla qubits [`multi_controlled_x`] needs for `num_controls`
/// control qubits.
pub fn ancillas_needed(num_controls: usize) -> usize {
    num_controls.saturating_sub(2)
}

/// Flip `target` iff every qubit in `controls` is `|1>`. `ancillas` must have
/// length `ancillas_needed(controls.len())`; their state is restored to
/// `|0>` before this returns.
pub fn multi_controlled_x(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    ancillas: &[QubitId],
) -> CoreResult<()> {
    match controls.len() {
        0 => {
            circuit.x(target)?;
        }
        1 => {
            circuit.cx(controls[0], target)?;
        }
        2 => {
            circuit.ccx(controls[0], controls[1], target)?;
        }
        n => {
            if ancillas.len() != n - 2 {
                return Err(ErrorKind::InvalidArgument(format!(
                    "multi-controlled X over {n} controls needs {} ancillas, got {}",
                    n - 2,
                    ancillas.len()
                )));
            }
            circuit.ccx(controls[0], controls[1], ancillas[0])?;
            for i in 0..n - 3 {
                circuit.ccx(controls[i + 2], ancillas[i], ancillas[i + 1])?;
            }
            circuit.ccx(controls[n - 1], ancillas[n - 3], target)?;
            for i in (0..n - 3).rev() {
                circuit.ccx(controls[i + 2], ancillas[i], ancillas[i + 1])?;
            }
            circuit.ccx(controls[0], controls[1], ancillas[0])?;
        }
    }
    Ok(())
}

/// Phase-flip `|1...1>` (every qubit in `controls` plus `target` all set).
/// Realised as `H(target) . multi_controlled_x(controls, target) . H(target)`.
pub fn multi_controlled_z(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    ancillas: &[QubitId],
) -> CoreResult<()> {
    circuit.h(target)?;
    multi_controlled_x(circuit, controls, target, ancillas)?;
    circuit.h(target)?;
    Ok(())
}

//! Grover's search and its generalisation to amplitude amplification.

use qcore_ir::{Circuit, Gate, QubitId};
use qcore_types::{CoreResult, Counts, ErrorKind};
use rand::RngCore;
use tracing::{debug, instrument};

use crate::mcz::{ancillas_needed, multi_controlled_z};

/// The result of running [`grover_search`].
#[derive(Debug, Clone)]
pub struct GroverOutcome {
    pub iterations: u32,
    pub counts: Counts,
}

/// The optimal number of Grover iterations for `n_bits` qubits with `marked`
/// marked items out of `2^n_bits`. Handles the edge cases: zero marked items
/// is an error, and once more than half the space is marked a single
/// iteration is already optimal (further iterations over-rotate past the
/// marked subspace and reduce success probability).
pub fn optimal_iterations(n_bits: u32, marked: u64) -> CoreResult<u32> {
    if marked == 0 {
        return Err(ErrorKind::InvalidArgument("marked_count must be > 0".into()));
    }
    let space = 1u64 << n_bits;
    if marked >= space / 2 {
        return Ok(1);
    }
    let iterations = (std::f64::consts::FRAC_PI_4 * ((space as f64) / (marked as f64)).sqrt()).floor();
    Ok(iterations.max(1.0) as u32)
}

/// Build and simulate Grover's search. `oracle` is a gate sequence over the
/// same `n_bits` qubits that phase-flips every marked basis state; the
/// caller is responsible for it being a valid unitary over gate set.
#[instrument(skip(oracle, rng), fields(n_bits, marked_count))]
pub fn grover_search(
    n_bits: u32,
    oracle: &[Gate],
    marked_count: u64,
    shots: u32,
    rng: &mut dyn RngCore,
) -> CoreResult<GroverOutcome> {
    let iterations = optimal_iterations(n_bits, marked_count)?;
    let ancilla_count = ancillas_needed(n_bits.saturating_sub(1) as usize) as u32;
    let mut circuit = Circuit::new("grover", n_bits + ancilla_count, n_bits);

    for q in 0..n_bits {
        circuit.h(q)?;
    }

    let controls: Vec<QubitId> = (0..n_bits.saturating_sub(1)).map(QubitId).collect();
    let ancillas: Vec<QubitId> = (n_bits..n_bits + ancilla_count).map(QubitId).collect();
    let diffusion_target = QubitId(n_bits.saturating_sub(1));

    for _ in 0..iterations {
        for gate in oracle {
            circuit.append(gate.clone())?;
        }
        for q in 0..n_bits {
            circuit.h(q)?;
            circuit.x(q)?;
        }
        multi_controlled_z(&mut circuit, &controls, diffusion_target, &ancillas)?;
        for q in 0..n_bits {
            circuit.x(q)?;
            circuit.h(q)?;
        }
    }

    for q in 0..n_bits {
        circuit.measure(q, q)?;
    }

    debug!(iterations, width = circuit.width(), "built Grover circuit");
    let sim = qcore_sim::simulate(&circuit, shots, rng)?;
    Ok(GroverOutcome {
        iterations,
        counts: sim.counts,
    })
}

/// Invert a gate sequence in the closed set: reverse order, and replace each
/// gate with its adjoint. `Measure`/`Barrier` are not unitary and are
/// rejected.
pub fn invert_sequence(gates: &[Gate]) -> CoreResult<Vec<Gate>> {
    gates.iter().rev().map(invert_gate).collect()
}

fn invert_gate(gate: &Gate) -> CoreResult<Gate> {
    Ok(match *gate {
        Gate::H(q) => Gate::H(q),
        Gate::X(q) => Gate::X(q),
        Gate::Y(q) => Gate::Y(q),
        Gate::Z(q) => Gate::Z(q),
        Gate::S(q) => Gate::U3(q, 0.0, 0.0, -std::f64::consts::FRAC_PI_2),
        Gate::T(q) => Gate::U3(q, 0.0, 0.0, -std::f64::consts::FRAC_PI_4),
        Gate::Rx(q, theta) => Gate::Rx(q, -theta),
        Gate::Ry(q, theta) => Gate::Ry(q, -theta),
        Gate::Rz(q, theta) => Gate::Rz(q, -theta),
        Gate::U3(q, theta, phi, lambda) => Gate::U3(q, -theta, -lambda, -phi),
        Gate::Cx(c, t) => Gate::Cx(c, t),
        Gate::Cz(c, t) => Gate::Cz(c, t),
        Gate::Ccx(c0, c1, t) => Gate::Ccx(c0, c1, t),
        Gate::Measure(..) | Gate::Barrier(_) => {
            return Err(ErrorKind::InvalidArgument(
                "state preparation for amplitude amplification must be unitary; found a Measure/Barrier".into(),
            ))
        }
    })
}

/// Generalised Grover over an arbitrary initial distribution: `state_prep`
/// replaces the uniform-superposition Hadamard wall, and its inverse
/// (derived automatically via [`invert_sequence`]) replaces the second half
/// of the diffusion operator.
pub fn amplitude_amplification(
    width: u32,
    state_prep: &[Gate],
    oracle: &[Gate],
    iterations: u32,
    shots: u32,
    rng: &mut dyn RngCore,
) -> CoreResult<GroverOutcome> {
    let prep_inverse = invert_sequence(state_prep)?;
    let ancilla_count = ancillas_needed(width.saturating_sub(1) as usize) as u32;
    let mut circuit = Circuit::new("amplitude-amplification", width + ancilla_count, width);

    for gate in state_prep {
        circuit.append(gate.clone())?;
    }

    let controls: Vec<QubitId> = (0..width.saturating_sub(1)).map(QubitId).collect();
    let ancillas: Vec<QubitId> = (width..width + ancilla_count).map(QubitId).collect();
    let reflect_target = QubitId(width.saturating_sub(1));

    for _ in 0..iterations {
        for gate in oracle {
            circuit.append(gate.clone())?;
        }
        for gate in &prep_inverse {
            circuit.append(gate.clone())?;
        }
        for q in 0..width {
            circuit.x(q)?;
        }
        multi_controlled_z(&mut circuit, &controls, reflect_target, &ancillas)?;
        for q in 0..width {
            circuit.x(q)?;
        }
        for gate in state_prep {
            circuit.append(gate.clone())?;
        }
    }

    for q in 0..width {
        circuit.measure(q, q)?;
    }

    let sim = qcore_sim::simulate(&circuit, shots, rng)?;
    Ok(GroverOutcome {
        iterations,
        counts: sim.counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn optimal_iterations_matches_closed_form() {
        // floor((pi/4) * sqrt(8/1)) == 2
        assert_eq!(optimal_iterations(3, 1).unwrap(), 2);
    }

    #[test]
    fn zero_marked_is_rejected() {
        assert_eq!(
            optimal_iterations(3, 0).unwrap_err(),
            ErrorKind::InvalidArgument("marked_count must be > 0".into())
        );
    }

    #[test]
    fn majority_marked_caps_at_one_iteration() {
        assert_eq!(optimal_iterations(3, 6).unwrap(), 1);
    }

    #[test]
    fn grover_search_finds_a_single_marked_item() {
        // oracle flips the phase of |111>
        let oracle = vec![Gate::H(QubitId(2)), Gate::Ccx(QubitId(0), QubitId(1), QubitId(2)), Gate::H(QubitId(2))];
        let mut rng = StdRng::seed_from_u64(42);
        let outcome = grover_search(3, &oracle, 1, 1024, &mut rng).unwrap();
        let hits = outcome.counts.get("111").copied().unwrap_or(0);
        assert!(hits > 900, "expected >900/1024 hits on |111>, got {hits}");
    }

    #[test]
    fn invert_sequence_reverses_order_and_negates_rotation_angles() {
        let seq = vec![Gate::H(QubitId(0)), Gate::Rx(QubitId(0), 0.3)];
        let inv = invert_sequence(&seq).unwrap();
        assert_eq!(inv, vec![Gate::Rx(QubitId(0), -0.3), Gate::H(QubitId(0))]);
    }
}

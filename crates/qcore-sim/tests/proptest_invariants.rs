//! Property-based tests for simulator invariants.

use proptest::prelude::*;
use qcore_ir::{Circuit, QubitId};
use qcore_sim::simulate;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generate a circuit over 1-5 qubits from a random sequence of gates,
/// followed by a measurement of every qubit into a matching classical bit —
/// guaranteeing `simulate` always has something to sample.
fn arb_measured_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|width| {
        prop::collection::vec(arb_gate_op(width), 0..=12).prop_map(move |ops| {
            let mut circuit = Circuit::new("prop", width, width);
            for op in ops {
                op.apply(&mut circuit);
            }
            for q in 0..width {
                let _ = circuit.measure(QubitId(q), q);
            }
            circuit
        })
    })
}

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Rx(u32, f64),
    Cx(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            GateOp::H(q) => {
                let _ = circuit.h(QubitId(q));
            }
            GateOp::X(q) => {
                let _ = circuit.x(QubitId(q));
            }
            GateOp::Rx(q, theta) => {
                let _ = circuit.rx(QubitId(q), theta);
            }
            GateOp::Cx(c, t) => {
                let _ = circuit.cx(QubitId(c), QubitId(t));
            }
        }
    }
}

fn arb_gate_op(width: u32) -> impl Strategy<Value = GateOp> {
    if width < 2 {
        prop_oneof![
            (0..width).prop_map(GateOp::H),
            (0..width).prop_map(GateOp::X),
            (0..width, -6.3_f64..6.3).prop_map(|(q, t)| GateOp::Rx(q, t)),
        ]
        .boxed()
    } else {
        prop_oneof![
            (0..width).prop_map(GateOp::H),
            (0..width).prop_map(GateOp::X),
            (0..width, -6.3_f64..6.3).prop_map(|(q, t)| GateOp::Rx(q, t)),
            (0..width, 0..width)
                .prop_filter("control and target must differ", |(c, t)| c != t)
                .prop_map(|(c, t)| GateOp::Cx(c, t)),
        ]
        .boxed()
    }
}

proptest! {
    /// The counts map always accounts for exactly `shots_executed` shots, and
    /// every bitstring key has one character per classical bit.
    #[test]
    fn counts_sum_to_shots_executed_with_correct_bitstring_length(
        circuit in arb_measured_circuit(),
        shots in 1_u32..500,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = simulate(&circuit, shots, &mut rng).unwrap();
        prop_assert_eq!(outcome.shots, shots);
        let total: u64 = outcome.counts.values().sum();
        prop_assert_eq!(total, shots as u64);
        for key in outcome.counts.keys() {
            prop_assert_eq!(key.len() as u32, circuit.n_clbits());
        }
    }

    /// Simulating the same circuit with the same seed and shot count twice
    /// reproduces identical counts.
    #[test]
    fn simulate_is_deterministic_given_the_same_seed(
        circuit in arb_measured_circuit(),
        shots in 1_u32..500,
        seed in any::<u64>(),
    ) {
        let mut rng_a = StdRng::seed_from_u64(seed);
        let mut rng_b = StdRng::seed_from_u64(seed);
        let a = simulate(&circuit, shots, &mut rng_a).unwrap();
        let b = simulate(&circuit, shots, &mut rng_b).unwrap();
        prop_assert_eq!(a.counts, b.counts);
        prop_assert_eq!(a.shots, b.shots);
    }

    /// The final statevector's squared-amplitude sum never drifts from 1 by
    /// more than the simulator's own normalisation tolerance, for any gate
    /// sequence the builder accepts.
    #[test]
    fn final_statevector_stays_normalized(circuit in arb_measured_circuit()) {
        let mut sv = qcore_sim::Statevector::zero(circuit.width());
        for gate in circuit.gates() {
            sv.apply(gate);
        }
        let norm: f64 = sv.amplitudes().iter().map(|a| a.norm_sqr()).sum();
        prop_assert!((norm - 1.0).abs() < 1e-9, "norm drifted to {norm}");
    }
}

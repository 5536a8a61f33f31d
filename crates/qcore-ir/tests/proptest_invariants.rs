//! Property-based tests for circuit-builder invariants.

use qcore_ir::{Circuit, Gate, QubitId};
use proptest::prelude::*;

/// Generate a circuit built from a random sequence of gate operations over a
/// random qubit count, exercising the builder's own invariant checks (a
/// rejected operation is simply dropped, never panics), alongside the subset
/// of those operations the builder actually accepted, in the order it
/// accepted them.
fn arb_circuit() -> impl Strategy<Value = (Circuit, Vec<Gate>)> {
    (1_u32..=6).prop_flat_map(|width| {
        prop::collection::vec(arb_gate_op(width), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::new("prop", width, width);
            let mut accepted = Vec::new();
            for op in ops {
                let before = circuit.gates().len();
                op.apply(&mut circuit);
                if circuit.gates().len() > before {
                    accepted.push(circuit.gates().last().unwrap().clone());
                }
            }
            (circuit, accepted)
        })
    })
}

/// Gate operations that can be applied to a circuit, mirroring a subset of
/// `Circuit`'s builder methods.
#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Rx(u32, f64),
    Cx(u32, u32),
    Measure(u32, u32),
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
            GateOp::Measure(q, c) => {
                let _ = circuit.measure(QubitId(q), c);
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
            (0..width, 0..width).prop_map(|(q, c)| GateOp::Measure(q, c)),
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
            (0..width, 0..width).prop_map(|(q, c)| GateOp::Measure(q, c)),
        ]
        .boxed()
    }
}

proptest! {
    /// `Circuit::gates` preserves the order the builder accepted operations
    /// in, and every qubit operand named by any gate is within `[0, width)`
    /// — the builder never lets an out-of-range index through.
    #[test]
    fn gates_preserve_order_and_stay_within_width((circuit, accepted) in arb_circuit()) {
        let width = circuit.width();
        for gate in circuit.gates() {
            for q in gate.qubits() {
                prop_assert!(q.0 < width, "qubit {} out of range for width {}", q.0, width);
            }
        }
        prop_assert_eq!(circuit.gates(), accepted.as_slice());
    }

    /// Once a qubit has been measured, no later gate in the circuit ever
    /// references that qubit again — the builder's rejection of such
    /// operations means the final gate list can never contain one.
    #[test]
    fn no_gate_after_measure_touches_the_measured_qubit((circuit, _) in arb_circuit()) {
        let mut measured: std::collections::HashSet<u32> = std::collections::HashSet::new();
        for gate in circuit.gates() {
            if let Gate::Measure(q, _) = gate {
                measured.insert(q.0);
                continue;
            }
            for q in gate.qubits() {
                prop_assert!(
                    !measured.contains(&q.0),
                    "qubit {} used after being measured",
                    q.0
                );
            }
        }
    }
}

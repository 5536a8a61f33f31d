//! The circuit builder: the only way to construct a [`Circuit`].

use std::collections::HashSet;
use std::hash::Hasher;

use qcore_types::{CoreResult, ErrorKind, GateTag};
use rustc_hash::FxHasher;

use crate::gate::Gate;
use crate::qubit::{ClbitId, QubitId};

/// A fixed-width quantum circuit: a qubit count, a classical-bit count, and
/// an ordered instruction list. There is no separate "frozen" state — once a
/// qubit has been measured, further instructions touching it are rejected by
/// construction, so a `Circuit` is always in a state a provider can act on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Circuit {
    name: String,
    width: u32,
    n_clbits: u32,
    gates: Vec<Gate>,
    #[serde(skip)]
    measured_qubits: HashSet<u32>,
    #[serde(skip)]
    used_clbits: HashSet<u32>,
}

impl Circuit {
    /// Create an empty circuit over `width` qubits and `n_clbits` classical
    /// bits.
    pub fn new(name: impl Into<String>, width: u32, n_clbits: u32) -> Self {
        Self {
            name: name.into(),
            width,
            n_clbits,
            gates: Vec::new(),
            measured_qubits: HashSet::new(),
            used_clbits: HashSet::new(),
        }
    }

    fn check_qubit(&self, q: QubitId) -> CoreResult<()> {
        if q.0 >= self.width {
            return Err(ErrorKind::InvalidCircuit(format!(
                "qubit {} out of range for width {}",
                q.0, self.width
            )));
        }
        if self.measured_qubits.contains(&q.0) {
            return Err(ErrorKind::InvalidCircuit(format!(
                "qubit {} already measured, no further gates allowed on it",
                q.0
            )));
        }
        Ok(())
    }

    fn check_distinct(&self, qs: &[QubitId]) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for q in qs {
            if !seen.insert(q.0) {
                return Err(ErrorKind::InvalidCircuit(format!(
                    "qubit {} used more than once as an operand of the same gate",
                    q.0
                )));
            }
        }
        Ok(())
    }

    fn push(&mut self, gate: Gate) -> CoreResult<&mut Self> {
        let qubits = gate.qubits();
        for &q in &qubits {
            self.check_qubit(q)?;
        }
        self.check_distinct(&qubits)?;
        self.gates.push(gate);
        Ok(self)
    }

    /// Hadamard.
    pub fn h(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::H(q.into()))
    }

    /// Pauli-X.
    pub fn x(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::X(q.into()))
    }

    /// Pauli-Y.
    pub fn y(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::Y(q.into()))
    }

    /// Pauli-Z.
    pub fn z(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::Z(q.into()))
    }

    /// Phase gate S.
    pub fn s(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::S(q.into()))
    }

    /// T gate.
    pub fn t(&mut self, q: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::T(q.into()))
    }

    /// Rotation around X.
    pub fn rx(&mut self, q: impl Into<QubitId>, theta: f64) -> CoreResult<&mut Self> {
        self.push(Gate::Rx(q.into(), theta))
    }

    /// Rotation around Y.
    pub fn ry(&mut self, q: impl Into<QubitId>, theta: f64) -> CoreResult<&mut Self> {
        self.push(Gate::Ry(q.into(), theta))
    }

    /// Rotation around Z.
    pub fn rz(&mut self, q: impl Into<QubitId>, theta: f64) -> CoreResult<&mut Self> {
        self.push(Gate::Rz(q.into(), theta))
    }

    /// Universal single-qubit rotation U3(theta, phi, lambda).
    pub fn u3(
        &mut self,
        q: impl Into<QubitId>,
        theta: f64,
        phi: f64,
        lambda: f64,
    ) -> CoreResult<&mut Self> {
        self.push(Gate::U3(q.into(), theta, phi, lambda))
    }

    /// Controlled-X (CNOT).
    pub fn cx(&mut self, control: impl Into<QubitId>, target: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::Cx(control.into(), target.into()))
    }

    /// Controlled-Z.
    pub fn cz(&mut self, control: impl Into<QubitId>, target: impl Into<QubitId>) -> CoreResult<&mut Self> {
        self.push(Gate::Cz(control.into(), target.into()))
    }

    /// Toffoli (CCX).
    pub fn ccx(
        &mut self,
        c0: impl Into<QubitId>,
        c1: impl Into<QubitId>,
        target: impl Into<QubitId>,
    ) -> CoreResult<&mut Self> {
        self.push(Gate::Ccx(c0.into(), c1.into(), target.into()))
    }

    /// Scheduling barrier over the given qubits.
    pub fn barrier(&mut self, qs: impl IntoIterator<Item = impl Into<QubitId>>) -> CoreResult<&mut Self> {
        let qs: Vec<QubitId> = qs.into_iter().map(Into::into).collect();
        self.push(Gate::Barrier(qs))
    }

    /// Measure `q` into classical bit `c`. A classical bit may receive at
    /// most one measurement and a measured qubit accepts no further
    /// instructions.
    pub fn measure(&mut self, q: impl Into<QubitId>, c: impl Into<ClbitId>) -> CoreResult<&mut Self> {
        let q = q.into();
        let c = c.into();
        self.check_qubit(q)?;
        if c.0 >= self.n_clbits {
            return Err(ErrorKind::InvalidCircuit(format!(
                "classical bit {} out of range for {} clbits",
                c.0, self.n_clbits
            )));
        }
        if self.used_clbits.contains(&c.0) {
            return Err(ErrorKind::InvalidCircuit(format!(
                "classical bit {} already written by an earlier measurement",
                c.0
            )));
        }
        self.gates.push(Gate::Measure(q, c));
        self.measured_qubits.insert(q.0);
        self.used_clbits.insert(c.0);
        Ok(self)
    }

    /// Append a pre-built [`Gate`], subject to the same invariant checks as
    /// the named builder methods. `gate` must not be a `Measure` (use
    /// [`Circuit::measure`], which also tracks the classical-bit
    /// invariants).
    pub fn append(&mut self, gate: Gate) -> CoreResult<&mut Self> {
        if gate.is_measure() {
            return Err(ErrorKind::InvalidCircuit(
                "append a Measure via Circuit::measure, not Circuit::append".into(),
            ));
        }
        self.push(gate)
    }

    /// Circuit name, used only for diagnostics and logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of classical bits.
    pub fn n_clbits(&self) -> u32 {
        self.n_clbits
    }

    /// The instruction sequence, in program order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Whether any gate in the circuit measures a qubit.
    pub fn has_measurements(&self) -> bool {
        self.gates.iter().any(Gate::is_measure)
    }

    /// Check that every gate's tag is present in `capabilities`. Measurement
    /// and barrier are assumed universally supported and are not checked.
    pub fn validate_against(&self, capabilities: &HashSet<GateTag>) -> CoreResult<()> {
        for gate in &self.gates {
            if gate.is_measure() || gate.is_barrier() {
                continue;
            }
            let tag = gate.tag();
            if !capabilities.contains(&tag) {
                return Err(ErrorKind::UnsupportedGate(tag.to_string()));
            }
        }
        Ok(())
    }

    /// A stable, order-sensitive content hash of this circuit, used as a
    /// cache key by dispatcher-level translation caches. Not cryptographic:
    /// it is built from two independently seeded `FxHasher` runs concatenated
    /// into 32 bytes, which is enough entropy to make accidental collisions
    /// between distinct circuits practically unobservable for cache-key use,
    /// but it must never be used anywhere a collision-resistant digest is
    /// required.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(16 + self.gates.len() * 24);
        buf.extend_from_slice(&self.width.to_le_bytes());
        buf.extend_from_slice(&self.n_clbits.to_le_bytes());
        for gate in &self.gates {
            encode_gate(gate, &mut buf);
        }

        const SEEDS: [u64; 4] = [
            0x9E37_79B9_7F4A_7C15,
            0xC2B2_AE3D_27D4_EB4F,
            0x1656_67B1_9E37_79F9,
            0x27D4_EB2F_1656_67C5,
        ];
        let mut out = [0u8; 32];
        for (i, seed) in SEEDS.iter().enumerate() {
            let mut hasher = FxHasher::default();
            hasher.write_u64(*seed);
            hasher.write(&buf);
            out[i * 8..i * 8 + 8].copy_from_slice(&hasher.finish().to_le_bytes());
        }
        out
    }

    /// A Bell-pair circuit: `H(0); CX(0,1); measure both`.
    pub fn bell() -> Self {
        let mut c = Self::new("bell", 2, 2);
        c.h(0).unwrap().cx(0, 1).unwrap();
        c.measure(0, 0).unwrap().measure(1, 1).unwrap();
        c
    }

    /// A GHZ-state circuit over `n` qubits: `H(0)` then a CNOT ladder, then
    /// measure all qubits in order.
    pub fn ghz(n: u32) -> Self {
        let mut c = Self::new("ghz", n, n);
        if n > 0 {
            c.h(0).unwrap();
            for i in 0..n.saturating_sub(1) {
                c.cx(i, i + 1).unwrap();
            }
            for i in 0..n {
                c.measure(i, i).unwrap();
            }
        }
        c
    }
}

fn encode_gate(gate: &Gate, buf: &mut Vec<u8>) {
    fn q(buf: &mut Vec<u8>, id: QubitId) {
        buf.extend_from_slice(&id.0.to_le_bytes());
    }
    fn f(buf: &mut Vec<u8>, v: f64) {
        const GRID: f64 = 1e-12;
        let mut rounded = (v / GRID).round() * GRID;
        if rounded == 0.0 {
            rounded = 0.0; // normalise -0.0 so it hashes the same as 0.0
        }
        buf.extend_from_slice(&rounded.to_bits().to_le_bytes());
    }

    match gate {
        Gate::H(a) => {
            buf.push(0);
            q(buf, *a);
        }
        Gate::X(a) => {
            buf.push(1);
            q(buf, *a);
        }
        Gate::Y(a) => {
            buf.push(2);
            q(buf, *a);
        }
        Gate::Z(a) => {
            buf.push(3);
            q(buf, *a);
        }
        Gate::S(a) => {
            buf.push(4);
            q(buf, *a);
        }
        Gate::T(a) => {
            buf.push(5);
            q(buf, *a);
        }
        Gate::Rx(a, t) => {
            buf.push(6);
            q(buf, *a);
            f(buf, *t);
        }
        Gate::Ry(a, t) => {
            buf.push(7);
            q(buf, *a);
            f(buf, *t);
        }
        Gate::Rz(a, t) => {
            buf.push(8);
            q(buf, *a);
            f(buf, *t);
        }
        Gate::Cx(a, b) => {
            buf.push(9);
            q(buf, *a);
            q(buf, *b);
        }
        Gate::Cz(a, b) => {
            buf.push(10);
            q(buf, *a);
            q(buf, *b);
        }
        Gate::Ccx(a, b, c) => {
            buf.push(11);
            q(buf, *a);
            q(buf, *b);
            q(buf, *c);
        }
        Gate::U3(a, t1, t2, t3) => {
            buf.push(12);
            q(buf, *a);
            f(buf, *t1);
            f(buf, *t2);
            f(buf, *t3);
        }
        Gate::Measure(a, c) => {
            buf.push(13);
            q(buf, *a);
            buf.extend_from_slice(&c.0.to_le_bytes());
        }
        Gate::Barrier(qs) => {
            buf.push(14);
            buf.extend_from_slice(&(qs.len() as u32).to_le_bytes());
            for a in qs {
                q(buf, *a);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_qubit() {
        let mut c = Circuit::new("t", 2, 2);
        assert_eq!(
            c.h(5).unwrap_err(),
            ErrorKind::InvalidCircuit("qubit 5 out of range for width 2".into())
        );
    }

    #[test]
    fn rejects_gate_after_measurement_on_same_qubit() {
        let mut c = Circuit::new("t", 1, 1);
        c.measure(0, 0).unwrap();
        assert!(c.x(0).is_err());
    }

    #[test]
    fn rejects_reused_clbit() {
        let mut c = Circuit::new("t", 2, 1);
        c.measure(0, 0).unwrap();
        assert!(c.measure(1, 0).is_err());
    }

    #[test]
    fn rejects_repeated_qubit_operand_on_cx() {
        let mut c = Circuit::new("t", 2, 0);
        assert!(c.cx(0, 0).is_err());
    }

    #[test]
    fn fingerprint_is_deterministic_and_order_sensitive() {
        let mut a = Circuit::new("a", 2, 0);
        a.h(0).unwrap().x(1).unwrap();
        let mut b = Circuit::new("b", 2, 0);
        b.h(0).unwrap().x(1).unwrap();
        let mut c = Circuit::new("c", 2, 0);
        c.x(1).unwrap().h(0).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn bell_has_expected_shape() {
        let c = Circuit::bell();
        assert_eq!(c.width(), 2);
        assert_eq!(c.gates().len(), 4);
        assert!(c.has_measurements());
    }

    #[test]
    fn validate_against_rejects_unsupported_gate() {
        let mut c = Circuit::new("t", 1, 0);
        c.t(0).unwrap();
        let caps: HashSet<GateTag> = [GateTag::new("h"), GateTag::new("x")].into_iter().collect();
        assert_eq!(
            c.validate_against(&caps).unwrap_err(),
            ErrorKind::UnsupportedGate("t".into())
        );
    }
}

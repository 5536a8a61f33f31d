//! Dense state-vector representation and unitary gate application.

use num_complex::Complex64;
use qcore_ir::Gate;
use qcore_types::{CoreResult, ErrorKind};

/// Tolerance on `sum(|amplitude|^2) - 1` below which a statevector is
/// considered normalised. Gate application is unitary by construction, so a
/// violation this large can only come from a gate bug, not floating-point
/// drift.
const NORM_TOLERANCE: f64 = 1e-9;

/// A dense complex amplitude vector over `2^num_qubits` basis states, qubit
/// `q` addressed by bit `q` of the basis index (qubit 0 is the least
/// significant bit).
#[derive(Debug, Clone)]
pub struct Statevector {
    num_qubits: u32,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// The `|0...0>` state over `num_qubits` qubits.
    pub fn zero(num_qubits: u32) -> Self {
        let dim = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply every unitary gate in `gate`. `Measure` and `Barrier` have no
    /// effect here; the caller handles them.
    pub fn apply(&mut self, gate: &Gate) {
        match *gate {
            Gate::H(q) => self.apply_single(q.0, |a, b| {
                let f = std::f64::consts::FRAC_1_SQRT_2;
                (f * (a + b), f * (a - b))
            }),
            Gate::X(q) => self.apply_single(q.0, |a, b| (b, a)),
            Gate::Y(q) => self.apply_single(q.0, |a, b| {
                let i = Complex64::i();
                (-i * b, i * a)
            }),
            Gate::Z(q) => self.apply_single(q.0, |a, b| (a, -b)),
            Gate::S(q) => self.apply_single(q.0, |a, b| (a, Complex64::i() * b)),
            Gate::T(q) => self.apply_single(q.0, |a, b| {
                let phase = Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4);
                (a, phase * b)
            }),
            Gate::Rx(q, theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                let i = Complex64::i();
                self.apply_single(q.0, move |a, b| (c * a - i * s * b, -i * s * a + c * b));
            }
            Gate::Ry(q, theta) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                self.apply_single(q.0, move |a, b| (c * a - s * b, s * a + c * b));
            }
            Gate::Rz(q, theta) => {
                let phase_neg = Complex64::from_polar(1.0, -theta / 2.0);
                let phase_pos = Complex64::from_polar(1.0, theta / 2.0);
                self.apply_single(q.0, move |a, b| (phase_neg * a, phase_pos * b));
            }
            Gate::U3(q, theta, phi, lambda) => {
                let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
                let e_lambda = Complex64::from_polar(1.0, lambda);
                let e_phi = Complex64::from_polar(1.0, phi);
                let e_phi_lambda = Complex64::from_polar(1.0, phi + lambda);
                self.apply_single(q.0, move |a, b| {
                    (c * a - e_lambda * s * b, e_phi * s * a + e_phi_lambda * c * b)
                });
            }
            Gate::Cx(c, t) => self.apply_controlled(c.0, t.0, |a, b| (b, a)),
            Gate::Cz(c, t) => self.apply_controlled(c.0, t.0, |a, b| (a, -b)),
            Gate::Ccx(c0, c1, t) => self.apply_doubly_controlled(c0.0, c1.0, t.0),
            Gate::Measure(..) | Gate::Barrier(_) => {}
        }
    }

    /// Apply a 2x2 unitary `f(amp_0, amp_1) -> (amp_0', amp_1')` to every
    /// pair of basis states differing only in bit `q`.
    fn apply_single<F>(&mut self, q: u32, f: F)
    where
        F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
    {
        let mask = 1usize << q;
        let dim = self.amplitudes.len();
        for i in 0..dim {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = f(self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = a;
                self.amplitudes[j] = b;
            }
        }
    }

    /// Apply a 2x2 unitary to `target` only on basis states where `control`
    /// is set.
    fn apply_controlled<F>(&mut self, control: u32, target: u32, f: F)
    where
        F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
    {
        let cmask = 1usize << control;
        let tmask = 1usize << target;
        let dim = self.amplitudes.len();
        for i in 0..dim {
            if i & cmask != 0 && i & tmask == 0 {
                let j = i | tmask;
                let (a, b) = f(self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = a;
                self.amplitudes[j] = b;
            }
        }
    }

    /// Toffoli: flip `target` where both controls are set.
    fn apply_doubly_controlled(&mut self, c0: u32, c1: u32, target: u32) {
        let c0mask = 1usize << c0;
        let c1mask = 1usize << c1;
        let tmask = 1usize << target;
        let dim = self.amplitudes.len();
        for i in 0..dim {
            if i & c0mask != 0 && i & c1mask != 0 && i & tmask == 0 {
                let j = i | tmask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// The squared-amplitude distribution over basis indices.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Verify `sum(|amp|^2) == 1` within [`NORM_TOLERANCE`].
    pub fn check_normalized(&self) -> CoreResult<()> {
        let total: f64 = self.amplitudes.iter().map(|a| a.norm_sqr()).sum();
        if !total.is_finite() {
            return Err(ErrorKind::NumericError(
                "statevector contains a non-finite amplitude".into(),
            ));
        }
        if (total - 1.0).abs() > NORM_TOLERANCE {
            return Err(ErrorKind::NumericError(format!(
                "statevector norm {total} deviates from 1 by more than {NORM_TOLERANCE}"
            )));
        }
        Ok(())
    }

    /// Collapse onto the subspace where qubit `q` reads `outcome`, then
    /// renormalise. Used by the projective measurement path.
    pub fn project(&mut self, q: u32, outcome: bool) {
        let mask = 1usize << q;
        let dim = self.amplitudes.len();
        for i in 0..dim {
            let bit_set = i & mask != 0;
            if bit_set != outcome {
                self.amplitudes[i] = Complex64::new(0.0, 0.0);
            }
        }
        let norm: f64 = self.amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            for a in &mut self.amplitudes {
                *a /= norm;
            }
        }
    }
}

/// Sample a basis index from a cumulative-probability walk over `probs`,
/// drawing one uniform variate from `u`.
pub fn sample_index(probs: &[f64], u: f64) -> usize {
    let mut acc = 0.0;
    for (i, p) in probs.iter().enumerate() {
        acc += p;
        if u < acc {
            return i;
        }
    }
    probs.len() - 1
}

//! Quantum execution core: algorithmic kernels.
//!
//! Circuit-building and closed-form primitives for the standard quantum
//! algorithms attack clients compose: the quantum Fourier transform, Shor's
//! period finding, Grover's search and its amplitude-amplification
//! generalisation, and classical-vs-quantum complexity estimates.

pub mod advantage;
pub mod grover;
pub mod mcz;
pub mod qft;
pub mod shor;

pub use advantage::{estimate_quantum_advantage, AdvantageKind, QuantumAdvantageEstimate};
pub use grover::{amplitude_amplification, grover_search, invert_sequence, optimal_iterations, GroverOutcome};
pub use qft::qft;
pub use shor::{shor_period_finding, ShorOutcome, MIN_CONSISTENT_SAMPLES};

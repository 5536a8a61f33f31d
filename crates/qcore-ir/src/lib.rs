//! Quantum execution core: circuit intermediate representation.
//!
//! A provider-agnostic representation of a quantum circuit as a fixed qubit
//! count, a fixed classical-bit count, and a closed-set instruction sequence.
//! There is no DAG, no symbolic parameters, and no custom-gate extension
//! point: every instruction a circuit can contain is a variant of [`Gate`],
//! so every consumer — the simulator, a provider's `translate`, the
//! dispatcher's capability check — matches on it exhaustively.
//!
//! # Example
//!
//! ```rust
//! use qcore_ir::Circuit;
//!
//! let mut circuit = Circuit::new("bell", 2, 2);
//! circuit.h(0).unwrap().cx(0, 1).unwrap();
//! circuit.measure(0, 0).unwrap().measure(1, 1).unwrap();
//!
//! assert_eq!(circuit.width(), 2);
//! assert!(circuit.has_measurements());
//! ```

pub mod circuit;
pub mod gate;
pub mod qubit;

pub use circuit::Circuit;
pub use gate::Gate;
pub use qubit::{ClbitId, QubitId};

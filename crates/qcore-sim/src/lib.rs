//! Quantum execution core: state-vector circuit simulator.
//!
//! Executes a [`qcore_ir::Circuit`] against a dense complex amplitude vector
//! and samples measurement outcomes, grounded on the same bit-mask-and-stride
//! gate application used by the workspace's other statevector code, but built
//! once per circuit rather than re-run per shot (see [`simulate`]).

pub mod simulate;
pub mod statevector;

pub use simulate::{simulate, simulate_with_mode, MeasurementMode, SimOutcome, MAX_SIM_QUBITS};
pub use statevector::Statevector;

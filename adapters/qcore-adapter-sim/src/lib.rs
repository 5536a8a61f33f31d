//! `LocalSimulator`: an in-process `Provider` that executes circuits
//! against `qcore-sim`'s state-vector simulator.
//!
//! # Example
//!
//! ```ignore
//! use qcore_adapter_sim::LocalSimulator;
//! use qcore_hal::{Credentials, Provider};
//! use qcore_ir::Circuit;
//!
//! let mut provider = LocalSimulator::new();
//! provider.initialize(Credentials::default())?;
//! let device = &provider.list_devices()?[0];
//! let circuit = Circuit::bell();
//! let handle = provider.submit(&device.name, &circuit, 1000)?;
//! let (state, result) = provider.poll(&handle)?;
//! ```

mod simulator;

pub use simulator::LocalSimulator;

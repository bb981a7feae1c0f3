//! Adapter implementations for task registry and executor ports.

pub mod memory;

mod simulated;

pub use simulated::SimulatedExecutor;

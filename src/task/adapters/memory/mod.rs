//! In-memory adapter implementations.
//!
//! The registry keeps every record in process memory; nothing survives a
//! restart.

mod task;

pub use task::InMemoryTaskRegistry;

//! Delegated task lifecycle management for Foreman.
//!
//! Callers delegate work described in free text; the manager admits it under
//! a concurrency cap, drives it through an external executor while racing
//! cancellation and a deadline, and answers status, listing, and statistics
//! queries from a bounded in-memory registry. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

//! Foreman: lifecycle and admission management for delegated tasks.
//!
//! A caller hands a unit of work to the manager, receives an identifier
//! immediately, and later polls for progress, lists tasks, or cancels them.
//! The manager bounds how many tasks may be active at once, enforces a
//! per-task deadline, and keeps a bounded history of finished tasks.
//!
//! # Architecture
//!
//! Foreman follows hexagonal architecture principles:
//!
//! - **Domain**: Task records, validated values, and the state machine
//! - **Ports**: Abstract registry and executor interfaces
//! - **Adapters**: In-memory registry and a simulated executor
//! - **Services**: Admission, the lifecycle engine, retention, and the
//!   manager boundary
//!
//! # Modules
//!
//! - [`task`]: Task delegation, tracking, and cancellation

pub mod task;

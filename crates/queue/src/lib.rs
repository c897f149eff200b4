//! Background job layer for versus.
//!
//! Periodic maintenance jobs (weekly rotation, contest closure, retention
//! cleanup, notification flush) driven by tokio intervals.

pub mod executor;
pub mod scheduler;

pub use executor::ServiceExecutor;
pub use scheduler::{JobExecutor, SchedulerConfig, run_scheduler};

//! Shared performance scaffolding used by the Criterion benches and the
//! scenario tests.
//!
//! Benches and tests pull their workloads from here so both measure the same
//! vectors for the same variant.

pub mod scenarios;

pub mod analysis;
pub mod config;
pub mod experiment;
pub mod harness;
pub mod plot;
pub mod report;
pub mod sort;
pub mod timer;
pub mod workload;

// Workloads shared by benches and scenario tests
pub mod perf;

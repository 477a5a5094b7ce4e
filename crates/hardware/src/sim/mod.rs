//! Top-level simulation drivers.
//!
//! Provides the co-simulation loops that advance the processor front-end
//! and one or two memory tiers, plus the factory that turns a configuration
//! into a frozen spec and a memory.

/// Driver loops and builders.
pub mod runner;

pub use runner::{
    build_memory, build_spec, run_cpu_trace, run_dram_trace, run_dram_trace_hybrid,
};

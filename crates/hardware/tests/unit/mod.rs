//! # Unit Tests
//!
//! This module organizes the fine-grained tests for the simulator's
//! components, mirroring the source tree.


/// Per-channel controller: scheduling, watermark hysteresis, refresh.
pub mod controller;

/// DRAM spec, node tree, and standard presets.
pub mod dram;

/// Memory tier: mapping and request routing.
pub mod memory;


/// Top-level drivers: DRAM-trace, hybrid, and CPU-trace loops.
pub mod sim;

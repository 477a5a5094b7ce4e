//! Cycle-accurate DRAM memory-system simulator library.
//!
//! This crate implements a trace-driven, cycle-accurate model of one or two
//! DRAM memory subsystems with the following:
//! 1. **DRAM model:** Organization hierarchy, command timing tables, and a
//!    flat node tree validating and advancing per-bank state every tick.
//! 2. **Controller:** Per-channel request queues, FR-FCFS-family
//!    scheduling, write-drain hysteresis, and refresh injection.
//! 3. **Standards:** Preset data for DDR3/DDR4, LPDDR3/4, GDDR5, HBM,
//!    WideIO/WideIO2, SALP-MASA, DSARP, ALDRAM, TLDRAM, STTMRAM, and PCM
//!    behind one factory.
//! 4. **Drivers:** DRAM-trace (single and hybrid fast/slow tier) and
//!    CPU-trace co-simulation loops with warmup and stats lifecycle.
//! 5. **Statistics:** A deterministic registry of named scalars and
//!    histograms printed at shutdown.
//!
//! The engine is single-threaded and cooperatively ticked; every component
//! advances only through explicit `tick()` calls from a driver.

/// Common types (user-facing error taxonomy).
pub mod common;
/// Simulator configuration (defaults, enums, key=value loader).
pub mod config;
/// Per-channel memory controller, scheduler, and refresh pacing.
pub mod controller;
/// DRAM spec, node tree, and standard presets.
pub mod dram;
/// Per-tier memory: mapping and controller fan-out.
pub mod memory;
/// Trace-driven processor front-end.
pub mod processor;
/// Memory request value object and completion hooks.
pub mod request;
/// Top-level simulation drivers.
pub mod sim;
/// Statistics registry, clock, and warmup gate.
pub mod stats;
/// DRAM and CPU trace readers.
pub mod trace;

/// Root configuration type; load with `Config::from_file`.
pub use crate::config::Config;
/// Per-channel controller; owned by a `Memory`.
pub use crate::controller::Controller;
/// One memory tier; construct with `sim::build_memory`.
pub use crate::memory::Memory;
/// Trace-driven multicore front-end for CPU mode.
pub use crate::processor::Processor;
/// Memory operation value object.
pub use crate::request::Request;
/// Statistics registry handle.
pub use crate::stats::StatList;

//! DRAM organization, timing, and state modeling.
//!
//! This module organizes the standard-independent machinery of the
//! simulator:
//! 1. **Spec:** Hierarchy levels, command kinds, and timing tables.
//! 2. **Node tree:** Per-channel timing state and the bank state machine.
//! 3. **Standards:** Preset tables and builders for every supported
//!    standard.

/// Flat node tree: decode, check, and update.
pub mod node;

/// Levels, commands, timing entries, and the spec type.
pub mod spec;

/// Per-standard organization and speed presets.
pub mod standards;

pub use node::{DramTree, NodeState};
pub use spec::{Command, DramSpec, Level, RefreshMode, TimingEntry, TimingParams};

//! DRAM model tests: spec tables, node tree behavior, standard presets.


/// Spec: predicates, scopes, latencies, and timing-table structure.
pub mod spec;

/// Standard factory and preset coverage.
pub mod standards;

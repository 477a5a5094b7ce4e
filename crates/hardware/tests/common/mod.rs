//! Shared fixtures and helpers for the test suite.

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use dramsim_core::Memory;
use dramsim_core::config::Config;
use dramsim_core::controller::Controller;
use dramsim_core::dram::{Command, DramSpec, DramTree};
use dramsim_core::sim::{build_memory, build_spec};
use dramsim_core::stats::StatList;

/// Minimal config for `standard` with every other key at its default.
pub fn config(standard: &str) -> Config {
    serde_json::from_value(serde_json::json!({ "standard": standard }))
        .expect("test config must deserialize")
}

/// Frozen spec for a config.
pub fn spec(cfg: &Config) -> Arc<DramSpec> {
    build_spec(cfg).expect("test spec must build")
}

/// One-tier memory registered under the `memory` prefix.
pub fn memory(cfg: &Config, stats: &StatList) -> Memory {
    build_memory(cfg, stats, "memory").expect("test memory must build")
}

/// Standalone channel-0 controller for a config.
pub fn controller(cfg: &Config, stats: &StatList) -> Controller {
    Controller::new(cfg, spec(cfg), 0, stats, "memory.ch0")
}

/// Ticks the memory until nothing is pending, bounded by `limit` cycles.
pub fn drain(memory: &mut Memory, stats: &StatList, limit: u64) {
    for _ in 0..limit {
        if memory.pending_requests() == 0 {
            return;
        }
        memory.tick();
        stats.tick();
    }
    panic!("memory did not drain within {limit} cycles");
}

/// Writes `lines` to a temp file and returns it (the path lives as long as
/// the returned handle).
pub fn trace_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp trace");
    for line in lines {
        writeln!(file, "{line}").expect("write trace line");
    }
    file.flush().expect("flush trace");
    file
}

/// Full-length coordinate for a spec from the indices after the channel.
///
/// Missing trailing indices stay zero, so `coord(&spec, &[0, 2])` addresses
/// rank 0, bank 2, row 0, column 0 on a bank-grouped standard's behalf.
pub fn coord(spec: &DramSpec, tail: &[usize]) -> Vec<usize> {
    let mut out = vec![0; spec.levels.len()];
    out[1..=tail.len()].copy_from_slice(tail);
    out
}

/// Advances `clk` until `cmd` is legal, issues it, and returns the issue
/// cycle.
pub fn issue_when_legal(tree: &mut DramTree, cmd: Command, coord: &[usize], from: u64) -> u64 {
    let mut clk = from;
    while !tree.check(cmd, coord, clk) {
        clk += 1;
        assert!(clk < from + 1_000_000, "command {cmd:?} never became legal");
    }
    tree.update(cmd, coord, clk);
    clk
}

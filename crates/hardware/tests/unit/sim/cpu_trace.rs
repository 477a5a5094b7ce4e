//! # CPU-Trace Driver Tests
//!
//! Exercises warmup, the stats reset, the cpu_tick/mem_tick interleave, and
//! all three termination modes over small in-file traces.

use pretty_assertions::assert_eq;

use dramsim_core::sim::run_cpu_trace;
use dramsim_core::stats::StatList;

use crate::common::{self, trace_file};

/// Five bubbles and three reads, one with a writeback: eight instructions.
fn small_trace() -> tempfile::NamedTempFile {
    trace_file(&["2 0", "3 64", "0 192 256"])
}

#[test]
fn a_trace_runs_to_completion_and_counts_instructions() {
    let trace = small_trace();
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("run");

    assert_eq!(stats.value("cpu.core0.insts"), Some(8.0));
    assert_eq!(mem.pending_requests(), 0, "default mode drains memory");
    assert!(stats.warmup_complete());
}

#[test]
fn each_trace_file_gets_its_own_core() {
    let t0 = small_trace();
    let t1 = small_trace();
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[
            t0.path().to_str().unwrap().to_string(),
            t1.path().to_str().unwrap().to_string(),
        ],
        &stats,
    )
    .expect("run");

    assert_eq!(stats.value("cpu.core0.insts"), Some(8.0));
    assert_eq!(stats.value("cpu.core1.insts"), Some(8.0));
}

#[test]
fn warmup_resets_statistics_before_the_steady_phase() {
    let trace = small_trace();
    let mut cfg = common::config("DDR3");
    cfg.warmup_insts = 5;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("run");

    assert!(stats.warmup_complete());
    let insts = stats.value("cpu.core0.insts").expect("registered");
    assert!(
        insts < 8.0,
        "warmup-phase instructions ({insts}) must not survive the reset"
    );
    assert_eq!(mem.pending_requests(), 0);
}

#[test]
fn trace_exhaustion_during_warmup_skips_to_steady_state() {
    let trace = small_trace();
    let mut cfg = common::config("DDR3");
    cfg.warmup_insts = 1_000_000;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("an exhausted warmup is a warning, not an error");
    assert!(stats.warmup_complete());
    assert_eq!(mem.pending_requests(), 0);
}

#[test]
fn weighted_speedup_mode_stops_at_the_instruction_limit() {
    let trace = small_trace();
    let mut cfg = common::config("DDR3");
    cfg.expected_limit_insts = 50;
    cfg.calc_weighted_speedup = true;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("run");

    let insts = stats.value("cpu.core0.insts").expect("registered");
    assert!(
        insts >= 50.0,
        "the wrapped trace must reach the instruction budget, got {insts}"
    );
}

#[test]
fn early_exit_stops_without_draining() {
    let trace = small_trace();
    let mut cfg = common::config("DDR3");
    cfg.early_exit = true;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("run");
    assert_eq!(stats.value("cpu.core0.insts"), Some(8.0));
}

#[test]
fn cpu_runs_faster_than_memory_by_the_tick_ratio() {
    let trace = small_trace();
    let mut cfg = common::config("DDR3");
    cfg.cpu_tick = 4;
    cfg.mem_tick = 1;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_cpu_trace(
        &cfg,
        &mut mem,
        &[trace.path().to_str().unwrap().to_string()],
        &stats,
    )
    .expect("run");

    let cpu_cycles = stats.value("cpu.cycles").expect("registered");
    let mem_cycles = stats.value("memory.ch0.cycles").expect("registered");
    assert!(
        cpu_cycles > mem_cycles,
        "cpu ({cpu_cycles}) ticks more often than memory ({mem_cycles})"
    );
    assert!(cpu_cycles <= 4.0 * (mem_cycles + 4.0));
}

//! # DRAM-Trace Driver Tests
//!
//! Runs small traces end to end through the single-tier and hybrid loops
//! and checks completion counts, drain behavior, latency ordering, tier
//! routing, and byte-for-byte replay determinism.

use pretty_assertions::assert_eq;

use dramsim_core::request::{Reply, Request, RequestKind};
use dramsim_core::sim::{run_dram_trace, run_dram_trace_hybrid};
use dramsim_core::stats::StatList;

use crate::common::{self, trace_file};

fn stat_line(stats: &StatList, name: &str) -> Option<String> {
    let mut out = Vec::new();
    stats.print_all(&mut out).expect("print");
    String::from_utf8(out)
        .expect("utf8")
        .lines()
        .find(|l| l.starts_with(name))
        .map(str::to_string)
}

#[test]
fn a_single_read_completes_and_drains() {
    let trace = trace_file(&["0 R"]);
    let cfg = common::config("DDR4");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_dram_trace(&mut mem, trace.path().to_str().unwrap(), &stats).expect("run");

    assert_eq!(stats.value("trace.reads"), Some(1.0));
    assert_eq!(stats.value("trace.writes"), Some(0.0));
    assert_eq!(mem.pending_requests(), 0);
    let total = stat_line(&stats, "trace.request_latency.total").expect("histogram printed");
    assert!(
        total.split_whitespace().nth(1) == Some("1"),
        "exactly one latency sample: {total}"
    );
}

#[test]
fn hex_addresses_parse() {
    let trace = trace_file(&["0x40 R", "0x80 W"]);
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_dram_trace(&mut mem, trace.path().to_str().unwrap(), &stats).expect("run");
    assert_eq!(stats.value("trace.reads"), Some(1.0));
    assert_eq!(stats.value("trace.writes"), Some(1.0));
}

#[test]
fn malformed_trace_lines_are_reported() {
    let trace = trace_file(&["0 X"]);
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);
    assert!(run_dram_trace(&mut mem, trace.path().to_str().unwrap(), &stats).is_err());
}

#[test]
fn a_write_only_trace_drains_past_the_watermark() {
    let lines: Vec<String> = (0..40).map(|i| format!("{} W", i * 64)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let trace = trace_file(&refs);
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    run_dram_trace(&mut mem, trace.path().to_str().unwrap(), &stats).expect("run");
    assert_eq!(stats.value("trace.writes"), Some(40.0));
    assert_eq!(mem.pending_requests(), 0, "end-of-trace drain must empty the queues");
}

#[test]
fn open_row_hits_are_faster_than_misses_and_conflicts() {
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let miss = stats.histogram("probe.miss", "cold access");
    let hit = stats.histogram("probe.hit", "same-row access");
    let conflict = stats.histogram("probe.conflict", "row-conflict access");
    let mut mem = common::memory(&cfg, &stats);

    let row_stride = 1 << 16; // first row bit under the default mapping
    mem.send(Request::new(0, RequestKind::Read, Reply::Latency(miss.clone())))
        .expect("accepted");
    common::drain(&mut mem, &stats, 100_000);
    mem.send(Request::new(64, RequestKind::Read, Reply::Latency(hit.clone())))
        .expect("accepted");
    common::drain(&mut mem, &stats, 100_000);
    mem.send(Request::new(
        row_stride,
        RequestKind::Read,
        Reply::Latency(conflict.clone()),
    ))
    .expect("accepted");
    common::drain(&mut mem, &stats, 100_000);

    assert!(
        hit.mean() < miss.mean(),
        "row hit ({}) must undercut the cold miss ({})",
        hit.mean(),
        miss.mean()
    );
    assert!(
        hit.mean() < conflict.mean(),
        "row hit ({}) must undercut the conflict ({})",
        hit.mean(),
        conflict.mean()
    );
    assert_eq!(stats.value("memory.ch0.row_hits"), Some(1.0));
    assert_eq!(stats.value("memory.ch0.row_misses"), Some(1.0));
    assert_eq!(stats.value("memory.ch0.row_conflicts"), Some(1.0));
}

#[test]
fn bank_parallel_reads_interleave_without_precharging() {
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);
    let spec = std::sync::Arc::clone(mem.spec());

    // Same rank and row index, adjacent banks, via the inverse mapping.
    let a = mem.encode_addr(&common::coord(&spec, &[0, 0, 0, 0]));
    let b = mem.encode_addr(&common::coord(&spec, &[0, 1, 0, 0]));
    let hist = stats.histogram("probe", "bank-parallel latency");
    mem.send(Request::new(a, RequestKind::Read, Reply::Latency(hist.clone())))
        .expect("accepted");
    mem.send(Request::new(b, RequestKind::Read, Reply::Latency(hist.clone())))
        .expect("accepted");
    common::drain(&mut mem, &stats, 100_000);

    assert_eq!(hist.total(), 2);
    assert_eq!(
        stats.value("memory.ch0.row_conflicts"),
        Some(0.0),
        "neither access precharges the other"
    );
    assert_eq!(stats.value("memory.ch0.row_misses"), Some(2.0));
}

#[test]
fn identical_runs_produce_identical_stats_bytes() {
    let lines: Vec<String> = (0..24)
        .map(|i| format!("{} {}", i * 4096, if i % 3 == 0 { "W" } else { "R" }))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let trace = trace_file(&refs);

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let cfg = common::config("DDR4");
        let stats = StatList::new();
        let mut mem = common::memory(&cfg, &stats);
        run_dram_trace(&mut mem, trace.path().to_str().unwrap(), &stats).expect("run");
        let mut out = Vec::new();
        stats.print_all(&mut out).expect("print");
        outputs.push(out);
    }
    assert_eq!(outputs[0], outputs[1], "replay must be byte-for-byte identical");
}

#[test]
fn hybrid_routes_each_tier_by_address_range() {
    let mut fast_cfg = common::config("DDR3");
    fast_cfg.org = "DDR3_1Gb_x8".to_string();
    let slow_cfg = common::config("PCM");
    let stats = StatList::new();
    let mut fast = common::memory(&fast_cfg, &stats);
    let mut slow =
        dramsim_core::sim::build_memory(&slow_cfg, &stats, "memory2").expect("slow tier");
    assert_eq!(fast.max_address, 1 << 30);

    let boundary = fast.max_address;
    let lines = ["0 R".to_string(), format!("{boundary} R")];
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let trace = trace_file(&refs);

    run_dram_trace_hybrid(&mut fast, &mut slow, trace.path().to_str().unwrap(), &stats)
        .expect("run");

    assert_eq!(stats.value("memory.incoming_reads"), Some(1.0));
    assert_eq!(stats.value("memory2.incoming_reads"), Some(1.0));
    assert_eq!(fast.pending_requests(), 0);
    assert_eq!(slow.pending_requests(), 0);
    assert_eq!(stats.value("trace.reads"), Some(2.0));
}

#[test]
#[should_panic(expected = "outside both tiers")]
fn hybrid_rejects_addresses_beyond_both_tiers() {
    let mut fast_cfg = common::config("DDR3");
    fast_cfg.org = "DDR3_1Gb_x8".to_string();
    let mut slow_cfg = common::config("DDR3");
    slow_cfg.org = "DDR3_1Gb_x8".to_string();
    let stats = StatList::new();
    let mut fast = common::memory(&fast_cfg, &stats);
    let mut slow =
        dramsim_core::sim::build_memory(&slow_cfg, &stats, "memory2").expect("slow tier");

    let beyond = fast.max_address + slow.max_address;
    let line = format!("{beyond} R");
    let trace = trace_file(&[line.as_str()]);
    let _ = run_dram_trace_hybrid(&mut fast, &mut slow, trace.path().to_str().unwrap(), &stats);
}

//! Simulation driver loops.
//!
//! Three loops cover the supported modes:
//! 1. **DRAM trace, single tier:** one request per trace line; a rejected
//!    send stalls the line and retries next tick; after the trace ends the
//!    write watermark drops to zero to force a drain.
//! 2. **DRAM trace, hybrid:** the same loop with address-ranged routing
//!    between a fast and a slow tier.
//! 3. **CPU trace:** warmup at full CPU cadence with stats discarded at the
//!    end, then a steady phase interleaving CPU and memory ticks in the
//!    configured ratio with three termination modes.
//!
//! The global tick counter advances at exactly one point in each loop;
//! no component mutates it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::SimError;
use crate::config::Config;
use crate::dram::{DramSpec, standards};
use crate::memory::Memory;
use crate::processor::Processor;
use crate::request::{Reply, Request, RequestKind};
use crate::stats::StatList;
use crate::trace::DramTrace;

/// Builds and freezes the spec for one tier.
///
/// The org and speed presets come from the standard's tables; channel,
/// rank, and (where present) subarray counts come from the config. After
/// this point the spec is immutable and shared by every controller of the
/// tier.
///
/// # Errors
///
/// Unknown org or speed preset names.
pub fn build_spec(cfg: &Config) -> Result<Arc<DramSpec>, SimError> {
    let mut spec = standards::build(cfg)?;
    spec.set_channels(cfg.channels);
    spec.set_ranks(cfg.ranks);
    spec.set_subarrays(cfg.subarrays);
    info!(
        standard = %spec.standard,
        org = %spec.org,
        speed = %spec.speed,
        channels = cfg.channels,
        ranks = cfg.ranks,
        "spec assembled"
    );
    Ok(Arc::new(spec))
}

/// Builds one memory tier, registering its statistics under `prefix`.
///
/// # Errors
///
/// Spec construction errors.
pub fn build_memory(cfg: &Config, stats: &StatList, prefix: &str) -> Result<Memory, SimError> {
    let spec = build_spec(cfg)?;
    Ok(Memory::new(cfg, spec, stats, prefix))
}

/// Runs a DRAM request trace against a single tier.
///
/// # Errors
///
/// Trace reading errors.
pub fn run_dram_trace(
    memory: &mut Memory,
    trace_path: &str,
    stats: &StatList,
) -> Result<(), SimError> {
    let mut trace = DramTrace::open(trace_path)?;
    let latency = stats.histogram("trace.request_latency", "Request round-trip latency (cycles)");
    let reads = stats.scalar("trace.reads", "Read requests accepted from the trace");
    let writes = stats.scalar("trace.writes", "Write requests accepted from the trace");

    let mut stalled: Option<Request> = None;
    let mut end = false;
    while !end || stalled.is_some() || memory.pending_requests() > 0 {
        if !end && stalled.is_none() {
            match trace.next()? {
                Some((addr, kind)) => {
                    stalled = Some(Request::new(addr, kind, Reply::Latency(latency.clone())));
                }
                None => {
                    end = true;
                    debug!("trace exhausted; draining write queues");
                }
            }
        }
        if let Some(req) = stalled.take() {
            let kind = req.kind;
            match memory.send(req) {
                Ok(()) => match kind {
                    RequestKind::Read => reads.inc(),
                    RequestKind::Write => writes.inc(),
                    RequestKind::Refresh => {}
                },
                Err(req) => stalled = Some(req),
            }
        }
        if end {
            memory.set_high_writeq_watermark(0.0);
        }
        memory.tick();
        stats.tick();
    }
    memory.finish();
    Ok(())
}

/// Runs a DRAM request trace against a fast and a slow tier.
///
/// Addresses below the fast tier's capacity route there; addresses up to
/// the combined capacity route to the slow tier, rebased to its address
/// space. Anything beyond is fatal. Neither tier stalls the other: a
/// rejected send stalls only the trace line.
///
/// # Errors
///
/// Trace reading errors.
///
/// # Panics
///
/// When a trace address lies outside both tiers.
pub fn run_dram_trace_hybrid(
    fast: &mut Memory,
    slow: &mut Memory,
    trace_path: &str,
    stats: &StatList,
) -> Result<(), SimError> {
    let mut trace = DramTrace::open(trace_path)?;
    let latency = stats.histogram("trace.request_latency", "Request round-trip latency (cycles)");
    let reads = stats.scalar("trace.reads", "Read requests accepted from the trace");
    let writes = stats.scalar("trace.writes", "Write requests accepted from the trace");

    let mut stalled: Option<Request> = None;
    let mut end = false;
    while !end || stalled.is_some() || fast.pending_requests() > 0 || slow.pending_requests() > 0 {
        if !end && stalled.is_none() {
            match trace.next()? {
                Some((addr, kind)) => {
                    stalled = Some(Request::new(addr, kind, Reply::Latency(latency.clone())));
                }
                None => {
                    end = true;
                    debug!("trace exhausted; draining write queues");
                }
            }
        }
        if let Some(req) = stalled.take() {
            let kind = req.kind;
            let sent = if req.addr < fast.max_address {
                fast.send(req)
            } else if req.addr < fast.max_address + slow.max_address {
                let mut rebased = req;
                rebased.addr -= fast.max_address;
                slow.send(rebased).map_err(|mut r| {
                    r.addr += fast.max_address;
                    r
                })
            } else {
                tracing::error!(addr = req.addr, "address outside both tiers");
                panic!(
                    "run_dram_trace_hybrid: address {:#x} outside both tiers",
                    req.addr
                );
            };
            match sent {
                Ok(()) => match kind {
                    RequestKind::Read => reads.inc(),
                    RequestKind::Write => writes.inc(),
                    RequestKind::Refresh => {}
                },
                Err(req) => stalled = Some(req),
            }
        }
        if end {
            fast.set_high_writeq_watermark(0.0);
            slow.set_high_writeq_watermark(0.0);
        }
        fast.tick();
        slow.tick();
        stats.tick();
    }
    fast.finish();
    slow.finish();
    Ok(())
}

/// Runs CPU instruction traces behind the processor front-end.
///
/// Warmup ticks the CPU every cycle and the memory `mem_tick` times every
/// `cpu_tick` CPU cycles, until every core has committed at least
/// `warmup_insts` instructions; statistics then reset and the warmup gate
/// flips. The steady phase interleaves over a `cpu_tick * mem_tick` window
/// and terminates per the configured mode. In weighted-speedup mode the
/// loop exits at the instruction limit without draining pending memory
/// requests; the metric is defined over a fixed instruction count.
///
/// # Errors
///
/// Trace loading errors.
pub fn run_cpu_trace(
    cfg: &Config,
    memory: &mut Memory,
    trace_paths: &[String],
    stats: &StatList,
) -> Result<(), SimError> {
    let mut proc = Processor::new(cfg, trace_paths, stats)?;
    let cpu_tick = cfg.cpu_tick.max(1);
    let mem_tick = cfg.mem_tick.max(1);

    if cfg.warmup_insts > 0 {
        let mut i: u64 = 0;
        loop {
            proc.tick(memory);
            stats.tick();
            if i % cpu_tick == cpu_tick - 1 {
                for _ in 0..mem_tick {
                    memory.tick();
                }
            }
            i += 1;

            let warm = proc.cores.iter().all(|c| c.insts() >= cfg.warmup_insts);
            if warm {
                break;
            }
            if proc.has_reached_limit() {
                warn!(
                    "input trace ended during warmup; consider lowering warmup_insts"
                );
                break;
            }
        }
    }

    stats.set_warmup_complete();
    info!("warmup complete; resetting statistics");
    stats.reset_all();
    proc.reset_stats();
    assert_eq!(proc.get_insts(), 0, "stats reset must zero committed counts");

    let tick_mult = cpu_tick * mem_tick;
    let mut i: u64 = 0;
    loop {
        if (i % tick_mult) % mem_tick == 0 {
            proc.tick(memory);
            stats.tick();

            if cfg.calc_weighted_speedup {
                if proc.has_reached_limit() {
                    break;
                }
            } else if cfg.early_exit {
                if proc.finished() {
                    break;
                }
            } else if proc.finished() && memory.pending_requests() == 0 {
                break;
            }
        }
        if (i % tick_mult) % cpu_tick == 0 {
            memory.tick();
        }
        i += 1;
    }
    memory.finish();
    Ok(())
}

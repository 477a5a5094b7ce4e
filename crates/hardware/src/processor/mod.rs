//! Trace-driven processor front-end.
//!
//! The front-end replays one instruction trace per core against the memory
//! system. Each core models only what the memory sees: an in-order issue
//! window of bounded depth, a fixed retire width, loads that hold their
//! window slot until the data returns, and writebacks that fire and forget.
//! Everything finer (caches, branch prediction, actual ROB mechanics) is
//! out of scope; the drivers consume the contract `tick`, `finished`,
//! `has_reached_limit`, `get_insts`, and `reset_stats`.

use tracing::debug;

use crate::common::SimError;
use crate::config::Config;
use crate::memory::Memory;
use crate::request::{CoreInbox, Request};
use crate::stats::{Scalar, StatList};
use crate::trace::CpuTrace;

/// Issue width and retire width per core, instructions per cycle.
const IPC: usize = 4;

/// In-flight window depth per core.
const WINDOW_DEPTH: usize = 128;

/// Bounded in-order window of issued, not yet retired instructions.
#[derive(Debug)]
struct Window {
    ready: Vec<bool>,
    addrs: Vec<u64>,
    head: usize,
    tail: usize,
    load: usize,
}

impl Window {
    fn new(depth: usize) -> Self {
        Self {
            ready: vec![false; depth],
            addrs: vec![0; depth],
            head: 0,
            tail: 0,
            load: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.load == self.ready.len()
    }

    fn is_empty(&self) -> bool {
        self.load == 0
    }

    fn insert(&mut self, ready: bool, addr: u64) {
        debug_assert!(!self.is_full());
        self.ready[self.tail] = ready;
        self.addrs[self.tail] = addr;
        self.tail = (self.tail + 1) % self.ready.len();
        self.load += 1;
    }

    /// Retires up to `max` ready instructions from the head, in order.
    fn retire(&mut self, max: usize) -> usize {
        let mut retired = 0;
        while retired < max && self.load > 0 && self.ready[self.head] {
            self.head = (self.head + 1) % self.ready.len();
            self.load -= 1;
            retired += 1;
        }
        retired
    }

    /// Marks every entry whose line matches the completed address ready.
    fn set_ready(&mut self, addr: u64, mask: u64) {
        let depth = self.ready.len();
        let mut i = self.head;
        for _ in 0..self.load {
            if self.addrs[i] & mask == addr & mask {
                self.ready[i] = true;
            }
            i = (i + 1) % depth;
        }
    }
}

/// One trace-replaying core.
#[derive(Debug)]
pub struct Core {
    /// Core index, also the request `core` tag.
    pub id: usize,
    window: Window,
    trace: CpuTrace,
    inbox: CoreInbox,
    line_mask: u64,
    bubbles: u64,
    current: Option<crate::trace::CpuRecord>,
    pending_writeback: Option<u64>,
    retired: u64,
    expected_limit: u64,
    insts_stat: Scalar,
}

impl Core {
    fn new(
        id: usize,
        mut trace: CpuTrace,
        line_mask: u64,
        expected_limit: u64,
        stats: &StatList,
    ) -> Self {
        let current = trace.next();
        let bubbles = current.map_or(0, |r| r.bubbles);
        Self {
            id,
            window: Window::new(WINDOW_DEPTH),
            trace,
            inbox: CoreInbox::new(),
            line_mask,
            bubbles,
            current,
            pending_writeback: None,
            retired: 0,
            expected_limit,
            insts_stat: stats.scalar(
                &format!("cpu.core{id}.insts"),
                "Instructions committed by this core",
            ),
        }
    }

    /// Committed instructions since the last stats reset.
    pub fn insts(&self) -> u64 {
        self.retired
    }

    /// Whether this core can produce no further work.
    pub fn finished(&self) -> bool {
        if self.expected_limit > 0 {
            return self.retired >= self.expected_limit;
        }
        self.current.is_none() && self.pending_writeback.is_none() && self.window.is_empty()
    }

    /// Whether this core has hit its budget (or, without one, its trace
    /// end).
    pub fn has_reached_limit(&self) -> bool {
        if self.expected_limit > 0 {
            self.retired >= self.expected_limit
        } else {
            self.current.is_none()
        }
    }

    fn reset_stats(&mut self) {
        self.retired = 0;
        self.insts_stat.set(0.0);
    }

    fn advance_record(&mut self) {
        self.current = self.trace.next();
        self.bubbles = self.current.map_or(0, |r| r.bubbles);
    }

    fn tick(&mut self, mem: &mut Memory) {
        while let Some(addr) = self.inbox.pop() {
            self.window.set_ready(addr, self.line_mask);
        }
        self.retired += self.window.retire(IPC) as u64;
        self.insts_stat.set(self.retired as f64);

        let mut issued = 0;
        while issued < IPC {
            if let Some(wb) = self.pending_writeback {
                match mem.send(Request::write(wb)) {
                    Ok(()) => self.pending_writeback = None,
                    Err(_) => break,
                }
            }
            if self.bubbles > 0 {
                if self.window.is_full() {
                    break;
                }
                self.window.insert(true, 0);
                self.bubbles -= 1;
                issued += 1;
                continue;
            }
            let Some(record) = self.current else { break };
            if self.window.is_full() {
                break;
            }
            match mem.send(Request::read(record.addr, self.id, self.inbox.clone())) {
                Ok(()) => {}
                Err(_) => break,
            }
            self.window.insert(false, record.addr);
            issued += 1;
            self.pending_writeback = record.writeback;
            self.advance_record();
        }
    }
}

/// The multicore front-end the CPU-trace driver advances.
#[derive(Debug)]
pub struct Processor {
    /// Cores in trace-file order.
    pub cores: Vec<Core>,
    cycles: u64,
    cycles_stat: Scalar,
}

impl Processor {
    /// Builds one core per trace file.
    ///
    /// With `calc_weighted_speedup` or a nonzero instruction budget, traces
    /// wrap so every core reaches the budget.
    ///
    /// # Errors
    ///
    /// Trace loading errors.
    pub fn new(cfg: &Config, trace_paths: &[String], stats: &StatList) -> Result<Self, SimError> {
        let wrap = cfg.expected_limit_insts > 0;
        let line_mask = !63u64;
        let mut cores = Vec::with_capacity(trace_paths.len());
        for (id, path) in trace_paths.iter().enumerate() {
            let trace = CpuTrace::load(path, wrap)?;
            debug!(core = id, records = trace.len(), "loaded cpu trace");
            cores.push(Core::new(
                id,
                trace,
                line_mask,
                cfg.expected_limit_insts,
                stats,
            ));
        }
        Ok(Self {
            cores,
            cycles: 0,
            cycles_stat: stats.scalar("cpu.cycles", "CPU cycles simulated"),
        })
    }

    /// Builds a processor from in-memory traces; used by the test suite.
    pub fn from_traces(traces: Vec<CpuTrace>, expected_limit: u64, stats: &StatList) -> Self {
        let cores = traces
            .into_iter()
            .enumerate()
            .map(|(id, trace)| Core::new(id, trace, !63u64, expected_limit, stats))
            .collect();
        Self {
            cores,
            cycles: 0,
            cycles_stat: stats.scalar("cpu.cycles", "CPU cycles simulated"),
        }
    }

    /// Advances every core by one CPU cycle.
    pub fn tick(&mut self, mem: &mut Memory) {
        self.cycles += 1;
        self.cycles_stat.set(self.cycles as f64);
        for core in &mut self.cores {
            core.tick(mem);
        }
    }

    /// Whether every core is finished.
    pub fn finished(&self) -> bool {
        self.cores.iter().all(Core::finished)
    }

    /// Whether every core has hit its instruction budget or trace end.
    pub fn has_reached_limit(&self) -> bool {
        self.cores.iter().all(Core::has_reached_limit)
    }

    /// Total committed instructions across cores.
    pub fn get_insts(&self) -> u64 {
        self.cores.iter().map(Core::insts).sum()
    }

    /// Zeroes per-core instruction counts and the cycle counter.
    pub fn reset_stats(&mut self) {
        self.cycles = 0;
        self.cycles_stat.set(0.0);
        for core in &mut self.cores {
            core.reset_stats();
        }
    }
}

//! Per-channel memory controller.
//!
//! One controller owns one channel: its request queues, its DRAM node tree,
//! and the in-flight list of reads waiting for data. Each memory tick runs
//! the stages in a fixed, observable order:
//! 1. **Retire** in-flight commands whose completion cycle has arrived.
//! 2. **Refresh** injection at the cadence the spec dictates.
//! 3. **Write-drain hysteresis** between read and write service modes.
//! 4. **Schedule** one candidate from the active queue.
//! 5. **Issue** the candidate's next required command if timing-legal.
//!
//! A full queue is back-pressure, reported through `send`'s return value.
//! Everything else that can go wrong inside the controller is a programming
//! error and aborts.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use crate::config::Config;
use crate::dram::{Command, DramSpec, DramTree};
use crate::request::{Request, RequestKind};
use crate::stats::{Scalar, StatList};

/// Refresh pacing.
pub mod refresh;

/// Scheduling policies.
pub mod scheduler;

use refresh::{Refresh, RefreshTarget};
use scheduler::Scheduler;

/// Bounded FIFO-insertion request queue.
///
/// Insertion order is arrival order; extraction order is up to the
/// scheduling policy.
#[derive(Debug, Default)]
pub struct Queue {
    entries: Vec<Request>,
    max: usize,
}

impl Queue {
    fn new(max: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max),
            max,
        }
    }

    /// Current occupancy.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue holds no requests.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the queue can accept no further requests.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.max
    }

    /// Queued requests in arrival order.
    pub fn requests(&self) -> &[Request] {
        &self.entries
    }

    fn push(&mut self, req: Request) {
        debug_assert!(!self.is_full());
        self.entries.push(req);
    }

    fn remove(&mut self, index: usize) -> Request {
        self.entries.remove(index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueueSel {
    Read,
    Write,
    Other,
}

/// Memory controller for one channel.
pub struct Controller {
    channel: usize,
    spec: Arc<DramSpec>,
    /// Timing and row-buffer state for this channel.
    pub tree: DramTree,
    clk: u64,
    readq: Queue,
    writeq: Queue,
    otherq: Queue,
    pending: VecDeque<Request>,
    scheduler: Scheduler,
    refresh: Refresh,
    write_mode: bool,
    high_watermark: f32,
    low_watermark: f32,

    read_reqs: Scalar,
    write_reqs: Scalar,
    forwarded_reads: Scalar,
    row_hits: Scalar,
    row_misses: Scalar,
    row_conflicts: Scalar,
    refreshes: Scalar,
    read_latency_sum: Scalar,
    served_reads: Scalar,
    served_writes: Scalar,
    cycles: Scalar,
}

impl Controller {
    /// Creates the controller for `channel`, registering its statistics
    /// under `prefix`.
    ///
    /// The spec must be frozen (channel and rank counts written).
    pub fn new(
        cfg: &Config,
        spec: Arc<DramSpec>,
        channel: usize,
        stats: &StatList,
        prefix: &str,
    ) -> Self {
        let tree = DramTree::new(Arc::clone(&spec));
        let refresh = Refresh::new(&spec, cfg.ranks);
        let stat = |name: &str, desc: &str| stats.scalar(&format!("{prefix}.{name}"), desc);
        Self {
            channel,
            tree,
            clk: 0,
            readq: Queue::new(cfg.readq_entries),
            writeq: Queue::new(cfg.writeq_entries),
            otherq: Queue::new(cfg.otherq_entries),
            pending: VecDeque::new(),
            scheduler: Scheduler::new(cfg.scheduler, cfg.scheduler_cap),
            refresh,
            write_mode: false,
            high_watermark: cfg.high_writeq_watermark,
            low_watermark: cfg.low_writeq_watermark,
            read_reqs: stat("read_requests", "Read requests accepted"),
            write_reqs: stat("write_requests", "Write requests accepted"),
            forwarded_reads: stat("forwarded_reads", "Reads served from the write queue"),
            row_hits: stat("row_hits", "Requests whose first command was the access itself"),
            row_misses: stat("row_misses", "Requests whose first command was an activate"),
            row_conflicts: stat("row_conflicts", "Requests whose first command was a precharge"),
            refreshes: stat("refreshes", "Refresh commands issued"),
            read_latency_sum: stat("read_latency_sum", "Sum of read round-trip latencies"),
            served_reads: stat("served_reads", "Column reads served by the banks"),
            served_writes: stat("served_writes", "Column writes served by the banks"),
            cycles: stat("cycles", "Memory cycles simulated by this controller"),
            spec,
        }
    }

    /// Channel index within the owning memory.
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Cycles this controller has ticked.
    pub fn clk(&self) -> u64 {
        self.clk
    }

    /// Whether the controller is currently draining writes.
    pub fn write_mode(&self) -> bool {
        self.write_mode
    }

    /// Read queue occupancy.
    pub fn read_queue_len(&self) -> usize {
        self.readq.len()
    }

    /// Write queue occupancy.
    pub fn write_queue_len(&self) -> usize {
        self.writeq.len()
    }

    /// Other-queue occupancy plus refresh backlog.
    pub fn other_queue_len(&self) -> usize {
        self.otherq.len() + self.refresh.backlog()
    }

    /// Reads issued and awaiting data return.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Enqueues a request, or returns it when the target queue is full.
    ///
    /// Sets the arrival cycle on acceptance. A read that hits a queued
    /// write is served from the write buffer: it retires on the next tick
    /// without touching the banks.
    ///
    /// # Errors
    ///
    /// Back-pressure only: the rejected request comes back unchanged for
    /// the producer to retry next tick.
    pub fn send(&mut self, mut req: Request) -> Result<(), Request> {
        match req.kind {
            RequestKind::Read => {
                if self.writeq.requests().iter().any(|w| w.addr == req.addr) {
                    req.arrive = self.clk;
                    req.depart = self.clk + 1;
                    self.read_reqs.inc();
                    self.forwarded_reads.inc();
                    self.insert_pending(req);
                    return Ok(());
                }
                if self.readq.is_full() {
                    return Err(req);
                }
                req.arrive = self.clk;
                self.read_reqs.inc();
                self.readq.push(req);
                Ok(())
            }
            RequestKind::Write => {
                if self.writeq.is_full() {
                    return Err(req);
                }
                req.arrive = self.clk;
                self.write_reqs.inc();
                self.writeq.push(req);
                Ok(())
            }
            RequestKind::Refresh => {
                if self.otherq.is_full() {
                    return Err(req);
                }
                req.arrive = self.clk;
                self.otherq.push(req);
                Ok(())
            }
        }
    }

    /// Requests owned by this controller: queued plus in flight.
    pub fn pending_requests(&self) -> usize {
        self.readq.len() + self.writeq.len() + self.otherq.len() + self.pending.len()
    }

    /// Overrides the write-drain entry threshold.
    ///
    /// Passing 0.0 forces the controller into drain mode whenever reads are
    /// not strictly required, which the drivers use at end of trace.
    pub fn set_high_writeq_watermark(&mut self, mark: f32) {
        self.high_watermark = mark;
    }

    /// Overrides the write-drain exit threshold.
    pub fn set_low_writeq_watermark(&mut self, mark: f32) {
        self.low_watermark = mark;
    }

    /// Advances the controller by one memory cycle.
    pub fn tick(&mut self) {
        self.clk += 1;
        let clk = self.clk;

        // 1. Retire.
        loop {
            match self.pending.front() {
                Some(req) if req.depart <= clk => {}
                _ => break,
            }
            if let Some(req) = self.pending.pop_front() {
                self.read_latency_sum.add((req.depart - req.arrive) as f64);
                req.complete();
            }
        }

        // 2. Refresh injection.
        self.refresh.tick(clk);
        while let Some(target) = self.refresh.peek() {
            if self.otherq.is_full() {
                trace!(channel = self.channel, "refresh postponed: other queue full");
                break;
            }
            let mut req = Request::refresh(self.refresh_coord(target));
            req.arrive = clk;
            self.otherq.push(req);
            self.refresh.take();
        }

        // 3. Write-drain hysteresis.
        let occupancy = self.writeq.len() as f32 / self.writeq.capacity() as f32;
        if !self.write_mode {
            if occupancy >= self.high_watermark {
                self.write_mode = true;
                trace!(channel = self.channel, "entering write drain");
            }
        } else if occupancy <= self.low_watermark {
            self.write_mode = false;
        }

        // 4. Schedule. Refresh and friends are rare, so the other-queue
        // takes precedence whenever it holds anything.
        let source = if !self.otherq.is_empty() {
            QueueSel::Other
        } else if self.write_mode {
            QueueSel::Write
        } else {
            QueueSel::Read
        };
        let queue = match source {
            QueueSel::Read => &self.readq,
            QueueSel::Write => &self.writeq,
            QueueSel::Other => &self.otherq,
        };
        let Some(index) = self
            .scheduler
            .choose(queue.requests(), &self.tree, &self.spec, clk)
        else {
            return;
        };

        // 5. Issue.
        let req = &queue.entries[index];
        let start = self.spec.start_command(req.kind);
        let cmd = self.tree.decode(start, &req.coord);
        if !self.tree.check(cmd, &req.coord, clk) {
            return; // stall this tick
        }

        let kind = req.kind;
        if req.first_issue && kind != RequestKind::Refresh {
            if cmd == start {
                self.row_hits.inc();
            } else if cmd == Command::Act {
                self.row_misses.inc();
            } else if matches!(cmd, Command::Pre | Command::PreA) {
                self.row_conflicts.inc();
            }
        }

        self.tree.update(cmd, &req.coord, clk);
        self.scheduler
            .note_issue(cmd == start && kind != RequestKind::Refresh);

        let queue = match source {
            QueueSel::Read => &mut self.readq,
            QueueSel::Write => &mut self.writeq,
            QueueSel::Other => &mut self.otherq,
        };
        if cmd == start {
            let mut req = queue.remove(index);
            match req.kind {
                RequestKind::Read => {
                    req.depart = clk + self.spec.read_latency();
                    self.insert_pending(req);
                }
                RequestKind::Write => {
                    req.depart = clk;
                    req.complete();
                }
                RequestKind::Refresh => {
                    req.depart = clk;
                    req.complete();
                    self.refreshes.inc();
                }
            }
        } else {
            queue.entries[index].first_issue = false;
        }
    }

    /// Records terminal bookkeeping into the registered statistics.
    pub fn finish(&mut self) {
        let (reads, writes) = self.tree.served();
        self.served_reads.set(reads as f64);
        self.served_writes.set(writes as f64);
        self.cycles.set(self.clk as f64);
    }

    fn insert_pending(&mut self, req: Request) {
        let pos = self
            .pending
            .iter()
            .rposition(|r| r.depart <= req.depart)
            .map_or(0, |p| p + 1);
        self.pending.insert(pos, req);
    }

    fn refresh_coord(&self, target: RefreshTarget) -> Vec<usize> {
        let mut coord = vec![0; self.spec.levels.len()];
        coord[0] = self.channel;
        coord[1] = target.rank;
        if let Some(mut bank) = target.bank {
            let bank_level = self.spec.bank_level();
            for l in (2..=bank_level).rev() {
                coord[l] = bank % self.spec.counts[l];
                bank /= self.spec.counts[l];
            }
        }
        coord
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("channel", &self.channel)
            .field("clk", &self.clk)
            .field("pending", &self.pending_requests())
            .finish()
    }
}

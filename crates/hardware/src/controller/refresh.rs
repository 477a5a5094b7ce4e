//! Refresh obligation tracking.
//!
//! The refresh unit paces each rank at the interval the spec dictates and
//! hands due targets to the controller, which turns them into requests on
//! the other-queue. Per-bank standards walk the banks of each rank
//! round-robin at a proportionally shorter interval. A target the
//! controller cannot enqueue this tick (other-queue full) stays pending and
//! is retried next tick; the cadence clock keeps running so a postponed
//! refresh does not delay the following one.

use std::collections::VecDeque;

use crate::dram::{DramSpec, RefreshMode};

/// One due refresh: the rank and, in per-bank mode, the linear bank index
/// within that rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTarget {
    /// Rank to refresh.
    pub rank: usize,
    /// Linear bank within the rank, counting across bank groups.
    pub bank: Option<usize>,
}

/// Refresh pacing state for one channel.
#[derive(Debug)]
pub struct Refresh {
    interval: u64,
    mode: RefreshMode,
    banks_per_rank: usize,
    next_due: Vec<u64>,
    bank_cursor: Vec<usize>,
    pending: VecDeque<RefreshTarget>,
}

impl Refresh {
    /// Creates the refresh unit for `spec` with `ranks` ranks.
    ///
    /// A zero refresh interval (non-volatile cells) disables injection
    /// entirely.
    pub fn new(spec: &DramSpec, ranks: usize) -> Self {
        let banks_per_rank = spec.banks_per_rank();
        let interval = match spec.refresh_mode {
            RefreshMode::AllRank => spec.params.n_refi,
            RefreshMode::PerBank => (spec.params.n_refi / banks_per_rank as u64).max(1),
        };
        let interval = if spec.params.n_refi == 0 { 0 } else { interval };
        Self {
            interval,
            mode: spec.refresh_mode,
            banks_per_rank,
            next_due: vec![interval; ranks],
            bank_cursor: vec![0; ranks],
            pending: VecDeque::new(),
        }
    }

    /// Accrues refresh obligations due at `now`.
    pub fn tick(&mut self, now: u64) {
        if self.interval == 0 {
            return;
        }
        for rank in 0..self.next_due.len() {
            while now >= self.next_due[rank] {
                self.next_due[rank] += self.interval;
                let bank = match self.mode {
                    RefreshMode::AllRank => None,
                    RefreshMode::PerBank => {
                        let b = self.bank_cursor[rank];
                        self.bank_cursor[rank] = (b + 1) % self.banks_per_rank;
                        Some(b)
                    }
                };
                self.pending.push_back(RefreshTarget { rank, bank });
            }
        }
    }

    /// Oldest obligation not yet enqueued.
    pub fn peek(&self) -> Option<RefreshTarget> {
        self.pending.front().copied()
    }

    /// Drops the oldest obligation after the controller enqueued it.
    pub fn take(&mut self) {
        let _ = self.pending.pop_front();
    }

    /// Obligations waiting for other-queue space.
    pub fn backlog(&self) -> usize {
        self.pending.len()
    }
}

//! Request scheduling policies.
//!
//! A policy is a pure function of queue contents and node-tree state: it
//! inspects, never mutates. The controller reports each issued command back
//! via [`Scheduler::note_issue`] so the capped policy can track its row-hit
//! streak.

use crate::config::SchedulerKind;
use crate::dram::{DramSpec, DramTree};
use crate::request::Request;

/// Scheduling policy instance for one controller.
#[derive(Debug)]
pub struct Scheduler {
    kind: SchedulerKind,
    cap: u64,
    streak: u64,
}

impl Scheduler {
    /// Creates a scheduler of the given kind.
    ///
    /// `cap` bounds consecutive row hits for [`SchedulerKind::FrfcfsCap`]
    /// and is ignored by the other policies.
    pub fn new(kind: SchedulerKind, cap: u64) -> Self {
        Self {
            kind,
            cap: cap.max(1),
            streak: 0,
        }
    }

    /// Picks the index of the request to serve this tick, if any.
    ///
    /// FCFS returns the oldest request. FR-FCFS scores each request: a row
    /// hit whose access command is legal now beats any merely-ready
    /// request, which beats a stalled one; ties fall to arrival order
    /// (queues insert FIFO, so index order is arrival order). The capped
    /// variant stops preferring hits once the streak reaches the cap.
    pub fn choose(
        &self,
        queue: &[Request],
        tree: &DramTree,
        spec: &DramSpec,
        now: u64,
    ) -> Option<usize> {
        if queue.is_empty() {
            return None;
        }
        if self.kind == SchedulerKind::Fcfs {
            return Some(0);
        }

        let capped = self.kind == SchedulerKind::FrfcfsCap && self.streak >= self.cap;
        let mut best = 0;
        let mut best_score = u8::MIN;
        for (i, req) in queue.iter().enumerate() {
            let start = spec.start_command(req.kind);
            let cmd = tree.decode(start, &req.coord);
            let ready = tree.check(cmd, &req.coord, now);
            let hit = ready && cmd == start && !capped;
            let score = 1 + u8::from(ready) + u8::from(hit);
            if score > best_score {
                best = i;
                best_score = score;
            }
        }
        Some(best)
    }

    /// Records the outcome of an issued access for streak tracking.
    pub fn note_issue(&mut self, row_hit: bool) {
        if row_hit {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
    }
}

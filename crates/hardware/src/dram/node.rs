//! The DRAM node tree: per-level timing state and the bank state machine.
//!
//! One tree exists per channel, owned by that channel's controller. Nodes
//! are stored in a flat, level-major vector so that walking a coordinate
//! path, finding siblings, and enumerating a rank's banks are all index
//! arithmetic; `check` and `update` are allocation-free.
//!
//! The tree materializes every level above `Row`. Row and column indices
//! are carried in the request coordinate and consumed by the row-state
//! holder, which is the bank for most standards and the subarray for
//! standards with subarray-level parallelism.

use std::sync::Arc;

use crate::dram::spec::{Command, DramSpec, TimingEntry};

/// Maximum materialized depth: channel, rank, bank group, bank, subarray.
const MAX_PATH: usize = 5;

/// History depth per command; covers the four-activate window rule.
const HIST: usize = 4;

/// Sentinel for "this command was never issued here".
const NEVER: u64 = u64::MAX;

/// Power and row-buffer state of one node.
///
/// Rank nodes move between the power states; row-state holders move between
/// `Opened` and `Closed`. A node is `Opened` exactly when its open-row field
/// is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Rank is powered and accepting commands.
    PoweredUp,
    /// Row buffer holds a row.
    Opened,
    /// Row buffer is empty.
    Closed,
    /// Precharge power-down (all banks closed).
    PowerDown,
    /// Active power-down (entered with a row open).
    ActivePowerDown,
    /// Self-refresh.
    SelfRefresh,
}

#[derive(Clone)]
struct Node {
    next: [u64; Command::COUNT],
    prev: [[u64; HIST]; Command::COUNT],
    state: NodeState,
    open_row: Option<usize>,
    served_reads: u64,
    served_writes: u64,
}

impl Node {
    fn new(state: NodeState) -> Self {
        Self {
            next: [0; Command::COUNT],
            prev: [[NEVER; HIST]; Command::COUNT],
            state,
            open_row: None,
            served_reads: 0,
            served_writes: 0,
        }
    }
}

/// Flat node tree for one channel.
pub struct DramTree {
    spec: Arc<DramSpec>,
    offsets: Vec<usize>,
    sizes: Vec<usize>,
    nodes: Vec<Node>,
}

impl DramTree {
    /// Builds the tree for one channel of `spec`.
    ///
    /// The spec must be frozen: channel, rank, and subarray counts already
    /// written.
    pub fn new(spec: Arc<DramSpec>) -> Self {
        let depth = spec.tree_levels();
        assert!(
            (3..=MAX_PATH).contains(&depth),
            "unsupported hierarchy depth {depth}"
        );

        let mut sizes = vec![1usize; depth];
        for l in 1..depth {
            sizes[l] = sizes[l - 1] * spec.counts[l];
        }
        let mut offsets = vec![0usize; depth];
        for l in 1..depth {
            offsets[l] = offsets[l - 1] + sizes[l - 1];
        }

        let total: usize = sizes.iter().sum();
        let leaf_start = offsets[depth - 1];
        let rank_start = offsets[1];
        let rank_end = offsets[1] + sizes[1];
        let nodes = (0..total)
            .map(|i| {
                if i >= leaf_start {
                    Node::new(NodeState::Closed)
                } else if (rank_start..rank_end).contains(&i) {
                    Node::new(NodeState::PoweredUp)
                } else {
                    Node::new(NodeState::Closed)
                }
            })
            .collect();

        Self {
            spec,
            offsets,
            sizes,
            nodes,
        }
    }

    /// The spec this tree was built from.
    pub fn spec(&self) -> &Arc<DramSpec> {
        &self.spec
    }

    fn depth(&self) -> usize {
        self.offsets.len()
    }

    fn path(&self, coord: &[usize]) -> [usize; MAX_PATH] {
        let depth = self.depth();
        debug_assert!(coord.len() >= depth);
        let mut idx = [0usize; MAX_PATH];
        for l in 1..depth {
            debug_assert!(coord[l] < self.spec.counts[l], "coordinate out of range");
            idx[l] = idx[l - 1] * self.spec.counts[l] + coord[l];
        }
        idx
    }

    /// Leaf nodes (row-state holders) spanned by the subtree of the node at
    /// `(level, local)`.
    fn leaf_range(&self, level: usize, local: usize) -> std::ops::Range<usize> {
        let leaf_level = self.depth() - 1;
        let factor = self.sizes[leaf_level] / self.sizes[level];
        let start = self.offsets[leaf_level] + local * factor;
        start..start + factor
    }

    fn any_open_under(&self, level: usize, local: usize) -> bool {
        self.leaf_range(level, local)
            .any(|i| self.nodes[i].state == NodeState::Opened)
    }

    /// Returns the next command that must issue for `cmd` to make progress.
    ///
    /// Walks top-down: a rank in a power state demands its exit command
    /// first; a refresh over open banks demands a precharge; an access to a
    /// closed or wrong-row bank demands an activate or precharge. When no
    /// prerequisite stands, `cmd` itself is returned.
    pub fn decode(&self, cmd: Command, coord: &[usize]) -> Command {
        let idx = self.path(coord);
        let rank = &self.nodes[self.offsets[1] + idx[1]];
        match rank.state {
            NodeState::PowerDown | NodeState::ActivePowerDown => {
                if cmd != Command::Pdx {
                    return Command::Pdx;
                }
            }
            NodeState::SelfRefresh => {
                if cmd != Command::Srx {
                    return Command::Srx;
                }
            }
            _ => {}
        }

        match cmd {
            Command::Rd | Command::Wr | Command::Rda | Command::Wra => {
                let leaf = &self.nodes[self.offsets[self.depth() - 1] + idx[self.depth() - 1]];
                match leaf.open_row {
                    None => Command::Act,
                    Some(row) if row == coord[self.spec.row_level()] => cmd,
                    Some(_) => Command::Pre,
                }
            }
            Command::Ref | Command::Sre => {
                if self.any_open_under(1, idx[1]) {
                    Command::PreA
                } else {
                    cmd
                }
            }
            Command::RefPb => {
                let bank = self.spec.bank_level();
                if self.any_open_under(bank, idx[bank]) {
                    // A single-node bank can precharge itself; a bank of
                    // subarrays falls back to the rank-wide precharge.
                    if bank == self.depth() - 1 {
                        Command::Pre
                    } else {
                        Command::PreA
                    }
                } else {
                    Command::RefPb
                }
            }
            other => other,
        }
    }

    /// Whether `cmd` is timing-legal at `now` across every level it scopes.
    pub fn check(&self, cmd: Command, coord: &[usize], now: u64) -> bool {
        let idx = self.path(coord);
        let end = self.spec.scope(cmd).min(self.depth() - 1);
        let ci = cmd.index();
        for l in 0..=end {
            if now < self.nodes[self.offsets[l] + idx[l]].next[ci] {
                return false;
            }
        }
        true
    }

    /// Earliest cycle `cmd` becomes legal along the coordinate path.
    ///
    /// Exposed for schedulers with lookahead and for verification; the hot
    /// path uses [`check`](Self::check).
    pub fn earliest(&self, cmd: Command, coord: &[usize]) -> u64 {
        let idx = self.path(coord);
        let end = self.spec.scope(cmd).min(self.depth() - 1);
        let ci = cmd.index();
        (0..=end)
            .map(|l| self.nodes[self.offsets[l] + idx[l]].next[ci])
            .max()
            .unwrap_or(0)
    }

    /// Applies the timing and state effects of issuing `cmd` at `now`.
    ///
    /// Every constraint `(from = cmd, to, gap, scope)` along the path raises
    /// `next[to]` to at least the constraint base plus `gap`; same-node
    /// entries measure from the `dist`-th most recent issue, sibling entries
    /// from `now` on every sibling. The bank state machine advances last.
    pub fn update(&mut self, cmd: Command, coord: &[usize], now: u64) {
        debug_assert!(self.check(cmd, coord, now), "update on an illegal command");
        let spec = Arc::clone(&self.spec);
        let idx = self.path(coord);
        let end = spec.scope(cmd).min(self.depth() - 1);
        let ci = cmd.index();

        for l in 0..=end {
            let i = self.offsets[l] + idx[l];

            let hist = &mut self.nodes[i].prev[ci];
            for k in (1..HIST).rev() {
                hist[k] = hist[k - 1];
            }
            hist[0] = now;

            for entry in spec.timing_for(l, cmd) {
                self.apply_entry(entry, l, i, ci, now);
            }
        }

        self.apply_state(cmd, &idx, coord);
    }

    fn apply_entry(&mut self, entry: &TimingEntry, level: usize, i: usize, ci: usize, now: u64) {
        let ti = entry.to.index();
        if entry.sibling {
            if level == 0 {
                return;
            }
            let width = self.spec.counts[level];
            let local = i - self.offsets[level];
            let block = self.offsets[level] + (local / width) * width;
            for s in block..block + width {
                if s != i {
                    let next = &mut self.nodes[s].next[ti];
                    *next = (*next).max(now + entry.gap);
                }
            }
        } else {
            let base = if entry.dist <= 1 {
                now
            } else {
                self.nodes[i].prev[ci][entry.dist - 1]
            };
            if base == NEVER {
                return;
            }
            let next = &mut self.nodes[i].next[ti];
            *next = (*next).max(base + entry.gap);
        }
    }

    fn apply_state(&mut self, cmd: Command, idx: &[usize; MAX_PATH], coord: &[usize]) {
        let leaf_level = self.depth() - 1;
        let leaf = self.offsets[leaf_level] + idx[leaf_level];
        let rank = self.offsets[1] + idx[1];

        if matches!(cmd, Command::Rd | Command::Rda) {
            self.nodes[leaf].served_reads += 1;
        }
        if matches!(cmd, Command::Wr | Command::Wra) {
            self.nodes[leaf].served_writes += 1;
        }

        match cmd {
            Command::Act => {
                let node = &mut self.nodes[leaf];
                node.state = NodeState::Opened;
                node.open_row = Some(coord[self.spec.row_level()]);
            }
            Command::Pre | Command::Rda | Command::Wra => self.close(leaf),
            Command::PreA => {
                for i in self.leaf_range(1, idx[1]) {
                    self.close(i);
                }
            }
            Command::Pde => {
                let state = if self.any_open_under(1, idx[1]) {
                    NodeState::ActivePowerDown
                } else {
                    NodeState::PowerDown
                };
                self.nodes[rank].state = state;
            }
            Command::Pdx | Command::Srx => self.nodes[rank].state = NodeState::PoweredUp,
            Command::Sre => self.nodes[rank].state = NodeState::SelfRefresh,
            _ => {}
        }
    }

    fn close(&mut self, i: usize) {
        let node = &mut self.nodes[i];
        node.state = NodeState::Closed;
        node.open_row = None;
    }

    /// Open row at the coordinate's row-state holder.
    pub fn open_row(&self, coord: &[usize]) -> Option<usize> {
        let idx = self.path(coord);
        let leaf_level = self.depth() - 1;
        self.nodes[self.offsets[leaf_level] + idx[leaf_level]].open_row
    }

    /// Whether the coordinate's row is currently open.
    pub fn row_hit(&self, coord: &[usize]) -> bool {
        self.open_row(coord) == Some(coord[self.spec.row_level()])
    }

    /// Whether any row is open at the coordinate's row-state holder.
    pub fn row_open(&self, coord: &[usize]) -> bool {
        self.open_row(coord).is_some()
    }

    /// Power/row state of the rank the coordinate addresses.
    pub fn rank_state(&self, coord: &[usize]) -> NodeState {
        let idx = self.path(coord);
        self.nodes[self.offsets[1] + idx[1]].state
    }

    /// Total reads and writes served by every row-state holder.
    pub fn served(&self) -> (u64, u64) {
        let leaf_level = self.depth() - 1;
        let start = self.offsets[leaf_level];
        self.nodes[start..]
            .iter()
            .fold((0, 0), |(r, w), n| (r + n.served_reads, w + n.served_writes))
    }
}

impl std::fmt::Debug for DramTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DramTree")
            .field("levels", &self.depth())
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

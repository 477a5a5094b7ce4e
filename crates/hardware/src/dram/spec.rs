//! DRAM standard specification: hierarchy, commands, and timing tables.
//!
//! This module defines the immutable data object that parameterizes the node
//! tree and the controller for a named DRAM standard. It provides:
//! 1. **Hierarchy:** [`Level`] and the ordered per-standard level list with
//!    fan-out counts.
//! 2. **Commands:** [`Command`] kinds with classification predicates and a
//!    per-command scope level.
//! 3. **Timing:** [`TimingEntry`] tables built from a [`TimingParams`] bin;
//!    multiple entries for the same command pair are conjunctive.
//!
//! Standards differ only in tables and in the presence of the bank-group and
//! subarray levels. One table-population routine serves every standard; the
//! per-standard builders in [`standards`](crate::dram::standards) contribute
//! nothing but data.

use crate::config::StandardKind;
use crate::request::RequestKind;

/// Organization hierarchy levels from the channel down to the addressed
/// column.
///
/// Every standard orders its levels Channel, Rank, then the bank hierarchy,
/// then Row and Column. Bank groups (DDR4, GDDR5, HBM) sit above banks;
/// subarrays (SALP-MASA, DSARP) sit below them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Independent command/data bus with its own controller.
    Channel,
    /// Chip-select group sharing a channel.
    Rank,
    /// Bank group with long/short timing distinction.
    BankGroup,
    /// Row-buffer-bearing bank.
    Bank,
    /// Independently activatable subarray within a bank.
    Subarray,
    /// DRAM row; addressed, not materialized as a node.
    Row,
    /// Burst-granular column; addressed, not materialized as a node.
    Column,
}

/// DRAM command kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Activate a row into the row buffer.
    Act,
    /// Precharge one bank (or one subarray's row buffer).
    Pre,
    /// Precharge every bank in a rank.
    PreA,
    /// Column read from the open row.
    Rd,
    /// Column write to the open row.
    Wr,
    /// Read with auto-precharge.
    Rda,
    /// Write with auto-precharge.
    Wra,
    /// All-bank refresh at rank scope.
    Ref,
    /// Per-bank refresh.
    RefPb,
    /// Power-down entry.
    Pde,
    /// Power-down exit.
    Pdx,
    /// Self-refresh entry.
    Sre,
    /// Self-refresh exit.
    Srx,
}

impl Command {
    /// Number of command kinds; sizes the per-node timing tables.
    pub const COUNT: usize = 13;

    /// All command kinds in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Act,
        Self::Pre,
        Self::PreA,
        Self::Rd,
        Self::Wr,
        Self::Rda,
        Self::Wra,
        Self::Ref,
        Self::RefPb,
        Self::Pde,
        Self::Pdx,
        Self::Sre,
        Self::Srx,
    ];

    /// Dense index for table lookups.
    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this command transfers column data.
    pub fn is_accessing(self) -> bool {
        matches!(self, Self::Rd | Self::Wr | Self::Rda | Self::Wra)
    }

    /// Whether this command opens a row.
    pub fn is_opening(self) -> bool {
        matches!(self, Self::Act)
    }

    /// Whether this command leaves the target closed when it completes.
    pub fn is_closing(self) -> bool {
        matches!(self, Self::Pre | Self::PreA | Self::Rda | Self::Wra)
    }

    /// Whether this command performs a refresh.
    pub fn is_refreshing(self) -> bool {
        matches!(self, Self::Ref | Self::RefPb)
    }
}

/// One minimum-gap constraint between a command pair at one level.
///
/// `dist` counts issues of the *from* command: 1 is the previous issue,
/// 4 expresses sliding-window rules such as the four-activate window.
/// `sibling` applies the constraint to every other child of the same parent
/// instead of the issuing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingEntry {
    /// Constrained (later) command.
    pub to: Command,
    /// How many issues of the earlier command back the gap is measured from.
    pub dist: usize,
    /// Minimum cycle gap.
    pub gap: u64,
    /// Apply to siblings of the issuing node rather than the node itself.
    pub sibling: bool,
}

/// Refresh granularity dictated by the standard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// One REF covers a whole rank.
    AllRank,
    /// REFPB walks the banks of each rank round-robin.
    PerBank,
}

/// Speed-bin timing parameters, in memory-clock cycles.
///
/// Field names follow the JEDEC `t`-parameter they count cycles for. The
/// `_s`/`_l` pairs are the short (cross-group) and long (same-group)
/// variants; standards without bank groups set both to the same value.
#[derive(Clone, Copy, Debug)]
pub struct TimingParams {
    /// Data rate in MT/s, recorded for reporting only.
    pub rate: u64,
    /// Burst length on the bus.
    pub n_bl: u64,
    /// Column-to-column, cross-group.
    pub n_ccd_s: u64,
    /// Column-to-column, same group.
    pub n_ccd_l: u64,
    /// CAS read latency.
    pub n_cl: u64,
    /// Row-to-column delay.
    pub n_rcd: u64,
    /// Precharge latency.
    pub n_rp: u64,
    /// CAS write latency.
    pub n_cwl: u64,
    /// Minimum row-open time.
    pub n_ras: u64,
    /// Row cycle (activate-to-activate, same bank).
    pub n_rc: u64,
    /// Read-to-precharge.
    pub n_rtp: u64,
    /// Write-to-read turnaround, cross-group.
    pub n_wtr_s: u64,
    /// Write-to-read turnaround, same group.
    pub n_wtr_l: u64,
    /// Write recovery.
    pub n_wr: u64,
    /// Activate-to-activate, cross-group.
    pub n_rrd_s: u64,
    /// Activate-to-activate, same group.
    pub n_rrd_l: u64,
    /// Four-activate window; 0 disables the rule.
    pub n_faw: u64,
    /// All-bank refresh cycle time.
    pub n_rfc: u64,
    /// Per-bank refresh cycle time.
    pub n_rfc_pb: u64,
    /// Average refresh interval.
    pub n_refi: u64,
    /// Rank-to-rank switch penalty.
    pub n_rtrs: u64,
    /// Minimum power-down residency.
    pub n_cke: u64,
    /// Power-down exit latency.
    pub n_xp: u64,
    /// Minimum self-refresh residency.
    pub n_ckesr: u64,
    /// Self-refresh exit latency.
    pub n_xs: u64,
}

/// Immutable specification of one DRAM standard instance.
///
/// Built by a standard factory from named `org` and `speed` presets, then
/// finalized by the driver writing the channel and rank counts before the
/// spec is frozen behind an `Arc` and shared by every controller of a tier.
#[derive(Debug)]
pub struct DramSpec {
    /// Standard this spec instantiates.
    pub standard: StandardKind,
    /// Organization preset name.
    pub org: String,
    /// Speed bin name.
    pub speed: String,
    /// Ordered hierarchy, `Channel` first, `Column` last.
    pub levels: Vec<Level>,
    /// Fan-out at each level, parallel to `levels`.
    pub counts: Vec<usize>,
    /// Channel data-bus width in bits.
    pub channel_width_bits: usize,
    /// Prefetch depth (columns per burst).
    pub prefetch: usize,
    /// Refresh granularity.
    pub refresh_mode: RefreshMode,
    /// Speed-bin parameters the tables were built from.
    pub params: TimingParams,
    /// Per node-level, per command: conjunctive timing entries.
    pub timing: Vec<[Vec<TimingEntry>; Command::COUNT]>,
    scope: [usize; Command::COUNT],
}

impl DramSpec {
    /// Assembles a spec from per-standard data.
    ///
    /// `counts` carries placeholder channel and rank entries; the driver
    /// writes the real values via [`set_channels`](Self::set_channels) and
    /// [`set_ranks`](Self::set_ranks) before freezing the spec.
    pub fn assemble(
        standard: StandardKind,
        org: &str,
        speed: &str,
        levels: Vec<Level>,
        counts: Vec<usize>,
        channel_width_bits: usize,
        prefetch: usize,
        refresh_mode: RefreshMode,
        params: TimingParams,
    ) -> Self {
        assert_eq!(levels.len(), counts.len());
        assert_eq!(levels[0], Level::Channel);
        assert_eq!(levels[1], Level::Rank);
        assert_eq!(levels[levels.len() - 2], Level::Row);
        assert_eq!(levels[levels.len() - 1], Level::Column);

        let row_level = levels.len() - 2;
        let timing = populate_timing(&levels[..row_level], &params);

        let index_of = |level: Level| {
            levels
                .iter()
                .position(|&l| l == level)
                .unwrap_or(row_level)
        };
        let bank = index_of(Level::Bank);
        let rank = index_of(Level::Rank);
        let row = row_level;
        let column = levels.len() - 1;

        let mut scope = [rank; Command::COUNT];
        scope[Command::Act.index()] = row;
        scope[Command::Pre.index()] = row;
        scope[Command::PreA.index()] = rank;
        scope[Command::Rd.index()] = column;
        scope[Command::Wr.index()] = column;
        scope[Command::Rda.index()] = column;
        scope[Command::Wra.index()] = column;
        scope[Command::Ref.index()] = rank;
        scope[Command::RefPb.index()] = bank;

        Self {
            standard,
            org: org.to_string(),
            speed: speed.to_string(),
            levels,
            counts,
            channel_width_bits,
            prefetch,
            refresh_mode,
            params,
            timing,
            scope,
        }
    }

    /// Position of `level` in the hierarchy, if present.
    pub fn level_index(&self, level: Level) -> Option<usize> {
        self.levels.iter().position(|&l| l == level)
    }

    /// Number of materialized node levels (everything above `Row`).
    pub fn tree_levels(&self) -> usize {
        self.levels.len() - 2
    }

    /// Index of the `Row` level.
    pub fn row_level(&self) -> usize {
        self.levels.len() - 2
    }

    /// Index of the `Bank` level.
    pub fn bank_level(&self) -> usize {
        self.level_index(Level::Bank)
            .expect("every standard has a bank level")
    }

    /// Writes the channel count; called once by the driver.
    pub fn set_channels(&mut self, channels: usize) {
        assert!(channels > 0, "at least one channel is required");
        self.counts[0] = channels;
    }

    /// Writes the rank count; called once by the driver.
    pub fn set_ranks(&mut self, ranks: usize) {
        assert!(ranks > 0, "at least one rank is required");
        self.counts[1] = ranks;
    }

    /// Writes the subarray count for standards with a subarray level.
    ///
    /// Silently ignored otherwise, so the driver can apply the config
    /// unconditionally.
    pub fn set_subarrays(&mut self, subarrays: usize) {
        if let Some(idx) = self.level_index(Level::Subarray) {
            assert!(subarrays > 0, "at least one subarray is required");
            self.counts[idx] = subarrays;
        }
    }

    /// Transaction granularity in bytes (one burst across the channel).
    pub fn tx_bytes(&self) -> u64 {
        (self.channel_width_bits / 8) as u64 * self.prefetch as u64
    }

    /// Cycles from issuing a read command to data availability.
    pub fn read_latency(&self) -> u64 {
        self.params.n_cl + self.params.n_bl
    }

    /// Cycles from issuing a write command to write completion at the bank.
    pub fn write_latency(&self) -> u64 {
        self.params.n_cwl + self.params.n_bl
    }

    /// Deepest level a command's constraints reach.
    #[inline(always)]
    pub fn scope(&self, cmd: Command) -> usize {
        self.scope[cmd.index()]
    }

    /// Timing entries for `cmd` at node level `level`.
    #[inline(always)]
    pub fn timing_for(&self, level: usize, cmd: Command) -> &[TimingEntry] {
        &self.timing[level][cmd.index()]
    }

    /// The terminal command a request of `kind` must issue.
    pub fn start_command(&self, kind: RequestKind) -> Command {
        match kind {
            RequestKind::Read => Command::Rd,
            RequestKind::Write => Command::Wr,
            RequestKind::Refresh => match self.refresh_mode {
                RefreshMode::AllRank => Command::Ref,
                RefreshMode::PerBank => Command::RefPb,
            },
        }
    }

    /// Banks per rank, counting bank groups but not subarrays.
    pub fn banks_per_rank(&self) -> usize {
        let bank = self.bank_level();
        self.counts[2..=bank].iter().product()
    }
}

const READS: [Command; 2] = [Command::Rd, Command::Rda];
const WRITES: [Command; 2] = [Command::Wr, Command::Wra];

/// Builds the per-level timing tables from one parameter bin.
///
/// `node_levels` is the hierarchy above `Row`; which bank-family level
/// carries the row-cycle constraints depends on whether a subarray level is
/// present (the subarray is then the row-state holder).
fn populate_timing(
    node_levels: &[Level],
    p: &TimingParams,
) -> Vec<[Vec<TimingEntry>; Command::COUNT]> {
    let mut table: Vec<[Vec<TimingEntry>; Command::COUNT]> = (0..node_levels.len())
        .map(|_| std::array::from_fn(|_| Vec::new()))
        .collect();
    let has_subarray = node_levels.contains(&Level::Subarray);

    let mut add = |lvl: usize, from: Command, to: Command, dist: usize, gap: u64, sibling: bool| {
        if gap == 0 && dist <= 1 {
            return;
        }
        table[lvl][from.index()].push(TimingEntry {
            to,
            dist,
            gap,
            sibling,
        });
    };

    let rtw = (p.n_cl + p.n_bl + 2).saturating_sub(p.n_cwl);
    let wtr_s = p.n_cwl + p.n_bl + p.n_wtr_s;
    let wtr_l = p.n_cwl + p.n_bl + p.n_wtr_l;
    let write_recovery = p.n_cwl + p.n_bl + p.n_wr;

    for (l, level) in node_levels.iter().enumerate() {
        match level {
            Level::Channel => {
                // Data-bus occupancy: back-to-back bursts of the same
                // direction cannot overlap on the channel.
                for f in READS {
                    for t in READS {
                        add(l, f, t, 1, p.n_bl, false);
                    }
                }
                for f in WRITES {
                    for t in WRITES {
                        add(l, f, t, 1, p.n_bl, false);
                    }
                }
            }
            Level::Rank => {
                for f in READS {
                    for t in READS {
                        add(l, f, t, 1, p.n_ccd_s, false);
                        add(l, f, t, 1, p.n_bl + p.n_rtrs, true);
                    }
                    for t in WRITES {
                        add(l, f, t, 1, rtw, false);
                        add(
                            l,
                            f,
                            t,
                            1,
                            (p.n_cl + p.n_bl + p.n_rtrs).saturating_sub(p.n_cwl),
                            true,
                        );
                    }
                    add(l, f, Command::Pde, 1, p.n_cl + p.n_bl + 1, false);
                }
                for f in WRITES {
                    for t in WRITES {
                        add(l, f, t, 1, p.n_ccd_s, false);
                        add(l, f, t, 1, p.n_bl + p.n_rtrs, true);
                    }
                    for t in READS {
                        add(l, f, t, 1, wtr_s, false);
                        add(
                            l,
                            f,
                            t,
                            1,
                            (p.n_cwl + p.n_bl + p.n_rtrs).saturating_sub(p.n_cl),
                            true,
                        );
                    }
                    add(l, f, Command::Pde, 1, write_recovery, false);
                }

                add(l, Command::Act, Command::Act, 1, p.n_rrd_s, false);
                if p.n_faw > 0 {
                    add(l, Command::Act, Command::Act, 4, p.n_faw, false);
                }
                add(l, Command::Act, Command::PreA, 1, p.n_ras, false);
                add(l, Command::Act, Command::Pde, 1, 1, false);
                add(l, Command::PreA, Command::Act, 1, p.n_rp, false);
                add(l, Command::PreA, Command::Ref, 1, p.n_rp, false);
                add(l, Command::PreA, Command::Pde, 1, 1, false);
                add(l, Command::PreA, Command::Sre, 1, p.n_rp, false);
                add(l, Command::Pre, Command::Ref, 1, p.n_rp, false);
                add(l, Command::Pre, Command::Pde, 1, 1, false);
                add(l, Command::Pre, Command::Sre, 1, p.n_rp, false);
                add(l, Command::Rda, Command::Ref, 1, p.n_rtp + p.n_rp, false);
                add(l, Command::Wra, Command::Ref, 1, write_recovery + p.n_rp, false);

                for t in [Command::Act, Command::Ref, Command::Sre, Command::Pde] {
                    add(l, Command::Ref, t, 1, p.n_rfc, false);
                }

                add(l, Command::Pde, Command::Pdx, 1, p.n_cke, false);
                for t in [
                    Command::Act,
                    Command::Pre,
                    Command::PreA,
                    Command::Rd,
                    Command::Wr,
                    Command::Rda,
                    Command::Wra,
                    Command::Ref,
                    Command::RefPb,
                    Command::Sre,
                ] {
                    add(l, Command::Pdx, t, 1, p.n_xp, false);
                }
                add(l, Command::Sre, Command::Srx, 1, p.n_ckesr, false);
                for t in [
                    Command::Act,
                    Command::Pre,
                    Command::PreA,
                    Command::Rd,
                    Command::Wr,
                    Command::Rda,
                    Command::Wra,
                    Command::Ref,
                    Command::RefPb,
                    Command::Pde,
                ] {
                    add(l, Command::Srx, t, 1, p.n_xs, false);
                }
            }
            Level::BankGroup => {
                for f in READS {
                    for t in READS {
                        add(l, f, t, 1, p.n_ccd_l, false);
                    }
                }
                for f in WRITES {
                    for t in WRITES {
                        add(l, f, t, 1, p.n_ccd_l, false);
                    }
                    for t in READS {
                        add(l, f, t, 1, wtr_l, false);
                    }
                }
                add(l, Command::Act, Command::Act, 1, p.n_rrd_l, false);
            }
            Level::Bank if has_subarray => {
                // Row-cycle rules move down to the subarray; inter-subarray
                // activations within one bank only pace at the long RRD.
                add(l, Command::Act, Command::Act, 1, p.n_rrd_l, false);
                add(l, Command::RefPb, Command::Act, 1, p.n_rfc_pb, false);
                add(l, Command::RefPb, Command::RefPb, 1, p.n_rfc_pb, false);
            }
            Level::Bank | Level::Subarray => {
                add(l, Command::Act, Command::Act, 1, p.n_rc, false);
                for t in [Command::Rd, Command::Rda, Command::Wr, Command::Wra] {
                    add(l, Command::Act, t, 1, p.n_rcd, false);
                }
                add(l, Command::Act, Command::Pre, 1, p.n_ras, false);
                add(l, Command::Pre, Command::Act, 1, p.n_rp, false);
                add(l, Command::Pre, Command::RefPb, 1, p.n_rp, false);
                add(l, Command::Rd, Command::Pre, 1, p.n_rtp, false);
                add(l, Command::Wr, Command::Pre, 1, write_recovery, false);
                add(l, Command::Rda, Command::Act, 1, p.n_rtp + p.n_rp, false);
                add(l, Command::Wra, Command::Act, 1, write_recovery + p.n_rp, false);
                add(l, Command::RefPb, Command::Act, 1, p.n_rfc_pb, false);
                add(l, Command::RefPb, Command::RefPb, 1, p.n_rfc_pb, false);
            }
            Level::Row | Level::Column => {
                unreachable!("row and column levels carry no timing nodes")
            }
        }
    }

    table
}

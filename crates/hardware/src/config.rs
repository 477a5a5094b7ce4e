//! Configuration system for the memory-system simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize a simulation. It provides:
//! 1. **Defaults:** Baseline constants (queue depths, watermarks, tick
//!    ratios) applied when a key is absent from the config file.
//! 2. **Structures:** The flat [`Config`] consumed by the spec factory, the
//!    memory builder, and the drivers.
//! 3. **Enums:** DRAM standard, scheduling policy, address mapping, and
//!    trace mode selectors.
//!
//! Configuration is supplied as a text file of `key = value` entries
//! (`#` starts a comment). [`Config::from_file`] bridges that format into
//! serde so that file keys and struct fields live in one place: each value
//! is coerced to a JSON scalar (integer, float, bool including `on`/`off`,
//! or string) and the resulting object is deserialized with unknown keys
//! rejected.

use std::fmt;
use std::fs;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::common::SimError;

/// Default configuration constants.
///
/// These values define the baseline controller and driver configuration when
/// not explicitly overridden in the config file.
mod defaults {
    /// Channels per memory tier.
    pub const CHANNELS: usize = 1;

    /// Ranks per channel.
    pub const RANKS: usize = 1;

    /// Subarrays per bank, for standards with a subarray level.
    pub const SUBARRAYS: usize = 8;

    /// Read queue capacity per controller.
    pub const READQ_ENTRIES: usize = 32;

    /// Write queue capacity per controller.
    pub const WRITEQ_ENTRIES: usize = 32;

    /// Other-queue (refresh and friends) capacity per controller.
    pub const OTHERQ_ENTRIES: usize = 8;

    /// Write-queue occupancy ratio at which the controller enters write
    /// drain mode.
    pub const HIGH_WRITEQ_WATERMARK: f32 = 0.8;

    /// Write-queue occupancy ratio at which the controller resumes reads.
    pub const LOW_WRITEQ_WATERMARK: f32 = 0.2;

    /// Consecutive row-hit cap for the capped FR-FCFS scheduler.
    pub const SCHEDULER_CAP: u64 = 16;

    /// CPU ticks per interleave group in CPU-trace mode.
    pub const CPU_TICK: u64 = 4;

    /// Memory ticks per interleave group in CPU-trace mode.
    pub const MEM_TICK: u64 = 1;
}

/// DRAM standards selectable at startup.
///
/// The standard chooses the organization hierarchy (presence of bank groups
/// or subarrays), the preset tables, and the refresh granularity. Everything
/// downstream of the spec factory is standard-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StandardKind {
    /// DDR3 SDRAM.
    #[serde(rename = "DDR3")]
    Ddr3,
    /// DDR4 SDRAM (adds bank groups).
    #[serde(rename = "DDR4")]
    Ddr4,
    /// Low-power DDR3.
    #[serde(rename = "LPDDR3")]
    Lpddr3,
    /// Low-power DDR4 (per-bank refresh).
    #[serde(rename = "LPDDR4")]
    Lpddr4,
    /// Graphics DDR5 (bank groups).
    #[serde(rename = "GDDR5")]
    Gddr5,
    /// High Bandwidth Memory (wide channels, per-bank refresh).
    #[serde(rename = "HBM")]
    Hbm,
    /// Wide I/O mobile DRAM.
    #[serde(rename = "WideIO")]
    WideIo,
    /// Wide I/O 2 mobile DRAM.
    #[serde(rename = "WideIO2")]
    WideIo2,
    /// Subarray-level parallelism DRAM (MASA variant).
    #[serde(rename = "SALP-MASA")]
    SalpMasa,
    /// DSARP subarray DRAM with per-bank refresh.
    #[serde(rename = "DSARP")]
    Dsarp,
    /// Adaptive-latency DRAM (DDR3 organization).
    #[serde(rename = "ALDRAM")]
    Aldram,
    /// Tiered-latency DRAM (DDR3 organization).
    #[serde(rename = "TLDRAM")]
    Tldram,
    /// Spin-transfer-torque MRAM behind a DDR interface.
    #[serde(rename = "STTMRAM")]
    SttMram,
    /// Phase-change memory behind a DDR interface.
    #[serde(rename = "PCM")]
    Pcm,
}

impl StandardKind {
    /// Canonical name as written in config files and stats filenames.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ddr3 => "DDR3",
            Self::Ddr4 => "DDR4",
            Self::Lpddr3 => "LPDDR3",
            Self::Lpddr4 => "LPDDR4",
            Self::Gddr5 => "GDDR5",
            Self::Hbm => "HBM",
            Self::WideIo => "WideIO",
            Self::WideIo2 => "WideIO2",
            Self::SalpMasa => "SALP-MASA",
            Self::Dsarp => "DSARP",
            Self::Aldram => "ALDRAM",
            Self::Tldram => "TLDRAM",
            Self::SttMram => "STTMRAM",
            Self::Pcm => "PCM",
        }
    }
}

impl fmt::Display for StandardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request scheduling policies.
///
/// The policy is a pure function of queue contents and node-tree state; it
/// never mutates either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SchedulerKind {
    /// First-come-first-served: always the oldest request.
    #[serde(rename = "FCFS", alias = "fcfs")]
    Fcfs,
    /// First-ready FCFS: prefer row hits, then ready commands, then age.
    #[default]
    #[serde(rename = "FRFCFS", alias = "frfcfs")]
    Frfcfs,
    /// FR-FCFS with a cap on consecutive row hits to bound starvation.
    #[serde(rename = "FRFCFS_Cap", alias = "FRFCFS-Cap", alias = "frfcfs_cap")]
    FrfcfsCap,
}

/// Address-to-coordinate mapping schemes.
///
/// Names give the field order from most to least significant bit above the
/// transaction offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MappingKind {
    /// Row, bank, rank, column, channel (the default mapping).
    #[default]
    #[serde(rename = "defaultmapping", alias = "RoBaRaCoCh")]
    RoBaRaCoCh,
    /// Channel, rank, bank, row, column.
    #[serde(rename = "ChRaBaRoCo")]
    ChRaBaRoCo,
    /// Row, column, bank, rank, channel.
    #[serde(rename = "RoCoBaRaCh")]
    RoCoBaRaCh,
}

impl MappingKind {
    /// Resolves a mapping name from the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "defaultmapping" | "RoBaRaCoCh" => Some(Self::RoBaRaCoCh),
            "ChRaBaRoCo" => Some(Self::ChRaBaRoCo),
            "RoCoBaRaCh" => Some(Self::RoCoBaRaCh),
            _ => None,
        }
    }
}

/// Trace format driving the simulation, written by the driver from `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TraceMode {
    /// Per-core CPU instruction traces behind a processor front-end.
    #[serde(rename = "CPU", alias = "cpu")]
    Cpu,
    /// A single pre-generated DRAM request trace.
    #[default]
    #[serde(rename = "DRAM", alias = "dram")]
    Dram,
}

/// Root configuration for one memory tier and the drivers attached to it.
///
/// In hybrid mode each tier carries its own `Config`; driver-level settings
/// (tick ratios, warmup, exit modes) are read from the fast tier's config,
/// matching the trace-driven front-end that only the fast tier serves.
///
/// # Examples
///
/// ```
/// use dramsim_core::config::{Config, SchedulerKind, StandardKind};
///
/// let cfg: Config = serde_json::from_value(serde_json::json!({
///     "standard": "DDR4",
///     "org": "DDR4_4Gb_x8",
///     "speed": "DDR4_2400R",
///     "channels": 1,
///     "ranks": 1,
/// }))
/// .unwrap();
/// assert_eq!(cfg.standard, StandardKind::Ddr4);
/// assert_eq!(cfg.scheduler, SchedulerKind::Frfcfs);
/// assert_eq!(cfg.readq_entries, 32);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// DRAM standard; the only key without a default.
    pub standard: StandardKind,

    /// Organization preset name; empty selects the standard's default.
    #[serde(default)]
    pub org: String,

    /// Speed bin name; empty selects the standard's default.
    #[serde(default)]
    pub speed: String,

    /// Channels in this tier.
    #[serde(default = "Config::default_channels")]
    pub channels: usize,

    /// Ranks per channel.
    #[serde(default = "Config::default_ranks")]
    pub ranks: usize,

    /// Subarrays per bank (standards with a subarray level only).
    #[serde(default = "Config::default_subarrays")]
    pub subarrays: usize,

    /// Request scheduling policy.
    #[serde(default)]
    pub scheduler: SchedulerKind,

    /// Consecutive row-hit cap for `FRFCFS_Cap`.
    #[serde(default = "Config::default_scheduler_cap")]
    pub scheduler_cap: u64,

    /// Address mapping; normally written by the driver from `--mapping`.
    #[serde(default)]
    pub mapping: MappingKind,

    /// Read queue capacity per controller.
    #[serde(default = "Config::default_readq_entries")]
    pub readq_entries: usize,

    /// Write queue capacity per controller.
    #[serde(default = "Config::default_writeq_entries")]
    pub writeq_entries: usize,

    /// Other-queue capacity per controller.
    #[serde(default = "Config::default_otherq_entries")]
    pub otherq_entries: usize,

    /// Write-drain entry threshold as an occupancy ratio.
    #[serde(default = "Config::default_high_watermark")]
    pub high_writeq_watermark: f32,

    /// Write-drain exit threshold as an occupancy ratio.
    #[serde(default = "Config::default_low_watermark")]
    pub low_writeq_watermark: f32,

    /// CPU ticks per interleave group in CPU-trace mode.
    #[serde(default = "Config::default_cpu_tick")]
    pub cpu_tick: u64,

    /// Memory ticks per interleave group in CPU-trace mode.
    #[serde(default = "Config::default_mem_tick")]
    pub mem_tick: u64,

    /// Committed instructions per core before stats reset; 0 disables warmup.
    #[serde(default)]
    pub warmup_insts: u64,

    /// Per-core instruction budget; 0 means run the trace once to the end.
    #[serde(default)]
    pub expected_limit_insts: u64,

    /// Stop as soon as the processor finishes, without draining memory.
    #[serde(default)]
    pub early_exit: bool,

    /// Weighted-speedup mode: stop at the instruction limit.
    #[serde(default)]
    pub calc_weighted_speedup: bool,

    /// Trace format; written by the driver from `--mode`.
    #[serde(default)]
    pub trace_type: TraceMode,

    /// Core count; written by the driver from the number of trace files.
    #[serde(default = "Config::default_cores")]
    pub cores: usize,
}

impl Config {
    fn default_channels() -> usize {
        defaults::CHANNELS
    }

    fn default_ranks() -> usize {
        defaults::RANKS
    }

    fn default_subarrays() -> usize {
        defaults::SUBARRAYS
    }

    fn default_scheduler_cap() -> u64 {
        defaults::SCHEDULER_CAP
    }

    fn default_readq_entries() -> usize {
        defaults::READQ_ENTRIES
    }

    fn default_writeq_entries() -> usize {
        defaults::WRITEQ_ENTRIES
    }

    fn default_otherq_entries() -> usize {
        defaults::OTHERQ_ENTRIES
    }

    fn default_high_watermark() -> f32 {
        defaults::HIGH_WRITEQ_WATERMARK
    }

    fn default_low_watermark() -> f32 {
        defaults::LOW_WRITEQ_WATERMARK
    }

    fn default_cpu_tick() -> u64 {
        defaults::CPU_TICK
    }

    fn default_mem_tick() -> u64 {
        defaults::MEM_TICK
    }

    fn default_cores() -> usize {
        1
    }

    /// Loads a configuration from a `key = value` text file.
    ///
    /// Lines are comment-stripped at the first `#`, blank lines are skipped,
    /// and each remaining line must contain exactly one `=`. Values are
    /// coerced to JSON scalars before deserialization, so integer keys
    /// accept integers, watermarks accept floats, and flags accept
    /// `true`/`false`/`on`/`off`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be read,
    /// [`SimError::MalformedConfig`] for a line without `=`, and
    /// [`SimError::InvalidConfig`] for unknown keys or bad values.
    pub fn from_file(path: &str) -> Result<Self, SimError> {
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        let mut map = Map::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(SimError::MalformedConfig {
                    path: path.to_string(),
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            let _ = map.insert(key.trim().to_string(), coerce_scalar(value.trim()));
        }
        serde_json::from_value(Value::Object(map)).map_err(|e| SimError::InvalidConfig {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Coerces a config value string to the JSON scalar serde expects.
fn coerce_scalar(value: &str) -> Value {
    match value {
        "true" | "on" => return Value::Bool(true),
        "false" | "off" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = value.parse::<u64>() {
        return Value::from(n);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = value.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }
    Value::String(value.to_string())
}

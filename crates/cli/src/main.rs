//! DRAM memory-system simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It
//! performs:
//! 1. **DRAM-trace runs:** Replay a request trace against one tier, or two
//!    tiers addressed as contiguous ranges when two configs are given.
//! 2. **CPU-trace runs:** Replay per-core instruction traces behind the
//!    processor front-end with warmup and steady phases.
//! 3. **Stats output:** Write every registered statistic to the `--stats`
//!    file, defaulting to `<standard>.stats` (or
//!    `<standard>_<standard2>.stats` for hybrid runs).

use std::fs::File;
use std::io::BufWriter;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dramsim_core::common::SimError;
use dramsim_core::config::{Config, MappingKind, TraceMode};
use dramsim_core::sim::{build_memory, run_cpu_trace, run_dram_trace, run_dram_trace_hybrid};
use dramsim_core::stats::StatList;

#[derive(Parser, Debug)]
#[command(
    name = "dramsim",
    author,
    version,
    about = "Cycle-accurate DRAM memory-system simulator",
    long_about = "Replay a DRAM request trace or per-core CPU instruction traces against a \
cycle-accurate memory-system model.\n\nGive --config once for a single tier or twice for a \
hybrid fast/slow pair addressed as contiguous ranges.\n\nExamples:\n  \
dramsim -c configs/ddr4.cfg --mode dram traces/stream.trace\n  \
dramsim -c configs/ddr4.cfg -c configs/pcm.cfg --mode dram traces/stream.trace\n  \
dramsim -c configs/ddr3.cfg --mode cpu traces/core0.trace traces/core1.trace"
)]
struct Cli {
    /// Config file; pass twice (fast, then slow) for a hybrid run.
    #[arg(short = 'c', long = "config", value_name = "FILE", required = true)]
    configs: Vec<String>,

    /// Trace format.
    #[arg(long, value_enum)]
    mode: Mode,

    /// Stats output file; defaults to <standard>.stats.
    #[arg(long, value_name = "FILE")]
    stats: Option<String>,

    /// Address mapping name, once per config file.
    #[arg(long = "mapping", value_name = "NAME")]
    mappings: Vec<String>,

    /// Trace files; one for dram mode, one per core for cpu mode.
    #[arg(required = true, value_name = "TRACE")]
    traces: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Per-core CPU instruction traces.
    Cpu,
    /// A single DRAM request trace.
    Dram,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    if cli.configs.len() > 2 {
        return Err(SimError::Usage(
            "at most two --config files are supported (fast and slow tier)".to_string(),
        ));
    }
    if cli.mappings.len() > cli.configs.len() {
        return Err(SimError::Usage(
            "more --mapping names than --config files".to_string(),
        ));
    }
    if cli.mode == Mode::Dram && cli.traces.len() != 1 {
        return Err(SimError::Usage(
            "dram mode takes exactly one trace file".to_string(),
        ));
    }

    let mut configs = Vec::with_capacity(cli.configs.len());
    for (i, path) in cli.configs.iter().enumerate() {
        let mut cfg = Config::from_file(path)?;
        cfg.trace_type = match cli.mode {
            Mode::Cpu => TraceMode::Cpu,
            Mode::Dram => TraceMode::Dram,
        };
        cfg.cores = cli.traces.len();
        if let Some(name) = cli.mappings.get(i) {
            cfg.mapping = MappingKind::from_name(name).ok_or_else(|| {
                SimError::Usage(format!("unknown mapping `{name}`"))
            })?;
        }
        configs.push(cfg);
    }

    let stats_path = cli.stats.clone().unwrap_or_else(|| match configs.as_slice() {
        [one] => format!("{}.stats", one.standard.name()),
        [fast, slow] => format!("{}_{}.stats", fast.standard.name(), slow.standard.name()),
        _ => unreachable!("config count validated above"),
    });

    let stats = StatList::new();
    match (cli.mode, configs.len()) {
        (Mode::Dram, 1) => {
            let mut memory = build_memory(&configs[0], &stats, "memory")?;
            run_dram_trace(&mut memory, &cli.traces[0], &stats)?;
        }
        (Mode::Dram, _) => {
            let mut fast = build_memory(&configs[0], &stats, "memory")?;
            let mut slow = build_memory(&configs[1], &stats, "memory2")?;
            run_dram_trace_hybrid(&mut fast, &mut slow, &cli.traces[0], &stats)?;
        }
        (Mode::Cpu, tiers) => {
            if tiers > 1 {
                tracing::warn!("cpu mode drives the fast tier only; second config ignored");
            }
            let mut memory = build_memory(&configs[0], &stats, "memory")?;
            run_cpu_trace(&configs[0], &mut memory, &cli.traces, &stats)?;
        }
    }

    let file = File::create(&stats_path).map_err(|e| SimError::io(&stats_path, e))?;
    let mut out = BufWriter::new(file);
    stats
        .print_all(&mut out)
        .map_err(|e| SimError::io(&stats_path, e))?;

    println!("Simulation done. Statistics written to {stats_path}");
    Ok(())
}

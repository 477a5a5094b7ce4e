//! # Spec Tests
//!
//! Verifies command classification, per-command scopes, derived latencies,
//! and the shape of the populated timing tables.

use pretty_assertions::assert_eq;

use dramsim_core::config::StandardKind;
use dramsim_core::dram::{Command, Level, RefreshMode};
use dramsim_core::request::RequestKind;

use crate::common;

#[test]
fn command_predicates_classify() {
    assert!(Command::Rd.is_accessing());
    assert!(Command::Wra.is_accessing());
    assert!(!Command::Act.is_accessing());

    assert!(Command::Act.is_opening());
    assert!(!Command::Pre.is_opening());

    assert!(Command::Pre.is_closing());
    assert!(Command::PreA.is_closing());
    assert!(Command::Rda.is_closing());
    assert!(!Command::Rd.is_closing());

    assert!(Command::Ref.is_refreshing());
    assert!(Command::RefPb.is_refreshing());
    assert!(!Command::Sre.is_refreshing());
}

#[test]
fn scopes_follow_the_hierarchy() {
    let spec = common::spec(&common::config("DDR4"));
    let rank = spec.level_index(Level::Rank).unwrap();
    let row = spec.level_index(Level::Row).unwrap();
    let column = spec.level_index(Level::Column).unwrap();
    let bank = spec.level_index(Level::Bank).unwrap();

    assert_eq!(spec.scope(Command::Act), row);
    assert_eq!(spec.scope(Command::Pre), row);
    assert_eq!(spec.scope(Command::Rd), column);
    assert_eq!(spec.scope(Command::Wr), column);
    assert_eq!(spec.scope(Command::Ref), rank);
    assert_eq!(spec.scope(Command::PreA), rank);
    assert_eq!(spec.scope(Command::RefPb), bank);
    assert_eq!(spec.scope(Command::Sre), rank);
}

#[test]
fn derived_latencies_come_from_the_speed_bin() {
    let spec = common::spec(&common::config("DDR4"));
    assert_eq!(spec.speed, "DDR4_2400R");
    assert_eq!(spec.read_latency(), spec.params.n_cl + spec.params.n_bl);
    assert_eq!(spec.write_latency(), spec.params.n_cwl + spec.params.n_bl);
    assert_eq!(spec.read_latency(), 20);
    assert_eq!(spec.tx_bytes(), 64);
}

#[test]
fn bank_group_level_carries_long_timings() {
    let spec = common::spec(&common::config("DDR4"));
    let bg = spec.level_index(Level::BankGroup).unwrap();
    let entries = spec.timing_for(bg, Command::Act);
    assert!(
        entries
            .iter()
            .any(|e| e.to == Command::Act && e.gap == spec.params.n_rrd_l),
        "same-group activates must pace at the long RRD"
    );
    let rd = spec.timing_for(bg, Command::Rd);
    assert!(rd.iter().any(|e| e.to == Command::Rd && e.gap == spec.params.n_ccd_l));
}

#[test]
fn four_activate_window_is_a_dist_four_entry() {
    let spec = common::spec(&common::config("DDR3"));
    let rank = spec.level_index(Level::Rank).unwrap();
    let entries = spec.timing_for(rank, Command::Act);
    assert!(
        entries
            .iter()
            .any(|e| e.to == Command::Act && e.dist == 4 && e.gap == spec.params.n_faw)
    );
}

#[test]
fn sibling_rank_turnaround_entries_exist() {
    let spec = common::spec(&common::config("DDR3"));
    let rank = spec.level_index(Level::Rank).unwrap();
    let entries = spec.timing_for(rank, Command::Rd);
    assert!(entries.iter().any(|e| e.sibling && e.to == Command::Rd));
}

#[test]
fn start_command_follows_the_refresh_mode() {
    let ddr3 = common::spec(&common::config("DDR3"));
    assert_eq!(ddr3.refresh_mode, RefreshMode::AllRank);
    assert_eq!(ddr3.start_command(RequestKind::Refresh), Command::Ref);

    let lpddr4 = common::spec(&common::config("LPDDR4"));
    assert_eq!(lpddr4.refresh_mode, RefreshMode::PerBank);
    assert_eq!(lpddr4.start_command(RequestKind::Refresh), Command::RefPb);

    assert_eq!(ddr3.start_command(RequestKind::Read), Command::Rd);
    assert_eq!(ddr3.start_command(RequestKind::Write), Command::Wr);
}

#[test]
fn banks_per_rank_counts_groups() {
    assert_eq!(common::spec(&common::config("DDR3")).banks_per_rank(), 8);
    assert_eq!(common::spec(&common::config("DDR4")).banks_per_rank(), 16);
}

#[test]
fn subarray_count_is_configurable_only_where_present() {
    let mut cfg = common::config("SALP-MASA");
    cfg.subarrays = 4;
    let spec = common::spec(&cfg);
    let sa = spec.level_index(Level::Subarray).unwrap();
    assert_eq!(spec.counts[sa], 4);

    let mut cfg = common::config("DDR3");
    cfg.subarrays = 4;
    let spec = common::spec(&cfg);
    assert_eq!(spec.level_index(Level::Subarray), None);
    assert_eq!(spec.standard, StandardKind::Ddr3);
}

//! # Standard Factory Tests
//!
//! Every supported standard must build from its default presets, carry the
//! right hierarchy, and reject unknown preset names.

use pretty_assertions::assert_eq;
use rstest::rstest;

use dramsim_core::dram::{Level, RefreshMode, standards};

use crate::common;

#[rstest]
#[case("DDR3", false, false)]
#[case("DDR4", true, false)]
#[case("LPDDR3", false, false)]
#[case("LPDDR4", false, false)]
#[case("GDDR5", true, false)]
#[case("HBM", true, false)]
#[case("WideIO", false, false)]
#[case("WideIO2", false, false)]
#[case("SALP-MASA", false, true)]
#[case("DSARP", false, true)]
#[case("ALDRAM", false, false)]
#[case("TLDRAM", false, false)]
#[case("STTMRAM", false, false)]
#[case("PCM", false, false)]
fn every_standard_builds_with_defaults(
    #[case] name: &str,
    #[case] bank_groups: bool,
    #[case] subarrays: bool,
) {
    let cfg = common::config(name);
    let spec = standards::build(&cfg).expect("default presets must build");
    assert_eq!(spec.standard.name(), name);
    assert_eq!(spec.levels[0], Level::Channel);
    assert_eq!(spec.levels[1], Level::Rank);
    assert_eq!(spec.level_index(Level::BankGroup).is_some(), bank_groups);
    assert_eq!(spec.level_index(Level::Subarray).is_some(), subarrays);
    assert!(spec.level_index(Level::Bank).is_some());
    assert!(spec.tx_bytes().is_power_of_two());
    assert!(!spec.org.is_empty());
    assert!(!spec.speed.is_empty());
}

#[test]
fn named_presets_are_selected() {
    let mut cfg = common::config("DDR4");
    cfg.org = "DDR4_8Gb_x8".to_string();
    cfg.speed = "DDR4_3200W".to_string();
    let spec = standards::build(&cfg).expect("named presets");
    assert_eq!(spec.org, "DDR4_8Gb_x8");
    assert_eq!(spec.speed, "DDR4_3200W");
    assert_eq!(spec.params.rate, 3200);
}

#[test]
fn unknown_org_is_rejected() {
    let mut cfg = common::config("DDR4");
    cfg.org = "DDR4_123Gb_x8".to_string();
    assert!(standards::build(&cfg).is_err());
}

#[test]
fn unknown_speed_is_rejected() {
    let mut cfg = common::config("DDR3");
    cfg.speed = "DDR3_9999Z".to_string();
    assert!(standards::build(&cfg).is_err());
}

#[test]
fn per_bank_refresh_standards_declare_it() {
    for name in ["LPDDR4", "HBM", "DSARP"] {
        let spec = standards::build(&common::config(name)).expect("builds");
        assert_eq!(spec.refresh_mode, RefreshMode::PerBank, "{name}");
    }
    for name in ["DDR3", "DDR4", "GDDR5", "SALP-MASA"] {
        let spec = standards::build(&common::config(name)).expect("builds");
        assert_eq!(spec.refresh_mode, RefreshMode::AllRank, "{name}");
    }
}

#[test]
fn non_volatile_standards_never_refresh() {
    for name in ["STTMRAM", "PCM"] {
        let spec = standards::build(&common::config(name)).expect("builds");
        assert_eq!(spec.params.n_refi, 0, "{name} cells do not leak");
    }
}

#[test]
fn variant_standards_reuse_the_ddr3_organization() {
    let ddr3 = standards::build(&common::config("DDR3")).expect("builds");
    for name in ["ALDRAM", "TLDRAM"] {
        let spec = standards::build(&common::config(name)).expect("builds");
        assert_eq!(spec.levels, ddr3.levels, "{name}");
        assert!(
            spec.params.n_rcd < ddr3.params.n_rcd || spec.params.n_ras < ddr3.params.n_ras,
            "{name} exists to shave row timings"
        );
    }
}

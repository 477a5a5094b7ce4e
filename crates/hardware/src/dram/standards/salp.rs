//! Subarray-parallel presets.
//!
//! SALP-MASA and DSARP split each bank into independently activatable
//! subarrays; the subarray is the row-state holder and the row-cycle
//! constraints move down to it. DSARP additionally refreshes per bank so
//! that accesses to other banks proceed under a refresh. The subarray count
//! comes from the configuration, not the organization preset.

use crate::common::SimError;
use crate::config::{Config, StandardKind};
use crate::dram::spec::{DramSpec, Level, RefreshMode, TimingParams};

use super::{OrgPreset, SpeedPreset, pick_org, pick_speed};

const LEVELS: [Level; 6] = [
    Level::Channel,
    Level::Rank,
    Level::Bank,
    Level::Subarray,
    Level::Row,
    Level::Column,
];

const ORGS: [OrgPreset; 2] = [
    OrgPreset {
        name: "SALP_4Gb_x8",
        counts: &[0, 0, 8, 8, 1 << 13, 1 << 10],
    },
    OrgPreset {
        name: "SALP_8Gb_x8",
        counts: &[0, 0, 8, 8, 1 << 14, 1 << 10],
    },
];

const SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "SALP_1600K",
    params: TimingParams {
        rate: 1600,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 11,
        n_rcd: 11,
        n_rp: 11,
        n_cwl: 8,
        n_ras: 28,
        n_rc: 39,
        n_rtp: 6,
        n_wtr_s: 6,
        n_wtr_l: 6,
        n_wr: 12,
        n_rrd_s: 5,
        n_rrd_l: 5,
        n_faw: 24,
        n_rfc: 128,
        n_rfc_pb: 48,
        n_refi: 6240,
        n_rtrs: 2,
        n_cke: 4,
        n_xp: 5,
        n_ckesr: 5,
        n_xs: 136,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let org = pick_org(cfg.standard, &ORGS, &cfg.org)?;
    let speed = pick_speed(cfg.standard, &SPEEDS, &cfg.speed)?;
    let refresh = if cfg.standard == StandardKind::Dsarp {
        RefreshMode::PerBank
    } else {
        RefreshMode::AllRank
    };
    Ok(DramSpec::assemble(
        cfg.standard,
        org.name,
        speed.name,
        LEVELS.to_vec(),
        org.counts.to_vec(),
        64,
        8,
        refresh,
        speed.params,
    ))
}

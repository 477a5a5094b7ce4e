//! Low-power DDR presets.
//!
//! LPDDR3 keeps the plain eight-bank hierarchy with all-rank refresh;
//! LPDDR4 narrows the channel, deepens the prefetch, and refreshes per
//! bank.

use crate::common::SimError;
use crate::config::{Config, StandardKind};
use crate::dram::spec::{DramSpec, Level, RefreshMode, TimingParams};

use super::{OrgPreset, SpeedPreset, pick_org, pick_speed};

const LEVELS: [Level; 5] = [
    Level::Channel,
    Level::Rank,
    Level::Bank,
    Level::Row,
    Level::Column,
];

const LPDDR3_ORGS: [OrgPreset; 2] = [
    OrgPreset {
        name: "LPDDR3_4Gb_x32",
        counts: &[0, 0, 8, 1 << 14, 1 << 10],
    },
    OrgPreset {
        name: "LPDDR3_8Gb_x32",
        counts: &[0, 0, 8, 1 << 15, 1 << 10],
    },
];

const LPDDR4_ORGS: [OrgPreset; 2] = [
    OrgPreset {
        name: "LPDDR4_4Gb_x16",
        counts: &[0, 0, 8, 1 << 15, 1 << 10],
    },
    OrgPreset {
        name: "LPDDR4_8Gb_x16",
        counts: &[0, 0, 8, 1 << 16, 1 << 10],
    },
];

const LPDDR3_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "LPDDR3_1600",
    params: TimingParams {
        rate: 1600,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 12,
        n_rcd: 15,
        n_rp: 15,
        n_cwl: 6,
        n_ras: 34,
        n_rc: 48,
        n_rtp: 6,
        n_wtr_s: 6,
        n_wtr_l: 6,
        n_wr: 12,
        n_rrd_s: 8,
        n_rrd_l: 8,
        n_faw: 40,
        n_rfc: 168,
        n_rfc_pb: 168,
        n_refi: 3120,
        n_rtrs: 2,
        n_cke: 6,
        n_xp: 6,
        n_ckesr: 12,
        n_xs: 180,
    },
}];

const LPDDR4_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "LPDDR4_2400",
    params: TimingParams {
        rate: 2400,
        n_bl: 8,
        n_ccd_s: 8,
        n_ccd_l: 8,
        n_cl: 28,
        n_rcd: 29,
        n_rp: 26,
        n_cwl: 14,
        n_ras: 51,
        n_rc: 76,
        n_rtp: 9,
        n_wtr_s: 12,
        n_wtr_l: 12,
        n_wr: 30,
        n_rrd_s: 12,
        n_rrd_l: 12,
        n_faw: 48,
        n_rfc: 336,
        n_rfc_pb: 112,
        n_refi: 4680,
        n_rtrs: 2,
        n_cke: 9,
        n_xp: 9,
        n_ckesr: 18,
        n_xs: 348,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let lpddr4 = cfg.standard == StandardKind::Lpddr4;
    let (orgs, speeds): (&[OrgPreset], &[SpeedPreset]) = if lpddr4 {
        (&LPDDR4_ORGS, &LPDDR4_SPEEDS)
    } else {
        (&LPDDR3_ORGS, &LPDDR3_SPEEDS)
    };
    let org = pick_org(cfg.standard, orgs, &cfg.org)?;
    let speed = pick_speed(cfg.standard, speeds, &cfg.speed)?;
    let (width, prefetch, refresh) = if lpddr4 {
        (16, 16, RefreshMode::PerBank)
    } else {
        (32, 8, RefreshMode::AllRank)
    };
    Ok(DramSpec::assemble(
        cfg.standard,
        org.name,
        speed.name,
        LEVELS.to_vec(),
        org.counts.to_vec(),
        width,
        prefetch,
        refresh,
        speed.params,
    ))
}

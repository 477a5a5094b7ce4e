//! DDR3 presets, shared by the DDR3-organized variant standards.
//!
//! ALDRAM (adaptive-latency) and TLDRAM (tiered-latency near segment) keep
//! the DDR3 hierarchy and differ only in their cycle parameters, so all
//! three dispatch here with their own speed tables.

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

const ORGS: [OrgPreset; 3] = [
    OrgPreset {
        name: "DDR3_2Gb_x8",
        counts: &[0, 0, 8, 1 << 15, 1 << 10],
    },
    OrgPreset {
        name: "DDR3_1Gb_x8",
        counts: &[0, 0, 8, 1 << 14, 1 << 10],
    },
    OrgPreset {
        name: "DDR3_4Gb_x8",
        counts: &[0, 0, 8, 1 << 16, 1 << 10],
    },
];

const SPEEDS: [SpeedPreset; 3] = [
    SpeedPreset {
        name: "DDR3_1600K",
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
            n_rfc_pb: 128,
            n_refi: 6240,
            n_rtrs: 2,
            n_cke: 4,
            n_xp: 5,
            n_ckesr: 5,
            n_xs: 136,
        },
    },
    SpeedPreset {
        name: "DDR3_1333H",
        params: TimingParams {
            rate: 1333,
            n_bl: 4,
            n_ccd_s: 4,
            n_ccd_l: 4,
            n_cl: 9,
            n_rcd: 9,
            n_rp: 9,
            n_cwl: 7,
            n_ras: 24,
            n_rc: 33,
            n_rtp: 5,
            n_wtr_s: 5,
            n_wtr_l: 5,
            n_wr: 10,
            n_rrd_s: 4,
            n_rrd_l: 4,
            n_faw: 20,
            n_rfc: 107,
            n_rfc_pb: 107,
            n_refi: 5200,
            n_rtrs: 2,
            n_cke: 4,
            n_xp: 4,
            n_ckesr: 5,
            n_xs: 112,
        },
    },
    SpeedPreset {
        name: "DDR3_1866M",
        params: TimingParams {
            rate: 1866,
            n_bl: 4,
            n_ccd_s: 4,
            n_ccd_l: 4,
            n_cl: 13,
            n_rcd: 13,
            n_rp: 13,
            n_cwl: 9,
            n_ras: 32,
            n_rc: 45,
            n_rtp: 7,
            n_wtr_s: 7,
            n_wtr_l: 7,
            n_wr: 14,
            n_rrd_s: 5,
            n_rrd_l: 5,
            n_faw: 26,
            n_rfc: 150,
            n_rfc_pb: 150,
            n_refi: 7280,
            n_rtrs: 2,
            n_cke: 5,
            n_xp: 6,
            n_ckesr: 6,
            n_xs: 160,
        },
    },
];

/// ALDRAM at its cool-temperature operating point: activation and precharge
/// shortened relative to the DDR3-1600 baseline.
const ALDRAM_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "ALDRAM_1600K_T45",
    params: TimingParams {
        rate: 1600,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 11,
        n_rcd: 8,
        n_rp: 8,
        n_cwl: 8,
        n_ras: 21,
        n_rc: 29,
        n_rtp: 6,
        n_wtr_s: 6,
        n_wtr_l: 6,
        n_wr: 9,
        n_rrd_s: 5,
        n_rrd_l: 5,
        n_faw: 24,
        n_rfc: 128,
        n_rfc_pb: 128,
        n_refi: 6240,
        n_rtrs: 2,
        n_cke: 4,
        n_xp: 5,
        n_ckesr: 5,
        n_xs: 136,
    },
}];

/// TLDRAM near-segment bin: short bitlines cut the row timings roughly in
/// half against DDR3-1600.
const TLDRAM_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "TLDRAM_1600K_Near",
    params: TimingParams {
        rate: 1600,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 8,
        n_rcd: 6,
        n_rp: 6,
        n_cwl: 8,
        n_ras: 14,
        n_rc: 20,
        n_rtp: 6,
        n_wtr_s: 6,
        n_wtr_l: 6,
        n_wr: 8,
        n_rrd_s: 5,
        n_rrd_l: 5,
        n_faw: 24,
        n_rfc: 128,
        n_rfc_pb: 128,
        n_refi: 6240,
        n_rtrs: 2,
        n_cke: 4,
        n_xp: 5,
        n_ckesr: 5,
        n_xs: 136,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let speeds: &[SpeedPreset] = match cfg.standard {
        StandardKind::Aldram => &ALDRAM_SPEEDS,
        StandardKind::Tldram => &TLDRAM_SPEEDS,
        _ => &SPEEDS,
    };
    let org = pick_org(cfg.standard, &ORGS, &cfg.org)?;
    let speed = pick_speed(cfg.standard, speeds, &cfg.speed)?;
    Ok(DramSpec::assemble(
        cfg.standard,
        org.name,
        speed.name,
        LEVELS.to_vec(),
        org.counts.to_vec(),
        64,
        8,
        RefreshMode::AllRank,
        speed.params,
    ))
}

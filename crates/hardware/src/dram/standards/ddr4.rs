//! DDR4 presets: bank groups with long/short column and activation timings.

use crate::common::SimError;
use crate::config::Config;
use crate::dram::spec::{DramSpec, Level, RefreshMode, TimingParams};

use super::{OrgPreset, SpeedPreset, pick_org, pick_speed};

const LEVELS: [Level; 6] = [
    Level::Channel,
    Level::Rank,
    Level::BankGroup,
    Level::Bank,
    Level::Row,
    Level::Column,
];

const ORGS: [OrgPreset; 3] = [
    OrgPreset {
        name: "DDR4_4Gb_x8",
        counts: &[0, 0, 4, 4, 1 << 15, 1 << 10],
    },
    OrgPreset {
        name: "DDR4_8Gb_x8",
        counts: &[0, 0, 4, 4, 1 << 16, 1 << 10],
    },
    OrgPreset {
        name: "DDR4_16Gb_x8",
        counts: &[0, 0, 4, 4, 1 << 17, 1 << 10],
    },
];

const SPEEDS: [SpeedPreset; 3] = [
    SpeedPreset {
        name: "DDR4_2400R",
        params: TimingParams {
            rate: 2400,
            n_bl: 4,
            n_ccd_s: 4,
            n_ccd_l: 6,
            n_cl: 16,
            n_rcd: 16,
            n_rp: 16,
            n_cwl: 12,
            n_ras: 39,
            n_rc: 55,
            n_rtp: 9,
            n_wtr_s: 3,
            n_wtr_l: 9,
            n_wr: 18,
            n_rrd_s: 4,
            n_rrd_l: 6,
            n_faw: 26,
            n_rfc: 420,
            n_rfc_pb: 420,
            n_refi: 9360,
            n_rtrs: 2,
            n_cke: 6,
            n_xp: 8,
            n_ckesr: 7,
            n_xs: 432,
        },
    },
    SpeedPreset {
        name: "DDR4_2133P",
        params: TimingParams {
            rate: 2133,
            n_bl: 4,
            n_ccd_s: 4,
            n_ccd_l: 6,
            n_cl: 15,
            n_rcd: 15,
            n_rp: 15,
            n_cwl: 11,
            n_ras: 36,
            n_rc: 51,
            n_rtp: 8,
            n_wtr_s: 3,
            n_wtr_l: 8,
            n_wr: 16,
            n_rrd_s: 4,
            n_rrd_l: 5,
            n_faw: 23,
            n_rfc: 374,
            n_rfc_pb: 374,
            n_refi: 8320,
            n_rtrs: 2,
            n_cke: 6,
            n_xp: 7,
            n_ckesr: 7,
            n_xs: 384,
        },
    },
    SpeedPreset {
        name: "DDR4_3200W",
        params: TimingParams {
            rate: 3200,
            n_bl: 4,
            n_ccd_s: 4,
            n_ccd_l: 8,
            n_cl: 22,
            n_rcd: 22,
            n_rp: 22,
            n_cwl: 16,
            n_ras: 52,
            n_rc: 74,
            n_rtp: 12,
            n_wtr_s: 4,
            n_wtr_l: 12,
            n_wr: 24,
            n_rrd_s: 4,
            n_rrd_l: 8,
            n_faw: 34,
            n_rfc: 560,
            n_rfc_pb: 560,
            n_refi: 12480,
            n_rtrs: 2,
            n_cke: 8,
            n_xp: 10,
            n_ckesr: 9,
            n_xs: 576,
        },
    },
];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let org = pick_org(cfg.standard, &ORGS, &cfg.org)?;
    let speed = pick_speed(cfg.standard, &SPEEDS, &cfg.speed)?;
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

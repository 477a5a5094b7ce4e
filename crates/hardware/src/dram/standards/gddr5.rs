//! GDDR5 presets: graphics-class bank groups on a 32-bit channel.

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

const ORGS: [OrgPreset; 2] = [
    OrgPreset {
        name: "GDDR5_4Gb_x32",
        counts: &[0, 0, 4, 4, 1 << 14, 1 << 10],
    },
    OrgPreset {
        name: "GDDR5_8Gb_x32",
        counts: &[0, 0, 4, 4, 1 << 15, 1 << 10],
    },
];

const SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "GDDR5_6000",
    params: TimingParams {
        rate: 6000,
        n_bl: 2,
        n_ccd_s: 2,
        n_ccd_l: 3,
        n_cl: 18,
        n_rcd: 18,
        n_rp: 18,
        n_cwl: 4,
        n_ras: 42,
        n_rc: 60,
        n_rtp: 3,
        n_wtr_s: 4,
        n_wtr_l: 6,
        n_wr: 20,
        n_rrd_s: 6,
        n_rrd_l: 6,
        n_faw: 24,
        n_rfc: 195,
        n_rfc_pb: 195,
        n_refi: 2850,
        n_rtrs: 2,
        n_cke: 8,
        n_xp: 10,
        n_ckesr: 10,
        n_xs: 210,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let org = pick_org(cfg.standard, &ORGS, &cfg.org)?;
    let speed = pick_speed(cfg.standard, &SPEEDS, &cfg.speed)?;
    Ok(DramSpec::assemble(
        cfg.standard,
        org.name,
        speed.name,
        LEVELS.to_vec(),
        org.counts.to_vec(),
        32,
        8,
        RefreshMode::AllRank,
        speed.params,
    ))
}

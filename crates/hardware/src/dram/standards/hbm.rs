//! HBM presets: wide pseudo-channels, shallow prefetch, per-bank refresh.

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
        name: "HBM_4Gb",
        counts: &[0, 0, 4, 4, 1 << 15, 1 << 7],
    },
    OrgPreset {
        name: "HBM_8Gb",
        counts: &[0, 0, 4, 4, 1 << 16, 1 << 7],
    },
];

const SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "HBM_1000",
    params: TimingParams {
        rate: 1000,
        n_bl: 2,
        n_ccd_s: 2,
        n_ccd_l: 3,
        n_cl: 7,
        n_rcd: 7,
        n_rp: 7,
        n_cwl: 4,
        n_ras: 17,
        n_rc: 24,
        n_rtp: 3,
        n_wtr_s: 2,
        n_wtr_l: 4,
        n_wr: 8,
        n_rrd_s: 4,
        n_rrd_l: 5,
        n_faw: 20,
        n_rfc: 130,
        n_rfc_pb: 64,
        n_refi: 1950,
        n_rtrs: 2,
        n_cke: 4,
        n_xp: 5,
        n_ckesr: 5,
        n_xs: 135,
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
        128,
        2,
        RefreshMode::PerBank,
        speed.params,
    ))
}

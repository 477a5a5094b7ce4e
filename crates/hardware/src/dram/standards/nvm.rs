//! Non-volatile memory presets behind a DDR3-style interface.
//!
//! STT-MRAM reads at DRAM-class latency but pays a long write pulse; PCM
//! pays heavily on both row activation (the array read) and writeback.
//! Neither cell leaks, so the refresh interval is zero and the controller
//! injects no refresh at all.

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

const STTMRAM_ORGS: [OrgPreset; 1] = [OrgPreset {
    name: "STTMRAM_2Gb_x8",
    counts: &[0, 0, 8, 1 << 15, 1 << 10],
}];

const PCM_ORGS: [OrgPreset; 2] = [
    OrgPreset {
        name: "PCM_8Gb_x8",
        counts: &[0, 0, 8, 1 << 17, 1 << 10],
    },
    OrgPreset {
        name: "PCM_16Gb_x8",
        counts: &[0, 0, 8, 1 << 18, 1 << 10],
    },
];

const STTMRAM_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "STTMRAM_1600K",
    params: TimingParams {
        rate: 1600,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 11,
        n_rcd: 18,
        n_rp: 14,
        n_cwl: 8,
        n_ras: 40,
        n_rc: 55,
        n_rtp: 6,
        n_wtr_s: 6,
        n_wtr_l: 6,
        n_wr: 40,
        n_rrd_s: 5,
        n_rrd_l: 5,
        n_faw: 24,
        n_rfc: 0,
        n_rfc_pb: 0,
        n_refi: 0,
        n_rtrs: 2,
        n_cke: 4,
        n_xp: 5,
        n_ckesr: 5,
        n_xs: 5,
    },
}];

const PCM_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "PCM_800",
    params: TimingParams {
        rate: 800,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 5,
        n_rcd: 22,
        n_rp: 60,
        n_cwl: 4,
        n_ras: 80,
        n_rc: 140,
        n_rtp: 3,
        n_wtr_s: 3,
        n_wtr_l: 3,
        n_wr: 60,
        n_rrd_s: 2,
        n_rrd_l: 2,
        n_faw: 20,
        n_rfc: 0,
        n_rfc_pb: 0,
        n_refi: 0,
        n_rtrs: 2,
        n_cke: 2,
        n_xp: 3,
        n_ckesr: 3,
        n_xs: 3,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let (orgs, speeds): (&[OrgPreset], &[SpeedPreset]) =
        if cfg.standard == StandardKind::SttMram {
            (&STTMRAM_ORGS, &STTMRAM_SPEEDS)
        } else {
            (&PCM_ORGS, &PCM_SPEEDS)
        };
    let org = pick_org(cfg.standard, orgs, &cfg.org)?;
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

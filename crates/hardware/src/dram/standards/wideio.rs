//! Wide I/O presets.
//!
//! WideIO2 runs the doubled channel width directly in its preset data and
//! carries the deeper prefetch of the second generation.

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

const WIDEIO_ORGS: [OrgPreset; 1] = [OrgPreset {
    name: "WideIO_1Gb",
    counts: &[0, 0, 4, 1 << 14, 1 << 9],
}];

const WIDEIO2_ORGS: [OrgPreset; 1] = [OrgPreset {
    name: "WideIO2_2Gb",
    counts: &[0, 0, 8, 1 << 14, 1 << 9],
}];

const WIDEIO_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "WideIO_266",
    params: TimingParams {
        rate: 266,
        n_bl: 2,
        n_ccd_s: 2,
        n_ccd_l: 2,
        n_cl: 3,
        n_rcd: 6,
        n_rp: 6,
        n_cwl: 1,
        n_ras: 9,
        n_rc: 15,
        n_rtp: 2,
        n_wtr_s: 3,
        n_wtr_l: 3,
        n_wr: 4,
        n_rrd_s: 2,
        n_rrd_l: 2,
        n_faw: 10,
        n_rfc: 42,
        n_rfc_pb: 42,
        n_refi: 1040,
        n_rtrs: 1,
        n_cke: 2,
        n_xp: 2,
        n_ckesr: 3,
        n_xs: 50,
    },
}];

const WIDEIO2_SPEEDS: [SpeedPreset; 1] = [SpeedPreset {
    name: "WideIO2_1066",
    params: TimingParams {
        rate: 1066,
        n_bl: 4,
        n_ccd_s: 4,
        n_ccd_l: 4,
        n_cl: 9,
        n_rcd: 10,
        n_rp: 10,
        n_cwl: 5,
        n_ras: 23,
        n_rc: 32,
        n_rtp: 4,
        n_wtr_s: 4,
        n_wtr_l: 4,
        n_wr: 8,
        n_rrd_s: 4,
        n_rrd_l: 4,
        n_faw: 17,
        n_rfc: 96,
        n_rfc_pb: 96,
        n_refi: 2080,
        n_rtrs: 2,
        n_cke: 3,
        n_xp: 4,
        n_ckesr: 4,
        n_xs: 104,
    },
}];

pub(super) fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    let second_gen = cfg.standard == StandardKind::WideIo2;
    let (orgs, speeds): (&[OrgPreset], &[SpeedPreset]) = if second_gen {
        (&WIDEIO2_ORGS, &WIDEIO2_SPEEDS)
    } else {
        (&WIDEIO_ORGS, &WIDEIO_SPEEDS)
    };
    let org = pick_org(cfg.standard, orgs, &cfg.org)?;
    let speed = pick_speed(cfg.standard, speeds, &cfg.speed)?;
    let (width, prefetch) = if second_gen { (128, 8) } else { (128, 4) };
    Ok(DramSpec::assemble(
        cfg.standard,
        org.name,
        speed.name,
        LEVELS.to_vec(),
        org.counts.to_vec(),
        width,
        prefetch,
        RefreshMode::AllRank,
        speed.params,
    ))
}

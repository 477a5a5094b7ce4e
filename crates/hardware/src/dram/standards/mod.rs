//! Preset tables and spec builders for the supported DRAM standards.
//!
//! Every standard contributes only data: an ordered level list, named
//! organization presets (fan-out counts), and named speed bins (cycle
//! parameters). The single [`build`] factory turns a configuration into a
//! [`DramSpec`]; nothing downstream branches on the standard again.

use crate::common::SimError;
use crate::config::{Config, StandardKind};
use crate::dram::spec::{DramSpec, TimingParams};

mod ddr3;
mod ddr4;
mod gddr5;
mod hbm;
mod lpddr;
mod nvm;
mod salp;
mod wideio;

/// One organization preset: fan-out counts parallel to the standard's level
/// list, with zero placeholders for channel and rank.
pub(crate) struct OrgPreset {
    pub name: &'static str,
    pub counts: &'static [usize],
}

/// One speed bin.
pub(crate) struct SpeedPreset {
    pub name: &'static str,
    pub params: TimingParams,
}

/// Builds the spec for the configured standard, org, and speed.
///
/// An empty `org` or `speed` selects the standard's first (default) preset.
/// Channel, rank, and subarray counts stay at their placeholders; the
/// driver writes them before freezing the spec.
///
/// # Errors
///
/// Returns [`SimError::UnknownOrg`] or [`SimError::UnknownSpeed`] when a
/// named preset does not exist for the standard.
pub fn build(cfg: &Config) -> Result<DramSpec, SimError> {
    match cfg.standard {
        StandardKind::Ddr3 | StandardKind::Aldram | StandardKind::Tldram => ddr3::build(cfg),
        StandardKind::Ddr4 => ddr4::build(cfg),
        StandardKind::Lpddr3 | StandardKind::Lpddr4 => lpddr::build(cfg),
        StandardKind::Gddr5 => gddr5::build(cfg),
        StandardKind::Hbm => hbm::build(cfg),
        StandardKind::WideIo | StandardKind::WideIo2 => wideio::build(cfg),
        StandardKind::SalpMasa | StandardKind::Dsarp => salp::build(cfg),
        StandardKind::SttMram | StandardKind::Pcm => nvm::build(cfg),
    }
}

pub(crate) fn pick_org<'a>(
    standard: StandardKind,
    table: &'a [OrgPreset],
    requested: &str,
) -> Result<&'a OrgPreset, SimError> {
    if requested.is_empty() {
        return Ok(&table[0]);
    }
    table
        .iter()
        .find(|o| o.name == requested)
        .ok_or_else(|| SimError::UnknownOrg {
            standard: standard.name().to_string(),
            org: requested.to_string(),
        })
}

pub(crate) fn pick_speed<'a>(
    standard: StandardKind,
    table: &'a [SpeedPreset],
    requested: &str,
) -> Result<&'a SpeedPreset, SimError> {
    if requested.is_empty() {
        return Ok(&table[0]);
    }
    table
        .iter()
        .find(|s| s.name == requested)
        .ok_or_else(|| SimError::UnknownSpeed {
            standard: standard.name().to_string(),
            speed: requested.to_string(),
        })
}

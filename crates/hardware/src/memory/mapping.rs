//! Address-to-coordinate mapping schemes.
//!
//! A mapping names the order in which level fields are peeled from the
//! transaction-aligned address, least significant first. The low bits of an
//! address stream change fastest, so the mapping decides which levels see
//! locality: the default keeps the channel and column lowest (adjacent
//! lines hit the same row) and the row highest.

use crate::config::MappingKind;
use crate::dram::{DramSpec, Level};

/// Level indices in peel order, least significant field first.
///
/// Levels a standard does not have are skipped; within the bank family the
/// finest level (subarray) peels before the bank, the bank before the
/// group.
pub(crate) fn lsb_order(kind: MappingKind, spec: &DramSpec) -> Vec<usize> {
    match kind {
        MappingKind::ChRaBaRoCo => (0..spec.levels.len()).rev().collect(),
        MappingKind::RoBaRaCoCh => order_of(
            spec,
            &[
                Level::Channel,
                Level::Column,
                Level::Rank,
                Level::Subarray,
                Level::Bank,
                Level::BankGroup,
                Level::Row,
            ],
        ),
        MappingKind::RoCoBaRaCh => order_of(
            spec,
            &[
                Level::Channel,
                Level::Rank,
                Level::Subarray,
                Level::Bank,
                Level::BankGroup,
                Level::Column,
                Level::Row,
            ],
        ),
    }
}

fn order_of(spec: &DramSpec, levels: &[Level]) -> Vec<usize> {
    levels
        .iter()
        .filter_map(|&l| spec.level_index(l))
        .collect()
}

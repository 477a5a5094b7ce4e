//! One memory tier: address mapping and the fan-out to channel controllers.
//!
//! The memory owns its controllers, decodes each incoming address to a
//! coordinate exactly once, and dispatches the request to the right
//! channel. Routing between tiers is the caller's duty: an address at or
//! beyond [`Memory::max_address`] here is a programming error, not
//! back-pressure.

use std::sync::Arc;

use crate::config::{Config, MappingKind};
use crate::controller::Controller;
use crate::dram::{DramSpec, Level};
use crate::request::{Request, RequestKind};
use crate::stats::{Scalar, StatList};

/// Mapping schemes.
pub mod mapping;

/// One memory tier.
pub struct Memory {
    spec: Arc<DramSpec>,
    /// Channel controllers, advanced in index order every tick.
    pub ctrls: Vec<Controller>,
    mapping: MappingKind,
    lsb_order: Vec<usize>,
    addr_bits: Vec<usize>,
    tx_bits: u32,
    /// One past the highest addressable byte of this tier.
    pub max_address: u64,
    incoming_reads: Scalar,
    incoming_writes: Scalar,
}

impl Memory {
    /// Builds a tier over a frozen spec, registering statistics under
    /// `prefix`.
    ///
    /// Every level fan-out must be a power of two; the bit-sliced mappings
    /// depend on it.
    pub fn new(cfg: &Config, spec: Arc<DramSpec>, stats: &StatList, prefix: &str) -> Self {
        assert_eq!(spec.counts[0], cfg.channels, "spec not frozen with config");

        let column = spec
            .level_index(Level::Column)
            .expect("every standard addresses columns");
        let mut addr_bits = Vec::with_capacity(spec.levels.len());
        for (l, &count) in spec.counts.iter().enumerate() {
            let effective = if l == column {
                count / spec.prefetch
            } else {
                count
            };
            assert!(
                effective.is_power_of_two(),
                "level fan-out {effective} is not a power of two"
            );
            addr_bits.push(effective.trailing_zeros() as usize);
        }

        let tx_bytes = spec.tx_bytes();
        assert!(tx_bytes.is_power_of_two());
        let total_bits: usize = addr_bits.iter().sum();
        let max_address = tx_bytes << total_bits;

        let ctrls = (0..cfg.channels)
            .map(|c| {
                Controller::new(
                    cfg,
                    Arc::clone(&spec),
                    c,
                    stats,
                    &format!("{prefix}.ch{c}"),
                )
            })
            .collect();

        Self {
            ctrls,
            mapping: cfg.mapping,
            lsb_order: mapping::lsb_order(cfg.mapping, &spec),
            addr_bits,
            tx_bits: tx_bytes.trailing_zeros(),
            max_address,
            incoming_reads: stats.scalar(
                &format!("{prefix}.incoming_reads"),
                "Read requests accepted by this tier",
            ),
            incoming_writes: stats.scalar(
                &format!("{prefix}.incoming_writes"),
                "Write requests accepted by this tier",
            ),
            spec,
        }
    }

    /// The spec shared by this tier's controllers.
    pub fn spec(&self) -> &Arc<DramSpec> {
        &self.spec
    }

    /// The mapping this tier decodes with.
    pub fn mapping(&self) -> MappingKind {
        self.mapping
    }

    /// Decodes an address into one index per organization level.
    pub fn decode_addr(&self, addr: u64) -> Vec<usize> {
        debug_assert!(addr < self.max_address);
        let mut coord = vec![0; self.addr_bits.len()];
        let mut rest = addr >> self.tx_bits;
        for &l in &self.lsb_order {
            let bits = self.addr_bits[l];
            coord[l] = (rest & ((1 << bits) - 1)) as usize;
            rest >>= bits;
        }
        coord
    }

    /// Reassembles the address a coordinate decodes from.
    ///
    /// Inverse of [`decode_addr`](Self::decode_addr); the transaction
    /// offset bits come back as zero.
    pub fn encode_addr(&self, coord: &[usize]) -> u64 {
        let mut addr = 0u64;
        for &l in self.lsb_order.iter().rev() {
            addr = (addr << self.addr_bits[l]) | coord[l] as u64;
        }
        addr << self.tx_bits
    }

    /// Decodes and dispatches a request to its channel's controller.
    ///
    /// # Errors
    ///
    /// Back-pressure from the controller; the request comes back for the
    /// producer to retry.
    ///
    /// # Panics
    ///
    /// When the address is outside this tier. Tier routing happens above
    /// this layer; by the time a request reaches a memory its address must
    /// be in range.
    pub fn send(&mut self, mut req: Request) -> Result<(), Request> {
        assert!(
            req.addr < self.max_address,
            "memory send: address {:#x} beyond tier capacity {:#x}",
            req.addr,
            self.max_address
        );
        req.coord = self.decode_addr(req.addr);
        let channel = req.coord[0];
        let kind = req.kind;
        self.ctrls[channel].send(req)?;
        match kind {
            RequestKind::Read => self.incoming_reads.inc(),
            RequestKind::Write => self.incoming_writes.inc(),
            RequestKind::Refresh => {}
        }
        Ok(())
    }

    /// Advances every controller exactly once, in channel order.
    pub fn tick(&mut self) {
        for ctrl in &mut self.ctrls {
            ctrl.tick();
        }
    }

    /// Requests owned by this tier: queued plus in flight, all channels.
    pub fn pending_requests(&self) -> usize {
        self.ctrls.iter().map(Controller::pending_requests).sum()
    }

    /// Forwards a write-drain entry threshold to every controller.
    pub fn set_high_writeq_watermark(&mut self, mark: f32) {
        for ctrl in &mut self.ctrls {
            ctrl.set_high_writeq_watermark(mark);
        }
    }

    /// Forwards a write-drain exit threshold to every controller.
    pub fn set_low_writeq_watermark(&mut self, mark: f32) {
        for ctrl in &mut self.ctrls {
            ctrl.set_low_writeq_watermark(mark);
        }
    }

    /// Flushes terminal bookkeeping on every controller.
    pub fn finish(&mut self) {
        for ctrl in &mut self.ctrls {
            ctrl.finish();
        }
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("standard", &self.spec.standard)
            .field("channels", &self.ctrls.len())
            .field("max_address", &self.max_address)
            .finish()
    }
}

//! # Write-Drain Hysteresis Tests
//!
//! Drives a standalone controller with writes only and checks the
//! dual-threshold mode machine: enter drain at the high watermark, stay
//! until the low watermark, resume reads after.

use dramsim_core::config::Config;
use dramsim_core::controller::Controller;
use dramsim_core::request::{Reply, Request, RequestKind};
use dramsim_core::stats::StatList;

use crate::common::{self, coord};

fn s6_config() -> Config {
    let mut cfg = common::config("DDR3");
    cfg.writeq_entries = 32;
    cfg.high_writeq_watermark = 0.8;
    cfg.low_writeq_watermark = 0.4;
    cfg
}

fn write_to_col(ctrl: &Controller, col: usize) -> Request {
    let mut req = Request::new((col * 64) as u64, RequestKind::Write, Reply::Discard);
    req.coord = coord(ctrl.tree.spec(), &[0, 0, 0, col]);
    req
}

fn send_writes(ctrl: &mut Controller, from: usize, count: usize) {
    for col in from..from + count {
        let req = write_to_col(ctrl, col);
        assert!(ctrl.send(req).is_ok(), "write queue unexpectedly full");
    }
}

#[test]
fn drain_engages_at_the_high_watermark() {
    let stats = StatList::new();
    let mut ctrl = common::controller(&s6_config(), &stats);

    send_writes(&mut ctrl, 0, 25);
    ctrl.tick();
    assert!(!ctrl.write_mode(), "25 of 32 is below the 0.8 watermark");

    send_writes(&mut ctrl, 25, 1);
    ctrl.tick();
    assert!(ctrl.write_mode(), "26 of 32 crosses the 0.8 watermark");
}

#[test]
fn drain_holds_until_the_low_watermark() {
    let stats = StatList::new();
    let mut ctrl = common::controller(&s6_config(), &stats);

    send_writes(&mut ctrl, 0, 26);
    ctrl.tick();
    assert!(ctrl.write_mode());

    // Drain to exactly 12 entries; the controller must stay in write mode
    // the whole way down.
    let mut guard = 0;
    while ctrl.write_queue_len() > 12 {
        ctrl.tick();
        if ctrl.write_queue_len() > 12 {
            assert!(ctrl.write_mode(), "drain must hold above the low watermark");
        }
        guard += 1;
        assert!(guard < 10_000, "write drain made no progress");
    }

    // The next tick observes 12 of 32 (0.375) and resumes reads.
    ctrl.tick();
    assert!(!ctrl.write_mode(), "12 of 32 is at the 0.4 low watermark");
}

#[test]
fn oscillation_between_thresholds_does_not_flip_modes() {
    let stats = StatList::new();
    let mut ctrl = common::controller(&s6_config(), &stats);

    send_writes(&mut ctrl, 0, 26);
    ctrl.tick();
    assert!(ctrl.write_mode());

    // Refill while draining; occupancy hovers between the watermarks.
    let mut col = 26;
    for _ in 0..200 {
        ctrl.tick();
        if ctrl.write_queue_len() <= 14 {
            send_writes(&mut ctrl, col, 4);
            col += 4;
        }
        assert!(
            ctrl.write_mode(),
            "mode must not flip while occupancy stays above the low watermark"
        );
    }
}

#[test]
fn zero_high_watermark_forces_drain() {
    let stats = StatList::new();
    let mut ctrl = common::controller(&s6_config(), &stats);

    send_writes(&mut ctrl, 0, 4);
    ctrl.set_high_writeq_watermark(0.0);
    let mut guard = 0;
    while ctrl.pending_requests() > 0 {
        ctrl.tick();
        guard += 1;
        assert!(guard < 10_000, "forced drain did not finish");
    }
    assert_eq!(ctrl.write_queue_len(), 0);
}

#[test]
fn reads_still_retire_while_the_drain_watermark_is_zero() {
    let stats = StatList::new();
    let hist = stats.histogram("probe", "read latency probe");
    let mut ctrl = common::controller(&s6_config(), &stats);
    ctrl.set_high_writeq_watermark(0.0);

    let mut req = Request::new(0, RequestKind::Read, Reply::Latency(hist.clone()));
    req.coord = coord(ctrl.tree.spec(), &[0, 0, 0, 0]);
    assert!(ctrl.send(req).is_ok());

    let mut guard = 0;
    while hist.total() == 0 {
        ctrl.tick();
        guard += 1;
        assert!(guard < 10_000, "read starved behind an empty write drain");
    }
}

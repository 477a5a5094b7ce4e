//! # Routing and Conservation Tests
//!
//! Dispatch to channel controllers, queue conservation, back-pressure, and
//! the capacity contract.

use pretty_assertions::assert_eq;

use dramsim_core::request::{Reply, Request, RequestKind};
use dramsim_core::stats::StatList;

use crate::common;

#[test]
fn requests_reach_the_controller_their_channel_owns() {
    let mut cfg = common::config("DDR3");
    cfg.channels = 2;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);
    let tx = mem.spec().tx_bytes();

    // Default mapping: adjacent lines alternate channels.
    mem.send(Request::new(0, RequestKind::Read, Reply::Discard))
        .expect("accepted");
    mem.send(Request::new(tx, RequestKind::Read, Reply::Discard))
        .expect("accepted");
    assert_eq!(mem.ctrls[0].pending_requests(), 1);
    assert_eq!(mem.ctrls[1].pending_requests(), 1);
}

#[test]
fn sent_minus_completed_equals_pending_every_cycle() {
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let hist = stats.histogram("probe", "completion probe");
    let mut mem = common::memory(&cfg, &stats);

    let sent = 12u64;
    for i in 0..sent {
        // Spread across banks so the drain exercises parallelism.
        let addr = i * 4096;
        mem.send(Request::new(addr, RequestKind::Read, Reply::Latency(hist.clone())))
            .expect("accepted");
    }

    let mut guard = 0;
    while mem.pending_requests() > 0 {
        assert_eq!(
            sent - hist.total(),
            mem.pending_requests() as u64,
            "conservation must hold every cycle"
        );
        mem.tick();
        stats.tick();
        guard += 1;
        assert!(guard < 100_000, "requests did not drain");
    }
    assert_eq!(hist.total(), sent, "exactly one completion per request");
}

#[test]
fn every_accepted_read_departs_no_earlier_than_it_arrived() {
    let cfg = common::config("DDR4");
    let stats = StatList::new();
    let hist = stats.histogram("probe", "latency probe");
    let mut mem = common::memory(&cfg, &stats);

    for i in 0..8u64 {
        mem.send(Request::new(
            i * 64,
            RequestKind::Read,
            Reply::Latency(hist.clone()),
        ))
        .expect("accepted");
    }
    common::drain(&mut mem, &stats, 100_000);
    assert_eq!(hist.total(), 8);
    assert!(hist.mean() > 0.0, "latency histogram records depart - arrive");
}

#[test]
fn full_read_queue_applies_back_pressure() {
    let mut cfg = common::config("DDR3");
    cfg.readq_entries = 2;
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);

    // Same bank, distinct rows: nothing retires without ticks, and the
    // write-buffer forwarding path cannot trigger.
    let row_stride = 1 << 17;
    mem.send(Request::new(0, RequestKind::Read, Reply::Discard))
        .expect("accepted");
    mem.send(Request::new(row_stride, RequestKind::Read, Reply::Discard))
        .expect("accepted");
    let rejected = mem.send(Request::new(2 * row_stride, RequestKind::Read, Reply::Discard));
    let req = rejected.expect_err("third read must bounce");
    assert_eq!(req.addr, 2 * row_stride, "the request comes back intact");
}

#[test]
fn reads_forward_from_a_queued_write_to_the_same_line() {
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let hist = stats.histogram("probe", "forwarded latency");
    let mut mem = common::memory(&cfg, &stats);

    mem.send(Request::new(0, RequestKind::Write, Reply::Discard))
        .expect("accepted");
    mem.send(Request::new(0, RequestKind::Read, Reply::Latency(hist.clone())))
        .expect("accepted");

    mem.tick();
    stats.tick();
    mem.tick();
    stats.tick();
    assert_eq!(hist.total(), 1, "forwarded read retires almost immediately");
    assert!(hist.mean() <= 1.0);
}

#[test]
#[should_panic(expected = "beyond tier capacity")]
fn out_of_range_addresses_are_a_programming_error() {
    let cfg = common::config("DDR3");
    let stats = StatList::new();
    let mut mem = common::memory(&cfg, &stats);
    let addr = mem.max_address;
    let _ = mem.send(Request::new(addr, RequestKind::Read, Reply::Discard));
}

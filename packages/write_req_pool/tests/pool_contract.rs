//! Tests that drive [`WriteReqPool`] the way an event loop write path would:
//! a warm-up burst, a steady-state hot loop with overlapping writes in flight,
//! and loop shutdown.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "we do not need to worry about these things when writing test code"
)]

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;
use write_req_pool::{Lease, WriteReqFactory, WriteReqPool};

/// Stands in for the event loop the write requests are bound to. Registration is the
/// expensive step the pool exists to amortize, so the loop counts registrations and
/// refuses them once closed.
struct FakeLoop {
    registrations: Cell<usize>,
    closed: Cell<bool>,
}

impl FakeLoop {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            registrations: Cell::new(0),
            closed: Cell::new(false),
        })
    }
}

/// Stands in for a native write request registered with the loop. Writing appends to
/// an internal buffer; completion clears it, mimicking a self-resetting handle.
struct FakeWriteReq {
    loop_handle: Rc<FakeLoop>,
    pending: Vec<u8>,
    writes_completed: usize,
}

impl FakeWriteReq {
    fn submit(&mut self, payload: &[u8]) {
        assert!(
            self.pending.is_empty(),
            "a write request carries at most one in-flight write"
        );
        self.pending.extend_from_slice(payload);
    }

    fn complete(&mut self) {
        self.pending.clear();
        self.writes_completed += 1;
    }
}

impl Drop for FakeWriteReq {
    fn drop(&mut self) {
        // Native teardown would unregister from the loop here.
        self.loop_handle
            .registrations
            .set(self.loop_handle.registrations.get() - 1);
    }
}

#[derive(Debug, Error)]
#[error("the event loop is closed")]
struct LoopClosed;

struct FakeLoopFactory {
    loop_handle: Rc<FakeLoop>,
}

impl WriteReqFactory for FakeLoopFactory {
    type Handle = FakeWriteReq;
    type Error = LoopClosed;

    fn create(&mut self) -> Result<FakeWriteReq, LoopClosed> {
        if self.loop_handle.closed.get() {
            return Err(LoopClosed);
        }

        self.loop_handle
            .registrations
            .set(self.loop_handle.registrations.get() + 1);

        Ok(FakeWriteReq {
            loop_handle: Rc::clone(&self.loop_handle),
            pending: Vec::new(),
            writes_completed: 0,
        })
    }
}

fn loop_pool(base_capacity: usize) -> (WriteReqPool<FakeLoopFactory>, Rc<FakeLoop>) {
    let loop_handle = FakeLoop::new();

    let pool = WriteReqPool::builder(FakeLoopFactory {
        loop_handle: Rc::clone(&loop_handle),
    })
    .base_capacity(base_capacity)
    .build();

    (pool, loop_handle)
}

#[test]
fn hot_write_loop_registers_nothing_after_warmup() {
    let (mut pool, loop_handle) = loop_pool(4);

    // Warm-up: the first checkout materializes the base capacity.
    let lease = pool.allocate().unwrap();
    pool.release(lease).unwrap();
    assert_eq!(loop_handle.registrations.get(), 4);

    // Steady state: thousands of writes, never more than 4 in flight.
    for round in 0_u32..1000 {
        let lease = pool.allocate().unwrap();

        let req = pool.req_mut(&lease);
        req.submit(&round.to_be_bytes());
        req.complete();

        pool.release(lease).unwrap();
    }

    // The hot loop registered nothing new with the event loop.
    assert_eq!(loop_handle.registrations.get(), 4);
    assert_eq!(pool.capacity(), 4);
}

#[test]
fn overlapping_writes_use_distinct_requests() {
    let (mut pool, _loop_handle) = loop_pool(2);

    // Three writes in flight at once forces growth past the base capacity.
    let first = pool.allocate().unwrap();
    let second = pool.allocate().unwrap();
    let third = pool.allocate().unwrap();

    pool.req_mut(&first).submit(b"alpha");
    pool.req_mut(&second).submit(b"beta");
    pool.req_mut(&third).submit(b"gamma");

    // Each in-flight write sits on its own handle.
    assert_eq!(pool.req(&first).pending, b"alpha");
    assert_eq!(pool.req(&second).pending, b"beta");
    assert_eq!(pool.req(&third).pending, b"gamma");

    for lease in [first, second, third] {
        pool.req_mut(&lease).complete();
        pool.release(lease).unwrap();
    }

    assert!(pool.capacity() >= 4);
    assert!(pool.is_empty());
}

#[test]
fn completed_requests_are_reused_before_new_ones() {
    let (mut pool, _loop_handle) = loop_pool(8);

    // Interleave completions and new writes for a while, then verify that the
    // busiest handle completed many writes - proof of reuse rather than churn.
    let mut in_flight: Vec<Lease> = Vec::new();

    for round in 0_u32..100 {
        let lease = pool.allocate().unwrap();
        pool.req_mut(&lease).submit(&round.to_be_bytes());
        in_flight.push(lease);

        // Keep at most two writes in flight, completing the oldest one first.
        if in_flight.len() == 2 {
            let oldest = in_flight.remove(0);
            pool.req_mut(&oldest).complete();
            pool.release(oldest).unwrap();
        }
    }

    let max_completions = in_flight
        .iter()
        .map(|lease| pool.req(lease).writes_completed)
        .max()
        .unwrap();

    assert!(max_completions > 1, "handles must be reused across writes");
    assert_eq!(pool.capacity(), 8);

    for lease in in_flight {
        pool.release(lease).unwrap();
    }
}

#[test]
fn loop_shutdown_unregisters_everything() {
    let (mut pool, loop_handle) = loop_pool(4);

    let lease = pool.allocate().unwrap();
    pool.release(lease).unwrap();
    assert_eq!(loop_handle.registrations.get(), 4);

    // Loop shutdown disposes the pool; every handle unregisters.
    pool.dispose();
    assert_eq!(loop_handle.registrations.get(), 0);

    // The closed loop rejects any further use of the pool.
    assert!(pool.allocate().is_err());
}

#[test]
fn closed_loop_fails_growth_but_not_existing_requests() {
    let (mut pool, loop_handle) = loop_pool(2);

    let first = pool.allocate().unwrap();
    let second = pool.allocate().unwrap();

    // The loop stops accepting registrations mid-flight.
    loop_handle.closed.set(true);

    // Growth fails, but the writes already in flight are unaffected.
    assert!(pool.allocate().is_err());

    pool.req_mut(&first).submit(b"still fine");
    pool.req_mut(&first).complete();

    pool.release(first).unwrap();
    pool.release(second).unwrap();

    // Released requests remain reusable without touching the closed loop.
    let reused = pool.allocate().unwrap();
    pool.release(reused).unwrap();
}

#[test]
fn dropping_the_pool_unregisters_everything() {
    let (mut pool, loop_handle) = loop_pool(4);

    let lease = pool.allocate().unwrap();
    pool.release(lease).unwrap();
    assert_eq!(loop_handle.registrations.get(), 4);

    drop(pool);

    assert_eq!(loop_handle.registrations.get(), 0);
}

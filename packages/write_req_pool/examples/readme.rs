//! Example that demonstrates the exact usage shown in the README.md file.
//!
//! This shows how to use `WriteReqPool` on an event loop write path.

use std::convert::Infallible;

use write_req_pool::{WriteReqFactory, WriteReqPool};

/// Stands in for a factory that registers native write requests with an event loop.
struct ByteBufferFactory;

impl WriteReqFactory for ByteBufferFactory {
    type Handle = Vec<u8>;
    type Error = Infallible;

    fn create(&mut self) -> Result<Vec<u8>, Infallible> {
        println!("registering a new write request with the loop");
        Ok(Vec::with_capacity(64))
    }
}

fn main() {
    println!("=== Write Request Pool README Example ===");

    let mut pool = WriteReqPool::builder(ByteBufferFactory)
        .base_capacity(4)
        .build();

    // The first checkout materializes the base capacity worth of write requests.
    let lease = pool.allocate().expect("factory is infallible");
    pool.req_mut(&lease).extend_from_slice(b"first response");
    println!("write submitted on slot {}", lease.index());
    pool.req_mut(&lease).clear();
    pool.release(lease).expect("pool is not disposed");

    // Subsequent checkouts reuse the same registered requests - note that no further
    // registration lines are printed.
    for round in 0..8 {
        let lease = pool.allocate().expect("factory is infallible");
        pool.req_mut(&lease)
            .extend_from_slice(format!("response {round}").as_bytes());
        pool.req_mut(&lease).clear();
        pool.release(lease).expect("pool is not disposed");
    }

    // Loop shutdown: every write request is torn down exactly once.
    pool.dispose();

    println!("README example completed successfully!");
}

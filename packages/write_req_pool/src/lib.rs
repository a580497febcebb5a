//! This package provides [`WriteReqPool`], a single-threaded pool of reusable write
//! requests bound to a native event loop.
//!
//! A write request is expensive to construct - it must be registered with the event
//! loop - but can be reused indefinitely once the loop is running. The pool hands out
//! and reclaims these handles so that the hot write path pays no per-write
//! construction or allocation cost, while guaranteeing that no two concurrent writes
//! ever use the same underlying handle.
//!
//! # Features
//!
//! - **Allocation-free reuse**: after warm-up, checking a write request out and back
//!   in is a pair of index operations.
//! - **Stable slots**: a slot's index and handle never change across capacity growth.
//! - **Doubling growth, no shrinking**: storage is materialized lazily at a
//!   configurable base capacity (default 1024) and doubles on exhaustion.
//! - **Compile-time thread confinement**: the pool is neither [`Send`] nor [`Sync`];
//!   the single-consumer contract is enforced by the type system, not a lock.
//! - **Leases, not flags**: a checkout is represented by a non-copyable [`Lease`]
//!   consumed on release, so use-after-return does not compile.
//! - **Explicit disposal**: [`WriteReqPool::dispose()`] tears down every handle
//!   through the factory; dropping the pool does the same.
//!
//! The event loop, the native write request type and its teardown are deliberately
//! outside this crate: they reach the pool only through the [`WriteReqFactory`] seam.
//!
//! # Example
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use write_req_pool::{WriteReqFactory, WriteReqPool};
//!
//! /// Stands in for a factory that registers write requests with an event loop.
//! struct ByteBufferFactory;
//!
//! impl WriteReqFactory for ByteBufferFactory {
//!     type Handle = Vec<u8>;
//!     type Error = Infallible;
//!
//!     fn create(&mut self) -> Result<Vec<u8>, Infallible> {
//!         Ok(Vec::with_capacity(64))
//!     }
//! }
//!
//! let mut pool = WriteReqPool::new(ByteBufferFactory);
//!
//! // Check a write request out, use it, hand it back.
//! let lease = pool.allocate()?;
//! pool.req_mut(&lease).extend_from_slice(b"response body");
//! pool.release(lease)?;
//!
//! // The same slot comes straight back on the next checkout.
//! let lease = pool.allocate()?;
//! assert_eq!(lease.index(), 0);
//! pool.release(lease)?;
//!
//! pool.dispose();
//! # Ok::<(), write_req_pool::Error<Infallible>>(())
//! ```

mod builder;
mod error;
mod factory;
mod pool;

pub use builder::*;
pub use error::*;
pub use factory::*;
pub use pool::*;

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{Error, WriteReqFactory, WriteReqPoolBuilder};

/// A single-threaded pool of reusable loop-bound write requests.
///
/// Write requests are expensive to construct (each one must be registered with a native
/// event loop) but can be reused indefinitely once the loop is running. The pool
/// eliminates the per-write construction cost on the hot I/O path: after a warm-up
/// phase, [`allocate()`][1] and [`release()`][2] are allocation-free index operations
/// on storage that only ever grows.
///
/// The caller checks out a write request via [`allocate()`][1], performs a native write
/// using the handle obtained through [`req()`][3] or [`req_mut()`][4], and hands the
/// slot back with [`release()`][2] once the write completes. The returned [`Lease`]
/// cannot be copied and is consumed by [`release()`][2], so a completed checkout cannot
/// be used again by accident.
///
/// # Single-threaded design
///
/// All pool operations are designed to execute on the one thread that owns the event
/// loop. The pool performs no locking; it is neither [`Send`] nor [`Sync`], so this
/// confinement is enforced at compile time rather than by a runtime assertion.
///
/// # Resource usage
///
/// Storage is materialized lazily on the first [`allocate()`][1], starting at the
/// configured base capacity (default 1024 slots) and doubling whenever the pool is
/// exhausted. Storage never shrinks; every constructed write request stays registered
/// with the loop until [`dispose()`][5] runs or the pool is dropped.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
///
/// use write_req_pool::{WriteReqFactory, WriteReqPool};
///
/// struct ByteBufferFactory;
///
/// impl WriteReqFactory for ByteBufferFactory {
///     type Handle = Vec<u8>;
///     type Error = Infallible;
///
///     fn create(&mut self) -> Result<Vec<u8>, Infallible> {
///         Ok(Vec::with_capacity(64))
///     }
/// }
///
/// let mut pool = WriteReqPool::new(ByteBufferFactory);
///
/// let lease = pool.allocate()?;
/// pool.req_mut(&lease).extend_from_slice(b"payload");
/// pool.release(lease)?;
/// # Ok::<(), write_req_pool::Error<Infallible>>(())
/// ```
///
/// [1]: Self::allocate
/// [2]: Self::release
/// [3]: Self::req
/// [4]: Self::req_mut
/// [5]: Self::dispose
pub struct WriteReqPool<F>
where
    F: WriteReqFactory,
{
    /// Pool storage. Slot indices are positions in this Vec and remain valid across
    /// capacity growth - growth only ever appends.
    slots: Vec<Slot<F::Handle>>,

    /// Indices of slots that are not checked out, most recently released on top.
    /// This is a complete free list, so every returned slot is reachable without
    /// growing storage, and the just-released slot is the next one handed out.
    free: Vec<usize>,

    /// Constructs and tears down the loop-bound handles. Carries whatever loop and
    /// trace context handle construction needs; opaque to the pool.
    factory: F,

    /// Storage size materialized by the first `allocate()`. Growth doubles from
    /// whatever the current storage size is.
    base_capacity: usize,

    /// One-way flag. Once set, the handles are gone and every operation except
    /// another `dispose()` refuses to run.
    disposed: bool,

    _single_threaded: PhantomData<*const ()>,
}

/// One pool slot: a write request plus bookkeeping.
#[derive(Debug)]
struct Slot<H> {
    /// Exclusively owned by this slot until disposal; never reassigned.
    req: H,

    /// True while a caller holds the lease for this slot. Advisory bookkeeping,
    /// not a lock - the `Lease` type is what actually enforces the checkout
    /// discipline.
    in_use: bool,

    /// This slot's fixed position in storage; assigned once at construction.
    index: usize,
}

/// A checked-out slot of a [`WriteReqPool`].
///
/// Obtained from [`WriteReqPool::allocate()`] and consumed by
/// [`WriteReqPool::release()`]. The type is deliberately neither [`Copy`] nor
/// [`Clone`]: once a lease has been released, there is no way left to reach the slot,
/// so using a write request after handing it back is a compile-time error.
#[derive(Debug, Eq, PartialEq)]
#[must_use]
pub struct Lease {
    index: usize,
}

impl Lease {
    /// The fixed index of the checked-out slot in pool storage.
    ///
    /// Stable for the lifetime of the pool; useful as a correlation identifier when
    /// tracing writes.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Storage materialized on first use if the builder does not say otherwise.
///
/// Carried over from the transport this design originates in, where one pool serves
/// one event loop thread and 1024 in-flight writes per loop is already unusual.
pub(crate) const DEFAULT_BASE_CAPACITY: usize = 1024;

impl<F> WriteReqPool<F>
where
    F: WriteReqFactory,
{
    #[must_use]
    pub(crate) fn new_inner(factory: F, base_capacity: usize) -> Self {
        assert!(
            base_capacity > 0,
            "WriteReqPool must have a nonzero base capacity"
        );

        Self {
            slots: Vec::new(),
            free: Vec::new(),
            factory,
            base_capacity,
            disposed: false,
            _single_threaded: PhantomData,
        }
    }

    /// Creates a new [`WriteReqPool`] with the default configuration.
    ///
    /// The pool starts with no storage; the first [`allocate()`][Self::allocate]
    /// materializes the base capacity worth of write requests.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::convert::Infallible;
    ///
    /// use write_req_pool::{WriteReqFactory, WriteReqPool};
    ///
    /// struct ByteBufferFactory;
    ///
    /// impl WriteReqFactory for ByteBufferFactory {
    ///     type Handle = Vec<u8>;
    ///     type Error = Infallible;
    ///
    ///     fn create(&mut self) -> Result<Vec<u8>, Infallible> {
    ///         Ok(Vec::new())
    ///     }
    /// }
    ///
    /// let pool = WriteReqPool::new(ByteBufferFactory);
    /// assert_eq!(pool.capacity(), 0);
    /// ```
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self::builder(factory).build()
    }

    /// Starts building a new [`WriteReqPool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    pub fn builder(factory: F) -> WriteReqPoolBuilder<F> {
        WriteReqPoolBuilder::new(factory)
    }

    /// The number of write requests currently checked out.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .len()
            .checked_sub(self.free.len())
            .expect("the free list only ever contains indices of constructed slots, so it cannot be longer than storage")
    }

    /// Whether no write requests are currently checked out.
    ///
    /// An empty pool may still be holding constructed write requests as unused capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of write requests constructed so far.
    ///
    /// Zero until the first [`allocate()`][Self::allocate], then at least the base
    /// capacity. Never decreases while the pool is live; drops to zero on disposal.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether [`dispose()`][Self::dispose] has already run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Checks out a ready-to-use write request.
    ///
    /// The fast path pops a free slot and touches nothing else - no allocation, no
    /// handle construction. When no free slot exists, the pool materializes more
    /// storage first: the base capacity on first use, double the current storage
    /// afterwards. Existing slots are never moved to different indices and their
    /// handles are untouched by growth.
    ///
    /// No two concurrently checked-out leases ever refer to the same slot or handle.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] if the pool has been disposed.
    ///
    /// [`Error::HandleConstruction`] if the factory fails while materializing new
    /// write requests. The pool remains valid: slots fully constructed before the
    /// failure (during this or any earlier call) stay usable, and a later
    /// `allocate()` will hand them out.
    pub fn allocate(&mut self) -> crate::Result<Lease, F::Error> {
        if self.disposed {
            return Err(Error::Disposed);
        }

        if let Some(index) = self.free.pop() {
            return Ok(self.check_out(index));
        }

        self.grow()?;

        let index = self
            .free
            .pop()
            .expect("grow() either fails or contributes at least one free slot");

        Ok(self.check_out(index))
    }

    /// Hands a checked-out slot back to the pool.
    ///
    /// The slot becomes the next one handed out by [`allocate()`][Self::allocate].
    /// The write request itself is not reset or reinitialized; reuse assumes the
    /// handle is self-resetting between writes, as native write requests are.
    ///
    /// # Errors
    ///
    /// [`Error::Disposed`] if the pool has been disposed. The lease is consumed
    /// either way - the slot it referred to no longer exists.
    pub fn release(&mut self, lease: Lease) -> crate::Result<(), F::Error> {
        if self.disposed {
            return Err(Error::Disposed);
        }

        let slot = self
            .slots
            .get_mut(lease.index)
            .expect("a lease always refers to a slot that exists for the lifetime of the pool");

        debug_assert!(slot.in_use, "released lease must refer to a checked-out slot");

        slot.in_use = false;
        self.free.push(lease.index);

        Ok(())
    }

    /// A shared reference to the checked-out write request.
    ///
    /// # Panics
    ///
    /// Panics if the pool was disposed while the lease was outstanding - the handle
    /// has already been torn down at that point.
    #[must_use]
    pub fn req(&self, lease: &Lease) -> &F::Handle {
        let slot = self
            .slots
            .get(lease.index)
            .expect("lease is outstanding but storage is gone - the pool was disposed under the caller");

        debug_assert!(slot.in_use, "lease must refer to a checked-out slot");

        &slot.req
    }

    /// An exclusive reference to the checked-out write request.
    ///
    /// # Panics
    ///
    /// Panics if the pool was disposed while the lease was outstanding - the handle
    /// has already been torn down at that point.
    #[must_use]
    pub fn req_mut(&mut self, lease: &Lease) -> &mut F::Handle {
        let slot = self
            .slots
            .get_mut(lease.index)
            .expect("lease is outstanding but storage is gone - the pool was disposed under the caller");

        debug_assert!(slot.in_use, "lease must refer to a checked-out slot");

        &mut slot.req
    }

    /// Releases every constructed write request and discards storage.
    ///
    /// Idempotent - a second call is a no-op. After disposal the pool is inert:
    /// [`allocate()`][Self::allocate] and [`release()`][Self::release] fail with
    /// [`Error::Disposed`] and never touch the released storage.
    ///
    /// Disposal proceeds even if leases are still outstanding; such leases become
    /// inert and [`req()`][Self::req] / [`req_mut()`][Self::req_mut] panic on them.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        self.disposed = true;
        self.free.clear();

        for slot in self.slots.drain(..) {
            self.factory.destroy(slot.req);
        }
    }

    fn check_out(&mut self, index: usize) -> Lease {
        let slot = self
            .slots
            .get_mut(index)
            .expect("free list entries always refer to constructed slots");

        debug_assert!(!slot.in_use, "free list entry must not be checked out");
        debug_assert_eq!(slot.index, index, "slot must sit at its assigned index");

        slot.in_use = true;

        Lease { index }
    }

    /// Materializes more storage: the base capacity on first use, double the current
    /// storage size afterwards. Storage only grows; it never shrinks for the lifetime
    /// of the pool.
    ///
    /// Newly constructed slots enter the free list so that the lowest new index is
    /// handed out first. On a factory failure the slots constructed so far are kept
    /// and the error propagates to the caller.
    fn grow(&mut self) -> crate::Result<(), F::Error> {
        let start = self.slots.len();

        let target = if start == 0 {
            self.base_capacity
        } else {
            start
                .checked_mul(2)
                .expect("doubling storage overflowed usize, which would mean more write requests than virtual memory can hold")
        };

        let mut failure = None;

        for index in start..target {
            match self.factory.create() {
                Ok(req) => self.slots.push(Slot {
                    req,
                    in_use: false,
                    index,
                }),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // Reverse order puts the lowest new index on top of the stack, so the pool
        // fills storage from the start.
        for index in (start..self.slots.len()).rev() {
            self.free.push(index);
        }

        match failure {
            None => Ok(()),
            Some(e) => Err(Error::HandleConstruction(e)),
        }
    }
}

impl<F> fmt::Debug for WriteReqPool<F>
where
    F: WriteReqFactory,
{
    #[cfg_attr(test, mutants::skip)] // Output is for humans, mutation is meaningless.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteReqPool")
            .field(
                "handle_type",
                &format_args!("{}", type_name::<F::Handle>()),
            )
            .field("capacity", &self.slots.len())
            .field("checked_out", &self.len())
            .field("base_capacity", &self.base_capacity)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl<F> Drop for WriteReqPool<F>
where
    F: WriteReqFactory,
{
    /// Disposes the pool if the caller has not already done so.
    fn drop(&mut self) {
        self.dispose();
    }
}

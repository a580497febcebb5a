use std::any::type_name;
use std::fmt;

use crate::pool::DEFAULT_BASE_CAPACITY;
use crate::{WriteReqFactory, WriteReqPool};

/// Builder for creating an instance of [`WriteReqPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`WriteReqPool::new()`][1] is sufficient for most
/// use cases.
///
/// # Examples
///
/// ```
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
/// let pool = WriteReqPool::builder(ByteBufferFactory)
///     .base_capacity(64)
///     .build();
/// ```
///
/// [1]: WriteReqPool::new
#[must_use]
pub struct WriteReqPoolBuilder<F>
where
    F: WriteReqFactory,
{
    factory: F,
    base_capacity: usize,
}

impl<F> fmt::Debug for WriteReqPoolBuilder<F>
where
    F: WriteReqFactory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteReqPoolBuilder")
            .field(
                "handle_type",
                &format_args!("{}", type_name::<F::Handle>()),
            )
            .field("base_capacity", &self.base_capacity)
            .finish_non_exhaustive()
    }
}

impl<F> WriteReqPoolBuilder<F>
where
    F: WriteReqFactory,
{
    pub(crate) fn new(factory: F) -> Self {
        Self {
            factory,
            base_capacity: DEFAULT_BASE_CAPACITY,
        }
    }

    /// Sets the number of write requests materialized by the first allocation.
    ///
    /// Growth doubles from the current storage size whenever the pool is exhausted,
    /// so this is also the granularity of the first growth step. The default of 1024
    /// suits one pool serving one event loop thread.
    ///
    /// Must be nonzero.
    pub fn base_capacity(mut self, base_capacity: usize) -> Self {
        self.base_capacity = base_capacity;
        self
    }

    /// Builds the write request pool with the specified configuration.
    ///
    /// No write request is constructed yet - storage is materialized by the first
    /// allocation.
    ///
    /// # Panics
    ///
    /// Panics if the base capacity was set to zero.
    #[must_use]
    pub fn build(self) -> WriteReqPool<F> {
        WriteReqPool::new_inner(self.factory, self.base_capacity)
    }
}

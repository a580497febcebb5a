use std::error::Error as StdError;

/// Creates and tears down the loop-bound write requests that a
/// [`WriteReqPool`][crate::WriteReqPool] hands out.
///
/// The pool itself knows nothing about the event loop, the native write request or any
/// trace sink - all of that context lives inside the factory, which the pool merely calls
/// through when it needs to materialize or release a handle. This is the expensive part
/// that pooling exists to amortize: `create()` typically registers a request object with
/// a native event loop.
///
/// A factory is only ever called from the thread that owns the pool, so implementations
/// are free to hold loop state that is itself not thread-safe.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
///
/// use write_req_pool::WriteReqFactory;
///
/// struct CountingFactory {
///     created: usize,
/// }
///
/// impl WriteReqFactory for CountingFactory {
///     type Handle = usize;
///     type Error = Infallible;
///
///     fn create(&mut self) -> Result<usize, Infallible> {
///         self.created += 1;
///         Ok(self.created)
///     }
/// }
/// ```
pub trait WriteReqFactory {
    /// The write request type handed out by the pool. Exclusively owned by its pool slot
    /// for the slot's entire lifetime.
    type Handle;

    /// The error returned when constructing a handle fails, e.g. because registration
    /// with the event loop was rejected.
    type Error: StdError + 'static;

    /// Constructs one write request bound to the owning event loop, ready for use.
    fn create(&mut self) -> Result<Self::Handle, Self::Error>;

    /// Releases a write request, invoking whatever native teardown it requires.
    ///
    /// The default implementation simply drops the handle, which is sufficient for
    /// handles whose teardown is expressed through [`Drop`].
    fn destroy(&mut self, handle: Self::Handle) {
        drop(handle);
    }
}

use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur when allocating from or returning to a [`WriteReqPool`].
///
/// `E` is the error type of the pool's [`WriteReqFactory`], surfaced unchanged when
/// materializing new write requests fails.
///
/// [`WriteReqPool`]: crate::WriteReqPool
/// [`WriteReqFactory`]: crate::WriteReqFactory
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error<E>
where
    E: StdError + 'static,
{
    /// The pool has already been disposed. Disposal is terminal for a pool instance;
    /// the caller must stop using it.
    #[error("the write request pool has been disposed")]
    Disposed,

    /// The factory failed to construct a new loop-bound write request while the pool
    /// was materializing storage. Slots constructed before the failure remain usable.
    #[error("failed to construct a loop-bound write request")]
    HandleConstruction(#[source] E),
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T, E> = std::result::Result<T, Error<E>>;

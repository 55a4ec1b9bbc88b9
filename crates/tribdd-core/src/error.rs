//! Typed outcomes of Substrate operations.
//!
//! Mirrors the four outcome kinds a CUDD-style manager can produce: a normal
//! result, a retry-required signal (dynamic reordering invalidated the
//! request), an out-of-memory signal, and a timeout. Only the latter two ever
//! escape the top-level retry loop in `tribdd-rules`.

/// Something the Substrate failed to do.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The unique table lookup could not proceed because a reorder is
    /// pending; the caller should clear `MAXREF` marks and retry.
    #[error("unique table operation aborted: a reorder is pending")]
    Reordered,
    /// The node arena has reached its configured capacity.
    #[error("out of memory: node budget exhausted")]
    OutOfMemory,
    /// The operation ran past the manager's configured deadline.
    #[error("operation exceeded its deadline")]
    Timeout,
}

/// Result of an operation that may fail the way the Substrate's
/// `UniqueInter` can: out of memory, or asking the caller to retry after a
/// reorder.
pub type AllocResult<T> = Result<T, Error>;

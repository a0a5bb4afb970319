use thiserror::Error;

/// Result alias used throughout slate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the toolkit.
///
/// Everything except `Cancelled` represents a contract violation or a lost
/// race surfaced to the caller as a value; none of these are retried
/// internally.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// A call violated an API contract (double initialization, a component
    /// owning itself, a non-container owner, a non-negative deceleration).
    #[error("invalid: {0}")]
    Invalid(String),

    /// The target component or container was already closed.
    #[error("closed: {0}")]
    Closed(String),

    /// The operation's subject already exists or is already running.
    #[error("exists: {0}")]
    Exists(String),

    /// A container's insertion policy rejected the candidate child.
    #[error("exhausted: {0}")]
    Exhausted(String),

    /// The frame loop was stopped by its cancellation token.
    #[error("cancelled")]
    Cancelled,
}

use thiserror::Error;

/// Failures reported by the flow engine.
///
/// Every operation borrows the snapshot it works on, so an error always
/// leaves the caller's snapshot exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// A branch or commit id that is not part of the snapshot
    #[error("unknown reference `{0}`")]
    InvalidReference(String),

    /// The operation needs a tip commit but the branch has none
    #[error("branch `{0}` has no commits")]
    EmptyBranch(String),

    /// The branch roles do not allow the requested operation
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// Snapshot failed an integrity check
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

pub type FlowResult<T> = Result<T, FlowError>;

use thiserror::Error;

/// Persistence-layer failure.
///
/// Opaque to callers of the organization subsystem: the engine neither
/// inspects nor retries these, it only wraps them in [`OrgError::Store`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("transaction error: {0}")]
    Transaction(String),
}

/// Error taxonomy of the organization subsystem.
///
/// A membership lookup that finds no row is NOT an error: store lookups
/// return `Option` and only operations that require the row turn `None`
/// into [`OrgError::NotFound`] or [`OrgError::PermissionDenied`].
#[derive(Error, Debug)]
pub enum OrgError {
    // --- caller mistakes ---
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate slug, duplicate membership, or an invitation state
    /// transition out of a terminal status.
    #[error("{0}")]
    Conflict(String),

    // --- infrastructure ---
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl OrgError {
    // --- Constructors ---

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

pub type OrgResult<T> = Result<T, OrgError>;

/// All errors a `CollectionSource` can return.
///
/// The taxonomy is deliberately small: callers only branch on whether a
/// retry can help. `RemoteUnavailable` is transient — issuing the same
/// operation again may succeed. `PermissionDenied` cannot succeed without a
/// changed identity. `Unknown` is the caught fallback; retry is not
/// structurally blocked but the default policy treats it as non-retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Network or service failure, transient.
    #[error("remote service unavailable: {message}")]
    RemoteUnavailable { message: String },

    /// The authenticated identity may not perform this operation.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Caught fallback for anything the source cannot classify.
    #[error("source error: {message}")]
    Unknown { message: String },
}

impl SourceError {
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        SourceError::RemoteUnavailable {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        SourceError::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        SourceError::Unknown {
            message: message.into(),
        }
    }

    /// Whether re-issuing the failed operation may succeed on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::RemoteUnavailable { .. })
    }
}

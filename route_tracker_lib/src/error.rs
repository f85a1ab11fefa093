use thiserror::Error;

/// Conditions reported to the presentation layer. None of them are fatal,
/// tracking is simply inactive while a permission notice is in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("location usage is restricted")]
    PermissionRestricted,
    #[error("location usage is denied")]
    PermissionDenied,
    #[error("location provider failed: {0}")]
    ProviderFailure(String),
}

impl TrackerError {
    /// Permission notices persist until the user changes the system settings.
    pub fn is_permission(&self) -> bool {
        matches!(self, TrackerError::PermissionRestricted | TrackerError::PermissionDenied)
    }
}

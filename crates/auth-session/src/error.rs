//! Session error types.

use identity_client::ClientError;
use thiserror::Error;

/// Session orchestration error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid or incomplete session configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A session is already established with a different configuration
    #[error("configuration drift: {field} differs from the established session")]
    ConfigDrift { field: &'static str },

    /// Login was called with no configuration and no prior session
    #[error("no session configuration available")]
    MissingConfig,

    /// Operation requires an initialized session
    #[error("session not initialized")]
    NotInitialized,

    /// Both silent and interactive login failed
    #[error("interactive login failed: {0}")]
    InteractiveLogin(#[source] ClientError),

    /// Both silent and interactive token acquisition failed
    #[error("interactive token acquisition failed: {0}")]
    InteractiveToken(#[source] ClientError),

    /// The fallback machine was driven out of order (orchestrator bug,
    /// not a provider failure)
    #[error("invalid fallback transition: {0}")]
    InvalidFlowTransition(String),

    /// Identity client error
    #[error("identity client error: {0}")]
    Client(#[from] ClientError),
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_drift_names_the_field() {
        let error = AuthError::ConfigDrift { field: "scopes" };
        assert_eq!(
            error.to_string(),
            "configuration drift: scopes differs from the established session"
        );
    }

    #[test]
    fn interactive_login_preserves_the_source() {
        let error = AuthError::InteractiveLogin(ClientError::Interaction(
            "popup closed by user".to_string(),
        ));
        assert!(error.to_string().contains("popup closed by user"));
    }
}

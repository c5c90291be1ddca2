//! Identity provider client contract.
//!
//! This crate defines the seam between the session orchestrator and the
//! browser identity library that actually talks to the provider:
//! - [`IdentityClient`]: login, token acquisition and logout in their silent,
//!   popup and redirect variants, plus redirect-response resolution and
//!   active-account management
//! - [`ClientFactory`]: the client construction entry point
//! - the opaque value types the provider hands back ([`Account`],
//!   [`AuthenticationResult`])
//!
//! The orchestrator depends only on these traits; production deployments wrap
//! the real identity library, tests supply a scripted double.

mod traits;
mod types;

pub use traits::{ClientFactory, IdentityClient};
pub use types::{Account, AuthRequest, AuthenticationResult, CacheLocation, ClientOptions};

use thiserror::Error;

/// Error type for identity client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Client construction against the provider authority failed
    #[error("client construction failed: {0}")]
    Construction(String),

    /// Silent authentication needs user interaction to proceed
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    /// Interactive flow failed (popup closed, blocked, or rejected)
    #[error("interactive flow failed: {0}")]
    Interaction(String),

    /// Provider or network failure
    #[error("provider error: {0}")]
    Provider(String),

    /// Redirect response was present but could not be resolved
    #[error("invalid redirect response: {0}")]
    RedirectResponse(String),
}

/// Result type for identity client operations.
pub type ClientResult<T> = Result<T, ClientError>;

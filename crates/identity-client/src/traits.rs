//! Client trait definitions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Account, AuthRequest, AuthenticationResult, ClientOptions, ClientResult};

/// A connected identity provider client.
///
/// The redirect variants are navigational: on the real provider they unload
/// the page, so the call never returns in the initiating execution context.
/// Implementations here return `Ok(())` once the navigation has been issued;
/// the eventual result is only observable through
/// [`handle_redirect_promise`](Self::handle_redirect_promise) after reload.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Interactive login through a transient popup window.
    async fn login_popup(&self, request: &AuthRequest) -> ClientResult<AuthenticationResult>;

    /// Interactive login through a full-page navigation.
    async fn login_redirect(&self, request: &AuthRequest) -> ClientResult<()>;

    /// Non-interactive login reusing an existing provider session.
    async fn sso_silent(&self, request: &AuthRequest) -> ClientResult<AuthenticationResult>;

    /// Token acquisition from cached or refreshable material, no interaction.
    async fn acquire_token_silent(&self, request: &AuthRequest)
        -> ClientResult<AuthenticationResult>;

    /// Interactive token acquisition through a popup window.
    async fn acquire_token_popup(&self, request: &AuthRequest)
        -> ClientResult<AuthenticationResult>;

    /// Interactive token acquisition through a full-page navigation.
    async fn acquire_token_redirect(&self, request: &AuthRequest) -> ClientResult<()>;

    /// End the provider session through a popup window.
    async fn logout_popup(&self) -> ClientResult<()>;

    /// End the provider session through a full-page navigation.
    async fn logout_redirect(&self) -> ClientResult<()>;

    /// Resolve the response of a redirect round-trip.
    ///
    /// Returns `None` when no redirect was pending.
    async fn handle_redirect_promise(&self) -> ClientResult<Option<AuthenticationResult>>;

    /// Mark the account subsequent silent and token operations act on.
    fn set_active_account(&self, account: &Account);

    /// The account currently marked active, if any.
    fn active_account(&self) -> Option<Account>;

    /// All accounts in the client's cache, most recently used first.
    fn get_all_accounts(&self) -> Vec<Account>;
}

impl std::fmt::Debug for dyn IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn IdentityClient")
    }
}

/// Construction entry point for [`IdentityClient`] instances.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Construct a client bound to the given provider options.
    async fn create(&self, options: ClientOptions) -> ClientResult<Arc<dyn IdentityClient>>;
}

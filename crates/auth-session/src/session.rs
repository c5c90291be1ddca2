//! Single-session authentication orchestration.
//!
//! [`AuthSession`] owns at most one identity client per instance and runs the
//! login, token and logout sequences against it. Interactive flows try the
//! least-intrusive step first: silent SSO before any window is opened, a
//! silent cache lookup before any token prompt. Silent failures are routine
//! and fall through to the configured interaction mode; only exhaustion of
//! the chain surfaces an error.
//!
//! Redirect mode is a two-phase protocol. Phase one issues a full-page
//! navigation and resolves to [`AuthOutcome::Navigated`]; the in-memory
//! continuation is unreachable once the page unloads. Phase two is
//! [`AuthSession::complete_redirect`], run on the fresh process after reload,
//! which resolves the pending response out of the client's durable cache.

use std::sync::{Arc, Mutex};

use identity_client::{
    AuthenticationResult, ClientFactory, ClientOptions, IdentityClient,
};
use tracing::{debug, info, warn};

use crate::config::{InteractionMode, SessionConfig};
use crate::flow::{FlowInput, FlowTracker};
use crate::{AuthError, AuthResult};

/// Outcome of an interactive-capable flow.
#[derive(Debug)]
pub enum AuthOutcome {
    /// The flow finished in-process with a result.
    Completed(AuthenticationResult),
    /// A full-page navigation was issued. The result arrives only through
    /// [`AuthSession::complete_redirect`] after the page reloads.
    Navigated,
}

impl AuthOutcome {
    /// The carried result, `None` when a navigation was issued.
    pub fn into_completed(self) -> Option<AuthenticationResult> {
        match self {
            AuthOutcome::Completed(result) => Some(result),
            AuthOutcome::Navigated => None,
        }
    }

    pub fn is_navigated(&self) -> bool {
        matches!(self, AuthOutcome::Navigated)
    }
}

/// Client plus the config it was established with. The two are only ever
/// present together.
struct Established {
    client: Arc<dyn IdentityClient>,
    config: SessionConfig,
}

/// The single logical signed-in identity of an application instance.
///
/// Owned by the composition root and passed by reference into callers;
/// "at most one active session" is an invariant of this object, not of any
/// global state. The lock is never held across a capability call.
pub struct AuthSession {
    factory: Arc<dyn ClientFactory>,
    state: Mutex<Option<Established>>,
}

impl AuthSession {
    /// Create a session bound to a client factory. No client is constructed
    /// until [`initialize`](Self::initialize) or [`login`](Self::login) runs.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(None),
        }
    }

    /// Construct the identity client for this session, exactly once.
    ///
    /// Re-initialization with an identical config (same tenant, client id and
    /// scopes) returns the existing handle; a differing config fails with
    /// [`AuthError::ConfigDrift`]. Construction failure leaves the session
    /// empty so a later attempt can succeed.
    pub async fn initialize(
        &self,
        config: SessionConfig,
    ) -> AuthResult<Arc<dyn IdentityClient>> {
        config.validate()?;

        if let Some(established) = self.state.lock().unwrap().as_ref() {
            return match established.config.drift_field(&config) {
                None => {
                    debug!(
                        tenant_id = %config.tenant_id,
                        "initialize repeated with identical config, reusing client"
                    );
                    Ok(established.client.clone())
                }
                Some(field) => Err(AuthError::ConfigDrift { field }),
            };
        }

        let options = ClientOptions {
            client_id: config.client_id.clone(),
            authority: config.authority()?,
            cache_location: config.cache_location,
        };
        let client = self.factory.create(options).await?;

        let mut state = self.state.lock().unwrap();
        // Interleaved calls are the caller's problem, but the first stored
        // client stays authoritative.
        if let Some(established) = state.as_ref() {
            return match established.config.drift_field(&config) {
                None => Ok(established.client.clone()),
                Some(field) => Err(AuthError::ConfigDrift { field }),
            };
        }

        info!(
            tenant_id = %config.tenant_id,
            client_id = %config.client_id,
            interaction = ?config.interaction,
            "identity client initialized"
        );
        *state = Some(Established {
            client: client.clone(),
            config,
        });
        Ok(client)
    }

    /// Sign in, trying silent SSO before the configured interactive mode.
    ///
    /// Without an established session a config is required and initialization
    /// runs first. On every completed path the resolved account becomes the
    /// client's active account.
    pub async fn login(&self, config: Option<SessionConfig>) -> AuthResult<AuthOutcome> {
        let (client, config) = self.ensure_established(config).await?;

        let mut flow = FlowTracker::new("login");
        if config.skip_silent_sso {
            flow.advance(FlowInput::SkipSilent)?;
        } else {
            flow.advance(FlowInput::AttemptSilent)?;
            match client.sso_silent(&config.silent_request()).await {
                Ok(result) => {
                    flow.advance(FlowInput::SilentSucceeded)?;
                    client.set_active_account(&result.account);
                    info!(username = %result.account.username, "silent SSO login succeeded");
                    return Ok(AuthOutcome::Completed(result));
                }
                Err(error) => {
                    warn!(%error, "silent SSO failed, falling back to interactive login");
                    flow.advance(FlowInput::SilentFailed)?;
                }
            }
        }

        let request = config.interactive_request();
        match config.interaction {
            InteractionMode::Popup => match client.login_popup(&request).await {
                Ok(result) => {
                    flow.advance(FlowInput::InteractiveSucceeded)?;
                    client.set_active_account(&result.account);
                    info!(username = %result.account.username, "popup login succeeded");
                    Ok(AuthOutcome::Completed(result))
                }
                Err(error) => {
                    flow.advance(FlowInput::InteractiveFailed)?;
                    Err(AuthError::InteractiveLogin(error))
                }
            },
            InteractionMode::Redirect => {
                client.login_redirect(&request).await?;
                flow.advance(FlowInput::NavigationIssued)?;
                debug!("redirect login navigation issued");
                Ok(AuthOutcome::Navigated)
            }
        }
    }

    /// Acquire an access token for the session's configured scopes, silently
    /// when possible.
    ///
    /// Does not change the active account.
    pub async fn get_access_token(&self) -> AuthResult<AuthOutcome> {
        let (client, config) = self.established()?;

        let request = config.token_request();
        let mut flow = FlowTracker::new("acquire_token");
        if config.skip_silent_token {
            flow.advance(FlowInput::SkipSilent)?;
        } else {
            flow.advance(FlowInput::AttemptSilent)?;
            match client.acquire_token_silent(&request).await {
                Ok(result) => {
                    flow.advance(FlowInput::SilentSucceeded)?;
                    debug!("silent token acquisition succeeded");
                    return Ok(AuthOutcome::Completed(result));
                }
                Err(error) => {
                    warn!(
                        %error,
                        "silent token acquisition failed, falling back to interactive"
                    );
                    flow.advance(FlowInput::SilentFailed)?;
                }
            }
        }

        match config.interaction {
            InteractionMode::Popup => match client.acquire_token_popup(&request).await {
                Ok(result) => {
                    flow.advance(FlowInput::InteractiveSucceeded)?;
                    Ok(AuthOutcome::Completed(result))
                }
                Err(error) => {
                    flow.advance(FlowInput::InteractiveFailed)?;
                    Err(AuthError::InteractiveToken(error))
                }
            },
            InteractionMode::Redirect => {
                client.acquire_token_redirect(&request).await?;
                flow.advance(FlowInput::NavigationIssued)?;
                debug!("redirect token navigation issued");
                Ok(AuthOutcome::Navigated)
            }
        }
    }

    /// Resolve the response of a redirect round-trip. Run once after the
    /// reload that follows a redirect navigation.
    ///
    /// A present result becomes the active account and is forwarded to the
    /// configured redirect callback. An absent one means no redirect was
    /// pending: the first cached account, if any, is restored as active and
    /// the callback is not invoked.
    pub async fn complete_redirect(&self) -> AuthResult<Option<AuthenticationResult>> {
        let (client, config) = self.established()?;

        match client.handle_redirect_promise().await? {
            Some(result) => {
                client.set_active_account(&result.account);
                info!(username = %result.account.username, "redirect flow completed");
                if let Some(callback) = config.on_redirect_complete.as_ref() {
                    callback(&result);
                }
                Ok(Some(result))
            }
            None => {
                let accounts = client.get_all_accounts();
                if let Some(account) = accounts.first() {
                    client.set_active_account(account);
                    debug!(
                        username = %account.username,
                        "no pending redirect, restored cached account"
                    );
                }
                Ok(None)
            }
        }
    }

    /// Sign out through the session's interaction mode and clear all state.
    ///
    /// A no-op without an established session; never fails. State is cleared
    /// before the provider call, so the session is gone whether that call
    /// completes, errors, or navigates away.
    pub async fn logout(&self) {
        let established = self.state.lock().unwrap().take();
        let Some(established) = established else {
            debug!("logout without an established session");
            return;
        };

        let result = match established.config.interaction {
            InteractionMode::Popup => established.client.logout_popup().await,
            InteractionMode::Redirect => established.client.logout_redirect().await,
        };
        match result {
            Ok(()) => info!("logged out"),
            Err(error) => warn!(%error, "provider logout failed, session state already cleared"),
        }
    }

    /// The established client handle, if any.
    pub fn session(&self) -> Option<Arc<dyn IdentityClient>> {
        self.state
            .lock()
            .unwrap()
            .as_ref()
            .map(|established| established.client.clone())
    }

    /// The config the session was established with, if any.
    pub fn active_config(&self) -> Option<SessionConfig> {
        self.state
            .lock()
            .unwrap()
            .as_ref()
            .map(|established| established.config.clone())
    }

    /// Drop all session state without touching the client. Test escape hatch.
    pub fn reset_for_testing(&self) {
        *self.state.lock().unwrap() = None;
    }

    fn established(&self) -> AuthResult<(Arc<dyn IdentityClient>, SessionConfig)> {
        let state = self.state.lock().unwrap();
        let established = state.as_ref().ok_or(AuthError::NotInitialized)?;
        Ok((established.client.clone(), established.config.clone()))
    }

    async fn ensure_established(
        &self,
        config: Option<SessionConfig>,
    ) -> AuthResult<(Arc<dyn IdentityClient>, SessionConfig)> {
        if self.state.lock().unwrap().is_none() {
            let config = config.ok_or(AuthError::MissingConfig)?;
            self.initialize(config).await?;
            return self.established();
        }

        let (client, stored) = self.established()?;
        if let Some(candidate) = config {
            if let Some(field) = stored.drift_field(&candidate) {
                return Err(AuthError::ConfigDrift { field });
            }
        }
        Ok((client, stored))
    }
}

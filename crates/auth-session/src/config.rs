//! Session configuration.

use std::fmt;
use std::sync::Arc;

use identity_client::{AuthRequest, AuthenticationResult, CacheLocation};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AuthError, AuthResult};

/// Base address the provider authority is derived from.
const AUTHORITY_BASE: &str = "https://login.microsoftonline.com";

/// Callback invoked with the resolved result after a redirect round-trip.
pub type RedirectCallback = dyn Fn(&AuthenticationResult) + Send + Sync;

/// How interactive login, token and logout flows reach the provider.
///
/// The two modes are mutually exclusive for the lifetime of a session. Popup
/// flows return a result in-process; redirect flows navigate the page away
/// and resolve only through
/// [`AuthSession::complete_redirect`](crate::AuthSession::complete_redirect)
/// after reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Popup,
    Redirect,
}

/// Configuration a session is established with. Immutable once accepted.
#[derive(Clone)]
pub struct SessionConfig {
    /// Tenant the provider authority is built from.
    pub tenant_id: String,
    pub client_id: String,
    /// Requested scopes, in order. Empty means none were configured.
    pub scopes: Vec<String>,
    pub interaction: InteractionMode,
    /// Required when `interaction` is [`InteractionMode::Redirect`].
    pub on_redirect_complete: Option<Arc<RedirectCallback>>,
    /// Storage-backing hint passed through to client construction.
    pub cache_location: Option<CacheLocation>,
    /// Account hint forwarded to silent SSO.
    pub login_hint: Option<String>,
    /// Skip the silent SSO step of the login fallback chain.
    pub skip_silent_sso: bool,
    /// Skip the silent step of the token fallback chain.
    pub skip_silent_token: bool,
}

impl SessionConfig {
    /// Popup-mode configuration with no scopes.
    pub fn new(tenant_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            scopes: Vec::new(),
            interaction: InteractionMode::Popup,
            on_redirect_complete: None,
            cache_location: None,
            login_hint: None,
            skip_silent_sso: false,
            skip_silent_token: false,
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Switch to redirect interaction with the given completion callback.
    pub fn with_redirect(
        mut self,
        callback: impl Fn(&AuthenticationResult) + Send + Sync + 'static,
    ) -> Self {
        self.interaction = InteractionMode::Redirect;
        self.on_redirect_complete = Some(Arc::new(callback));
        self
    }

    pub fn with_cache_location(mut self, location: CacheLocation) -> Self {
        self.cache_location = Some(location);
        self
    }

    pub fn with_login_hint(mut self, hint: impl Into<String>) -> Self {
        self.login_hint = Some(hint.into());
        self
    }

    /// Check the invariants a config must satisfy before it can establish a
    /// session.
    pub fn validate(&self) -> AuthResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(AuthError::Configuration(
                "tenant id must not be empty".to_string(),
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration(
                "client id must not be empty".to_string(),
            ));
        }
        if self.interaction == InteractionMode::Redirect && self.on_redirect_complete.is_none() {
            return Err(AuthError::Configuration(
                "redirect interaction requires an on_redirect_complete callback".to_string(),
            ));
        }
        Ok(())
    }

    /// Provider authority derived from the tenant.
    pub fn authority(&self) -> AuthResult<Url> {
        Url::parse(&format!("{}/{}", AUTHORITY_BASE, self.tenant_id))
            .map_err(|e| AuthError::Configuration(format!("tenant id is not authority-safe: {e}")))
    }

    /// The first identity field differing from `other`, if any.
    ///
    /// Tenant, client id and scopes participate; the interaction mode,
    /// callback and flags do not.
    pub fn drift_field(&self, other: &SessionConfig) -> Option<&'static str> {
        if self.tenant_id != other.tenant_id {
            return Some("tenant id");
        }
        if self.client_id != other.client_id {
            return Some("client id");
        }
        if self.scopes != other.scopes {
            return Some("scopes");
        }
        None
    }

    /// True when `other` targets the same tenant, client and scopes.
    pub fn same_identity(&self, other: &SessionConfig) -> bool {
        self.drift_field(other).is_none()
    }

    pub(crate) fn silent_request(&self) -> AuthRequest {
        AuthRequest {
            scopes: self.scopes.clone(),
            login_hint: self.login_hint.clone(),
        }
    }

    pub(crate) fn interactive_request(&self) -> AuthRequest {
        AuthRequest::new(self.scopes.clone())
    }

    pub(crate) fn token_request(&self) -> AuthRequest {
        AuthRequest::new(self.scopes.clone())
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("interaction", &self.interaction)
            .field("on_redirect_complete", &self.on_redirect_complete.is_some())
            .field("cache_location", &self.cache_location)
            .field("login_hint", &self.login_hint)
            .field("skip_silent_sso", &self.skip_silent_sso)
            .field("skip_silent_token", &self.skip_silent_token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interaction_is_popup() {
        let config = SessionConfig::new("contoso", "client-123");
        assert_eq!(config.interaction, InteractionMode::Popup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn redirect_without_callback_fails_validation() {
        let mut config = SessionConfig::new("contoso", "client-123");
        config.interaction = InteractionMode::Redirect;

        match config.validate() {
            Err(AuthError::Configuration(message)) => {
                assert!(message.contains("on_redirect_complete"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn redirect_with_callback_passes_validation() {
        let config = SessionConfig::new("contoso", "client-123").with_redirect(|_| {});
        assert_eq!(config.interaction, InteractionMode::Redirect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_tenant_or_client_fails_validation() {
        assert!(SessionConfig::new("", "client-123").validate().is_err());
        assert!(SessionConfig::new("contoso", " ").validate().is_err());
    }

    #[test]
    fn authority_is_derived_from_tenant() {
        let config = SessionConfig::new("contoso", "client-123");
        assert_eq!(
            config.authority().unwrap().as_str(),
            "https://login.microsoftonline.com/contoso"
        );
    }

    #[test]
    fn drift_compares_identity_fields_only() {
        let base = SessionConfig::new("contoso", "client-123").with_scopes(["user.read"]);

        let same = SessionConfig::new("contoso", "client-123")
            .with_scopes(["user.read"])
            .with_login_hint("ada@contoso.com");
        assert!(base.same_identity(&same));

        let other_tenant = SessionConfig::new("fabrikam", "client-123").with_scopes(["user.read"]);
        assert_eq!(base.drift_field(&other_tenant), Some("tenant id"));

        let other_client = SessionConfig::new("contoso", "client-456").with_scopes(["user.read"]);
        assert_eq!(base.drift_field(&other_client), Some("client id"));

        let other_scopes = SessionConfig::new("contoso", "client-123").with_scopes(["mail.read"]);
        assert_eq!(base.drift_field(&other_scopes), Some("scopes"));
    }

    #[test]
    fn silent_request_carries_the_login_hint() {
        let config = SessionConfig::new("contoso", "client-123")
            .with_scopes(["user.read"])
            .with_login_hint("ada@contoso.com");

        let request = config.silent_request();
        assert_eq!(request.login_hint.as_deref(), Some("ada@contoso.com"));

        let request = config.interactive_request();
        assert!(request.login_hint.is_none());
    }

    #[test]
    fn debug_does_not_render_the_callback() {
        let config = SessionConfig::new("contoso", "client-123").with_redirect(|_| {});
        let rendered = format!("{config:?}");
        assert!(rendered.contains("on_redirect_complete: true"));
    }
}

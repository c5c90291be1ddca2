//! Value types exchanged with the identity provider client.
//!
//! These are opaque handles from the orchestrator's point of view: it passes
//! them through without branching on their contents. The fields mirror what a
//! browser identity library reports for a signed-in identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A signed-in identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Provider-unique identifier, stable across tenants.
    pub home_account_id: String,
    /// Login name, usually an email address or UPN.
    pub username: String,
    /// Tenant the account was authenticated against.
    pub tenant_id: String,
    /// Display name when the provider supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Result of a completed login or token flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationResult {
    /// The identity the result belongs to.
    pub account: Account,
    pub access_token: String,
    /// Scopes actually granted, which may differ from those requested.
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<DateTime<Utc>>,
}

/// Parameters for a login or token acquisition call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub scopes: Vec<String>,
    /// Hint identifying which account silent flows should target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
}

impl AuthRequest {
    /// Request for the given scopes with no account hint.
    pub fn new(scopes: Vec<String>) -> Self {
        Self {
            scopes,
            login_hint: None,
        }
    }
}

/// Where the client persists its token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLocation {
    LocalStorage,
    SessionStorage,
    Memory,
}

/// Construction parameters for [`ClientFactory::create`].
///
/// [`ClientFactory::create`]: crate::ClientFactory::create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub client_id: String,
    /// Authority endpoint the client negotiates with.
    pub authority: Url,
    /// Storage backing for the token cache; the client picks its default
    /// when absent.
    pub cache_location: Option<CacheLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            home_account_id: "uid.tid".to_string(),
            username: "ada@contoso.com".to_string(),
            tenant_id: "contoso".to_string(),
            name: Some("Ada".to_string()),
        }
    }

    #[test]
    fn cache_location_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CacheLocation::LocalStorage).unwrap(),
            "\"local_storage\""
        );
        assert_eq!(
            serde_json::to_string(&CacheLocation::SessionStorage).unwrap(),
            "\"session_storage\""
        );
    }

    #[test]
    fn account_round_trips_through_json() {
        let account = account();
        let json = serde_json::to_string(&account).unwrap();
        let restored: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, account);
    }

    #[test]
    fn auth_request_new_has_no_hint() {
        let request = AuthRequest::new(vec!["user.read".to_string()]);
        assert_eq!(request.scopes, vec!["user.read".to_string()]);
        assert!(request.login_hint.is_none());
    }

    #[test]
    fn authentication_result_omits_absent_expiry() {
        let result = AuthenticationResult {
            account: account(),
            access_token: "token".to_string(),
            scopes: vec![],
            expires_on: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("expires_on"));
    }
}

//! Per-request identity and the session claim set.
//!
//! Authentication itself is a supplied capability: something upstream hands
//! out session tokens and decides what claims they carry. This module only
//! resolves a token into an immutable [`Identity`] that handlers receive as
//! a plain value.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

/// Claim type carrying the portal user identifier.
pub const CLAIM_USUARIO_ID: &str = "IdUsuario";

/// Opaque mapping from claim-type string to claim value.
///
/// An empty value is treated the same as a missing claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: HashMap<String, String>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, claim_type: impl Into<String>, value: impl Into<String>) {
        self.claims.insert(claim_type.into(), value.into());
    }

    /// Returns the claim value, filtering out empty strings.
    pub fn get(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .get(claim_type)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The caller's authenticated identity for a single request.
#[derive(Debug, Clone)]
pub struct Identity {
    authenticated: bool,
    claims: ClaimSet,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            claims: ClaimSet::new(),
        }
    }

    pub fn authenticated(claims: ClaimSet) -> Self {
        Self {
            authenticated: true,
            claims,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// The `IdUsuario` claim, absent when missing or empty.
    pub fn usuario_id(&self) -> Option<&str> {
        self.claims.get(CLAIM_USUARIO_ID)
    }
}

/// Resolves session tokens into claim sets.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the claims bound to `token`, or `None` for unknown tokens.
    async fn resolve(&self, token: &str) -> Option<ClaimSet>;
}

/// In-memory session store used by tests and dev mode.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, ClaimSet>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, token: impl Into<String>, claims: ClaimSet) {
        self.sessions.write().insert(token.into(), claims);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn resolve(&self, token: &str) -> Option<ClaimSet> {
        self.sessions.read().get(token).cloned()
    }
}

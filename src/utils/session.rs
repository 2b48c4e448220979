// src/utils/session.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::{RngCore, rngs::OsRng};

use crate::utils::clock::{Clock, SystemClock};

/// Random bytes per token. Hex encoded this gives a 48 character token.
const TOKEN_BYTES: usize = 24;

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Entry {
    identity: String,
    expires_at: DateTime<Utc>,
}

/// In-memory table of bearer tokens, shared by every clone.
///
/// There is no background sweeper: every [`SessionStore::validate`] call purges
/// all expired sessions before looking its token up.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
            clock,
        }
    }

    /// Opens a session for `identity` that lives for the configured TTL.
    pub fn issue(&self, identity: &str) -> Session {
        let token = generate_token();
        let expires_at = self.clock.now() + self.ttl;
        self.sessions.insert(
            token.clone(),
            Entry {
                identity: identity.to_string(),
                expires_at,
            },
        );

        Session {
            token,
            identity: identity.to_string(),
            expires_at,
        }
    }

    /// Resolves a token to its identity, or `None` when unknown or expired.
    pub fn validate(&self, token: &str) -> Option<String> {
        let now = self.clock.now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        self.sessions
            .get(token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.identity.clone())
    }

    /// Ends a session. Returns whether the token was known.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token.trim()).is_some()
    }

    /// Sessions currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

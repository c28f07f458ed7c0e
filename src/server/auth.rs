//! Admin credentials and session tokens.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::config::{ADMIN_MAX_SESSIONS, ADMIN_SESSION_TTL};

const TOKEN_LEN: usize = 48;

/// Checks admin logins and tracks issued bearer tokens in memory.
///
/// Tokens expire after `ttl`. At most `ADMIN_MAX_SESSIONS` are held; a login
/// past that evicts the oldest.
pub struct AdminAuth {
    username: String,
    password: String,
    ttl: Duration,
    issued: AtomicU64,
    tokens: Mutex<HashMap<String, Session>>,
}

struct Session {
    issued_at: Instant,
    /// Login order, for evicting the oldest.
    seq: u64,
}

impl AdminAuth {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            ttl: ADMIN_SESSION_TTL,
            issued: AtomicU64::new(0),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Admin login is disabled while no password is configured.
    pub fn is_enabled(&self) -> bool {
        !self.password.is_empty()
    }

    /// Issues a token when the credentials match.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        // Evaluate both so timing does not reveal which one failed.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if !(user_ok & pass_ok) {
            return None;
        }

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let mut tokens = self.lock_tokens();
        self.sweep(&mut tokens);
        while tokens.len() >= ADMIN_MAX_SESSIONS {
            let Some(oldest) = tokens
                .iter()
                .min_by_key(|(_, session)| session.seq)
                .map(|(token, _)| token.clone())
            else {
                break;
            };
            tokens.remove(&oldest);
        }
        let session = Session {
            issued_at: Instant::now(),
            seq: self.issued.fetch_add(1, Ordering::Relaxed),
        };
        tokens.insert(token.clone(), session);
        Some(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        let mut tokens = self.lock_tokens();
        match tokens.get(token) {
            Some(session) if session.issued_at.elapsed() < self.ttl => true,
            Some(_) => {
                tokens.remove(token);
                false
            }
            None => false,
        }
    }

    /// Revokes a token. Returns whether it was active.
    pub fn logout(&self, token: &str) -> bool {
        let mut tokens = self.lock_tokens();
        self.sweep(&mut tokens);
        tokens.remove(token).is_some()
    }

    pub fn active_sessions(&self) -> usize {
        let mut tokens = self.lock_tokens();
        self.sweep(&mut tokens);
        tokens.len()
    }

    fn sweep(&self, tokens: &mut HashMap<String, Session>) {
        tokens.retain(|_, session| session.issued_at.elapsed() < self.ttl);
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

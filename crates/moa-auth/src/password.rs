//! bcrypt password hashing.
//!
//! Hashing is CPU-bound, so the async entry points hand the work to
//! `spawn_blocking` rather than stall the executor.

use crate::{AuthError, Result};

/// Hashes and verifies passwords at a fixed bcrypt cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh salt.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Whether `password` matches `hash`. A malformed hash never matches.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        match outcome {
            Ok(matched) => Ok(matched),
            Err(e) => {
                log::warn!("Stored password hash could not be parsed: {e}");
                Ok(false)
            }
        }
    }

    /// True when `hash` was produced at a different cost or cannot be parsed.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        hash_cost(hash) != Some(self.cost)
    }
}

/// Cost field of a modular-crypt bcrypt hash (`$2b$12$...`).
fn hash_cost(hash: &str) -> Option<u32> {
    let mut parts = hash.split('$');
    if !parts.next()?.is_empty() {
        return None;
    }
    let variant = parts.next()?;
    if !matches!(variant, "2a" | "2b" | "2x" | "2y") {
        return None;
    }
    parts.next()?.parse().ok()
}

// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// The profile the server returns alongside a login token. Opaque to the
/// auth store; only displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Response of `GET /auth/me`: the identity the server sees in the token.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: u64,
    #[serde(default)]
    pub role: String,
}

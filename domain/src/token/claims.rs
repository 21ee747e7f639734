//! Claims carried by the session credentials.
//!
//! Both credential variants (access and refresh) share the same claims
//! shape; they differ only in which secret signs them and how far out
//! `exp` lies. The variant check therefore happens entirely through
//! signature verification against the matching secret.

use serde::{Deserialize, Serialize};

/// Claims for a session credential: the subject (user id in string form),
/// issued-at, and expiry as unix timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SessionClaims {
    pub(crate) sub: String,
    pub(crate) iat: usize,
    pub(crate) exp: usize,
}

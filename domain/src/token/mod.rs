//! Session credential management: issuing, verifying, and refreshing the
//! access/refresh token pair that identifies a caller everywhere else in
//! the system.
//!
//! Credentials are self-contained JWTs signed with HMAC-SHA256. The two
//! variants are signed with distinct secrets so an access token can never
//! pass verification as a refresh token or vice versa. Nothing is persisted:
//! a credential is valid exactly when its signature verifies under the
//! matching secret and it has not expired.

use crate::error::{DomainErrorKind, EntityErrorKind, Error};
use crate::user::UserDirectory;
use crate::Id;
use chrono::{Duration, Utc};
use claims::SessionClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::Serialize;
use service::config::Config;

pub(crate) mod claims;

/// A freshly minted access/refresh credential pair.
///
/// Serialized field names match the wire contract clients already speak
/// (`accessToken` / `refreshToken`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies the two session credential variants.
///
/// Constructed once from [`Config`] and shared behind the application state;
/// all operations are pure computation over the configured secrets, so the
/// value is freely shareable across tasks.
pub struct Tokens {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Tokens {
    pub fn new(config: &Config) -> Self {
        Self::with_secrets(
            config.jwt_access_secret(),
            config.jwt_refresh_secret(),
            Duration::seconds(config.access_token_expiry_seconds as i64),
            Duration::seconds(config.refresh_token_expiry_seconds as i64),
        )
    }

    pub fn with_secrets(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mints a new access/refresh pair for `subject`. Pure signing, no side
    /// effects; fails only if HMAC signing itself fails.
    pub fn issue(&self, subject: Id) -> Result<TokenPair, Error> {
        let now = Utc::now();

        let access_token = encode(
            &Header::default(),
            &SessionClaims {
                sub: subject.to_string(),
                iat: now.timestamp() as usize,
                exp: (now + self.access_ttl).timestamp() as usize,
            },
            &self.access_encoding,
        )?;

        let refresh_token = encode(
            &Header::default(),
            &SessionClaims {
                sub: subject.to_string(),
                iat: now.timestamp() as usize,
                exp: (now + self.refresh_ttl).timestamp() as usize,
            },
            &self.refresh_encoding,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies an access credential and returns its subject.
    pub fn verify_access(&self, token: &str) -> Result<Id, Error> {
        self.verify(token, &self.access_decoding)
    }

    /// Verifies a refresh credential and returns its subject.
    pub fn verify_refresh(&self, token: &str) -> Result<Id, Error> {
        self.verify(token, &self.refresh_decoding)
    }

    /// Re-mints both credentials from a refresh credential, confirming the
    /// subject still exists first. No consumption tracking: a refresh
    /// credential stays replayable until it expires.
    pub async fn refresh(
        &self,
        token: &str,
        directory: &UserDirectory,
    ) -> Result<TokenPair, Error> {
        let subject = self.verify_refresh(token)?;

        if !directory.exists(subject).await {
            warn!("Refresh rejected: subject {subject} no longer exists");
            return Err(Error::unauthenticated());
        }

        self.issue(subject)
    }

    fn verify(&self, token: &str, decoding: &DecodingKey) -> Result<Id, Error> {
        let mut validation = Validation::default();
        // Default leeway is 60s; the credential contract is a hard
        // now < expiry cutoff.
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, decoding, &validation).map_err(|err| {
            debug!("Credential verification failed: {err}");
            Error::from(err)
        })?;

        data.claims.sub.parse::<Id>().map_err(|err| {
            debug!("Credential subject is not a valid id: {err}");
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Entity(EntityErrorKind::Unauthenticated),
            }
        })
    }
}

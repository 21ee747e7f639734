//! The user directory: the seam where the durable user store plugs into the
//! realtime core.
//!
//! The core treats persistence as an external collaborator, so the directory
//! keeps its records in process memory behind an async lock. It answers the
//! three questions the core actually asks: does this subject still exist,
//! which user matches these login credentials, and is this username/email
//! pair still free at registration time.

use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::Id;
use log::*;
use password_auth::{generate_hash, verify_password};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A directory record. The password hash never leaves this module.
#[derive(Debug, Clone)]
struct Record {
    user: User,
    password_hash: String,
}

/// Public view of a user; safe to serialize into responses and events.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
}

/// Parameters for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Default)]
pub struct UserDirectory {
    records: RwLock<HashMap<Id, Record>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new user, rejecting duplicate emails and usernames with a
    /// Conflict error. Password hashing is delegated to `password-auth`.
    pub async fn register(&self, params: NewUser) -> Result<User, Error> {
        let mut records = self.records.write().await;

        if records
            .values()
            .any(|record| record.user.email == params.email)
        {
            return Err(Error::conflict());
        }
        if records
            .values()
            .any(|record| record.user.username == params.username)
        {
            return Err(Error::conflict());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: params.username,
            email: params.email,
        };

        // generate_hash runs the full argon2 KDF; fine at registration
        // volume but never call it inside a hot loop.
        records.insert(
            user.id,
            Record {
                user: user.clone(),
                password_hash: generate_hash(&params.password),
            },
        );

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Authenticates a login attempt by email. Unknown email and wrong
    /// password fail identically so the response doesn't leak which half
    /// was wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let records = self.records.read().await;

        let record = records
            .values()
            .find(|record| record.user.email == email)
            .ok_or_else(|| {
                debug!("Login failed: no user with email {email}");
                Error::unauthenticated()
            })?;

        verify_password(password, &record.password_hash).map_err(|err| {
            debug!("Login failed for {email}: password mismatch");
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Entity(EntityErrorKind::Unauthenticated),
            }
        })?;

        Ok(record.user.clone())
    }

    pub async fn find_by_id(&self, id: Id) -> Result<User, Error> {
        let records = self.records.read().await;
        records
            .get(&id)
            .map(|record| record.user.clone())
            .ok_or_else(Error::not_found)
    }

    /// Point-in-time existence check used by the token refresh flow.
    pub async fn exists(&self, id: Id) -> bool {
        self.records.read().await.contains_key(&id)
    }

    /// Removes a user. Returns NotFound if the id was never registered.
    pub async fn remove(&self, id: Id) -> Result<(), Error> {
        let mut records = self.records.write().await;
        records.remove(&id).map(|_| ()).ok_or_else(Error::not_found)
    }

    /// Seeds a deterministic development user so a fresh process has someone
    /// to log in as. Only called outside production.
    pub async fn seed_dev_user(&self) -> Result<User, Error> {
        self.register(NewUser {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "password".to_string(),
        })
        .await
        .map_err(|err| Error {
            source: err.source,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to seed development user".to_string(),
            )),
        })
    }
}

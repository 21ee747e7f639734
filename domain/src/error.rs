//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: `web` depends on `domain` but never on the libraries `domain`
/// wraps (e.g. `jsonwebtoken`). Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    Entity(EntityErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Enum representing errors attributable to the entities a request operates on:
/// the caller's credential, the addressed user, or a uniqueness constraint.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    /// Credential missing, malformed, expired, or signature mismatch. All
    /// verification failures collapse to this single kind at the API
    /// boundary; log lines may distinguish the causes.
    Unauthenticated,
    Forbidden,
    Conflict,
    Other(String),
}

impl Error {
    /// Shorthand for the uniform authentication failure.
    pub fn unauthenticated() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Entity(EntityErrorKind::Unauthenticated),
        }
    }

    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Entity(EntityErrorKind::NotFound),
        }
    }

    pub fn conflict() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Entity(EntityErrorKind::Conflict),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Every token failure surfaces as Unauthenticated regardless of the
// underlying jsonwebtoken cause. Callers must not be able to tell an
// expired credential apart from a malformed one.
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Entity(EntityErrorKind::Unauthenticated),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JSON serialization related error".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonwebtoken_errors_collapse_to_unauthenticated() {
        let jwt_err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        let err: Error = jwt_err.into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Entity(EntityErrorKind::Unauthenticated)
        );
        assert!(err.source.is_some());
    }
}

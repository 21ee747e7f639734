//! Business layer of the realtime core: session credentials and the user
//! directory the credential flows consult.

use uuid::Uuid;

pub mod error;
pub mod token;
pub mod user;

/// A type alias that represents any entity's internal id field data type.
pub type Id = Uuid;

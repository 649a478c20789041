// ⚠️ Error types - structural failures only
//
// Missing or malformed fields are NOT errors here: they degrade to the "-"
// placeholder inside the resolvers. CardError is reserved for inputs that break
// the contract as a whole (a null where a record object belongs, an invalid
// catalog file, unreadable input).

use crate::records::CardFamily;
use thiserror::Error;

/// Type alias for Result using CardError.
pub type Result<T> = std::result::Result<T, CardError>;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Invalid {family} payload: {source}")]
    Decode {
        family: CardFamily,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid card catalog: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CardError {
    pub(crate) fn decode(family: CardFamily, source: serde_json::Error) -> Self {
        CardError::Decode { family, source }
    }
}

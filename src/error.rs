//! Error taxonomy shared by the fetch, decode, flatten and load stages.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Network failure or a non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid feed url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The payload is not a valid GTFS-RT `FeedMessage`.
    #[error("failed to decode feed: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("entity '{entity_id}' is missing required field `{field}`")]
    MissingField {
        entity_id: String,
        field: &'static str,
    },

    #[error("entity '{entity_id}' has invalid `{field}`: {value}")]
    InvalidField {
        entity_id: String,
        field: &'static str,
        value: String,
    },

    #[error("entity id '{0}' appears more than once in the feed")]
    DuplicateEntity(String),

    /// Missing key file, shape file or other startup input.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(entity_id: &str, field: &'static str) -> Self {
        Error::MissingField {
            entity_id: entity_id.to_string(),
            field,
        }
    }

    pub(crate) fn invalid(entity_id: &str, field: &'static str, value: impl ToString) -> Self {
        Error::InvalidField {
            entity_id: entity_id.to_string(),
            field,
            value: value.to_string(),
        }
    }

    /// Short machine-readable label for the error class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport(_) | Error::InvalidUrl { .. } => "transport",
            Error::Decode(_) => "decode",
            Error::MissingField { .. } | Error::InvalidField { .. } | Error::DuplicateEntity(_) => {
                "schema"
            }
            Error::Config(_) => "config",
            Error::Io(_) | Error::Csv(_) | Error::Json(_) => "output",
        }
    }
}

//! Error types for each stage of a request.
//!
//! # Design
//! Building and config loading surface their errors to the caller. Decode and
//! extractor errors never leave the executor: they are logged and collapsed
//! into a failed [`crate::ApiResponse`].

use thiserror::Error;

/// Errors returned while building a request.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header name or value is not legal HTTP.
    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    /// The JSON payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raised by a caller-supplied extractor that cannot read the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExtractError(pub String);

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised while turning a response body into an `ApiResponse`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid json: {0}")]
    Json(#[source] serde_json::Error),

    #[error("response body is not a json object")]
    NotAnObject,

    /// The envelope's `code` field is null, an array or an object.
    #[error("field `code` is not a scalar")]
    CodeNotScalar,

    /// The data element does not match the target type.
    #[error("data does not match the target type: {0}")]
    Data(#[source] serde_json::Error),

    #[error("extractor failed: {0}")]
    Extract(#[from] ExtractError),
}

/// Errors returned while loading a [`crate::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

//! Transcoding error types.
//!
//! Errors fall into a small, fixed taxonomy:
//!
//! - **Configuration** - the codec set itself is wrong (a codec with zero
//!   supported media types, an ambiguous default). Raised at setup or
//!   first use, never silently ignored.
//! - **Dispatch** - no registered codec matched
//!   ([`NoDecoderFound`](TranscodeError::NoDecoderFound),
//!   [`NoEncoderFound`](TranscodeError::NoEncoderFound)).
//! - **Data** - the bytes were wrong
//!   ([`MalformedRepresentation`](TranscodeError::MalformedRepresentation),
//!   [`MediaType`](TranscodeError::MediaType)).
//!
//! The engine performs no retries and no fallback-to-default-codec
//! behavior; every error is surfaced once to the immediate caller, which
//! owns the translation into protocol responses (e.g. HTTP 406/415/400).

use thiserror::Error;

use crate::media_type::{MediaType, MediaTypeParseError};

/// Transcoding errors.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The codec set is misconfigured (zero supported media types,
    /// ambiguous default, dispatch inconsistency).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No registered decoder accepted the declared media type / model
    /// type combination.
    #[error("Unable to find a decoder for '{media_type}'")]
    NoDecoderFound {
        /// The declared media type of the input.
        media_type: String,
    },

    /// No registered encoder accepted the desired media type / object
    /// type combination.
    #[error("Unable to find an encoder for '{media_type}' that can encode an object of type '{object_type}'")]
    NoEncoderFound {
        /// The media type the caller asked for.
        media_type: String,
        /// The runtime type of the object to encode.
        object_type: String,
    },

    /// A decoder's low-level parse step failed on bytes that passed the
    /// `can_read` gate.
    #[error("Error decoding '{media_type}' representation in {decoder}: {detail}")]
    MalformedRepresentation {
        /// The decoder that rejected the payload.
        decoder: String,
        /// The declared media type of the payload.
        media_type: String,
        /// What the parse step reported.
        detail: String,
    },

    /// A media-type string failed to parse. This is a caller-side error,
    /// surfaced before any matching happens - never reported as "no match".
    #[error("Media type error: {0}")]
    MediaType(#[from] MediaTypeParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file/environment error.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for transcoding operations
pub type Result<T> = std::result::Result<T, TranscodeError>;

impl TranscodeError {
    /// Wrap a low-level decode failure with the decoder and media type it
    /// happened under.
    pub fn malformed(
        decoder: impl Into<String>,
        media_type: &MediaType,
        detail: impl std::fmt::Display,
    ) -> Self {
        TranscodeError::MalformedRepresentation {
            decoder: decoder.into(),
            media_type: media_type.to_string(),
            detail: detail.to_string(),
        }
    }
}

impl From<toml::de::Error> for TranscodeError {
    fn from(err: toml::de::Error) -> Self {
        TranscodeError::Config(err.to_string())
    }
}

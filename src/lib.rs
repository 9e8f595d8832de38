//! # Transcode - Media-Type Negotiation & Codec Dispatch
//!
//! Content negotiation for any transport: structured media-type matching
//! (type/subtype wildcards, parameter equality, charset/q exclusion) and
//! a codec registry that uses it to pick the right encoder or decoder
//! for a given object type and representation.
//!
//! ## Features
//!
//! - **Structured matching**: subset and match relations over parsed
//!   media types, suffix-aware (`application/*+json`), with `charset`,
//!   `q` and `*` parameters excluded from comparison
//! - **First-match dispatch**: ordered codec registry, frozen after
//!   setup, safe for unlimited concurrent readers
//! - **Header-before-body contract**: the winning encoder records its
//!   chosen representation before the body is written
//! - **Composable codecs**: collection codecs derive per-element
//!   contexts and delegate to the registered element codec
//!
//! ## Matching Overview
//!
//! | left | right | subset? |
//! |------|-------|---------|
//! | `text/plain` | `text/plain` | yes |
//! | `text/plain` | `text/*` | yes |
//! | `text/plain` | `*/*` | yes |
//! | `*/*` | `text/plain` | no (`*/*` is a subset only of `*/*`) |
//! | `application/vnd.example+json` | `application/json` | yes (plain subtype covers the suffix) |
//! | `application/vnd.example+json` | `application/*+json` | yes |
//! | `a/b; v=1; charset=utf-8` | `a/b; v=1` | yes (charset excluded) |
//! | `a/b; v=2` | `a/b; v=1` | no |
//!
//! ## Data Flow
//!
//! ```text
//! caller builds EncodeContext / DecodeContext
//!          │
//!          ▼
//!     Transcoder ──── can_write / can_read ───> registered codecs
//!          │                                    (registration order,
//!          │ first capable codec                 first match wins)
//!          ▼
//!     codec encodes/decodes against the stream,
//!     actual media type recorded in the context
//! ```
//!
//! ## Quick Start
//!
//! ### Matching Only
//!
//! ```rust,ignore
//! use transcode::{media_type::matching, MediaType};
//!
//! let declared = MediaType::parse("application/json; Domain=Weather; Version=1; charset=utf-8")?;
//! let supported = MediaType::parse("application/json; Domain=Weather; Version=1")?;
//!
//! assert!(matching::is_match(&declared, &supported)); // charset ignored
//! ```
//!
//! ### Full Registry
//!
//! ```rust,ignore
//! use transcode::{forecast, DecodeContext, EncodeContext, Forecast, MediaType};
//!
//! let transcoder = forecast::transcoder();
//!
//! // Encode: ask for the custom V1 representation.
//! let mut output = Vec::new();
//! let mut context = EncodeContext::new(&forecast, &mut output)
//!     .with_desired_media_type(MediaType::parse(
//!         "application/json; Domain=Example.Forecast.Custom; Version=1",
//!     )?);
//! let actual = transcoder.encode(&mut context).await?;
//!
//! // Decode it back.
//! let mut input: &[u8] = &output;
//! let mut context = DecodeContext::new(actual, &mut input).with_model::<Forecast>();
//! let round_tripped: Forecast = transcoder.decode_as(&mut context).await?;
//! ```
//!
//! ## Modules
//!
//! - [`media_type`]: parsed media types and the matching predicates
//! - [`codec`]: codec traits, contexts, and the dispatching registry
//! - [`forecast`]: sample resource with custom/serialized codec family
//! - [`problem`]: problem-report resource with an always-on encoder
//! - [`config`]: configuration management
//! - [`error`]: error types and result alias
//!
//! ## Scope
//!
//! The engine is transport-agnostic and owns no streams, no retries and
//! no fallback behavior: a failed match or decode is reported once, and
//! the caller decides what to do (e.g. answer HTTP 406/415/400). There
//! is no q-value ranking here - callers order their preferences before
//! asking.

pub mod codec;
pub mod config;
pub mod error;
pub mod forecast;
pub mod media_type;
pub mod problem;

// Re-exports for convenience
pub use codec::{
    DecodeContext, Decoder, EncodeContext, Encoder, TextEncoding, Transcoder, TranscoderBuilder,
    TypeTag,
};
pub use config::Config;
pub use error::{Result, TranscodeError};
pub use forecast::Forecast;
pub use media_type::matching::{has_wildcard, is_match, is_subset_of};
pub use media_type::{MediaType, MediaTypeParseError, Parameter};
pub use problem::Problem;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

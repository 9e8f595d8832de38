//! Codec traits, contexts, and the dispatching registry.
//!
//! A codec is an [`Encoder`] or [`Decoder`] bound to one or more media
//! types and one resource shape. Codecs register into a [`Transcoder`],
//! which answers the two operations every transport needs:
//!
//! ```text
//! caller builds context
//!        │
//!        ▼
//! ┌─────────────┐   can_read / can_write   ┌──────────────┐
//! │  Transcoder │ ───────────────────────> │ Codec 1..n   │
//! │  (frozen,   │   first match wins       │ (media types │
//! │   ordered)  │ <─────────────────────── │  + type tag) │
//! └─────────────┘                          └──────┬───────┘
//!        │                                        │
//!        ▼                                        ▼
//!  encode/decode runs                      media_type::matching
//! ```
//!
//! Capability checks are gated twice: a [`TypeTag`] comparison for the
//! runtime type, then media-type matching against the codec's supported
//! list. The winning encoder records its chosen representation in the
//! context **before** the body is written, so transports can emit
//! content-type headers first.
//!
//! Registration happens once, through [`TranscoderBuilder`]; the built
//! registry is immutable and freely shared across threads.

mod context;
mod decoder;
mod encoder;
pub mod json;
mod tag;
mod transcoder;

pub use context::{DecodeContext, EncodeContext, TextEncoding};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use tag::TypeTag;
pub use transcoder::{Transcoder, TranscoderBuilder};

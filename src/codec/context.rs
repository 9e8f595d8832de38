//! Per-operation encode/decode contexts.
//!
//! A context is a transient value bundle allocated fresh for each
//! encode/decode call and discarded afterwards. It carries the media
//! types being negotiated, the object (or expected model type), the
//! stream, and the text encoding. Contexts are never shared across
//! concurrent operations.
//!
//! Both context types support an explicit derive-and-override step for
//! per-element recursion in collection codecs: [`EncodeContext::for_object`]
//! and [`DecodeContext::for_model`] return a child context that preserves
//! the media-type and encoding settings, reborrows the stream, and
//! overrides only the object/model fields. There is no implicit deep
//! copy.
//!
//! Callers own the streams: the engine reads and writes but never opens
//! or closes them, and imposes no timeout or cancellation of its own.

use std::any::Any;
use std::io;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::TypeTag;
use crate::config::Config;
use crate::error::{Result, TranscodeError};
use crate::media_type::MediaType;

/// Text encoding for stream payloads.
///
/// The default is UTF-8 **without** a byte-order mark; a BOM on output
/// would corrupt strict JSON parsers downstream. Input decoding
/// tolerates (and strips) a leading BOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8, no byte-order mark on output.
    #[default]
    Utf8,
    /// Little-endian UTF-16.
    Utf16Le,
}

impl TextEncoding {
    /// Descriptive name (IANA charset label).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
        }
    }

    /// Encode text to bytes. Never emits a byte-order mark.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect(),
        }
    }

    /// Decode bytes to text, stripping a leading byte-order mark if
    /// present.
    pub fn decode(&self, bytes: &[u8]) -> io::Result<String> {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            Self::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "UTF-16 payload has an odd number of bytes",
                    ));
                }
                let mut units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                if units.first() == Some(&0xFEFF) {
                    units.remove(0);
                }
                String::from_utf16(&units)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Context for one encode operation.
pub struct EncodeContext<'a, 'o> {
    /// The media type the caller wants. If absent, the selected encoder
    /// is free to choose and must write back its default.
    pub desired_media_type: Option<MediaType>,
    /// The representation the selected encoder chose. Set by any encoder
    /// whose `can_write` reports success - before the body is written, so
    /// transports can emit content-type headers first.
    pub actual_media_type: Option<MediaType>,
    /// The object to encode.
    pub object: &'a (dyn Any + Send + Sync),
    /// Tag of the object's runtime type.
    pub object_type: Option<TypeTag>,
    /// Text encoding for the output stream.
    pub encoding: TextEncoding,
    /// Whether JSON codecs emit indented output.
    pub pretty: bool,
    output: Option<&'a mut (dyn AsyncWrite + Send + Unpin + 'o)>,
}

impl<'a, 'o> EncodeContext<'a, 'o> {
    /// Create a context for encoding `object` into `output`.
    pub fn new<T>(object: &'a T, output: &'a mut (dyn AsyncWrite + Send + Unpin + 'o)) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            desired_media_type: None,
            actual_media_type: None,
            object,
            object_type: Some(TypeTag::of::<T>()),
            encoding: TextEncoding::default(),
            pretty: true,
            output: Some(output),
        }
    }

    /// Create a context for an object whose concrete type is not known
    /// statically - e.g. re-encoding a value that came out of
    /// [`Transcoder::decode`](crate::Transcoder::decode).
    ///
    /// With no object type on the context, encoder selection skips the
    /// type gate and relies on media-type matching alone.
    pub fn new_untyped(
        object: &'a (dyn Any + Send + Sync),
        output: &'a mut (dyn AsyncWrite + Send + Unpin + 'o),
    ) -> Self {
        Self {
            desired_media_type: None,
            actual_media_type: None,
            object,
            object_type: None,
            encoding: TextEncoding::default(),
            pretty: true,
            output: Some(output),
        }
    }

    /// Set the media type the caller wants.
    pub fn with_desired_media_type(mut self, media_type: MediaType) -> Self {
        self.desired_media_type = Some(media_type);
        self
    }

    /// Set the output text encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Emit compact instead of indented JSON.
    pub fn with_compact_json(mut self) -> Self {
        self.pretty = false;
        self
    }

    /// Seed encoding and JSON style from a [`Config`].
    pub fn with_config(mut self, config: &Config) -> Self {
        self.encoding = config.encoding.text;
        self.pretty = config.json.pretty;
        self
    }

    /// Derive a child context for a single element of a collection,
    /// preserving media-type, encoding and JSON-style settings and
    /// reborrowing the output stream.
    ///
    /// Changes the child makes to its own fields do not propagate back.
    pub fn for_object<'b>(
        &'b mut self,
        object: &'b (dyn Any + Send + Sync),
        object_type: TypeTag,
    ) -> EncodeContext<'b, 'o> {
        EncodeContext {
            desired_media_type: self.desired_media_type.clone(),
            actual_media_type: self.actual_media_type.clone(),
            object,
            object_type: Some(object_type),
            encoding: self.encoding,
            pretty: self.pretty,
            output: self.output.as_mut().map(|stream| &mut **stream),
        }
    }

    /// The output stream.
    ///
    /// Fails with a configuration error if this context was derived
    /// without a stream.
    pub fn output(&mut self) -> Result<&mut (dyn AsyncWrite + Send + Unpin + 'o)> {
        self.output
            .as_mut()
            .map(|stream| &mut **stream)
            .ok_or_else(|| {
                TranscodeError::Configuration("encode context has no output stream".to_string())
            })
    }

    /// Describe the desired media type for error messages.
    pub(crate) fn desired_description(&self) -> String {
        self.desired_media_type
            .as_ref()
            .map_or_else(|| "(any)".to_string(), ToString::to_string)
    }

    /// Describe the object type for error messages.
    pub(crate) fn object_type_description(&self) -> String {
        self.object_type
            .map_or_else(|| "(unknown)".to_string(), |tag| tag.name().to_string())
    }
}

impl std::fmt::Debug for EncodeContext<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodeContext")
            .field("desired_media_type", &self.desired_media_type)
            .field("actual_media_type", &self.actual_media_type)
            .field("object_type", &self.object_type)
            .field("encoding", &self.encoding)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

/// Context for one decode operation.
pub struct DecodeContext<'a, 'i> {
    /// Tag of the expected model type. Optional - if absent, any type is
    /// acceptable.
    pub model_type: Option<TypeTag>,
    /// The declared media type of the bytes in the input stream.
    pub media_type: MediaType,
    /// Text encoding of the input stream.
    pub encoding: TextEncoding,
    input: Option<&'a mut (dyn AsyncRead + Send + Unpin + 'i)>,
}

impl<'a, 'i> DecodeContext<'a, 'i> {
    /// Create a context for decoding `input` declared as `media_type`.
    pub fn new(media_type: MediaType, input: &'a mut (dyn AsyncRead + Send + Unpin + 'i)) -> Self {
        Self {
            model_type: None,
            media_type,
            encoding: TextEncoding::default(),
            input: Some(input),
        }
    }

    /// Require the decoded value to be a `T`.
    pub fn with_model<T: Any>(mut self) -> Self {
        self.model_type = Some(TypeTag::of::<T>());
        self
    }

    /// Set the input text encoding.
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Seed the text encoding from a [`Config`].
    pub fn with_config(mut self, config: &Config) -> Self {
        self.encoding = config.encoding.text;
        self
    }

    /// Derive a child context for a single element of a collection,
    /// preserving the declared media type and encoding and reborrowing
    /// the input stream.
    pub fn for_model<'b>(&'b mut self, model_type: TypeTag) -> DecodeContext<'b, 'i> {
        DecodeContext {
            model_type: Some(model_type),
            media_type: self.media_type.clone(),
            encoding: self.encoding,
            input: self.input.as_mut().map(|stream| &mut **stream),
        }
    }

    /// The input stream.
    ///
    /// Fails with a configuration error if this context was derived
    /// without a stream.
    pub fn input(&mut self) -> Result<&mut (dyn AsyncRead + Send + Unpin + 'i)> {
        self.input
            .as_mut()
            .map(|stream| &mut **stream)
            .ok_or_else(|| {
                TranscodeError::Configuration("decode context has no input stream".to_string())
            })
    }
}

impl std::fmt::Debug for DecodeContext<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeContext")
            .field("model_type", &self.model_type)
            .field("media_type", &self.media_type)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

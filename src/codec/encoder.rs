//! Encoder trait and the default capability check.

use async_trait::async_trait;

use crate::codec::{EncodeContext, TypeTag};
use crate::error::{Result, TranscodeError};
use crate::media_type::{matching, MediaType};

/// Writes an object to the output stream as one of its supported media
/// types.
///
/// Encoders are created once at setup, hold no per-request state, and
/// are safe for unlimited concurrent reuse.
///
/// The default [`can_write`](Encoder::can_write) implements the full
/// selection algorithm, including its deliberate side effect: on
/// success the context's `actual_media_type` is set **before** `write`
/// runs, because transports need to emit a content-type header ahead of
/// the body. Implementations that override `can_write` (e.g. an
/// always-on fallback encoder) must preserve that contract.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Short name for error messages and logging.
    fn name(&self) -> &'static str;

    /// The media types this encoder can produce, in registration order.
    /// Must be non-empty; an empty list is a configuration error
    /// reported at first use.
    fn supported_media_types(&self) -> &[MediaType];

    /// Whether this encoder can encode objects of the tagged type.
    fn accepts(&self, object_type: TypeTag) -> bool {
        let _ = object_type;
        true
    }

    /// Decide whether this encoder can serve the context, and on success
    /// record the chosen representation in `context.actual_media_type`.
    ///
    /// Selection rules, in order, for each supported type:
    /// - a wildcard-pattern supported type accepts a desired type that
    ///   matches the pattern, and echoes the desired type back verbatim
    ///   (a wildcard encoder honors the caller's concrete request);
    /// - a concrete supported type accepts a desired type it matches,
    ///   and writes itself back.
    ///
    /// With no desired media type the encoder is free to choose: its
    /// single supported type becomes the actual one. An encoder with
    /// several supported types must be given a desired type - that
    /// ambiguity is a configuration error, not a `false`.
    fn can_write(&self, context: &mut EncodeContext<'_, '_>) -> Result<bool> {
        let supported = self.supported_media_types();
        if supported.is_empty() {
            return Err(TranscodeError::Configuration(format!(
                "Encoder '{}' does not support any media types. It must support at least one media type.",
                self.name()
            )));
        }

        if let Some(object_type) = context.object_type {
            if !self.accepts(object_type) {
                return Ok(false);
            }
        }

        let Some(desired) = context.desired_media_type.clone() else {
            if supported.len() > 1 {
                return Err(TranscodeError::Configuration(format!(
                    "Encoder '{}' supports multiple media types; a desired media type is required to pick one.",
                    self.name()
                )));
            }
            context.actual_media_type = Some(supported[0].clone());
            return Ok(true);
        };

        for media_type in supported {
            if matching::has_wildcard(media_type) {
                if matching::is_match(&desired, media_type) {
                    context.actual_media_type = Some(desired);
                    return Ok(true);
                }
            } else if matching::is_match(media_type, &desired) {
                context.actual_media_type = Some(media_type.clone());
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Write the context's object to its output stream.
    ///
    /// Only called after `can_write` returned true; `actual_media_type`
    /// is already set and must not be changed here (headers may already
    /// be on the wire).
    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()>;
}

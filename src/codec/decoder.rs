//! Decoder trait and the default capability check.

use std::any::Any;

use async_trait::async_trait;

use crate::codec::{DecodeContext, TypeTag};
use crate::error::{Result, TranscodeError};
use crate::media_type::{matching, MediaType};

/// Reads an object from an input stream declared as one of its
/// supported media types.
///
/// Decoders are created once at setup, hold no per-request state, and
/// are safe for unlimited concurrent reuse.
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Short name for error messages and logging.
    fn name(&self) -> &'static str;

    /// The media types this decoder can consume, in registration order.
    /// Must be non-empty; an empty list is a configuration error
    /// reported at first use.
    fn supported_media_types(&self) -> &[MediaType];

    /// Whether this decoder produces values of the tagged type.
    fn accepts(&self, model_type: TypeTag) -> bool {
        let _ = model_type;
        true
    }

    /// Decide whether this decoder can consume the context's declared
    /// media type (and produce its model type, when one is required).
    ///
    /// The declared media type must be at least as specific as one of
    /// the supported types: `is_match(declared, supported)` - e.g. a
    /// payload declared `application/json; Domain=Weather; Version=1;
    /// charset=utf-8` is accepted by a decoder supporting
    /// `application/json; Domain=Weather; Version=1`.
    fn can_read(&self, context: &DecodeContext<'_, '_>) -> Result<bool> {
        let supported = self.supported_media_types();
        if supported.is_empty() {
            return Err(TranscodeError::Configuration(format!(
                "Decoder '{}' does not support any media types. It must support at least one media type.",
                self.name()
            )));
        }

        if let Some(model_type) = context.model_type {
            if !self.accepts(model_type) {
                return Ok(false);
            }
        }

        Ok(supported
            .iter()
            .any(|media_type| matching::is_match(&context.media_type, media_type)))
    }

    /// Read one object from the context's input stream.
    ///
    /// Only called after `can_read` returned true. Parse failures behind
    /// that gate are reported as
    /// [`MalformedRepresentation`](TranscodeError::MalformedRepresentation),
    /// wrapped with this decoder's name and the declared media type.
    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>>;
}

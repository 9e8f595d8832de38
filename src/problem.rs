//! Problem-report resource and its always-on encoder.
//!
//! Transport adapters that translate engine errors into protocol
//! responses need one representation that is always available, whatever
//! the caller asked for. [`ProblemEncoder`] provides it: the capability
//! check answers solely on the object type and stamps
//! `application/problem+json` itself, so a problem body can be produced
//! even when the request's desired media type names something else
//! entirely.

use std::any::Any;
use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::codec::{json, EncodeContext, Encoder, TypeTag};
use crate::error::Result;
use crate::media_type::MediaType;

use serde::{Deserialize, Serialize};

/// Media type of the problem representation.
pub const PROBLEM_MEDIA_TYPE: &str = "application/problem+json";

/// A machine-readable problem report (RFC 7807 shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// URI identifying the problem type, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_uri: Option<String>,
    /// Short human-readable summary.
    pub title: String,
    /// Protocol status code, if the transport has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable explanation specific to this occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl Problem {
    /// Create a problem with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            type_uri: None,
            title: title.into(),
            status: None,
            detail: None,
            errors: BTreeMap::new(),
        }
    }

    /// Set the status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add a validation message for a field.
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }
}

/// Encoder for [`Problem`] values.
///
/// Overrides the default capability check: a problem can always be
/// written, regardless of the context's desired media type, and the
/// actual media type is always `application/problem+json`. Register it
/// last so it never shadows a content-negotiated codec.
pub struct ProblemEncoder {
    supported: Vec<MediaType>,
}

impl ProblemEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(PROBLEM_MEDIA_TYPE)],
        }
    }
}

impl Default for ProblemEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for ProblemEncoder {
    fn name(&self) -> &'static str {
        "ProblemEncoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, object_type: TypeTag) -> bool {
        object_type.is::<Problem>()
    }

    // Bypass the desired-media-type check: if the object is a Problem,
    // this encoder takes it and stamps its own media type. The
    // actual-media-type write-back still happens here, in the capability
    // check, so headers can go out before the body.
    fn can_write(&self, context: &mut EncodeContext<'_, '_>) -> Result<bool> {
        let accepted = context
            .object_type
            .is_some_and(|object_type| self.accepts(object_type));
        if accepted {
            context.actual_media_type = Some(self.supported[0].clone());
        }
        Ok(accepted)
    }

    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
        let object = context.object;
        let problem = object.downcast_ref::<Problem>().ok_or_else(|| {
            crate::error::TranscodeError::Configuration(format!(
                "{} cannot encode an object of type '{}'",
                self.name(),
                context.object_type_description()
            ))
        })?;
        let value = serde_json::to_value(problem)?;
        json::write_value(context, &value).await
    }
}

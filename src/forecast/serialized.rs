//! Serde-derived JSON codecs for [`Forecast`].
//!
//! Where the [`custom`](super::custom) codecs own their wire shape,
//! these lean on the resource's `Serialize`/`Deserialize` derives: the
//! representation mirrors the struct (camelCase fields, RFC 3339
//! timestamps at full precision), so a round trip is exact.

use std::any::Any;

use async_trait::async_trait;

use crate::codec::{json, DecodeContext, Decoder, EncodeContext, Encoder, TypeTag};
use crate::error::{Result, TranscodeError};
use crate::forecast::Forecast;
use crate::media_type::MediaType;

/// Media type of the serialized forecast representation.
pub const FORECAST_SERIALIZED_V1: &str =
    "application/json; Domain=Example.Forecast.Serialized; Version=1";

/// Media type of the serialized forecast-collection representation.
pub const FORECAST_COLLECTION_SERIALIZED_V1: &str =
    "application/json; Domain=Example.ForecastCollection.Serialized; Version=1";

/// Encoder that serializes a [`Forecast`] directly.
pub struct ForecastSerializedV1Encoder {
    supported: Vec<MediaType>,
}

impl ForecastSerializedV1Encoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_SERIALIZED_V1)],
        }
    }
}

impl Default for ForecastSerializedV1Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for ForecastSerializedV1Encoder {
    fn name(&self) -> &'static str {
        "ForecastSerializedV1Encoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, object_type: TypeTag) -> bool {
        object_type.is::<Forecast>()
    }

    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
        let object = context.object;
        let forecast = object.downcast_ref::<Forecast>().ok_or_else(|| {
            TranscodeError::Configuration(format!(
                "{} cannot encode an object of type '{}'",
                self.name(),
                context.object_type_description()
            ))
        })?;
        let value = serde_json::to_value(forecast)?;
        json::write_value(context, &value).await
    }
}

/// Decoder that deserializes a [`Forecast`] directly.
pub struct ForecastSerializedV1Decoder {
    supported: Vec<MediaType>,
}

impl ForecastSerializedV1Decoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_SERIALIZED_V1)],
        }
    }
}

impl Default for ForecastSerializedV1Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Decoder for ForecastSerializedV1Decoder {
    fn name(&self) -> &'static str {
        "ForecastSerializedV1Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Forecast>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let forecast: Forecast = serde_json::from_value(value)
            .map_err(|e| TranscodeError::malformed(self.name(), &context.media_type, e))?;
        Ok(Box::new(forecast))
    }
}

/// Encoder that serializes a `Vec<Forecast>` directly.
pub struct ForecastCollectionSerializedV1Encoder {
    supported: Vec<MediaType>,
}

impl ForecastCollectionSerializedV1Encoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_SERIALIZED_V1)],
        }
    }
}

impl Default for ForecastCollectionSerializedV1Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for ForecastCollectionSerializedV1Encoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionSerializedV1Encoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, object_type: TypeTag) -> bool {
        object_type.is::<Vec<Forecast>>()
    }

    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
        let object = context.object;
        let forecasts = object.downcast_ref::<Vec<Forecast>>().ok_or_else(|| {
            TranscodeError::Configuration(format!(
                "{} cannot encode an object of type '{}'",
                self.name(),
                context.object_type_description()
            ))
        })?;
        let value = serde_json::to_value(forecasts)?;
        json::write_value(context, &value).await
    }
}

/// Decoder that deserializes a `Vec<Forecast>` directly.
pub struct ForecastCollectionSerializedV1Decoder {
    supported: Vec<MediaType>,
}

impl ForecastCollectionSerializedV1Decoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_SERIALIZED_V1)],
        }
    }
}

impl Default for ForecastCollectionSerializedV1Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Decoder for ForecastCollectionSerializedV1Decoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionSerializedV1Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Vec<Forecast>>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let forecasts: Vec<Forecast> = serde_json::from_value(value)
            .map_err(|e| TranscodeError::malformed(self.name(), &context.media_type, e))?;
        Ok(Box::new(forecasts))
    }
}

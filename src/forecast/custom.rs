//! Hand-shaped JSON codecs for [`Forecast`].
//!
//! These codecs own their wire shape outright instead of mirroring the
//! struct: V1 spells the temperature node out, V2 abbreviates it, and
//! both write timestamps in a fixed UTC millisecond format. Decoders
//! accept the same field layout back and reject payloads missing the
//! required `date` field.
//!
//! ```text
//! V1: { "date": "2021-07-04T12:30:00.000Z",
//!       "temperature": { "celsius": 20, "fahrenheit": 67 },
//!       "summary": "Sunny" }
//!
//! V2: { "date": "2021-07-04T12:30:00.000Z",
//!       "temp": { "c": 20, "f": 67 },
//!       "summary": "Sunny" }
//! ```
//!
//! Collection codecs handle `Vec<Forecast>` by deriving a per-element
//! context and delegating to an element codec that is injected at
//! construction - register the same `Arc` in the transcoder so the
//! composed and the registered codec are one instance.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};

use crate::codec::{json, DecodeContext, Decoder, EncodeContext, Encoder, TypeTag};
use crate::error::{Result, TranscodeError};
use crate::forecast::Forecast;
use crate::media_type::MediaType;

/// Media type of the custom V1 forecast representation.
pub const FORECAST_CUSTOM_V1: &str =
    "application/json; Domain=Example.Forecast.Custom; Version=1";

/// Media type of the custom V2 forecast representation.
pub const FORECAST_CUSTOM_V2: &str =
    "application/json; Domain=Example.Forecast.Custom; Version=2";

/// Media type of the custom V1 forecast-collection representation.
pub const FORECAST_COLLECTION_CUSTOM_V1: &str =
    "application/json; Domain=Example.ForecastCollection.Custom; Version=1";

/// Media type of the custom V2 forecast-collection representation.
pub const FORECAST_COLLECTION_CUSTOM_V2: &str =
    "application/json; Domain=Example.ForecastCollection.Custom; Version=2";

/// UTC timestamp format written by the custom codecs. Three fractional
/// digits: a round trip may truncate sub-millisecond precision.
const DATE_WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Accepted on input: the same shape with zero to nine fractional
/// digits.
const DATE_READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_WRITE_FORMAT).to_string()
}

fn parse_date(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, DATE_READ_FORMAT).map(|naive| naive.and_utc())
}

fn forecast_of<'a>(context: &EncodeContext<'a, '_>, name: &'static str) -> Result<&'a Forecast> {
    let object = context.object;
    object.downcast_ref::<Forecast>().ok_or_else(|| {
        TranscodeError::Configuration(format!(
            "{name} cannot encode an object of type '{}'",
            context.object_type_description()
        ))
    })
}

fn required_date(
    value: &Value,
    decoder: &'static str,
    context: &DecodeContext<'_, '_>,
) -> Result<DateTime<Utc>> {
    let text = value
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            TranscodeError::malformed(decoder, &context.media_type, "missing 'date' field")
        })?;
    parse_date(text).map_err(|e| {
        TranscodeError::malformed(
            decoder,
            &context.media_type,
            format!("invalid 'date' value '{text}': {e}"),
        )
    })
}

/// Read `celsius` out of a temperature node; absent node means 0 °C,
/// but a present node must carry a readable value.
fn temperature_from_node(
    value: &Value,
    node_name: &str,
    field_name: &str,
    decoder: &'static str,
    context: &DecodeContext<'_, '_>,
) -> Result<i32> {
    let Some(node) = value.get(node_name) else {
        return Ok(0);
    };
    let celsius = node.get(field_name).and_then(Value::as_i64).ok_or_else(|| {
        TranscodeError::malformed(
            decoder,
            &context.media_type,
            format!("missing or non-integer '{node_name}.{field_name}' field"),
        )
    })?;
    i32::try_from(celsius).map_err(|_| {
        TranscodeError::malformed(
            decoder,
            &context.media_type,
            format!("'{node_name}.{field_name}' value {celsius} is out of range"),
        )
    })
}

fn summary_of(value: &Value) -> Option<String> {
    value.get("summary").and_then(Value::as_str).map(String::from)
}

// ---------------------------------------------------------------------
// Singular V1
// ---------------------------------------------------------------------

/// Encoder for the custom V1 forecast representation.
pub struct ForecastCustomV1Encoder {
    supported: Vec<MediaType>,
}

impl ForecastCustomV1Encoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_CUSTOM_V1)],
        }
    }

    /// Build the V1 value for the context's forecast.
    pub fn encode_value(&self, context: &EncodeContext<'_, '_>) -> Result<Value> {
        let forecast = forecast_of(context, self.name())?;

        let mut object = Map::new();
        object.insert("date".to_string(), json!(format_date(&forecast.date)));
        object.insert(
            "temperature".to_string(),
            json!({
                "celsius": forecast.temperature_c,
                "fahrenheit": forecast.temperature_f(),
            }),
        );
        if let Some(summary) = &forecast.summary {
            object.insert("summary".to_string(), json!(summary));
        }

        Ok(Value::Object(object))
    }
}

impl Default for ForecastCustomV1Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for ForecastCustomV1Encoder {
    fn name(&self) -> &'static str {
        "ForecastCustomV1Encoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, object_type: TypeTag) -> bool {
        object_type.is::<Forecast>()
    }

    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
        let value = self.encode_value(context)?;
        json::write_value(context, &value).await
    }
}

/// Decoder for the custom V1 forecast representation.
pub struct ForecastCustomV1Decoder {
    supported: Vec<MediaType>,
}

impl ForecastCustomV1Decoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_CUSTOM_V1)],
        }
    }

    /// Interpret a V1 value.
    pub fn decode_value(&self, value: &Value, context: &DecodeContext<'_, '_>) -> Result<Forecast> {
        Ok(Forecast {
            date: required_date(value, self.name(), context)?,
            temperature_c: temperature_from_node(
                value,
                "temperature",
                "celsius",
                self.name(),
                context,
            )?,
            summary: summary_of(value),
        })
    }
}

impl Default for ForecastCustomV1Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Decoder for ForecastCustomV1Decoder {
    fn name(&self) -> &'static str {
        "ForecastCustomV1Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Forecast>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let forecast = self.decode_value(&value, context)?;
        Ok(Box::new(forecast))
    }
}

// ---------------------------------------------------------------------
// Singular V2
// ---------------------------------------------------------------------

/// Encoder for the custom V2 forecast representation (abbreviated
/// temperature node).
pub struct ForecastCustomV2Encoder {
    supported: Vec<MediaType>,
}

impl ForecastCustomV2Encoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_CUSTOM_V2)],
        }
    }

    /// Build the V2 value for the context's forecast.
    pub fn encode_value(&self, context: &EncodeContext<'_, '_>) -> Result<Value> {
        let forecast = forecast_of(context, self.name())?;

        let mut object = Map::new();
        object.insert("date".to_string(), json!(format_date(&forecast.date)));
        object.insert(
            "temp".to_string(),
            json!({
                "c": forecast.temperature_c,
                "f": forecast.temperature_f(),
            }),
        );
        if let Some(summary) = &forecast.summary {
            object.insert("summary".to_string(), json!(summary));
        }

        Ok(Value::Object(object))
    }
}

impl Default for ForecastCustomV2Encoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for ForecastCustomV2Encoder {
    fn name(&self) -> &'static str {
        "ForecastCustomV2Encoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, object_type: TypeTag) -> bool {
        object_type.is::<Forecast>()
    }

    async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
        let value = self.encode_value(context)?;
        json::write_value(context, &value).await
    }
}

/// Decoder for the custom V2 forecast representation.
pub struct ForecastCustomV2Decoder {
    supported: Vec<MediaType>,
}

impl ForecastCustomV2Decoder {
    /// Create the decoder.
    pub fn new() -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_CUSTOM_V2)],
        }
    }

    /// Interpret a V2 value.
    pub fn decode_value(&self, value: &Value, context: &DecodeContext<'_, '_>) -> Result<Forecast> {
        Ok(Forecast {
            date: required_date(value, self.name(), context)?,
            temperature_c: temperature_from_node(value, "temp", "c", self.name(), context)?,
            summary: summary_of(value),
        })
    }
}

impl Default for ForecastCustomV2Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Decoder for ForecastCustomV2Decoder {
    fn name(&self) -> &'static str {
        "ForecastCustomV2Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Forecast>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let forecast = self.decode_value(&value, context)?;
        Ok(Box::new(forecast))
    }
}

// ---------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------

/// Encoder for V1 forecast collections.
///
/// Delegates each element to the injected [`ForecastCustomV1Encoder`]
/// through a derived per-element context, preserving input order.
pub struct ForecastCollectionCustomV1Encoder {
    supported: Vec<MediaType>,
    item: Arc<ForecastCustomV1Encoder>,
}

impl ForecastCollectionCustomV1Encoder {
    /// Create the encoder around its element codec.
    pub fn new(item: Arc<ForecastCustomV1Encoder>) -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_CUSTOM_V1)],
            item,
        }
    }
}

#[async_trait]
impl Encoder for ForecastCollectionCustomV1Encoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionCustomV1Encoder"
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

        let mut items = Vec::with_capacity(forecasts.len());
        for forecast in forecasts {
            let item_context = context.for_object(forecast, TypeTag::of::<Forecast>());
            items.push(self.item.encode_value(&item_context)?);
        }

        json::write_value(context, &Value::Array(items)).await
    }
}

/// Decoder for V1 forecast collections.
pub struct ForecastCollectionCustomV1Decoder {
    supported: Vec<MediaType>,
    item: Arc<ForecastCustomV1Decoder>,
}

impl ForecastCollectionCustomV1Decoder {
    /// Create the decoder around its element codec.
    pub fn new(item: Arc<ForecastCustomV1Decoder>) -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_CUSTOM_V1)],
            item,
        }
    }
}

#[async_trait]
impl Decoder for ForecastCollectionCustomV1Decoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionCustomV1Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Vec<Forecast>>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let elements = value.as_array().ok_or_else(|| {
            TranscodeError::malformed(self.name(), &context.media_type, "expected a JSON array")
        })?;

        let mut forecasts = Vec::with_capacity(elements.len());
        for element in elements {
            let item_context = context.for_model(TypeTag::of::<Forecast>());
            forecasts.push(self.item.decode_value(element, &item_context)?);
        }
        Ok(Box::new(forecasts))
    }
}

/// Encoder for V2 forecast collections.
pub struct ForecastCollectionCustomV2Encoder {
    supported: Vec<MediaType>,
    item: Arc<ForecastCustomV2Encoder>,
}

impl ForecastCollectionCustomV2Encoder {
    /// Create the encoder around its element codec.
    pub fn new(item: Arc<ForecastCustomV2Encoder>) -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_CUSTOM_V2)],
            item,
        }
    }
}

#[async_trait]
impl Encoder for ForecastCollectionCustomV2Encoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionCustomV2Encoder"
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

        let mut items = Vec::with_capacity(forecasts.len());
        for forecast in forecasts {
            let item_context = context.for_object(forecast, TypeTag::of::<Forecast>());
            items.push(self.item.encode_value(&item_context)?);
        }

        json::write_value(context, &Value::Array(items)).await
    }
}

/// Decoder for V2 forecast collections.
pub struct ForecastCollectionCustomV2Decoder {
    supported: Vec<MediaType>,
    item: Arc<ForecastCustomV2Decoder>,
}

impl ForecastCollectionCustomV2Decoder {
    /// Create the decoder around its element codec.
    pub fn new(item: Arc<ForecastCustomV2Decoder>) -> Self {
        Self {
            supported: vec![MediaType::from_static(FORECAST_COLLECTION_CUSTOM_V2)],
            item,
        }
    }
}

#[async_trait]
impl Decoder for ForecastCollectionCustomV2Decoder {
    fn name(&self) -> &'static str {
        "ForecastCollectionCustomV2Decoder"
    }

    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn accepts(&self, model_type: TypeTag) -> bool {
        model_type.is::<Vec<Forecast>>()
    }

    async fn read(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        let value = json::read_value(self.name(), context).await?;
        let elements = value.as_array().ok_or_else(|| {
            TranscodeError::malformed(self.name(), &context.media_type, "expected a JSON array")
        })?;

        let mut forecasts = Vec::with_capacity(elements.len());
        for element in elements {
            let item_context = context.for_model(TypeTag::of::<Forecast>());
            forecasts.push(self.item.decode_value(element, &item_context)?);
        }
        Ok(Box::new(forecasts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecast() -> Forecast {
        Forecast {
            date: "2021-07-04T12:30:00.123Z".parse().unwrap(),
            temperature_c: 20,
            summary: Some("Sunny".to_string()),
        }
    }

    #[test]
    fn test_parse_date_accepts_varying_precision() {
        for text in [
            "2021-07-04T12:30:00.123Z",
            "2021-07-04T12:30:00.12Z",
            "2021-07-04T12:30:00.1Z",
            "2021-07-04T12:30:00Z",
        ] {
            assert!(parse_date(text).is_ok(), "should parse '{text}'");
        }
        assert!(parse_date("04/07/2021 12:30").is_err());
    }

    #[test]
    fn test_v1_encode_shape() {
        let encoder = ForecastCustomV1Encoder::new();
        let forecast = forecast();
        let mut output = Vec::new();
        let context = EncodeContext::new(&forecast, &mut output);
        let value = encoder.encode_value(&context).unwrap();

        assert_eq!(
            value,
            json!({
                "date": "2021-07-04T12:30:00.123Z",
                "temperature": { "celsius": 20, "fahrenheit": 67 },
                "summary": "Sunny",
            })
        );
    }

    #[test]
    fn test_v1_encode_omits_missing_summary() {
        let encoder = ForecastCustomV1Encoder::new();
        let forecast = Forecast {
            summary: None,
            ..forecast()
        };
        let mut output = Vec::new();
        let context = EncodeContext::new(&forecast, &mut output);
        let value = encoder.encode_value(&context).unwrap();
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_v2_encode_shape() {
        let encoder = ForecastCustomV2Encoder::new();
        let forecast = forecast();
        let mut output = Vec::new();
        let context = EncodeContext::new(&forecast, &mut output);
        let value = encoder.encode_value(&context).unwrap();

        assert_eq!(
            value,
            json!({
                "date": "2021-07-04T12:30:00.123Z",
                "temp": { "c": 20, "f": 67 },
                "summary": "Sunny",
            })
        );
    }

    #[test]
    fn test_v1_decode_requires_date() {
        let decoder = ForecastCustomV1Decoder::new();
        let mut input: &[u8] = b"{}";
        let context = DecodeContext::new(MediaType::from_static(FORECAST_CUSTOM_V1), &mut input);

        let err = decoder
            .decode_value(&json!({"temperature": {"celsius": 5}}), &context)
            .unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::MalformedRepresentation { .. }
        ));
    }

    #[test]
    fn test_v1_decode_defaults_missing_temperature_node() {
        let decoder = ForecastCustomV1Decoder::new();
        let mut input: &[u8] = b"{}";
        let context = DecodeContext::new(MediaType::from_static(FORECAST_CUSTOM_V1), &mut input);

        let forecast = decoder
            .decode_value(&json!({"date": "2021-07-04T12:30:00.000Z"}), &context)
            .unwrap();
        assert_eq!(forecast.temperature_c, 0);
        assert_eq!(forecast.summary, None);
    }

    #[test]
    fn test_v1_decode_rejects_bad_temperature_node() {
        let decoder = ForecastCustomV1Decoder::new();
        let mut input: &[u8] = b"{}";
        let context = DecodeContext::new(MediaType::from_static(FORECAST_CUSTOM_V1), &mut input);

        let err = decoder
            .decode_value(
                &json!({"date": "2021-07-04T12:30:00.000Z", "temperature": {}}),
                &context,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::MalformedRepresentation { .. }
        ));
    }

    #[test]
    fn test_v1_value_round_trip_truncates_to_milliseconds() {
        let encoder = ForecastCustomV1Encoder::new();
        let decoder = ForecastCustomV1Decoder::new();

        let original = Forecast {
            date: "2021-07-04T12:30:00.123456789Z".parse().unwrap(),
            temperature_c: -3,
            summary: Some("Icy".to_string()),
        };

        let mut output = Vec::new();
        let encode_context = EncodeContext::new(&original, &mut output);
        let value = encoder.encode_value(&encode_context).unwrap();

        let mut input: &[u8] = b"";
        let decode_context =
            DecodeContext::new(MediaType::from_static(FORECAST_CUSTOM_V1), &mut input);
        let decoded = decoder.decode_value(&value, &decode_context).unwrap();

        assert_eq!(decoded.temperature_c, original.temperature_c);
        assert_eq!(decoded.summary, original.summary);
        let drift = (original.date - decoded.date).num_milliseconds().abs();
        assert!(drift <= 1, "date drift {drift} ms exceeds the 1 ms bound");
    }

    #[tokio::test]
    async fn test_collection_write_preserves_order() {
        let item = Arc::new(ForecastCustomV1Encoder::new());
        let encoder = ForecastCollectionCustomV1Encoder::new(item);

        let forecasts = vec![
            Forecast {
                date: "2021-07-04T00:00:00Z".parse().unwrap(),
                temperature_c: 1,
                summary: None,
            },
            Forecast {
                date: "2021-07-05T00:00:00Z".parse().unwrap(),
                temperature_c: 2,
                summary: None,
            },
            Forecast {
                date: "2021-07-06T00:00:00Z".parse().unwrap(),
                temperature_c: 3,
                summary: None,
            },
        ];

        let mut output = Vec::new();
        let mut context = EncodeContext::new(&forecasts, &mut output).with_compact_json();
        encoder.write(&mut context).await.unwrap();

        let value: Value = serde_json::from_slice(&output).unwrap();
        let celsius: Vec<i64> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["temperature"]["celsius"].as_i64().unwrap())
            .collect();
        assert_eq!(celsius, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_collection_read_rejects_non_array() {
        let item = Arc::new(ForecastCustomV1Decoder::new());
        let decoder = ForecastCollectionCustomV1Decoder::new(item);

        let mut input: &[u8] = br#"{"date": "2021-07-04T12:30:00Z"}"#;
        let mut context = DecodeContext::new(
            MediaType::from_static(FORECAST_COLLECTION_CUSTOM_V1),
            &mut input,
        );
        let err = decoder.read(&mut context).await.unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::MalformedRepresentation { .. }
        ));
    }
}

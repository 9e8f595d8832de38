//! Sample weather-forecast resource and its codec family.
//!
//! One resource, many representations - the canonical content
//! negotiation demonstration. All media types share
//! `application/json` and are versioned through `Domain`/`Version`
//! parameters:
//!
//! | Media type | Codec | Shape |
//! |------------|-------|-------|
//! | `...; Domain=Example.Forecast.Custom; Version=1` | [`custom`] | nested `temperature` node |
//! | `...; Domain=Example.Forecast.Custom; Version=2` | [`custom`] | abbreviated `temp` node |
//! | `...; Domain=Example.ForecastCollection.Custom; Version=1\|2` | [`custom`] | array of the above |
//! | `...; Domain=Example.Forecast.Serialized; Version=1` | [`serialized`] | serde-derived |
//! | `...; Domain=Example.ForecastCollection.Serialized; Version=1` | [`serialized`] | serde-derived array |
//!
//! The custom codecs format timestamps to millisecond precision, so a
//! round trip may lose sub-millisecond detail (bounded at 1 ms); the
//! serialized codecs round-trip exactly.

pub mod custom;
pub mod serialized;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::Transcoder;

/// A weather forecast for a single point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Forecast timestamp (UTC).
    pub date: DateTime<Utc>,
    /// Temperature in degrees Celsius.
    pub temperature_c: i32,
    /// Free-form summary, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Forecast {
    /// Temperature in degrees Fahrenheit, derived from
    /// [`temperature_c`](Self::temperature_c).
    pub fn temperature_f(&self) -> i32 {
        32 + (f64::from(self.temperature_c) / 0.5556) as i32
    }
}

/// Assemble a transcoder holding the full forecast codec set.
///
/// Collection codecs share their element codec with the registry: the
/// same `Arc` is registered and composed, so element-level work runs
/// through the exact codec instance a caller would reach directly.
pub fn transcoder() -> Transcoder {
    let custom_v1_encoder = Arc::new(custom::ForecastCustomV1Encoder::new());
    let custom_v1_decoder = Arc::new(custom::ForecastCustomV1Decoder::new());
    let custom_v2_encoder = Arc::new(custom::ForecastCustomV2Encoder::new());
    let custom_v2_decoder = Arc::new(custom::ForecastCustomV2Decoder::new());

    Transcoder::builder()
        // V1 custom codecs
        .with_shared_encoder(custom_v1_encoder.clone())
        .with_encoder(custom::ForecastCollectionCustomV1Encoder::new(
            custom_v1_encoder,
        ))
        .with_shared_decoder(custom_v1_decoder.clone())
        .with_decoder(custom::ForecastCollectionCustomV1Decoder::new(
            custom_v1_decoder,
        ))
        // V2 custom codecs
        .with_shared_encoder(custom_v2_encoder.clone())
        .with_encoder(custom::ForecastCollectionCustomV2Encoder::new(
            custom_v2_encoder,
        ))
        .with_shared_decoder(custom_v2_decoder.clone())
        .with_decoder(custom::ForecastCollectionCustomV2Decoder::new(
            custom_v2_decoder,
        ))
        // Serialization-based codecs
        .with_encoder(serialized::ForecastSerializedV1Encoder::new())
        .with_decoder(serialized::ForecastSerializedV1Decoder::new())
        .with_encoder(serialized::ForecastCollectionSerializedV1Encoder::new())
        .with_decoder(serialized::ForecastCollectionSerializedV1Decoder::new())
        .build()
}

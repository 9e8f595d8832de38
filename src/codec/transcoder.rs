//! Codec registry and first-match dispatch.

use std::any::Any;
use std::sync::Arc;

use crate::codec::{DecodeContext, Decoder, EncodeContext, Encoder};
use crate::error::{Result, TranscodeError};
use crate::media_type::MediaType;

/// An immutable, ordered collection of encoders and decoders.
///
/// Assembled once through [`TranscoderBuilder`] and frozen: after
/// `build()` the codec lists cannot change, so one instance can be
/// shared process-wide (e.g. in an `Arc`) and read concurrently without
/// locking.
///
/// Dispatch is a first-match-wins linear scan in registration order -
/// O(codecs) per request, which is fine at realistic codec counts (tens,
/// not thousands); the matching predicate dominates the cost. Order is
/// the tie-break when several codecs could serve the same request.
#[derive(Default)]
pub struct Transcoder {
    encoders: Vec<Arc<dyn Encoder>>,
    decoders: Vec<Arc<dyn Decoder>>,
}

impl Transcoder {
    /// Start assembling a codec set.
    pub fn builder() -> TranscoderBuilder {
        TranscoderBuilder::default()
    }

    /// Whether any registered decoder can serve the context.
    pub fn can_decode(&self, context: &DecodeContext<'_, '_>) -> Result<bool> {
        for decoder in &self.decoders {
            if decoder.can_read(context)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether any registered encoder can serve the context.
    ///
    /// Like [`Encoder::can_write`], a positive probe records the chosen
    /// representation in `context.actual_media_type`.
    pub fn can_encode(&self, context: &mut EncodeContext<'_, '_>) -> Result<bool> {
        for encoder in &self.encoders {
            if encoder.can_write(context)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The first registered decoder that can serve the context, if any.
    pub fn decoder_for(&self, context: &DecodeContext<'_, '_>) -> Result<Option<&Arc<dyn Decoder>>> {
        for decoder in &self.decoders {
            if decoder.can_read(context)? {
                return Ok(Some(decoder));
            }
        }
        Ok(None)
    }

    /// The first registered encoder that can serve the context, if any.
    ///
    /// A positive result has already recorded the chosen representation
    /// in `context.actual_media_type`.
    pub fn encoder_for(
        &self,
        context: &mut EncodeContext<'_, '_>,
    ) -> Result<Option<&Arc<dyn Encoder>>> {
        for encoder in &self.encoders {
            if encoder.can_write(context)? {
                return Ok(Some(encoder));
            }
        }
        Ok(None)
    }

    /// Decode the context's input stream with the first capable decoder.
    ///
    /// Fails with [`NoDecoderFound`](TranscodeError::NoDecoderFound) -
    /// naming the declared media type - when no decoder matches. No
    /// retries, no fallback: one decoder gets one attempt.
    pub async fn decode(&self, context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
        for decoder in &self.decoders {
            if decoder.can_read(context)? {
                tracing::debug!(
                    decoder = decoder.name(),
                    media_type = %context.media_type,
                    "selected decoder"
                );
                return decoder.read(context).await;
            }
        }

        tracing::warn!(media_type = %context.media_type, "no decoder matched");
        Err(TranscodeError::NoDecoderFound {
            media_type: context.media_type.to_string(),
        })
    }

    /// Decode and downcast to `T`.
    ///
    /// A downcast failure after a successful decode means the registered
    /// decoder produced a different type than the caller wired it for -
    /// a configuration error, not a data error.
    pub async fn decode_as<T: Any>(&self, context: &mut DecodeContext<'_, '_>) -> Result<T> {
        let media_type = context.media_type.clone();
        let value = self.decode(context).await?;
        value.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
            TranscodeError::Configuration(format!(
                "decoded value for '{media_type}' is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Encode the context's object with the first capable encoder and
    /// return the representation it chose.
    ///
    /// The encoded bytes go to the context's output stream. Fails with
    /// [`NoEncoderFound`](TranscodeError::NoEncoderFound) - naming the
    /// desired media type and the object type - when no encoder matches.
    pub async fn encode(&self, context: &mut EncodeContext<'_, '_>) -> Result<MediaType> {
        for encoder in &self.encoders {
            if encoder.can_write(context)? {
                tracing::debug!(
                    encoder = encoder.name(),
                    media_type = %context.desired_description(),
                    "selected encoder"
                );
                encoder.write(context).await?;
                return context.actual_media_type.clone().ok_or_else(|| {
                    TranscodeError::Configuration(format!(
                        "Encoder '{}' reported it can write but did not set an actual media type",
                        encoder.name()
                    ))
                });
            }
        }

        tracing::warn!(
            media_type = %context.desired_description(),
            object_type = %context.object_type_description(),
            "no encoder matched"
        );
        Err(TranscodeError::NoEncoderFound {
            media_type: context.desired_description(),
            object_type: context.object_type_description(),
        })
    }

    /// Every media type a registered decoder declares, in registration
    /// order, duplicates removed. Transport adapters use this to build
    /// 415 payloads and `Accept` hints.
    pub fn supported_decode_media_types(&self) -> Vec<MediaType> {
        let mut media_types: Vec<MediaType> = Vec::new();
        for decoder in &self.decoders {
            for media_type in decoder.supported_media_types() {
                if !media_types.contains(media_type) {
                    media_types.push(media_type.clone());
                }
            }
        }
        media_types
    }

    /// Every media type a registered encoder declares, in registration
    /// order, duplicates removed.
    pub fn supported_encode_media_types(&self) -> Vec<MediaType> {
        let mut media_types: Vec<MediaType> = Vec::new();
        for encoder in &self.encoders {
            for media_type in encoder.supported_media_types() {
                if !media_types.contains(media_type) {
                    media_types.push(media_type.clone());
                }
            }
        }
        media_types
    }
}

/// Builder for a [`Transcoder`].
///
/// Registration order is dispatch order. Mutation only exists here;
/// `build()` freezes the set.
#[derive(Default)]
pub struct TranscoderBuilder {
    encoders: Vec<Arc<dyn Encoder>>,
    decoders: Vec<Arc<dyn Decoder>>,
}

impl TranscoderBuilder {
    /// Register an encoder.
    pub fn with_encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoders.push(Arc::new(encoder));
        self
    }

    /// Register an already-shared encoder.
    ///
    /// Use this when the same instance is also composed into a
    /// collection codec, so element-level encoding runs through the
    /// exact codec that is registered.
    pub fn with_shared_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoders.push(encoder);
        self
    }

    /// Register a decoder.
    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    /// Register an already-shared decoder.
    pub fn with_shared_decoder(mut self, decoder: Arc<dyn Decoder>) -> Self {
        self.decoders.push(decoder);
        self
    }

    /// Freeze the codec set.
    pub fn build(self) -> Transcoder {
        Transcoder {
            encoders: self.encoders,
            decoders: self.decoders,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::codec::json;

    /// Decoder that accepts one media type and yields a fixed marker
    /// string, so ordering tests can tell instances apart.
    struct MarkerDecoder {
        marker: &'static str,
        supported: Vec<MediaType>,
    }

    impl MarkerDecoder {
        fn new(marker: &'static str, media_type: &'static str) -> Self {
            Self {
                marker,
                supported: vec![MediaType::from_static(media_type)],
            }
        }
    }

    #[async_trait]
    impl Decoder for MarkerDecoder {
        fn name(&self) -> &'static str {
            "MarkerDecoder"
        }

        fn supported_media_types(&self) -> &[MediaType] {
            &self.supported
        }

        async fn read(&self, _context: &mut DecodeContext<'_, '_>) -> Result<Box<dyn Any + Send + Sync>> {
            Ok(Box::new(self.marker.to_string()))
        }
    }

    struct MarkerEncoder {
        marker: &'static str,
        supported: Vec<MediaType>,
    }

    impl MarkerEncoder {
        fn new(marker: &'static str, media_type: &'static str) -> Self {
            Self {
                marker,
                supported: vec![MediaType::from_static(media_type)],
            }
        }
    }

    #[async_trait]
    impl Encoder for MarkerEncoder {
        fn name(&self) -> &'static str {
            "MarkerEncoder"
        }

        fn supported_media_types(&self) -> &[MediaType] {
            &self.supported
        }

        async fn write(&self, context: &mut EncodeContext<'_, '_>) -> Result<()> {
            json::write_value(context, &serde_json::json!(self.marker)).await
        }
    }

    #[tokio::test]
    async fn test_first_registered_decoder_wins() {
        // Both decoders accept the same media type; the first one
        // registered must be the one that runs.
        let transcoder = Transcoder::builder()
            .with_decoder(MarkerDecoder::new("first", "application/json; Version=1"))
            .with_decoder(MarkerDecoder::new("second", "application/json; Version=1"))
            .build();

        let mut input: &[u8] = b"{}";
        let mut context = DecodeContext::new(
            MediaType::from_static("application/json; Version=1"),
            &mut input,
        );
        let value = transcoder.decode_as::<String>(&mut context).await.unwrap();
        assert_eq!(value, "first");
    }

    #[tokio::test]
    async fn test_no_decoder_found_names_media_type() {
        let transcoder = Transcoder::builder()
            .with_decoder(MarkerDecoder::new("only", "application/json; Version=1"))
            .build();

        let mut input: &[u8] = b"{}";
        let mut context = DecodeContext::new(
            MediaType::from_static("application/json; Version=2"),
            &mut input,
        );
        let err = transcoder.decode(&mut context).await.unwrap_err();
        match err {
            TranscodeError::NoDecoderFound { media_type } => {
                assert_eq!(media_type, "application/json; Version=2");
            }
            other => panic!("expected NoDecoderFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_encode_returns_actual_media_type() {
        let transcoder = Transcoder::builder()
            .with_encoder(MarkerEncoder::new("enc", "application/json; Version=1"))
            .build();

        let object = String::from("payload");
        let mut output = Vec::new();
        let mut context = EncodeContext::new(&object, &mut output)
            .with_desired_media_type(MediaType::from_static(
                "application/json; Version=1; q=0.8",
            ));
        let actual = transcoder.encode(&mut context).await.unwrap();
        assert_eq!(actual, MediaType::from_static("application/json; Version=1"));
        assert!(!output.is_empty());
    }

    #[tokio::test]
    async fn test_no_encoder_found_names_media_type_and_object_type() {
        let transcoder = Transcoder::builder()
            .with_encoder(MarkerEncoder::new("enc", "application/json; Version=1"))
            .build();

        let object = String::from("payload");
        let mut output = Vec::new();
        let mut context = EncodeContext::new(&object, &mut output)
            .with_desired_media_type(MediaType::from_static("application/xml"));
        let err = transcoder.encode(&mut context).await.unwrap_err();
        match err {
            TranscodeError::NoEncoderFound {
                media_type,
                object_type,
            } => {
                assert_eq!(media_type, "application/xml");
                assert!(object_type.contains("String"));
            }
            other => panic!("expected NoEncoderFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_configuration_error_propagates_through_dispatch() {
        struct EmptyDecoder;

        #[async_trait]
        impl Decoder for EmptyDecoder {
            fn name(&self) -> &'static str {
                "EmptyDecoder"
            }

            fn supported_media_types(&self) -> &[MediaType] {
                &[]
            }

            async fn read(
                &self,
                _context: &mut DecodeContext<'_, '_>,
            ) -> Result<Box<dyn Any + Send + Sync>> {
                unreachable!("can_read fails fast before read is reached")
            }
        }

        let transcoder = Transcoder::builder().with_decoder(EmptyDecoder).build();
        let mut input: &[u8] = b"{}";
        let mut context =
            DecodeContext::new(MediaType::from_static("application/json"), &mut input);
        assert!(matches!(
            transcoder.decode(&mut context).await,
            Err(TranscodeError::Configuration(_))
        ));
    }

    #[test]
    fn test_supported_media_types_aggregation() {
        let transcoder = Transcoder::builder()
            .with_decoder(MarkerDecoder::new("a", "application/json; Version=1"))
            .with_decoder(MarkerDecoder::new("b", "application/json; Version=2"))
            .with_decoder(MarkerDecoder::new("c", "application/json; Version=1"))
            .build();

        let media_types = transcoder.supported_decode_media_types();
        assert_eq!(
            media_types,
            vec![
                MediaType::from_static("application/json; Version=1"),
                MediaType::from_static("application/json; Version=2"),
            ]
        );
    }
}

//! Shared JSON stream plumbing for codecs.
//!
//! Every JSON codec splits its work in two: a pure value step (build or
//! interpret a [`serde_json::Value`]) and this module's stream step
//! (bytes ↔ text ↔ value). Keeping the stream step in one place means
//! every codec gets identical behavior for text encoding, indentation,
//! and error wrapping:
//!
//! - output is indented by default (`context.pretty`), never carries a
//!   byte-order mark;
//! - input tolerates a leading byte-order mark and is decoded per the
//!   context's text encoding;
//! - parse failures behind a passing `can_read` gate surface as
//!   [`MalformedRepresentation`](crate::TranscodeError::MalformedRepresentation)
//!   wrapped with the decoder name and the declared media type.

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::codec::{DecodeContext, EncodeContext};
use crate::error::{Result, TranscodeError};

/// Render `value` to the context's output stream using its text
/// encoding and JSON style.
pub async fn write_value(context: &mut EncodeContext<'_, '_>, value: &Value) -> Result<()> {
    let text = if context.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let bytes = context.encoding.encode(&text);

    let output = context.output()?;
    output.write_all(&bytes).await?;
    output.flush().await?;
    Ok(())
}

/// Read the context's whole input stream and parse it as JSON.
///
/// `decoder` names the caller for error wrapping.
pub async fn read_value(decoder: &'static str, context: &mut DecodeContext<'_, '_>) -> Result<Value> {
    let mut bytes = Vec::new();
    context.input()?.read_to_end(&mut bytes).await?;

    let media_type = context.media_type.clone();
    let text = context
        .encoding
        .decode(&bytes)
        .map_err(|e| TranscodeError::malformed(decoder, &media_type, e))?;

    serde_json::from_str(&text).map_err(|e| TranscodeError::malformed(decoder, &media_type, e))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::TextEncoding;
    use crate::media_type::MediaType;

    #[tokio::test]
    async fn test_write_value_pretty_without_bom() {
        let object = ();
        let mut output = Vec::new();
        let mut context = EncodeContext::new(&object, &mut output);
        write_value(&mut context, &json!({"a": 1})).await.unwrap();

        assert_ne!(&output[..3], [0xEF, 0xBB, 0xBF]);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains('\n'), "pretty output is indented: {text}");
    }

    #[tokio::test]
    async fn test_write_value_compact() {
        let object = ();
        let mut output = Vec::new();
        let mut context = EncodeContext::new(&object, &mut output).with_compact_json();
        write_value(&mut context, &json!({"a": 1})).await.unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_read_value_tolerates_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"{"a": 1}"#);
        let mut input: &[u8] = &bytes;
        let mut context =
            DecodeContext::new(MediaType::from_static("application/json"), &mut input);
        let value = read_value("test", &mut context).await.unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_read_value_wraps_parse_failures() {
        let mut input: &[u8] = b"{not json";
        let mut context = DecodeContext::new(
            MediaType::from_static("application/json; Version=1"),
            &mut input,
        );
        let err = read_value("TestDecoder", &mut context).await.unwrap_err();
        match err {
            TranscodeError::MalformedRepresentation {
                decoder,
                media_type,
                ..
            } => {
                assert_eq!(decoder, "TestDecoder");
                assert_eq!(media_type, "application/json; Version=1");
            }
            other => panic!("expected MalformedRepresentation, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_utf16_round_trip() {
        let object = ();
        let mut output = Vec::new();
        let mut context = EncodeContext::new(&object, &mut output)
            .with_encoding(TextEncoding::Utf16Le)
            .with_compact_json();
        write_value(&mut context, &json!({"w": "❄"})).await.unwrap();

        let mut input: &[u8] = &output;
        let mut context =
            DecodeContext::new(MediaType::from_static("application/json"), &mut input)
                .with_encoding(TextEncoding::Utf16Le);
        let value = read_value("test", &mut context).await.unwrap();
        assert_eq!(value, json!({"w": "❄"}));
    }
}

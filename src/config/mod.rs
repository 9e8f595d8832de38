//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`TRANSCODE_*`)
//!
//! Configuration only seeds per-operation contexts
//! ([`EncodeContext::with_config`](crate::EncodeContext::with_config),
//! [`DecodeContext::with_config`](crate::DecodeContext::with_config));
//! the codec set itself is assembled in code through
//! [`TranscoderBuilder`](crate::TranscoderBuilder).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::TextEncoding;
use crate::error::{Result, TranscodeError};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// JSON output configuration
    #[serde(default)]
    pub json: JsonConfig,

    /// Text encoding configuration
    #[serde(default)]
    pub encoding: EncodingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| TranscodeError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| TranscodeError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(pretty) = std::env::var("TRANSCODE_JSON_PRETTY") {
            if let Ok(pretty) = pretty.parse() {
                config.json.pretty = pretty;
            }
        }
        if let Ok(encoding) = std::env::var("TRANSCODE_TEXT_ENCODING") {
            match encoding.to_lowercase().as_str() {
                "utf8" | "utf-8" => config.encoding.text = TextEncoding::Utf8,
                "utf16le" | "utf-16le" => config.encoding.text = TextEncoding::Utf16Le,
                _ => {}
            }
        }

        config
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        Self {
            json: JsonConfig {
                pretty: if other.json.pretty != JsonConfig::default().pretty {
                    other.json.pretty
                } else {
                    self.json.pretty
                },
            },
            encoding: EncodingConfig {
                text: if other.encoding.text != EncodingConfig::default().text {
                    other.encoding.text
                } else {
                    self.encoding.text
                },
            },
        }
    }
}

/// JSON output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonConfig {
    /// Emit indented JSON (default: true)
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

/// Text encoding configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Text encoding for streams (default: UTF-8, no byte-order mark)
    #[serde(default)]
    pub text: TextEncoding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.json.pretty);
        assert_eq!(config.encoding.text, TextEncoding::Utf8);
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [json]
            pretty = false

            [encoding]
            text = "utf16-le"
            "#,
        )
        .unwrap();
        assert!(!config.json.pretty);
        assert_eq!(config.encoding.text, TextEncoding::Utf16Le);
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[json]\npretty = false\n").unwrap();
        assert!(!config.json.pretty);
        assert_eq!(config.encoding.text, TextEncoding::Utf8);
    }

    #[test]
    fn test_merge_prefers_other_when_changed() {
        let base = Config::default();
        let other = Config {
            json: JsonConfig { pretty: false },
            encoding: EncodingConfig::default(),
        };
        let merged = base.merge(other);
        assert!(!merged.json.pretty);
        assert_eq!(merged.encoding.text, TextEncoding::Utf8);
    }

    #[test]
    fn test_merge_keeps_base_when_other_is_default() {
        let base = Config {
            json: JsonConfig { pretty: false },
            encoding: EncodingConfig {
                text: TextEncoding::Utf16Le,
            },
        };
        let merged = base.merge(Config::default());
        assert!(!merged.json.pretty);
        assert_eq!(merged.encoding.text, TextEncoding::Utf16Le);
    }
}

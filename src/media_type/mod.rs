//! Parsed media-type representation.
//!
//! A [`MediaType`] is the immutable, parsed form of a
//! `type/subtype[+suffix]; name=value; ...` expression:
//!
//! | Input | type | subtype | suffix | parameters |
//! |-------|------|---------|--------|------------|
//! | `application/json` | `application` | `json` | - | - |
//! | `application/vnd.example+json` | `application` | `vnd.example+json` | `json` | - |
//! | `application/*+json` | `application` | `*+json` | `json` | - |
//! | `application/json; Domain=Weather; Version=1` | `application` | `json` | - | `Domain=Weather`, `Version=1` |
//!
//! Original case is preserved for round-trip fidelity; all comparisons
//! performed by the [`matching`] predicates are ASCII case-insensitive on
//! names and case-sensitive on parameter values.
//!
//! Parsing is strict: a trailing `;`, a missing `/`, or a parameter
//! without a value is a [`MediaTypeParseError`], surfaced to the caller
//! immediately - a malformed header never reaches the matcher as a
//! silent "no match".

pub mod matching;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised while parsing a media-type string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeParseError {
    /// No `/` between type and subtype.
    #[error("media type '{0}' is missing a '/' between type and subtype")]
    MissingSlash(String),

    /// Empty or non-token type/subtype.
    #[error("media type '{0}' has an invalid type or subtype")]
    InvalidTypeOrSubtype(String),

    /// The parameter list ends in a separator (e.g. `a/b; p=1;`).
    #[error("media type '{0}' has a trailing parameter separator")]
    TrailingSeparator(String),

    /// A parameter is not a `name=value` pair.
    #[error("media type '{input}' has a malformed parameter '{parameter}'")]
    MalformedParameter {
        /// The full input string.
        input: String,
        /// The offending parameter segment.
        parameter: String,
    },
}

/// A single `name=value` media-type parameter.
///
/// Names compare case-insensitively, values case-sensitively; both are
/// stored with their original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    /// The parameter name, original case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter value, original case, quotes stripped.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// An immutable parsed media type.
///
/// Construct with [`MediaType::parse`] (or [`FromStr`]) for runtime
/// input, or [`MediaType::from_static`] for crate-owned literals.
/// Structural equality (`==`) is verbatim - case and parameter order
/// included; use [`matching::is_match`] / [`matching::is_subset_of`] for
/// the negotiation relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    type_: String,
    subtype: String,
    parameters: Vec<Parameter>,
}

/// Characters that end a token; anything containing these in type or
/// subtype position fails the parse.
const NON_TOKEN: &[char] = &[' ', '\t', '/', ';', ',', '=', '"'];

impl MediaType {
    /// Parse a `type/subtype[+suffix]; name=value; ...` string.
    pub fn parse(input: &str) -> Result<Self, MediaTypeParseError> {
        let mut segments = input.split(';');

        // split() always yields at least one segment
        let essence = segments.next().unwrap_or("").trim();
        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MediaTypeParseError::MissingSlash(input.to_string()))?;
        let type_ = type_.trim();
        let subtype = subtype.trim();
        if type_.is_empty()
            || subtype.is_empty()
            || type_.contains(NON_TOKEN)
            || subtype.contains(NON_TOKEN)
        {
            return Err(MediaTypeParseError::InvalidTypeOrSubtype(input.to_string()));
        }

        let rest: Vec<&str> = segments.collect();
        let mut parameters = Vec::with_capacity(rest.len());
        for (index, raw) in rest.iter().enumerate() {
            let segment = raw.trim();
            if segment.is_empty() {
                if index == rest.len() - 1 {
                    return Err(MediaTypeParseError::TrailingSeparator(input.to_string()));
                }
                return Err(MediaTypeParseError::MalformedParameter {
                    input: input.to_string(),
                    parameter: String::new(),
                });
            }

            let (name, value) =
                segment
                    .split_once('=')
                    .ok_or_else(|| MediaTypeParseError::MalformedParameter {
                        input: input.to_string(),
                        parameter: segment.to_string(),
                    })?;
            let name = name.trim();
            let mut value = value.trim();
            if name.is_empty() || value.is_empty() || name.contains(NON_TOKEN) {
                return Err(MediaTypeParseError::MalformedParameter {
                    input: input.to_string(),
                    parameter: segment.to_string(),
                });
            }

            // Strip surrounding double quotes; values are stored and
            // compared unquoted.
            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                value = &value[1..value.len() - 1];
            }

            parameters.push(Parameter {
                name: name.to_string(),
                value: value.to_string(),
            });
        }

        Ok(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            parameters,
        })
    }

    /// Parse a media-type literal owned by the caller.
    ///
    /// # Panics
    ///
    /// Panics if the literal is not a valid media type. Intended for
    /// codec registration constants, where an invalid literal is a
    /// programming error - use [`MediaType::parse`] for runtime input.
    #[track_caller]
    pub fn from_static(literal: &'static str) -> Self {
        match Self::parse(literal) {
            Ok(media_type) => media_type,
            Err(err) => panic!("invalid media type literal '{literal}': {err}"),
        }
    }

    /// The top-level type (e.g. `application`), original case.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The full subtype including any suffix (e.g. `vnd.example+json`),
    /// original case.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The structured-syntax suffix: the part of the subtype after the
    /// last `+` (e.g. `json` in `vnd.example+json`), if any.
    pub fn suffix(&self) -> Option<&str> {
        self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// The subtype with any suffix removed (`vnd.example` in
    /// `vnd.example+json`; the whole subtype when there is no suffix).
    pub fn subtype_without_suffix(&self) -> &str {
        self.subtype
            .rsplit_once('+')
            .map_or(self.subtype.as_str(), |(without, _)| without)
    }

    /// The parameters in insertion order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a parameter value by case-insensitive name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|parameter| parameter.is_named(name))
            .map(Parameter::value)
    }

    /// Whether this media type matches all types (`*/...`).
    pub fn matches_all_types(&self) -> bool {
        self.type_ == "*"
    }

    /// Whether this media type matches all subtypes (`.../*`).
    ///
    /// This is the whole-subtype wildcard; `*+json` does not qualify.
    pub fn matches_all_subtypes(&self) -> bool {
        self.subtype == "*"
    }

    /// Whether this media type matches all subtypes ignoring any
    /// structured-syntax suffix (`*+json` qualifies, `vnd.example+json`
    /// does not).
    pub fn matches_all_subtypes_without_suffix(&self) -> bool {
        self.subtype_without_suffix() == "*"
    }

    /// Whether this media type contains a wildcard in type, subtype, or a
    /// parameter literally named `*`.
    pub fn has_wildcard(&self) -> bool {
        matching::has_wildcard(self)
    }

    /// Whether every concrete aspect of `self` is covered by `set`.
    ///
    /// See [`matching::is_subset_of`].
    pub fn is_subset_of(&self, set: &MediaType) -> bool {
        matching::is_subset_of(self, set)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for parameter in &self.parameters {
            write!(f, "; {}={}", parameter.name, parameter.value)?;
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MediaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MediaType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_essence() {
        let mt = MediaType::parse("application/json").unwrap();
        assert_eq!(mt.type_(), "application");
        assert_eq!(mt.subtype(), "json");
        assert_eq!(mt.suffix(), None);
        assert_eq!(mt.subtype_without_suffix(), "json");
        assert!(mt.parameters().is_empty());
    }

    #[test]
    fn test_parse_suffix() {
        let mt = MediaType::parse("application/vnd.example+json").unwrap();
        assert_eq!(mt.subtype(), "vnd.example+json");
        assert_eq!(mt.suffix(), Some("json"));
        assert_eq!(mt.subtype_without_suffix(), "vnd.example");

        let wildcard = MediaType::parse("application/*+json").unwrap();
        assert!(wildcard.matches_all_subtypes_without_suffix());
        assert!(!wildcard.matches_all_subtypes());
    }

    #[test]
    fn test_parse_parameters_preserve_order_and_case() {
        let mt = MediaType::parse("application/json; Domain=Weather; Version=1").unwrap();
        let names: Vec<&str> = mt.parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, vec!["Domain", "Version"]);
        assert_eq!(mt.parameter("domain"), Some("Weather"));
        assert_eq!(mt.parameter("VERSION"), Some("1"));
        assert_eq!(mt.parameter("missing"), None);
    }

    #[test]
    fn test_parse_tolerates_irregular_spacing() {
        let mt = MediaType::parse("application/json;    domain=foo;version=1").unwrap();
        assert_eq!(mt.parameter("domain"), Some("foo"));
        assert_eq!(mt.parameter("version"), Some("1"));
    }

    #[test]
    fn test_parse_quoted_value() {
        let mt = MediaType::parse(r#"text/plain; title="hello world""#).unwrap();
        assert_eq!(mt.parameter("title"), Some("hello world"));
    }

    #[test]
    fn test_parse_missing_slash() {
        assert!(matches!(
            MediaType::parse("application"),
            Err(MediaTypeParseError::MissingSlash(_))
        ));
    }

    #[test]
    fn test_parse_empty_type_or_subtype() {
        assert!(matches!(
            MediaType::parse("/json"),
            Err(MediaTypeParseError::InvalidTypeOrSubtype(_))
        ));
        assert!(matches!(
            MediaType::parse("application/"),
            Err(MediaTypeParseError::InvalidTypeOrSubtype(_))
        ));
        assert!(matches!(
            MediaType::parse("application/json/extra"),
            Err(MediaTypeParseError::InvalidTypeOrSubtype(_))
        ));
    }

    #[test]
    fn test_parse_trailing_separator() {
        assert!(matches!(
            MediaType::parse("application/json; Domain=foo; Version=1;"),
            Err(MediaTypeParseError::TrailingSeparator(_))
        ));
        assert!(matches!(
            MediaType::parse("application/json;"),
            Err(MediaTypeParseError::TrailingSeparator(_))
        ));
    }

    #[test]
    fn test_parse_malformed_parameter() {
        assert!(matches!(
            MediaType::parse("application/json; domain"),
            Err(MediaTypeParseError::MalformedParameter { .. })
        ));
        assert!(matches!(
            MediaType::parse("application/json; =foo"),
            Err(MediaTypeParseError::MalformedParameter { .. })
        ));
        assert!(matches!(
            MediaType::parse("application/json; domain="),
            Err(MediaTypeParseError::MalformedParameter { .. })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let input = "application/json; Domain=Weather; Version=1";
        let mt = MediaType::parse(input).unwrap();
        assert_eq!(mt.to_string(), input);
        assert_eq!(MediaType::parse(&mt.to_string()).unwrap(), mt);
    }

    #[test]
    fn test_wildcard_flags() {
        let any = MediaType::parse("*/*").unwrap();
        assert!(any.matches_all_types());
        assert!(any.matches_all_subtypes());
        assert!(any.matches_all_subtypes_without_suffix());

        let concrete = MediaType::parse("application/json").unwrap();
        assert!(!concrete.matches_all_types());
        assert!(!concrete.matches_all_subtypes());
    }

    #[test]
    fn test_serde_string_form() {
        let mt = MediaType::parse("application/json; Domain=Weather").unwrap();
        let json = serde_json::to_string(&mt).unwrap();
        assert_eq!(json, r#""application/json; Domain=Weather""#);
        let back: MediaType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mt);

        assert!(serde_json::from_str::<MediaType>(r#""not a media type""#).is_err());
    }
}

//! Request shapes accepted by the public endpoints, and the rules that admit them.
//!
//! Parsing never looks at more than it needs: each constructor checks fields in
//! the order clients have always seen them reported and stops at the first
//! violation.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ValidationError;

/// Longest accepted class prefix, counted in UTF-16 code units.
pub const MAX_PREFIX_LEN: usize = 32;

/// CSS class prefix applied to every emitted class name or selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Prefix(String);

impl Prefix {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.encode_utf16().count() > MAX_PREFIX_LEN {
            return Err(ValidationError::PrefixTooLong);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `POST /highlight` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRequest {
    pub code: String,
    pub language: String,
    pub prefix: Prefix,
    pub verbose: bool,
}

impl HighlightRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        Self::from_json(parse_json_body(body)?)
    }

    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = into_fields(value);

        let code = take_string(&mut fields, "code")
            .ok_or_else(|| ValidationError::body_parameter("code"))?;
        let language = take_string(&mut fields, "language")
            .ok_or_else(|| ValidationError::body_parameter("language"))?;
        let prefix = Prefix::parse(take_string(&mut fields, "prefix").unwrap_or_default())?;
        let verbose = matches!(fields.get("verbose"), Some(Value::Bool(true)));

        Ok(Self {
            code,
            language,
            prefix,
            verbose,
        })
    }
}

/// `POST /css` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeRequest {
    pub theme_data: String,
    pub prefix: Prefix,
}

impl ThemeRequest {
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        Self::from_json(parse_json_body(body)?)
    }

    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = into_fields(value);

        let theme_data = take_string(&mut fields, "themeData")
            .ok_or_else(|| ValidationError::body_parameter("themeData"))?;
        let prefix = Prefix::parse(take_string(&mut fields, "prefix").unwrap_or_default())?;

        Ok(Self { theme_data, prefix })
    }
}

/// `GET /css` query: the theme is fetched from `themeUrl` after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeUrlRequest {
    pub theme_url: String,
    pub prefix: Prefix,
}

impl ThemeUrlRequest {
    /// Parse a raw query string. Repeated parameters resolve to their first occurrence.
    pub fn from_query(query: Option<&str>) -> Result<Self, ValidationError> {
        let query = query.unwrap_or_default();
        let theme_url = first_query_value(query, "themeUrl")
            .ok_or_else(|| ValidationError::query_parameter("themeUrl"))?;
        let prefix = Prefix::parse(first_query_value(query, "prefix").unwrap_or_default())?;

        Ok(Self { theme_url, prefix })
    }
}

fn parse_json_body(body: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(body).map_err(|err| ValidationError::malformed_body(err.to_string()))
}

// `null` and other non-object payloads carry no fields.
fn into_fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Some(value),
        _ => None,
    }
}

fn first_query_value(query: &str, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

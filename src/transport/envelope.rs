//! Envelope codec: `{id, timestamp, api_version, object, data}` response bodies.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::ResponseMetadata;

/// Field under which [`ResponseMetadata`] is merged into single-item payloads.
pub const METADATA_FIELD: &str = "metadata";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Kind of a JSON value, used to report shape mismatches.
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Target shape of a decoded payload.
pub enum Shape {
    Single,
    Sequence,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("an object"),
            Self::Sequence => f.write_str("an array"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON response: {0}")]
    Json(#[source] serde_json::Error),

    #[error("expected response body to be an object, got {found}")]
    NotAnEnvelope { found: JsonKind },

    #[error("response is missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("response field `{field}` must be {expected}, got {found}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
        found: JsonKind,
    },

    #[error("expected payload to be {expected}, got {found}")]
    UnexpectedShape { expected: Shape, found: JsonKind },

    #[error("item at index {index} does not match the expected type: {source}")]
    Element {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("payload does not match the expected type: {0}")]
    Convert(#[source] serde_json::Error),
}

/// Decode an enveloped single-object response into `T`.
///
/// The response metadata is merged into the payload under `metadata` before
/// conversion, replacing any field of that name the payload carried.
pub fn decode_response<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let (metadata, data) = split_envelope(body)?;
    let mut object = expect_object(data)?;
    let metadata = serde_json::to_value(metadata).map_err(DecodeError::Convert)?;
    object.insert(METADATA_FIELD.to_owned(), metadata);
    serde_json::from_value(Value::Object(object)).map_err(DecodeError::Convert)
}

/// Decode an enveloped list response into `Vec<T>`. Elements do not receive metadata.
pub fn decode_response_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    let (_, data) = split_envelope(body)?;
    decode_sequence(data)
}

/// Decode a bare JSON object body into `T`.
pub fn decode_item<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    let value = parse(body)?;
    decode_object(value)
}

/// Decode a bare JSON array body into `Vec<T>`, preserving order.
pub fn decode_items<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, DecodeError> {
    let value = parse(body)?;
    decode_sequence(value)
}

/// Extract the server's error message from a non-2xx body.
///
/// Prefers the `error` field of a JSON object; otherwise falls back to the raw
/// text. An empty body yields `None`.
pub fn decode_api_error(body: &[u8]) -> Option<String> {
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
        if let Some(Value::String(message)) = object.get("error") {
            return Some(message.clone());
        }
    }

    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

pub(crate) fn parse(body: &[u8]) -> Result<Value, DecodeError> {
    serde_json::from_slice(body).map_err(DecodeError::Json)
}

pub(crate) fn decode_object<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    let object = expect_object(value)?;
    serde_json::from_value(Value::Object(object)).map_err(DecodeError::Convert)
}

pub(crate) fn decode_sequence<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, DecodeError> {
    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(DecodeError::UnexpectedShape {
                expected: Shape::Sequence,
                found: JsonKind::of(&other),
            });
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value(element).map_err(|source| DecodeError::Element { index, source })
        })
        .collect()
}

fn expect_object(value: Value) -> Result<Map<String, Value>, DecodeError> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(DecodeError::UnexpectedShape {
            expected: Shape::Single,
            found: JsonKind::of(&other),
        }),
    }
}

fn split_envelope(body: &[u8]) -> Result<(ResponseMetadata, Value), DecodeError> {
    let mut envelope = match parse(body)? {
        Value::Object(object) => object,
        other => {
            return Err(DecodeError::NotAnEnvelope {
                found: JsonKind::of(&other),
            });
        }
    };

    let metadata = ResponseMetadata {
        id: string_field(&envelope, "id")?,
        timestamp: integer_field(&envelope, "timestamp")?,
        api_version: string_field(&envelope, "api_version")?,
        object: string_field(&envelope, "object")?,
    };
    let data = envelope
        .remove("data")
        .ok_or(DecodeError::MissingField { field: "data" })?;

    Ok((metadata, data))
}

fn string_field(envelope: &Map<String, Value>, field: &'static str) -> Result<String, DecodeError> {
    match envelope.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(DecodeError::FieldType {
            field,
            expected: "a string",
            found: JsonKind::of(other),
        }),
        None => Err(DecodeError::MissingField { field }),
    }
}

fn integer_field(envelope: &Map<String, Value>, field: &'static str) -> Result<i64, DecodeError> {
    match envelope.get(field) {
        Some(value) => value.as_i64().ok_or(DecodeError::FieldType {
            field,
            expected: "an integer",
            found: JsonKind::of(value),
        }),
        None => Err(DecodeError::MissingField { field }),
    }
}

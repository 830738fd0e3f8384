use serde::Serialize;
use serde_json::{Map, Value};

use super::envelope::JsonKind;
use crate::domain::{UnixTimestamp, UpdatePayload, ValidationError, WriteOptions};

/// Reserved item field holding the absolute expiry (epoch seconds).
pub const EXPIRES_ATTRIBUTE: &str = "__expires";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("item could not be serialized: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Flatten `item` into a field map and inject the expiry requested by `options`.
///
/// `now` anchors `expire_in`. Any `__expires` value already on the item is overwritten.
pub fn encode_item<T: Serialize>(
    item: &T,
    options: &WriteOptions,
    now: UnixTimestamp,
) -> Result<Map<String, Value>, EncodeError> {
    let expires_at = options.resolve(now)?;
    let mut fields = flatten_item(item)?;
    if let Some(at) = expires_at {
        fields.insert(EXPIRES_ATTRIBUTE.to_owned(), Value::from(at.value()));
    }
    Ok(fields)
}

/// Serialize `item` and require the result to be a JSON object.
pub fn flatten_item<T: Serialize>(item: &T) -> Result<Map<String, Value>, EncodeError> {
    match serde_json::to_value(item)? {
        Value::Object(fields) => Ok(fields),
        other => Err(ValidationError::NotAnObject {
            found: JsonKind::of(&other).as_str(),
        }
        .into()),
    }
}

/// Put the expiry into the `set` bucket of an update, replacing a caller-supplied one.
pub fn set_expiry(payload: &mut UpdatePayload, at: UnixTimestamp) {
    let value = Value::from(at.value());
    match payload
        .set
        .iter_mut()
        .find(|(field, _)| field == EXPIRES_ATTRIBUTE)
    {
        Some((_, existing)) => *existing = value,
        None => payload.set.push((EXPIRES_ATTRIBUTE.to_owned(), value)),
    }
}

/// Render the `key` field of a flattened item for error messages.
pub fn item_key(fields: &Map<String, Value>) -> String {
    match fields.get("key") {
        Some(Value::String(key)) => key.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

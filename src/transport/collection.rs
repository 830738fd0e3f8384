use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::envelope::{self, DecodeError};
use crate::domain::{Query, QueryResponse, UpdatePayload};

#[derive(Debug, Deserialize)]
struct QueryJsonResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    last_key: Option<String>,
    #[serde(default)]
    items: Value,
}

pub fn encode_insert_body(item: Map<String, Value>) -> Value {
    json!({ "item": item })
}

pub fn encode_put_body(items: Vec<Map<String, Value>>) -> Value {
    json!({ "items": items })
}

pub fn encode_update_body(payload: &UpdatePayload) -> Value {
    let set = payload
        .set
        .iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect::<Map<_, _>>();
    let increment = payload
        .increment
        .iter()
        .map(|(field, delta)| (field.clone(), Value::from(*delta)))
        .collect::<Map<_, _>>();
    let append = payload
        .append
        .iter()
        .map(|(field, values)| (field.clone(), Value::Array(values.clone())))
        .collect::<Map<_, _>>();
    let prepend = payload
        .prepend
        .iter()
        .map(|(field, values)| (field.clone(), Value::Array(values.clone())))
        .collect::<Map<_, _>>();

    json!({
        "updates": {
            "set": set,
            "increment": increment,
            "append": append,
            "prepend": prepend,
            "delete": payload.delete,
        }
    })
}

pub fn encode_query_body(query: &Query) -> Value {
    let mut body = Map::new();
    body.insert("limit".to_owned(), Value::from(query.page_limit()));
    body.insert(
        "last_key".to_owned(),
        query.last().map_or(Value::Null, Value::from),
    );
    if !query.filters().is_empty() {
        let filters = query
            .filters()
            .iter()
            .map(|filter| Value::Object(filter.as_map().clone()))
            .collect();
        body.insert("query".to_owned(), Value::Array(filters));
    }
    Value::Object(body)
}

pub fn decode_query_response<T: DeserializeOwned>(
    body: &[u8],
) -> Result<QueryResponse<T>, DecodeError> {
    let value = envelope::parse(body)?;
    let parsed: QueryJsonResponse = serde_json::from_value(value).map_err(DecodeError::Convert)?;
    let items = match parsed.items {
        Value::Null => Vec::new(),
        items => envelope::decode_sequence(items)?,
    };

    Ok(QueryResponse {
        count: parsed.count,
        last_key: parsed.last_key,
        items,
    })
}

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{ContentBlock, MessageContent};

/// Timestamp that accepts both integers (ms) and RFC3339 strings.
///
/// Anything else (null, garbage strings, out-of-range numbers) becomes `None`
/// so a bad timestamp never costs the whole record.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_timestamp_value(&value))
}

pub(crate) fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        // Unix timestamp in milliseconds
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => s.parse::<DateTime<Utc>>().ok(),
        _ => None,
    }
}

/// Deserialize `T` if the value has the right shape, otherwise `None`
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// `message.content`: a string, a block list (decoded block by block), or anything else
pub fn deserialize_content<'de, D>(deserializer: D) -> Result<MessageContent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => MessageContent::Text(text),
        Value::Array(items) => {
            MessageContent::Blocks(items.into_iter().map(ContentBlock::from_value).collect())
        }
        other => MessageContent::Other(other),
    })
}

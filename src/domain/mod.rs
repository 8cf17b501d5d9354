pub mod error;
pub mod identity;
pub mod model;
pub mod profiles;
pub mod slug;
pub mod waves;

use error::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub(crate) fn decode<T: DeserializeOwned>(doc: JsonValue) -> Result<T, Error> {
    Ok(serde_json::from_value(doc)?)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<JsonValue, Error> {
    Ok(serde_json::to_value(value)?)
}

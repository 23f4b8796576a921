use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A document as stored in a collection: a JSON object body.
pub type Document = Map<String, Value>;

/// Field carrying the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// Serialize an entity into a store document.
pub fn to_document<T: Serialize>(entity: &T) -> Result<Document> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::MalformedDocument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Decode a store document back into a typed shape.
pub fn from_document<T: DeserializeOwned>(document: &Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document.clone()))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_object_entities() {
        let result = to_document(&42_u32);
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }
}

use docgate::ID_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored record: identifier plus an arbitrary field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Field map with `id` merged in, the shape returned to HTTP clients.
    pub fn into_json(self) -> Value {
        let mut fields = self.fields;
        fields.insert(ID_FIELD.to_string(), Value::String(self.id));
        Value::Object(fields)
    }
}

/// A parent document together with the matching documents of one subcollection.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedDocument {
    pub parent: Document,
    pub children: Vec<Document>,
}

impl NestedDocument {
    /// Parent payload with the children listed under `subcollection`.
    pub fn into_json(self, subcollection: &str) -> Value {
        let children = self.children.into_iter().map(Document::into_json).collect();
        let mut value = self.parent.into_json();
        if let Value::Object(map) = &mut value {
            map.insert(subcollection.to_string(), Value::Array(children));
        }
        value
    }
}

/// Storage path of a subcollection under one parent document.
pub fn subcollection_path(collection: &str, parent_id: &str, subcollection: &str) -> String {
    format!("{collection}/{parent_id}/{subcollection}")
}

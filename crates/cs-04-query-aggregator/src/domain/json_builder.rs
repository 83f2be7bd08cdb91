//! # Single-pass JSON Builder
//!
//! Sets path keys directly to already-known values. Paths are split on any
//! of `\ / : .`, with runs of delimiters treated as one, so `a.b`, `a/b` and
//! `a::b` all address `{"a": {"b": ...}}`.

use serde_json::{Map, Value as JsonValue};

const PATH_DELIMITERS: &[char] = &['\\', '/', ':', '.'];

/// Split a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(PATH_DELIMITERS)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Walk (creating objects as needed) to the parent of the last segment and
/// set the leaf. An empty path leaves the document untouched.
pub(crate) fn set_at_path(root: &mut JsonValue, path: &str, value: JsonValue) {
    let segments = split_path(path);
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    if let Some(map) = walk_to_parent(root, parents) {
        map.insert((*leaf).to_string(), value);
    }
}

/// Append `value` to the array at `path`, creating or replacing the leaf
/// with an array when it is not one already.
pub(crate) fn push_at_path(root: &mut JsonValue, path: &str, value: JsonValue) {
    let segments = split_path(path);
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let Some(map) = walk_to_parent(root, parents) else {
        return;
    };
    let slot = map
        .entry((*leaf).to_string())
        .or_insert_with(|| JsonValue::Array(Vec::new()));
    if !slot.is_array() {
        *slot = JsonValue::Array(Vec::new());
    }
    if let JsonValue::Array(items) = slot {
        items.push(value);
    }
}

fn walk_to_parent<'a>(
    root: &'a mut JsonValue,
    parents: &[&str],
) -> Option<&'a mut Map<String, JsonValue>> {
    let mut node = root;
    for segment in parents {
        ensure_object(node);
        node = node
            .as_object_mut()?
            .entry((*segment).to_string())
            .or_insert(JsonValue::Null);
    }
    ensure_object(node);
    node.as_object_mut()
}

fn ensure_object(node: &mut JsonValue) {
    if !node.is_object() {
        *node = JsonValue::Object(Map::new());
    }
}

/// Builder for answers that are fully known locally.
#[derive(Debug, Clone, Default)]
pub struct JsonBuilder {
    document: Option<JsonValue>,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document, created empty on first access.
    pub fn document_mut(&mut self) -> &mut JsonValue {
        self.document
            .get_or_insert_with(|| JsonValue::Object(Map::new()))
    }

    pub fn add_string(&mut self, path: &str, value: &str) {
        set_at_path(self.document_mut(), path, JsonValue::String(value.to_string()));
    }

    /// Non-finite numbers are stored as `null`.
    pub fn add_double(&mut self, path: &str, value: f64) {
        set_at_path(self.document_mut(), path, JsonValue::from(value));
    }

    pub fn add_vector(&mut self, path: &str, values: &[f64]) {
        let array = values.iter().copied().map(JsonValue::from).collect();
        set_at_path(self.document_mut(), path, JsonValue::Array(array));
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// Serialised document, or `{}` if nothing was ever added.
    pub fn generate(&self) -> String {
        match &self.document {
            Some(document) => document.to_string(),
            None => "{}".to_string(),
        }
    }

    pub fn reset(&mut self) {
        self.document = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_path_compresses_delimiters() {
        assert_eq!(split_path("a.b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_path("fed::value"), vec!["fed", "value"]);
        assert_eq!(split_path("\\x\\\\y"), vec!["x", "y"]);
        assert!(split_path("./:").is_empty());
    }

    #[test]
    fn test_empty_builder_generates_empty_object() {
        assert_eq!(JsonBuilder::new().generate(), "{}");
    }

    #[test]
    fn test_nested_elements() {
        let mut builder = JsonBuilder::new();
        builder.add_double("fed1/voltage", 1.5);
        builder.add_string("fed1.name", "bus");
        builder.add_vector("fed2:load", &[1.0, 2.0]);

        let doc: JsonValue = serde_json::from_str(&builder.generate()).unwrap();
        assert_eq!(
            doc,
            json!({
                "fed1": { "voltage": 1.5, "name": "bus" },
                "fed2": { "load": [1.0, 2.0] }
            })
        );
    }

    #[test]
    fn test_scalar_parent_is_replaced_by_object() {
        let mut builder = JsonBuilder::new();
        builder.add_double("a", 1.0);
        builder.add_double("a.b", 2.0);
        let doc: JsonValue = serde_json::from_str(&builder.generate()).unwrap();
        assert_eq!(doc, json!({ "a": { "b": 2.0 } }));
    }

    #[test]
    fn test_reset() {
        let mut builder = JsonBuilder::new();
        builder.add_string("k", "v");
        assert!(!builder.is_empty());
        builder.reset();
        assert!(builder.is_empty());
        assert_eq!(builder.generate(), "{}");
    }
}

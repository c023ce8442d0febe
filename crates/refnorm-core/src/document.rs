//! Document model: a palette JSON document with its shape checked on load
//!
//! The document stays a tagged JSON value so that every field the normalizer
//! does not own survives a round trip. Object key order is preserved.
//!
//! Expected shape:
//!
//! ```text
//! { "colors": { "<id>": { "references": ["<int>", ...], ... }, ... },
//!   "palettes": { "<int>": { ... }, ... } }
//! ```

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::{Error, Result, COLORS_KEY, PALETTES_KEY, REFERENCES_KEY};

/// A parsed and shape-checked palette document
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    /// Parse JSON text and validate its shape
    ///
    /// # Errors
    /// `Json` for syntax errors, `MissingColors` or `InvalidShape`
    /// when the value is not a palette document.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Wrap an already-parsed value after validating its shape
    pub fn from_value(value: Value) -> Result<Self> {
        validate(&value)?;
        Ok(Document(value))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `colors` mapping
    pub fn colors(&self) -> Result<&Map<String, Value>> {
        self.0
            .get(COLORS_KEY)
            .and_then(Value::as_object)
            .ok_or(Error::MissingColors)
    }

    /// The `colors` mapping, mutably
    pub fn colors_mut(&mut self) -> Result<&mut Map<String, Value>> {
        self.0
            .get_mut(COLORS_KEY)
            .and_then(Value::as_object_mut)
            .ok_or(Error::MissingColors)
    }

    /// The `palettes` mapping, if the document has one
    pub fn palettes(&self) -> Option<&Map<String, Value>> {
        self.0.get(PALETTES_KEY).and_then(Value::as_object)
    }

    /// Serialize with 2-space indentation and a trailing newline
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.0)?;
        out.push('\n');
        Ok(out)
    }
}

/// Lowercase hex SHA-256 of `bytes`
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// JSON type name used in shape errors
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Shape validation ───────────────────────────────────────

fn validate(value: &Value) -> Result<()> {
    let root = value.as_object().ok_or_else(|| Error::InvalidShape {
        path: "$".into(),
        expected: "object",
        found: type_name(value),
    })?;

    let colors = root.get(COLORS_KEY).ok_or(Error::MissingColors)?;
    let colors = expect_object(colors, COLORS_KEY)?;
    for (id, record) in colors {
        let path = format!("{}.{}", COLORS_KEY, id);
        let record = expect_object(record, &path)?;
        if let Some(references) = record.get(REFERENCES_KEY) {
            validate_references(references, &format!("{}.{}", path, REFERENCES_KEY))?;
        }
    }

    if let Some(palettes) = root.get(PALETTES_KEY) {
        expect_object(palettes, PALETTES_KEY)?;
    }

    Ok(())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| Error::InvalidShape {
        path: path.to_string(),
        expected: "object",
        found: type_name(value),
    })
}

pub(crate) fn validate_references(value: &Value, path: &str) -> Result<()> {
    let items = value.as_array().ok_or_else(|| Error::InvalidShape {
        path: path.to_string(),
        expected: "array of strings",
        found: type_name(value),
    })?;
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Err(Error::InvalidShape {
                path: format!("{}[{}]", path, i),
                expected: "string",
                found: type_name(item),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape_error(text: &str) -> (String, &'static str, &'static str) {
        match Document::parse(text) {
            Err(Error::InvalidShape {
                path,
                expected,
                found,
            }) => (path, expected, found),
            other => panic!("expected InvalidShape, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_minimal_document() {
        let doc = Document::parse(r#"{"colors":{}}"#).unwrap();
        assert!(doc.colors().unwrap().is_empty());
        assert!(doc.palettes().is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Document::parse(r#"{"colors": "#).unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got {:?}", err);
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let (path, expected, found) = shape_error("[1, 2]");
        assert_eq!(path, "$");
        assert_eq!(expected, "object");
        assert_eq!(found, "array");
    }

    #[test]
    fn test_parse_requires_colors() {
        let err = Document::parse(r#"{"palettes":{}}"#).unwrap_err();
        assert!(matches!(err, Error::MissingColors), "got {:?}", err);
    }

    #[test]
    fn test_parse_rejects_non_object_colors() {
        let (path, _, found) = shape_error(r#"{"colors":[]}"#);
        assert_eq!(path, "colors");
        assert_eq!(found, "array");
    }

    #[test]
    fn test_parse_rejects_non_object_record() {
        let (path, _, found) = shape_error(r#"{"colors":{"red":"crimson"}}"#);
        assert_eq!(path, "colors.red");
        assert_eq!(found, "string");
    }

    #[test]
    fn test_parse_rejects_non_array_references() {
        let (path, expected, found) = shape_error(r#"{"colors":{"red":{"references":"1"}}}"#);
        assert_eq!(path, "colors.red.references");
        assert_eq!(expected, "array of strings");
        assert_eq!(found, "string");
    }

    #[test]
    fn test_parse_rejects_numeric_reference_items() {
        let (path, expected, found) =
            shape_error(r#"{"colors":{"red":{"references":["1", 2]}}}"#);
        assert_eq!(path, "colors.red.references[1]");
        assert_eq!(expected, "string");
        assert_eq!(found, "number");
    }

    #[test]
    fn test_parse_rejects_non_object_palettes() {
        let (path, _, found) = shape_error(r#"{"colors":{},"palettes":null}"#);
        assert_eq!(path, "palettes");
        assert_eq!(found, "null");
    }

    #[test]
    fn test_pretty_output_uses_two_space_indent() {
        let doc = Document::from_value(json!({"colors": {"red": {"references": ["1"]}}})).unwrap();
        let out = doc.to_pretty_string().unwrap();
        assert_eq!(
            out,
            "{\n  \"colors\": {\n    \"red\": {\n      \"references\": [\n        \"1\"\n      ]\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_pretty_output_preserves_key_order() {
        let text = r#"{"zeta":1,"colors":{"b":{"name":"B"},"a":{"name":"A"}},"alpha":2}"#;
        let out = Document::parse(text).unwrap().to_pretty_string().unwrap();
        let zeta = out.find("\"zeta\"").unwrap();
        let colors = out.find("\"colors\"").unwrap();
        let alpha = out.find("\"alpha\"").unwrap();
        assert!(zeta < colors && colors < alpha, "root order lost:\n{}", out);
        assert!(out.find("\"b\"").unwrap() < out.find("\"a\"").unwrap());
    }

    #[test]
    fn test_pretty_output_keeps_unicode_unescaped() {
        let doc = Document::parse(r#"{"colors":{"朱色":{"references":[]}}}"#).unwrap();
        let out = doc.to_pretty_string().unwrap();
        assert!(out.contains("朱色"), "got: {}", out);
    }

    #[test]
    fn test_from_value_into_value_round_trip() {
        let value = json!({"colors": {"red": {"references": ["2", "1"]}}, "palettes": {}});
        let doc = Document::from_value(value.clone()).unwrap();
        assert_eq!(doc.into_value(), value);
    }

    #[test]
    fn test_from_value_validates_shape() {
        let err = Document::from_value(json!({"colors": {"red": []}})).unwrap_err();
        assert!(matches!(err, Error::InvalidShape { .. }), "got {:?}", err);
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        // SHA-256("abc")
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

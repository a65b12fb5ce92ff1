//! Structured document parsing and serialization.
//!
//! Text is parsed as JSON or YAML (see [`Format::resolve`]) into generic
//! [`serde_json::Value`] documents and serialized back.

mod format;

pub use format::Format;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Largest integer a JavaScript consumer can hold exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Result of parsing a text buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub documents: Vec<Value>,
    pub format: Format,
}

fn parse_json(text: &str) -> EngineResult<Vec<Value>> {
    let value: Value = serde_json::from_str(text).map_err(|e| EngineError::parse(Format::Json, e))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn parse_yaml(text: &str) -> EngineResult<Vec<Value>> {
    let mut documents = Vec::new();
    for doc in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(doc).map_err(|e| EngineError::parse(Format::Yaml, e))?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Parse `text` into zero or more documents.
///
/// JSON is one document per parse, except that a top-level array is taken
/// as the document list. YAML supports `---` separated streams; null and
/// empty documents are dropped. Blank text has no documents.
pub fn parse(text: &str, hint: Option<Format>) -> EngineResult<Parsed> {
    let format = Format::resolve(text, hint);
    if text.trim().is_empty() {
        return Ok(Parsed {
            documents: Vec::new(),
            format,
        });
    }
    let documents = match format {
        Format::Json => parse_json(text)?,
        Format::Yaml => parse_yaml(text)?,
    };
    Ok(Parsed { documents, format })
}

/// Parse `text` and require exactly one document.
pub fn parse_single(text: &str, hint: Option<Format>) -> EngineResult<(Value, Format)> {
    let Parsed { mut documents, format } = parse(text, hint)?;
    if documents.len() != 1 {
        return Err(EngineError::MultiDocument {
            count: documents.len(),
        });
    }
    Ok((documents.remove(0), format))
}

fn is_unsafe_integer(n: &serde_json::Number) -> bool {
    match (n.as_u64(), n.as_i64()) {
        (Some(u), _) => u > MAX_SAFE_INTEGER,
        (None, Some(i)) => i.unsigned_abs() > MAX_SAFE_INTEGER,
        _ => false,
    }
}

fn needs_js_safe(value: &Value) -> bool {
    match value {
        Value::Number(n) => is_unsafe_integer(n),
        Value::Array(items) => items.iter().any(needs_js_safe),
        Value::Object(map) => map.values().any(needs_js_safe),
        _ => false,
    }
}

/// Copy of `value` with out-of-range integers turned into decimal strings.
fn js_safe(value: &Value) -> Value {
    match value {
        Value::Number(n) if is_unsafe_integer(n) => Value::String(n.to_string()),
        Value::Array(items) => Value::Array(items.iter().map(js_safe).collect()),
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), js_safe(v))).collect()),
        other => other.clone(),
    }
}

/// Serialize one document.
///
/// JSON is pretty-printed with a two-space indent; integers beyond
/// [`MAX_SAFE_INTEGER`] are written as strings. YAML uses a plain dump.
pub fn stringify(value: &Value, format: Format) -> EngineResult<String> {
    match format {
        Format::Json => {
            let out = if needs_js_safe(value) {
                serde_json::to_string_pretty(&js_safe(value))
            } else {
                serde_json::to_string_pretty(value)
            };
            out.map_err(|e| EngineError::Serialization(e.to_string()))
        }
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| EngineError::Serialization(e.to_string())),
    }
}

/// Serialize a document list the way [`parse`] reads it back: a JSON array
/// for several JSON documents, a `---` separated stream for YAML.
pub fn stringify_all(documents: &[Value], format: Format) -> EngineResult<String> {
    match (format, documents) {
        (_, [single]) => stringify(single, format),
        (Format::Json, docs) => stringify(&Value::Array(docs.to_vec()), Format::Json),
        (Format::Yaml, docs) => {
            let parts = docs
                .iter()
                .map(|doc| stringify(doc, Format::Yaml))
                .collect::<EngineResult<Vec<_>>>()?;
            Ok(parts.join("---\n"))
        }
    }
}

/// Raw editable text plus the format it was last classified as.
///
/// The format is `None` only until the buffer first holds non-blank text;
/// afterwards it follows the text's shape and survives the text going blank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentBuffer {
    text: String,
    format: Option<Format>,
}

impl DocumentBuffer {
    /// Buffer holding `text` already known to be in `format`.
    pub fn new(text: impl Into<String>, format: Format) -> Self {
        Self {
            text: text.into(),
            format: Some(format),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let format = Format::classify(&text);
        Self { text, format }
    }

    /// Serialize `value` into a new buffer.
    pub fn from_value(value: &Value, format: Format) -> EngineResult<Self> {
        Ok(Self {
            text: stringify(value, format)?,
            format: Some(format),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    pub fn resolved_format(&self) -> Format {
        Format::resolve(&self.text, self.format)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if let Some(format) = Format::classify(&self.text) {
            self.format = Some(format);
        }
    }

    pub fn documents(&self) -> EngineResult<Vec<Value>> {
        parse(&self.text, self.format).map(|p| p.documents)
    }

    pub fn single(&self) -> EngineResult<Value> {
        parse_single(&self.text, self.format).map(|(doc, _)| doc)
    }

    /// Check the text parses. Errors are for display only.
    pub fn validate(&self) -> EngineResult<()> {
        self.documents().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_json_object() {
        let parsed = parse("{\"a\": 1}", None).unwrap();
        assert_eq!(parsed.format, Format::Json);
        assert_eq!(parsed.documents, vec![json!({"a": 1})]);
    }

    #[test]
    fn parse_json_array_is_document_list() {
        let parsed = parse("[{\"a\": 1}, {\"b\": 2}]", None).unwrap();
        assert_eq!(parsed.documents.len(), 2);
    }

    #[test]
    fn parse_yaml_stream_drops_empty_documents() {
        let text = "a: 1\n---\n---\nb: 2\n---\nnull\n";
        let parsed = parse(text, None).unwrap();
        assert_eq!(parsed.format, Format::Yaml);
        assert_eq!(parsed.documents, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn parse_blank_has_no_documents() {
        assert!(parse("  \n", Some(Format::Json)).unwrap().documents.is_empty());
    }

    #[test]
    fn parse_error_is_structured() {
        let err = parse("{\"a\": ", None).unwrap_err();
        assert!(matches!(err, EngineError::Parse { format: Format::Json, .. }));
        let err = parse("a: b: c\n", None).unwrap_err();
        assert!(matches!(err, EngineError::Parse { format: Format::Yaml, .. }));
    }

    #[test]
    fn parse_single_rejects_streams() {
        let err = parse_single("a: 1\n---\nb: 2\n", None).unwrap_err();
        assert_eq!(err, EngineError::MultiDocument { count: 2 });
        let err = parse_single("", None).unwrap_err();
        assert_eq!(err, EngineError::MultiDocument { count: 0 });
    }

    #[test]
    fn stringify_json_two_space_indent() {
        let text = stringify(&json!({"a": {"b": 1}}), Format::Json).unwrap();
        assert_eq!(text, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    }

    #[test]
    fn stringify_json_big_integers_as_strings() {
        let text = stringify(&json!({"n": 9_007_199_254_740_993u64, "m": -9_007_199_254_740_993i64, "ok": 42}), Format::Json).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({"n": "9007199254740993", "m": "-9007199254740993", "ok": 42}));
    }

    #[test]
    fn stringify_yaml_keeps_key_order() {
        let text = stringify(&json!({"kind": "Pod", "apiVersion": "v1"}), Format::Yaml).unwrap();
        assert_eq!(text, "kind: Pod\napiVersion: v1\n");
    }

    #[test]
    fn round_trip_both_formats() {
        let doc = json!({
            "metadata": {"name": "x", "labels": {"app": "web"}},
            "spec": {"replicas": 3, "ports": [{"port": 80}, {"port": 443}], "paused": false, "note": "123"}
        });
        for format in [Format::Json, Format::Yaml] {
            let text = stringify(&doc, format).unwrap();
            let (back, detected) = parse_single(&text, None).unwrap();
            assert_eq!(detected, format);
            assert_eq!(back, doc);
        }
    }

    #[test]
    fn stringify_all_round_trips_streams() {
        let docs = vec![json!({"a": 1}), json!({"b": 2})];
        for format in [Format::Json, Format::Yaml] {
            let text = stringify_all(&docs, format).unwrap();
            assert_eq!(parse(&text, Some(format)).unwrap().documents, docs);
        }
    }

    #[test]
    fn buffer_format_persists_when_blank() {
        let mut buffer = DocumentBuffer::literal("{}");
        assert_eq!(buffer.format(), Some(Format::Json));
        buffer.set_text("");
        assert_eq!(buffer.format(), Some(Format::Json));
        buffer.set_text("a: 1");
        assert_eq!(buffer.format(), Some(Format::Yaml));
    }

    #[test]
    fn buffer_format_empty_before_content() {
        let buffer = DocumentBuffer::literal("");
        assert_eq!(buffer.format(), None);
        assert_eq!(buffer.resolved_format(), Format::Yaml);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn buffer_single_from_value() {
        let buffer = DocumentBuffer::from_value(&json!({"a": [1]}), Format::Yaml).unwrap();
        assert_eq!(buffer.single().unwrap(), json!({"a": [1]}));
    }
}

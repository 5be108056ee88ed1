//! Flattened translation tables

use std::collections::HashMap;

use serde_json::Value;

/// One language with a complete, flat key space
#[derive(Debug, Clone, PartialEq)]
pub struct Locale {
    pub code: String,
    data: HashMap<String, String>,
    overridden: usize,
}

/// Result of flattening a translation tree
#[derive(Debug, Default)]
pub struct Flattened {
    pub entries: HashMap<String, String>,
    /// Keys that appeared more than once with different values
    pub collisions: Vec<String>,
}

/// Flatten a nested tree into dotted keys.
///
/// Strings are leaves, numbers and booleans are stringified, arrays are
/// indexed and nulls are dropped. When a key is produced twice with different
/// values the first one is kept and the key is reported as a collision.
pub fn flatten(tree: &Value) -> Flattened {
    let mut out = Flattened::default();
    flatten_into(tree, &mut String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, path: &mut String, out: &mut Flattened) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                descend(path, key, child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                descend(path, &index.to_string(), child, out);
            }
        }
        Value::Null => {}
        Value::String(s) => insert_leaf(path, s.clone(), out),
        Value::Bool(b) => insert_leaf(path, b.to_string(), out),
        Value::Number(n) => insert_leaf(path, n.to_string(), out),
    }
}

fn descend(path: &mut String, segment: &str, child: &Value, out: &mut Flattened) {
    let len = path.len();
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(segment);
    flatten_into(child, path, out);
    path.truncate(len);
}

fn insert_leaf(path: &str, value: String, out: &mut Flattened) {
    match out.entries.get(path) {
        Some(existing) if *existing != value => out.collisions.push(path.to_string()),
        Some(_) => {}
        None => {
            out.entries.insert(path.to_string(), value);
        }
    }
}

impl Locale {
    /// The authoritative locale, taken as-is
    pub fn source(code: impl Into<String>, data: HashMap<String, String>) -> Self {
        Self {
            code: code.into(),
            data,
            overridden: 0,
        }
    }

    /// Start from `base` and overwrite every key the translation provides.
    ///
    /// Keys unknown to `base` are ignored so that every locale shares the
    /// authoritative key space.
    pub fn overlay(
        base: &Locale,
        code: impl Into<String>,
        translated: HashMap<String, String>,
    ) -> Self {
        let code = code.into();
        let mut data = base.data.clone();
        let mut overridden = 0;
        for (key, value) in translated {
            match data.get_mut(&key) {
                Some(slot) => {
                    *slot = value;
                    overridden += 1;
                }
                None => {
                    tracing::debug!(
                        locale = %code,
                        key = %key,
                        "Dropping key missing from source locale"
                    );
                }
            }
        }
        Self {
            code,
            data,
            overridden,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Like `get`, but an unknown key renders as itself
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    /// Render `key`, replacing `{name}` placeholders with the given values
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut out = self.text(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{}}}", name), value);
        }
        out
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// How many keys this locale translates itself
    pub fn overridden(&self) -> usize {
        self.overridden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flatten_nested_groups() {
        let tree = json!({
            "general": {
                "pong": "Pong!",
                "errors": { "missing": "Not found", "code": 404 }
            },
            "list": ["one", null, true]
        });
        let flat = flatten(&tree);

        assert_eq!(flat.entries.get("general.pong").unwrap(), "Pong!");
        assert_eq!(flat.entries.get("general.errors.missing").unwrap(), "Not found");
        assert_eq!(flat.entries.get("general.errors.code").unwrap(), "404");
        assert_eq!(flat.entries.get("list.0").unwrap(), "one");
        assert!(!flat.entries.contains_key("list.1"));
        assert_eq!(flat.entries.get("list.2").unwrap(), "true");
        assert!(flat.collisions.is_empty());
    }

    #[test]
    fn test_flatten_collision_keeps_first() {
        // object keys iterate sorted, so the nested "a" group is visited first
        let tree = json!({
            "a.b": "second",
            "a": { "b": "first" }
        });
        let flat = flatten(&tree);

        assert_eq!(flat.entries.get("a.b").unwrap(), "first");
        assert_eq!(flat.collisions, vec!["a.b".to_string()]);
    }

    #[test]
    fn test_overlay_precedence() {
        let en = Locale::source("en", map(&[("a.b", "X"), ("a.c", "Y")]));
        let fr = Locale::overlay(&en, "fr", map(&[("a.b", "X'")]));

        assert_eq!(fr.get("a.b"), Some("X'"));
        assert_eq!(fr.get("a.c"), Some("Y"));
        assert_eq!(fr.len(), en.len());
        assert_eq!(fr.overridden(), 1);
    }

    #[test]
    fn test_overlay_drops_unknown_keys() {
        let en = Locale::source("en", map(&[("a", "A")]));
        let de = Locale::overlay(&en, "de", map(&[("a", "Ä"), ("extra", "?")]));

        assert!(!de.contains("extra"));
        assert_eq!(de.keys().count(), 1);
    }

    #[test]
    fn test_format_placeholders() {
        let en = Locale::source("en", map(&[("greet", "Hello {name}, welcome to {place}")]));
        assert_eq!(
            en.format("greet", &[("name", "Ana"), ("place", "the server")]),
            "Hello Ana, welcome to the server"
        );
        assert_eq!(en.text("missing.key"), "missing.key");
    }
}

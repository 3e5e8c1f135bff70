use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between namespace segments of entity and annotation names
pub const NAMESPACE_SEPARATOR: char = '\\';

/// One annotation declared on an entity or operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataEntry {
    /// Declared annotation name (possibly namespaced, e.g. `App\Annotations\Route`)
    pub name: String,

    /// Raw arguments as written at the declaration site
    #[serde(default)]
    pub arguments: Arguments,
}

impl MetadataEntry {
    /// Create an entry without arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::default(),
        }
    }

    /// Builder: set arguments
    #[must_use]
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Last segment of the declared name
    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Context key used when the entry degrades to a plain fact
    #[must_use]
    pub fn fact_key(&self) -> String {
        lower_first(self.simple_name())
    }
}

/// Positional and named annotation arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Arguments {
    #[serde(default)]
    pub positional: Vec<Value>,

    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl Arguments {
    /// Arguments made of positional values only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: BTreeMap::new(),
        }
    }

    /// Builder: add a named argument
    #[must_use]
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Positional argument at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument, falling back to a positional index
    #[must_use]
    pub fn get_or(&self, key: &str, index: usize) -> Option<&Value> {
        self.named.get(key).or_else(|| self.get(index))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Raw value stored in the context for plain facts.
    ///
    /// Positional-only arguments become an array. With named arguments present the
    /// value is an object keyed by position (`"0"`, `"1"`, ...) and by name.
    #[must_use]
    pub fn to_value(&self) -> Value {
        if self.named.is_empty() {
            return Value::Array(self.positional.clone());
        }

        let mut map = Map::new();
        for (idx, value) in self.positional.iter().enumerate() {
            map.insert(idx.to_string(), value.clone());
        }
        for (key, value) in &self.named {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

/// Last namespace segment of `name`
#[must_use]
pub fn simple_name(name: &str) -> &str {
    name.rsplit(NAMESPACE_SEPARATOR).next().unwrap_or(name)
}

/// Lowercase the first character if it is ASCII, leaving the rest untouched
#[must_use]
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_lowercase()).chain(chars).collect(),
        None => String::new(),
    }
}

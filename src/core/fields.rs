//! Structured fields attached to log entries
//!
//! This module provides:
//! - `FieldValue`: the closed set of value kinds a field can hold
//! - `Fields`: a copy-on-write key/value set shared between entries
//!
//! Adding fields never mutates a `Fields` that is still referenced
//! elsewhere. Every `with_*` call builds a successor set; `insert` goes
//! through `Arc::make_mut` and clones the map first if it is shared.

use serde::{Serialize, Serializer};
use std::collections::hash_map;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Error value stored in a field, shareable across threads
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Value type for structured logging fields
#[derive(Clone)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// An error, rendered with its `Display` form
    Error(SharedError),
    /// Anything else that can be displayed
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl FieldValue {
    /// Wrap an arbitrary displayable value
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        FieldValue::Opaque(Arc::new(value))
    }

    /// Wrap an error value
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        FieldValue::Error(Arc::new(err))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            FieldValue::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::UInt(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Error(e) => serde_json::Value::String(e.to_string()),
            FieldValue::Opaque(d) => serde_json::Value::String(d.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Opaque(d) => write!(f, "{}", d),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.debug_tuple("String").field(s).finish(),
            FieldValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            FieldValue::UInt(u) => f.debug_tuple("UInt").field(u).finish(),
            FieldValue::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            FieldValue::Opaque(d) => f.debug_tuple("Opaque").field(&d.to_string()).finish(),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::UInt(a), FieldValue::UInt(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Error(a), FieldValue::Error(b)) => a.to_string() == b.to_string(),
            (FieldValue::Opaque(a), FieldValue::Opaque(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::UInt(u) => serializer.serialize_u64(*u),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Error(e) => serializer.collect_str(e),
            FieldValue::Opaque(d) => serializer.collect_str(d),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<()> for FieldValue {
    fn from(_: ()) -> Self {
        FieldValue::Null
    }
}

impl From<SharedError> for FieldValue {
    fn from(e: SharedError) -> Self {
        FieldValue::Error(e)
    }
}

impl From<&FieldValue> for FieldValue {
    fn from(v: &FieldValue) -> Self {
        v.clone()
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Copy-on-write set of structured fields
#[derive(Clone, Default, PartialEq)]
pub struct Fields {
    map: Arc<HashMap<String, FieldValue>>,
}

impl Fields {
    /// Create a new empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty field set with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: Arc::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, FieldValue> {
        self.map.iter()
    }

    /// Keys in lexical order, for formatters that want stable output
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Return a new set with one extra field
    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Fields
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.with_fields(std::iter::once((key, value)))
    }

    /// Return a new set containing this set's entries overridden by `fields`
    #[must_use]
    pub fn with_fields<I, K, V>(&self, fields: I) -> Fields
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let fields = fields.into_iter();
        let (additional, _) = fields.size_hint();
        let mut map = HashMap::with_capacity(self.map.len() + additional);
        map.extend(self.map.iter().map(|(k, v)| (k.clone(), v.clone())));
        map.extend(fields.map(|(k, v)| (k.into(), v.into())));
        Fields { map: Arc::new(map) }
    }

    /// Return a new set with `key=value` plus alternating key/value `extras`.
    ///
    /// An unpaired trailing key is kept with a `Null` value. Keys that are
    /// not strings use their display form.
    #[must_use]
    pub fn with<K, V, I>(&self, key: K, value: V, extras: I) -> Fields
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator,
        I::Item: Into<FieldValue>,
    {
        self.with_fields(variadic_pairs(key.into(), value.into(), extras))
    }

    /// Insert in place. Other holders of this set keep their own contents.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Arc::make_mut(&mut self.map).insert(key.into(), value.into());
    }

    /// Format fields as key=value pairs, sorted by key
    pub fn format_fields(&self) -> String {
        self.sorted_keys()
            .into_iter()
            .map(|k| format!("{}={}", k, self.map[k]))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn variadic_pairs<I>(key: String, value: FieldValue, extras: I) -> Vec<(String, FieldValue)>
where
    I: IntoIterator,
    I::Item: Into<FieldValue>,
{
    let mut extras = extras.into_iter().map(Into::into);
    let mut pairs = Vec::with_capacity(1 + extras.size_hint().0 / 2);
    pairs.push((key, value));
    while let Some(k) = extras.next() {
        let v = extras.next().unwrap_or(FieldValue::Null);
        pairs.push((field_key(k), v));
    }
    pairs
}

fn field_key(key: FieldValue) -> String {
    match key {
        FieldValue::String(s) => s,
        other => other.to_string(),
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.sorted_keys().into_iter().map(|k| (k, &self.map[k])))
            .finish()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.sorted_keys().into_iter().map(|k| (k, &self.map[k])))
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields {
            map: Arc::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = hash_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

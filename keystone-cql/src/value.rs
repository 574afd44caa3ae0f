//! Dynamically typed CQL values, as returned in rows of schema tables.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use uuid::Uuid;

use crate::pretty::CqlValueDisplayer;

/// Represents any CQL value that can appear in a `system_schema` row.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum CqlValue {
    Ascii(String),
    Boolean(bool),
    Blob(Vec<u8>),
    Int(i32),
    BigInt(i64),
    Text(String),
    List(Vec<CqlValue>),
    Map(Vec<(CqlValue, CqlValue)>),
    Set(Vec<CqlValue>),
    TinyInt(i8),
    Uuid(Uuid),
}

impl CqlValue {
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string contents of either an `ascii` or a `text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<CqlValue>> {
        match self {
            Self::List(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Ascii(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_vec(self) -> Option<Vec<CqlValue>> {
        match self {
            Self::List(s) => Some(s),
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_pair_vec(self) -> Option<Vec<(CqlValue, CqlValue)>> {
        match self {
            Self::Map(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a `list<text>` or `set<text>` into a vector of strings.
    /// Returns None if the value is not a collection or any element is not textual.
    pub fn into_string_vec(self) -> Option<Vec<String>> {
        self.into_vec()?
            .into_iter()
            .map(CqlValue::into_string)
            .collect()
    }

    /// Converts a `map<text, text>` into a HashMap.
    /// Returns None if the value is not a map or any key or value is not textual.
    pub fn into_string_map(self) -> Option<HashMap<String, String>> {
        self.into_pair_vec()?
            .into_iter()
            .map(|(k, v)| Some((k.into_string()?, v.into_string()?)))
            .collect()
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", CqlValueDisplayer(self))
    }
}

impl From<&str> for CqlValue {
    fn from(s: &str) -> Self {
        CqlValue::Text(s.to_owned())
    }
}

impl From<String> for CqlValue {
    fn from(s: String) -> Self {
        CqlValue::Text(s)
    }
}

impl From<bool> for CqlValue {
    fn from(b: bool) -> Self {
        CqlValue::Boolean(b)
    }
}

impl From<i32> for CqlValue {
    fn from(i: i32) -> Self {
        CqlValue::Int(i)
    }
}

impl<T: Into<CqlValue>> From<Vec<T>> for CqlValue {
    fn from(elements: Vec<T>) -> Self {
        CqlValue::List(elements.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<CqlValue>, V: Into<CqlValue>> From<BTreeMap<K, V>> for CqlValue {
    fn from(map: BTreeMap<K, V>) -> Self {
        CqlValue::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

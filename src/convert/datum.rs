//! In-memory values produced by decoders and consumed by encoders

use std::collections::BTreeMap;

/// A typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Datum>),
    Tuple(Vec<Datum>),
    Record {
        name: String,
        fields: BTreeMap<String, Datum>,
    },
    /// Untyped JSON carried through `any`
    Any(serde_json::Value),
}

impl Datum {
    /// Build a record value
    pub fn record<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Datum)>,
        S: Into<String>,
    {
        Self::Record {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(field, value)| (field.into(), value))
                .collect(),
        }
    }

    /// Short name of the value's shape, for error messages
    pub fn kind(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "str".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Tuple(items) => format!("{}-tuple", items.len()),
            Self::Record { name, .. } => format!("record {}", name),
            Self::Any(_) => "any".to_string(),
        }
    }

    /// Field of a record value
    pub fn field(&self, name: &str) -> Option<&Datum> {
        match self {
            Self::Record { fields, .. } => fields.get(name),
            _ => None,
        }
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

use std::fmt;

/// One cell of the final summary table.
///
/// `Str` carries genuine string fields (workload name, config label) and the
/// verbatim passthrough the parser uses for "nan" and unit-less latency
/// tokens.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Int(u64),
    Num(f64),
    Str(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Num(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Ordered field map with update semantics: insertion order is preserved and
/// re-inserting a key overwrites the value in place.
///
/// The CSV header is derived from the first record's key order, so order
/// stability is part of the contract. `Record::default()` is the empty
/// placeholder appended for runs that failed parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|entry| entry.0 == key) {
            slot.1 = value;
            return;
        }
        self.fields.push((key, value));
    }

    /// Folds `other` in, later keys overriding earlier ones in place.
    pub(crate) fn merge(&mut self, other: Record) {
        for (key, value) in other.fields {
            self.insert(key, value);
        }
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.fields.retain(|entry| entry.0 != key);
    }

    pub(crate) fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|entry| entry.0 == key)
            .map(|entry| &entry.1)
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|entry| entry.0.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

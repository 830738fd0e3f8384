//! Partial-update directives and their compilation into per-operation buckets.

use serde_json::Value;

/// One field's partial mutation.
///
/// `Append` and `Prepend` are distinct variants, so a compiled payload can
/// never confuse the two.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperation {
    /// Replace the field with a value.
    Set(Value),
    /// Remove the field from the item.
    Trim,
    /// Add a (possibly negative) delta to a numeric field.
    Increment(i64),
    /// Add values to the end of a list field.
    Append(Vec<Value>),
    /// Add values to the start of a list field.
    Prepend(Vec<Value>),
}

impl UpdateOperation {
    pub fn set(value: impl Into<Value>) -> Self {
        Self::Set(value.into())
    }

    pub fn trim() -> Self {
        Self::Trim
    }

    /// Increment by `delta`. Use `1` for the conventional counter bump.
    pub fn increment(delta: i64) -> Self {
        Self::Increment(delta)
    }

    /// Append `value`; a JSON array is taken as the list of values to append,
    /// anything else becomes a single-element list.
    pub fn append(value: impl Into<Value>) -> Self {
        Self::Append(into_values(value.into()))
    }

    /// Prepend `value`, with the same list normalization as [`UpdateOperation::append`].
    pub fn prepend(value: impl Into<Value>) -> Self {
        Self::Prepend(into_values(value.into()))
    }
}

impl From<Value> for UpdateOperation {
    fn from(value: Value) -> Self {
        Self::Set(value)
    }
}

fn into_values(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        other => vec![other],
    }
}

/// Insertion-ordered mapping of field name to [`UpdateOperation`].
///
/// Field names are unique: inserting a field again replaces its operation in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Updates {
    entries: Vec<(String, UpdateOperation)>,
}

impl Updates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the operation for `field`.
    pub fn insert(&mut self, field: impl Into<String>, operation: impl Into<UpdateOperation>) {
        let field = field.into();
        let operation = operation.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = operation,
            None => self.entries.push((field, operation)),
        }
    }

    /// Replace `field` with `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, UpdateOperation::set(value));
        self
    }

    /// Remove `field` from the item.
    pub fn trim(mut self, field: impl Into<String>) -> Self {
        self.insert(field, UpdateOperation::Trim);
        self
    }

    /// Add `delta` to the numeric `field`.
    pub fn increment(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.insert(field, UpdateOperation::Increment(delta));
        self
    }

    /// Append to the list `field`. See [`UpdateOperation::append`] for how `value` is read.
    pub fn append(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, UpdateOperation::append(value));
        self
    }

    /// Prepend to the list `field`.
    pub fn prepend(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, UpdateOperation::prepend(value));
        self
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateOperation)> {
        self.entries.iter().map(|(field, op)| (field.as_str(), op))
    }

    /// Classify every entry into its bucket. Each field lands in exactly one bucket.
    pub fn compile(&self) -> UpdatePayload {
        let mut payload = UpdatePayload::default();
        for (field, operation) in &self.entries {
            let field = field.clone();
            match operation {
                UpdateOperation::Set(value) => payload.set.push((field, value.clone())),
                UpdateOperation::Trim => payload.delete.push(field),
                UpdateOperation::Increment(delta) => payload.increment.push((field, *delta)),
                UpdateOperation::Append(values) => payload.append.push((field, values.clone())),
                UpdateOperation::Prepend(values) => payload.prepend.push((field, values.clone())),
            }
        }
        payload
    }
}

impl<K, V> FromIterator<(K, V)> for Updates
where
    K: Into<String>,
    V: Into<UpdateOperation>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut updates = Self::new();
        for (field, operation) in iter {
            updates.insert(field, operation);
        }
        updates
    }
}

/// Compiled wire form of [`Updates`]: one bucket per operation kind.
///
/// Within a bucket, fields keep the order in which they were inserted into [`Updates`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    pub set: Vec<(String, Value)>,
    pub increment: Vec<(String, i64)>,
    pub append: Vec<(String, Vec<Value>)>,
    pub prepend: Vec<(String, Vec<Value>)>,
    pub delete: Vec<String>,
}

impl UpdatePayload {
    /// Every field name across all buckets, in bucket order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.set
            .iter()
            .map(|(field, _)| field.as_str())
            .chain(self.increment.iter().map(|(field, _)| field.as_str()))
            .chain(self.append.iter().map(|(field, _)| field.as_str()))
            .chain(self.prepend.iter().map(|(field, _)| field.as_str()))
            .chain(self.delete.iter().map(String::as_str))
    }
}

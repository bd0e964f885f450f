//! Parameter placeholders.

use crate::error::Result;
use crate::value::{SqlValue, ToSqlValue};

use super::{ChunkKind, ChunkScope, SqlChunk};

/// One or more bound values written as parameter placeholders.
///
/// Several values, or consecutive value chunks, form a `, ` separated list.
/// An empty list writes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChunk {
    name: Option<String>,
    values: Vec<SqlValue>,
    indexed: bool,
}

impl ValueChunk {
    /// Creates a chunk binding one value under a generated name.
    #[must_use]
    pub fn new(value: impl ToSqlValue) -> Self {
        Self {
            name: None,
            values: vec![value.to_sql_value()],
            indexed: false,
        }
    }

    /// Creates a chunk binding one value under the given name.
    #[must_use]
    pub fn named(name: impl Into<String>, value: impl ToSqlValue) -> Self {
        Self {
            name: Some(name.into()),
            values: vec![value.to_sql_value()],
            indexed: false,
        }
    }

    /// Creates a chunk binding each value under its own generated name.
    #[must_use]
    pub fn list<T: ToSqlValue>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: None,
            values: values.into_iter().map(ToSqlValue::to_sql_value).collect(),
            indexed: true,
        }
    }

    /// Creates a chunk binding each value under `name` suffixed with its
    /// index (`name0`, `name1`, ...).
    #[must_use]
    pub fn named_list<T: ToSqlValue>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::list(values)
        }
    }

    fn parameter_name(&self, index: usize) -> Option<String> {
        match &self.name {
            Some(name) if self.indexed => Some(format!("{name}{index}")),
            Some(name) => Some(name.clone()),
            None => None,
        }
    }
}

impl SqlChunk for ValueChunk {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Value
    }

    fn init(&mut self, scope: &mut ChunkScope<'_>) -> Result<()> {
        for i in 0..self.values.len() {
            if let Some(name) = self.parameter_name(i) {
                scope.template_mut().reserve_parameter_name(name);
            }
        }
        Ok(())
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        if self.values.is_empty() {
            return Ok(());
        }
        scope.separate_by_comma_or_space(out);
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let name = self.parameter_name(i);
            scope.define_parameter(out, name.as_deref(), value.clone(), None);
        }
        Ok(())
    }
}

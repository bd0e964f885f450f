//! The output of a statement build.

use std::fmt;

use indexmap::IndexMap;

use crate::chunk::PARAMETER_MARKER;
use crate::template::ParameterValue;
use crate::value::SqlValue;

/// Generated SQL text with its named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSql {
    sql: String,
    parameters: IndexMap<String, ParameterValue>,
}

impl GeneratedSql {
    /// Creates the output from text and its bound parameters.
    #[must_use]
    pub const fn new(sql: String, parameters: IndexMap<String, ParameterValue>) -> Self {
        Self { sql, parameters }
    }

    /// Returns the SQL text, with `:name` placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters in binding order.
    #[must_use]
    pub const fn parameters(&self) -> &IndexMap<String, ParameterValue> {
        &self.parameters
    }

    /// Returns the value bound to a parameter name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&SqlValue> {
        self.parameters.get(name).map(|p| &p.value)
    }

    /// Consumes the output, returning the SQL text and the parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, IndexMap<String, ParameterValue>) {
        (self.sql, self.parameters)
    }

    /// Rewrites named placeholders into `?` for positional drivers.
    ///
    /// Values are returned in the order their placeholders appear in the
    /// text; a name used twice is bound twice. Quoted literals, quoted
    /// identifiers, `::` casts and names that were never bound are left
    /// untouched.
    ///
    /// ```rust
    /// use indexmap::IndexMap;
    /// use oxide_sqlgen::template::ParameterValue;
    /// use oxide_sqlgen::{GeneratedSql, SqlValue};
    ///
    /// let mut parameters = IndexMap::new();
    /// parameters.insert(
    ///     String::from("age"),
    ///     ParameterValue { value: SqlValue::Int(3), column: None },
    /// );
    /// let generated = GeneratedSql::new(
    ///     String::from("select ':age', x::text from t where age=:age"),
    ///     parameters,
    /// );
    ///
    /// let (sql, values) = generated.to_positional();
    /// assert_eq!(sql, "select ':age', x::text from t where age=?");
    /// assert_eq!(values, [SqlValue::Int(3)]);
    /// ```
    #[must_use]
    pub fn to_positional(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::new();
        let mut chars = self.sql.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            match c {
                '\'' | '"' => {
                    sql.push(c);
                    for (_, q) in chars.by_ref() {
                        sql.push(q);
                        if q == c {
                            break;
                        }
                    }
                }
                PARAMETER_MARKER => {
                    if chars.peek().is_some_and(|&(_, n)| n == PARAMETER_MARKER) {
                        sql.push(c);
                        if let Some((_, n)) = chars.next() {
                            sql.push(n);
                        }
                        continue;
                    }
                    let name_start = start + c.len_utf8();
                    let mut name_end = name_start;
                    while let Some(&(i, n)) = chars.peek() {
                        if !(n.is_alphanumeric() || n == '_') {
                            break;
                        }
                        name_end = i + n.len_utf8();
                        chars.next();
                    }
                    let name = &self.sql[name_start..name_end];
                    match self.parameters.get(name) {
                        Some(parameter) if !name.is_empty() => {
                            sql.push('?');
                            values.push(parameter.value.clone());
                        }
                        _ => {
                            sql.push(c);
                            sql.push_str(name);
                        }
                    }
                }
                _ => sql.push(c),
            }
        }
        (sql, values)
    }
}

impl fmt::Display for GeneratedSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

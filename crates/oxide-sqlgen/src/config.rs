//! Naming configuration for entity tables and columns.
//!
//! Entities that do not spell out their table or column names get them
//! derived from the entity and property names through a [`NamingStrategy`].
//!
//! ```rust
//! use oxide_sqlgen::config::{NamingStrategy, OomConfig};
//!
//! let config = OomConfig::new()
//!     .schema("app")
//!     .table_naming(NamingStrategy::new().prefix("t_").uppercase(true));
//!
//! assert_eq!(config.table_naming.apply("BoyFriend"), "t_BOY_FRIEND");
//! ```

use serde::Deserialize;

/// Converts entity or property names into SQL identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamingStrategy {
    /// Prepended to every generated name.
    pub prefix: String,
    /// Appended to every generated name.
    pub suffix: String,
    /// Turns `camelCase` into `camel_case`.
    pub split_camel_case: bool,
    /// Upper-cases generated names; they are lower-cased otherwise.
    pub uppercase: bool,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            split_camel_case: true,
            uppercase: false,
        }
    }
}

impl NamingStrategy {
    /// Creates the default strategy (`snake_case`, lower case, no affixes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Enables or disables camel case splitting.
    #[must_use]
    pub const fn split_camel_case(mut self, enabled: bool) -> Self {
        self.split_camel_case = enabled;
        self
    }

    /// Enables or disables upper-casing.
    #[must_use]
    pub const fn uppercase(mut self, enabled: bool) -> Self {
        self.uppercase = enabled;
        self
    }

    /// Converts a name according to this strategy.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        let base = if self.split_camel_case {
            split_camel_case(name)
        } else {
            String::from(name)
        };
        let base = if self.uppercase {
            base.to_uppercase()
        } else {
            base.to_lowercase()
        };
        format!("{}{base}{}", self.prefix, self.suffix)
    }
}

/// Configuration shared by every entity registered with a manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OomConfig {
    /// Schema for tables that do not declare their own.
    pub schema: Option<String>,
    /// Strategy for table names.
    pub table_naming: NamingStrategy,
    /// Strategy for column names.
    pub column_naming: NamingStrategy,
}

impl OomConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the table naming strategy.
    #[must_use]
    pub fn table_naming(mut self, strategy: NamingStrategy) -> Self {
        self.table_naming = strategy;
        self
    }

    /// Sets the column naming strategy.
    #[must_use]
    pub fn column_naming(mut self, strategy: NamingStrategy) -> Self {
        self.column_naming = strategy;
        self
    }
}

fn split_camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if previous_lower {
                result.push('_');
            }
            previous_lower = false;
        } else {
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
        }
        result.push(c);
    }
    result
}

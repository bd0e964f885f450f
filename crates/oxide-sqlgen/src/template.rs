//! Per-statement working context shared by all chunks of a chain.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::entity::{ColumnDescriptor, EntityDescriptor};
use crate::error::{Result, SqlGenError};
use crate::value::SqlValue;

/// A table reference bound during chunk initialization.
#[derive(Debug, Clone)]
pub struct TableRefData {
    /// Descriptor of the referenced entity.
    pub descriptor: Arc<EntityDescriptor>,
    /// Alias written in the query, if any.
    pub alias: Option<String>,
}

/// A value bound to a named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValue {
    /// The bound value.
    pub value: SqlValue,
    /// The column the value belongs to, if known.
    pub column: Option<ColumnDescriptor>,
}

/// Mutable state of one statement generation: table references, their
/// aliases, bound parameters and the parameter name generator.
///
/// Both table references and parameters keep registration order.
#[derive(Debug, Default)]
pub struct TemplateData {
    table_refs: IndexMap<String, TableRefData>,
    parameters: IndexMap<String, ParameterValue>,
    reserved_names: IndexSet<String>,
    parameter_count: usize,
}

impl TemplateData {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears table references, reserved names, parameters and the name
    /// generator.
    pub fn reset(&mut self) {
        self.table_refs.clear();
        self.reserved_names.clear();
        self.reset_parameters();
    }

    /// Clears parameters and restarts the name generator. Reserved names
    /// are kept.
    pub fn reset_parameters(&mut self) {
        self.parameters.clear();
        self.parameter_count = 0;
    }

    /// Binds a table reference to an entity descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::DuplicateTableRef`] if the reference is
    /// already bound.
    pub fn register_table_ref(
        &mut self,
        table_ref: impl Into<String>,
        descriptor: Arc<EntityDescriptor>,
        alias: Option<String>,
    ) -> Result<()> {
        let table_ref = table_ref.into();
        if self.table_refs.contains_key(&table_ref) {
            return Err(SqlGenError::DuplicateTableRef(table_ref));
        }
        self.table_refs
            .insert(table_ref, TableRefData { descriptor, alias });
        Ok(())
    }

    /// Returns the descriptor bound to a table reference.
    #[must_use]
    pub fn table_descriptor(&self, table_ref: &str) -> Option<Arc<EntityDescriptor>> {
        self.table_refs
            .get(table_ref)
            .map(|data| Arc::clone(&data.descriptor))
    }

    /// Returns the alias bound to a table reference.
    #[must_use]
    pub fn table_alias(&self, table_ref: &str) -> Option<&str> {
        self.table_refs
            .get(table_ref)
            .and_then(|data| data.alias.as_deref())
    }

    /// Finds the first registered table declaring the given property, or
    /// failing that, the given column name.
    #[must_use]
    pub fn find_table_descriptor_by_column_ref(
        &self,
        column_ref: &str,
    ) -> Option<Arc<EntityDescriptor>> {
        let tables = || self.table_refs.values().map(|data| &data.descriptor);
        tables()
            .find(|ded| ded.find_by_property_name(column_ref).is_some())
            .or_else(|| tables().find(|ded| ded.find_by_column_name(column_ref).is_some()))
            .map(Arc::clone)
    }

    /// Returns all bound table references in registration order.
    pub fn table_refs(&self) -> impl Iterator<Item = (&str, &TableRefData)> {
        self.table_refs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Generates a fresh parameter name, unique until the next reset.
    ///
    /// Names already bound or reserved are never handed out.
    pub fn next_parameter_name(&mut self) -> String {
        loop {
            let name = format!("p{}", self.parameter_count);
            self.parameter_count += 1;
            if !self.parameters.contains_key(&name) && !self.reserved_names.contains(&name) {
                return name;
            }
        }
    }

    /// Keeps `name` away from the name generator until the next [`reset`],
    /// so an explicit binding later in the statement does not collide with
    /// a generated one.
    ///
    /// [`reset`]: Self::reset
    pub fn reserve_parameter_name(&mut self, name: impl Into<String>) {
        self.reserved_names.insert(name.into());
    }

    /// Binds a value to a parameter name, replacing any earlier binding.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: SqlValue,
        column: Option<ColumnDescriptor>,
    ) {
        self.parameters
            .insert(name.into(), ParameterValue { value, column });
    }

    /// Returns the value bound to a parameter name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// Returns all bound parameters in binding order.
    #[must_use]
    pub const fn parameters(&self) -> &IndexMap<String, ParameterValue> {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::fixtures::{manager, Boy, Girl};
    use crate::entity::{EntityProvider, EntityType};

    fn descriptors() -> (Arc<EntityDescriptor>, Arc<EntityDescriptor>) {
        let manager = manager();
        (
            manager.lookup_type(EntityType::of::<Boy>()).unwrap(),
            manager.lookup_type(EntityType::of::<Girl>()).unwrap(),
        )
    }

    #[test]
    fn test_table_ref_binding() {
        let (boy, _) = descriptors();
        let mut data = TemplateData::new();
        data.register_table_ref("b", boy, Some(String::from("b")))
            .unwrap();

        assert_eq!(data.table_descriptor("b").unwrap().entity_name(), "Boy");
        assert_eq!(data.table_alias("b"), Some("b"));
        assert!(data.table_descriptor("Boy").is_none());
        assert!(data.table_alias("x").is_none());
    }

    #[test]
    fn test_duplicate_table_ref() {
        let (boy, girl) = descriptors();
        let mut data = TemplateData::new();
        data.register_table_ref("t", boy, None).unwrap();
        let result = data.register_table_ref("t", girl, None);
        assert!(matches!(result, Err(SqlGenError::DuplicateTableRef(r)) if r == "t"));
    }

    #[test]
    fn test_column_ref_prefers_first_table() {
        let (boy, girl) = descriptors();
        let mut data = TemplateData::new();
        data.register_table_ref("g", girl, None).unwrap();
        data.register_table_ref("b", boy, None).unwrap();

        let by_name = data.find_table_descriptor_by_column_ref("name").unwrap();
        assert_eq!(by_name.entity_name(), "Girl");
        let by_property = data.find_table_descriptor_by_column_ref("girl_id").unwrap();
        assert_eq!(by_property.entity_name(), "Boy");
        let by_column = data.find_table_descriptor_by_column_ref("SPECIALITY").unwrap();
        assert_eq!(by_column.entity_name(), "Girl");
        assert!(data.find_table_descriptor_by_column_ref("speed").is_none());
    }

    #[test]
    fn test_parameter_names_and_reset() {
        let mut data = TemplateData::new();
        assert_eq!(data.next_parameter_name(), "p0");
        assert_eq!(data.next_parameter_name(), "p1");
        data.add_parameter("p1", SqlValue::Int(1), None);
        data.add_parameter("age", SqlValue::Int(2), None);
        data.add_parameter("p1", SqlValue::Int(3), None);

        let names: Vec<&String> = data.parameters().keys().collect();
        assert_eq!(names, ["p1", "age"]);
        assert_eq!(data.parameter("p1").unwrap().value, SqlValue::Int(3));

        data.reset();
        assert!(data.parameters().is_empty());
        assert_eq!(data.next_parameter_name(), "p0");
    }

    #[test]
    fn test_generated_names_skip_bound_names() {
        let mut data = TemplateData::new();
        data.add_parameter("p0", SqlValue::Int(1), None);
        data.add_parameter("p2", SqlValue::Int(2), None);

        assert_eq!(data.next_parameter_name(), "p1");
        assert_eq!(data.next_parameter_name(), "p3");
        assert_eq!(data.parameter("p0").unwrap().value, SqlValue::Int(1));
    }

    #[test]
    fn test_reserved_names_survive_parameter_reset() {
        let mut data = TemplateData::new();
        data.reserve_parameter_name("p0");
        data.reset_parameters();
        assert_eq!(data.next_parameter_name(), "p1");

        data.reset();
        assert_eq!(data.next_parameter_name(), "p0");
    }
}

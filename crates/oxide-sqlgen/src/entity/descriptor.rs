//! Resolved table and column descriptors.

use crate::config::OomConfig;

use super::{EntitySchema, EntityType, PropertySchema, PropertyType};

/// A mapped column of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    property_name: String,
    column_name: String,
    property_type: PropertyType,
    nullable: bool,
    id: bool,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        column_name: impl Into<String>,
        property_type: PropertyType,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            column_name: column_name.into(),
            property_type,
            nullable: false,
            id: false,
        }
    }

    /// Marks the column as the identity column.
    #[must_use]
    pub const fn id(mut self) -> Self {
        self.id = true;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    fn from_schema(property: &PropertySchema, config: &OomConfig) -> Self {
        let column_name = property.column.map_or_else(
            || config.column_naming.apply(property.property),
            String::from,
        );
        Self {
            property_name: String::from(property.property),
            column_name,
            property_type: property.property_type,
            nullable: property.nullable,
            id: property.id,
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Returns the SQL column name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Returns the declared property type.
    #[must_use]
    pub const fn property_type(&self) -> PropertyType {
        self.property_type
    }

    /// Returns whether the property may be absent.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns whether this is an identity column.
    #[must_use]
    pub const fn is_id(&self) -> bool {
        self.id
    }

    /// Returns whether the property is a plain (non-optional) number.
    ///
    /// Such a property always holds a value, so zero stands for "not set".
    #[must_use]
    pub const fn is_primitive_numeric(&self) -> bool {
        self.property_type.is_numeric() && !self.nullable
    }
}

/// Table-level metadata of a registered entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    entity_name: String,
    entity_type: EntityType,
    table_name: String,
    schema_name: Option<String>,
    columns: Vec<ColumnDescriptor>,
}

impl EntityDescriptor {
    /// Creates a descriptor from explicit parts.
    #[must_use]
    pub fn new(
        entity_name: impl Into<String>,
        entity_type: EntityType,
        table_name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            entity_type,
            table_name: table_name.into(),
            schema_name: None,
            columns,
        }
    }

    /// Sets the schema name.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    /// Resolves a static schema, naming what the schema leaves unnamed.
    #[must_use]
    pub fn from_schema(entity_type: EntityType, schema: &EntitySchema, config: &OomConfig) -> Self {
        let table_name = schema
            .table
            .map_or_else(|| config.table_naming.apply(schema.name), String::from);
        let schema_name = schema
            .schema
            .map(String::from)
            .or_else(|| config.schema.clone());
        let columns = schema
            .properties
            .iter()
            .map(|p| ColumnDescriptor::from_schema(p, config))
            .collect();
        Self {
            entity_name: String::from(schema.name),
            entity_type,
            table_name,
            schema_name,
            columns,
        }
    }

    /// Returns the entity name.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Returns the runtime type of the entity.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the bare table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the schema name, if any.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    /// Returns the table name as written in queries (`schema.table`).
    #[must_use]
    pub fn table_name_for_query(&self) -> String {
        match &self.schema_name {
            Some(schema) => format!("{schema}.{}", self.table_name),
            None => self.table_name.clone(),
        }
    }

    /// Returns all mapped columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the identity columns.
    pub fn id_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_id())
    }

    /// Returns whether the entity has an identity column.
    #[must_use]
    pub fn has_id(&self) -> bool {
        self.columns.iter().any(ColumnDescriptor::is_id)
    }

    /// Finds a column by property name.
    #[must_use]
    pub fn find_by_property_name(&self, property: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.property_name == property)
    }

    /// Finds a column by SQL column name, ignoring case.
    #[must_use]
    pub fn find_by_column_name(&self, column: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.column_name.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingStrategy;
    use crate::entity::fixtures::{Boy, Girl};
    use crate::entity::DescribeEntity;

    #[test]
    fn test_default_naming() {
        let ded = EntityDescriptor::from_schema(
            EntityType::of::<Boy>(),
            &Boy::SCHEMA,
            &OomConfig::default(),
        );
        assert_eq!(ded.entity_name(), "Boy");
        assert_eq!(ded.table_name_for_query(), "boy");
        let names: Vec<&str> = ded.columns().iter().map(ColumnDescriptor::column_name).collect();
        assert_eq!(names, ["id", "name", "girl_id"]);
    }

    #[test]
    fn test_explicit_names_bypass_naming() {
        let config = OomConfig::new()
            .table_naming(NamingStrategy::new().prefix("x_"))
            .column_naming(NamingStrategy::new().uppercase(true));
        let ded = EntityDescriptor::from_schema(EntityType::of::<Girl>(), &Girl::SCHEMA, &config);
        assert_eq!(ded.table_name(), "GIRLS");
        assert_eq!(ded.find_by_property_name("age").unwrap().column_name(), "AGE");
    }

    #[test]
    fn test_config_schema_applies() {
        let config = OomConfig::new()
            .schema("school")
            .column_naming(NamingStrategy::new().uppercase(true));
        let ded = EntityDescriptor::from_schema(EntityType::of::<Boy>(), &Boy::SCHEMA, &config);
        assert_eq!(ded.schema_name(), Some("school"));
        assert_eq!(ded.table_name_for_query(), "school.boy");
        assert_eq!(ded.find_by_property_name("girl_id").unwrap().column_name(), "GIRL_ID");
    }

    #[test]
    fn test_id_columns() {
        let ded = EntityDescriptor::from_schema(
            EntityType::of::<Girl>(),
            &Girl::SCHEMA,
            &OomConfig::default(),
        );
        assert!(ded.has_id());
        let ids: Vec<&str> = ded.id_columns().map(ColumnDescriptor::property_name).collect();
        assert_eq!(ids, ["id"]);
        assert!(ded.find_by_column_name("speciality").is_some());
        assert!(ded.find_by_property_name("SPECIALITY").is_none());
    }

    #[test]
    fn test_primitive_numeric() {
        let age = ColumnDescriptor::new("age", "AGE", PropertyType::Integer);
        assert!(age.is_primitive_numeric());
        assert!(!age.clone().nullable().is_primitive_numeric());
        assert!(!ColumnDescriptor::new("n", "N", PropertyType::Text).is_primitive_numeric());
    }
}

//! Entity metadata.
//!
//! Persistent types describe themselves through a static [`EntitySchema`]
//! (usually produced by `#[derive(DbEntity)]`). A [`DbEntityManager`] turns
//! schemas into [`EntityDescriptor`]s, applying the configured naming, and
//! answers lookups by entity name or by runtime type.

mod descriptor;
mod manager;

use std::any::TypeId;
use std::fmt;

pub use descriptor::{ColumnDescriptor, EntityDescriptor};
pub use manager::{DbEntityManager, EntityProvider};

use crate::value::SqlValue;

/// Declared type of an entity property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Any integer type.
    Integer,
    /// `f32` or `f64`.
    Float,
    /// `bool`.
    Boolean,
    /// Character data.
    Text,
    /// Binary data.
    Blob,
    /// Anything else.
    Other,
}

impl PropertyType {
    /// Returns `true` for integer and floating point types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

/// Static description of one entity property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySchema {
    /// Property (field) name.
    pub property: &'static str,
    /// Explicit column name; derived from the property name when absent.
    pub column: Option<&'static str>,
    /// Declared property type.
    pub property_type: PropertyType,
    /// Whether the property may hold no value (`Option<T>`).
    pub nullable: bool,
    /// Whether the property maps to an identity column.
    pub id: bool,
}

/// Static description of a persistent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Entity name used by name lookups.
    pub name: &'static str,
    /// Explicit table name; derived from the entity name when absent.
    pub table: Option<&'static str>,
    /// Explicit schema name.
    pub schema: Option<&'static str>,
    /// Mapped properties, in declaration order.
    pub properties: &'static [PropertySchema],
}

/// Runtime type token of an entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    /// Returns the token of `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityType({})", self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A persistent object whose properties can be read by name.
///
/// This trait is object safe so chunks can hold `&dyn DbEntity`.
pub trait DbEntity: 'static {
    /// Returns the runtime type of this object.
    fn entity_type(&self) -> EntityType;

    /// Returns the current value of a property, or `None` if the entity has
    /// no such property.
    fn property_value(&self, property: &str) -> Option<SqlValue>;
}

impl fmt::Debug for dyn DbEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DbEntity({})", self.entity_type())
    }
}

/// An entity type with a static schema.
pub trait DescribeEntity: DbEntity + Sized {
    /// The entity schema.
    const SCHEMA: EntitySchema;
}

/// Anything that designates an entity type: either the type token itself
/// or an instance, which designates its own type.
pub trait ResolveEntityType {
    /// Returns the designated entity type.
    fn resolve_entity_type(&self) -> EntityType;
}

impl ResolveEntityType for EntityType {
    fn resolve_entity_type(&self) -> EntityType {
        *self
    }
}

impl<T: DbEntity> ResolveEntityType for T {
    fn resolve_entity_type(&self) -> EntityType {
        self.entity_type()
    }
}

impl ResolveEntityType for dyn DbEntity {
    fn resolve_entity_type(&self) -> EntityType {
        self.entity_type()
    }
}

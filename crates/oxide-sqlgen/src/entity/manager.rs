//! Registry of persistent entities.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::OomConfig;
use crate::error::{Result, SqlGenError};

use super::{DescribeEntity, EntityDescriptor, EntitySchema, EntityType};

/// Read-only source of entity metadata consumed by chunks.
///
/// Implementations are queried, never mutated, during generation and may
/// be shared between any number of concurrent statement builds.
pub trait EntityProvider {
    /// Looks up an entity by its name.
    fn lookup_name(&self, name: &str) -> Option<Arc<EntityDescriptor>>;

    /// Looks up an entity by its runtime type.
    fn lookup_type(&self, entity_type: EntityType) -> Option<Arc<EntityDescriptor>>;
}

/// The default [`EntityProvider`]: entities registered up front.
///
/// # Example
///
/// ```rust
/// use oxide_sqlgen::entity::{
///     DbEntity, DbEntityManager, DescribeEntity, EntitySchema, EntityType, PropertySchema,
///     PropertyType,
/// };
/// use oxide_sqlgen::{EntityProvider, SqlValue};
///
/// struct Tag;
///
/// impl DbEntity for Tag {
///     fn entity_type(&self) -> EntityType {
///         EntityType::of::<Self>()
///     }
///     fn property_value(&self, _property: &str) -> Option<SqlValue> {
///         None
///     }
/// }
///
/// impl DescribeEntity for Tag {
///     const SCHEMA: EntitySchema = EntitySchema {
///         name: "Tag",
///         table: None,
///         schema: None,
///         properties: &[PropertySchema {
///             property: "id",
///             column: None,
///             property_type: PropertyType::Integer,
///             nullable: false,
///             id: true,
///         }],
///     };
/// }
///
/// let mut manager = DbEntityManager::new();
/// manager.register::<Tag>().unwrap();
/// assert_eq!(manager.lookup_name("Tag").unwrap().table_name(), "tag");
/// ```
#[derive(Debug, Default)]
pub struct DbEntityManager {
    config: OomConfig,
    by_name: HashMap<String, Arc<EntityDescriptor>>,
    by_type: HashMap<EntityType, Arc<EntityDescriptor>>,
}

impl DbEntityManager {
    /// Creates an empty manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty manager with the given configuration.
    #[must_use]
    pub fn with_config(config: OomConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &OomConfig {
        &self.config
    }

    /// Registers an entity type.
    ///
    /// Registering the same type again returns the existing descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::DuplicateEntity`] if another type is already
    /// registered under the same entity name.
    pub fn register<T: DescribeEntity>(&mut self) -> Result<Arc<EntityDescriptor>> {
        self.register_schema(EntityType::of::<T>(), &T::SCHEMA)
    }

    /// Registers a schema for an arbitrary type token.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::DuplicateEntity`] if another type is already
    /// registered under the same entity name.
    pub fn register_schema(
        &mut self,
        entity_type: EntityType,
        schema: &EntitySchema,
    ) -> Result<Arc<EntityDescriptor>> {
        if let Some(existing) = self.by_type.get(&entity_type) {
            return Ok(Arc::clone(existing));
        }
        let descriptor = EntityDescriptor::from_schema(entity_type, schema, &self.config);
        self.insert(descriptor)
    }

    /// Registers a fully built descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::DuplicateEntity`] if another type is already
    /// registered under the same entity name.
    pub fn register_descriptor(&mut self, descriptor: EntityDescriptor) -> Result<Arc<EntityDescriptor>> {
        if let Some(existing) = self.by_type.get(&descriptor.entity_type()) {
            return Ok(Arc::clone(existing));
        }
        self.insert(descriptor)
    }

    fn insert(&mut self, descriptor: EntityDescriptor) -> Result<Arc<EntityDescriptor>> {
        if self.by_name.contains_key(descriptor.entity_name()) {
            return Err(SqlGenError::DuplicateEntity(String::from(descriptor.entity_name())));
        }
        debug!(
            entity = descriptor.entity_name(),
            table = %descriptor.table_name_for_query(),
            "registered entity"
        );
        let descriptor = Arc::new(descriptor);
        self.by_name
            .insert(String::from(descriptor.entity_name()), Arc::clone(&descriptor));
        self.by_type
            .insert(descriptor.entity_type(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns whether no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl EntityProvider for DbEntityManager {
    fn lookup_name(&self, name: &str) -> Option<Arc<EntityDescriptor>> {
        self.by_name.get(name).cloned()
    }

    fn lookup_type(&self, entity_type: EntityType) -> Option<Arc<EntityDescriptor>> {
        self.by_type.get(&entity_type).cloned()
    }
}

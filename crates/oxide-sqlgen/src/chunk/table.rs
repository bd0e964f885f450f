//! Table declarations.

use std::sync::Arc;

use crate::entity::{EntityDescriptor, EntityType, ResolveEntityType};
use crate::error::{Result, SqlGenError};

use super::{ChunkKind, ChunkScope, SqlChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableSource {
    Name(String),
    Type(EntityType),
}

/// Declares a table, optionally aliased, and binds its reference.
///
/// The reference other chunks use to reach the table is the alias when
/// there is one, the entity name otherwise. Consecutive tables form a
/// `, ` separated list.
#[derive(Debug, Clone)]
pub struct TableChunk {
    source: TableSource,
    alias: Option<String>,
    descriptor: Option<Arc<EntityDescriptor>>,
}

impl TableChunk {
    /// Declares the table of a named entity.
    #[must_use]
    pub fn by_name(entity_name: impl Into<String>, alias: Option<&str>) -> Self {
        Self::from_source(TableSource::Name(entity_name.into()), alias)
    }

    /// Declares the table of an entity type, given as a type token or as
    /// an instance.
    #[must_use]
    pub fn of<E: ResolveEntityType + ?Sized>(entity: &E, alias: Option<&str>) -> Self {
        Self::from_source(TableSource::Type(entity.resolve_entity_type()), alias)
    }

    fn from_source(source: TableSource, alias: Option<&str>) -> Self {
        Self {
            source,
            alias: alias.map(String::from),
            descriptor: None,
        }
    }

    /// Returns the alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl SqlChunk for TableChunk {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Table
    }

    fn init(&mut self, scope: &mut ChunkScope<'_>) -> Result<()> {
        let descriptor = match &self.source {
            TableSource::Name(name) => scope.lookup_name(name)?,
            TableSource::Type(entity_type) => scope.lookup_type(entity_type)?,
        };
        let table_ref = self
            .alias
            .clone()
            .unwrap_or_else(|| String::from(descriptor.entity_name()));
        scope.register_table_ref(table_ref, Arc::clone(&descriptor), self.alias.clone())?;
        self.descriptor = Some(descriptor);
        Ok(())
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let descriptor = self.descriptor.as_ref().ok_or(SqlGenError::NotInitialized)?;
        scope.separate_by_comma_or_space(out);
        out.push_str(&descriptor.table_name_for_query());
        if let Some(alias) = &self.alias {
            out.push(' ');
            out.push_str(alias);
        }
        Ok(())
    }
}

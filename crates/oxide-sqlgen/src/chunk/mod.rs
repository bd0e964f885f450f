//! SQL chunks: composable fragments of a statement.
//!
//! A statement is a [`ChunkChain`] of chunks. Generation runs in two passes:
//! every chunk is first initialized (tables register their references and
//! aliases), then every chunk appends its text to one shared buffer. Each
//! chunk only ever looks at the kind of its immediate predecessor to decide
//! how to separate itself from what came before:
//!
//! - a chunk following one of the same kind continues a list (`, `);
//! - anything else is separated by a single space, never doubled.
//!
//! A chunk that appends nothing (an empty value list, say) is invisible to
//! its successor, which is then separated from the last chunk that did.
//!
//! ```rust
//! use oxide_sqlgen::chunk::{ChunkChain, RawChunk, ValueChunk};
//! use oxide_sqlgen::{DbEntityManager, SqlValue, TemplateData};
//!
//! let entities = DbEntityManager::new();
//! let mut template = TemplateData::new();
//! let mut chain = ChunkChain::new();
//! chain.append(RawChunk::new("select"));
//! chain.append(ValueChunk::new(SqlValue::Int(1)));
//! chain.append(ValueChunk::named("two", SqlValue::Int(2)));
//!
//! let sql = chain.render(&entities, &mut template).unwrap();
//! assert_eq!(sql, "select :p0, :two");
//! assert_eq!(template.parameters().len(), 2);
//! ```

mod chain;
mod columns;
mod insert;
mod matching;
mod raw;
mod reference;
mod table;
mod update;
mod value;

use std::fmt;
use std::sync::Arc;

pub use chain::{ChunkChain, ChunkId};
pub use columns::SelectColumnsChunk;
pub use insert::InsertChunk;
pub use matching::MatchChunk;
pub use raw::RawChunk;
pub use reference::ReferenceChunk;
pub use table::TableChunk;
pub use update::UpdateChunk;
pub use value::ValueChunk;

use crate::entity::{
    ColumnDescriptor, DbEntity, EntityDescriptor, EntityProvider, ResolveEntityType,
};
use crate::error::{Result, SqlGenError};
use crate::template::TemplateData;
use crate::value::SqlValue;

/// Marker written in front of every parameter name.
pub const PARAMETER_MARKER: char = ':';

/// The role of a chunk in a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// Verbatim SQL text.
    Raw,
    /// A list of selected columns.
    SelectColumns,
    /// A table with optional alias.
    Table,
    /// A column or table reference.
    Reference,
    /// A conjunction of column matches.
    Match,
    /// Parameter placeholders.
    Value,
    /// A complete insert statement.
    Insert,
    /// An update `set` clause.
    Update,
}

impl ChunkKind {
    /// Returns `true` for every kind except [`ChunkKind::Raw`].
    #[must_use]
    pub const fn is_macro(self) -> bool {
        !matches!(self, Self::Raw)
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::SelectColumns => "select-columns",
            Self::Table => "table",
            Self::Reference => "reference",
            Self::Match => "match",
            Self::Value => "value",
            Self::Insert => "insert",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// A chunk's kind together with the kind of its predecessor.
///
/// All predicates answer `false` when there is no predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPosition {
    /// Kind of the chunk itself.
    pub kind: ChunkKind,
    /// Kind of the preceding chunk, if any.
    pub previous: Option<ChunkKind>,
}

impl ChunkPosition {
    /// Returns `true` if the previous chunk is of the given kind.
    #[must_use]
    pub fn is_previous_chunk_of_kind(&self, kind: ChunkKind) -> bool {
        self.previous == Some(kind)
    }

    /// Returns `true` if the previous chunk is of the same kind.
    #[must_use]
    pub fn is_previous_chunk_of_same_kind(&self) -> bool {
        self.is_previous_chunk_of_kind(self.kind)
    }

    /// Returns `true` if the previous chunk is not raw.
    #[must_use]
    pub fn is_previous_macro_chunk(&self) -> bool {
        self.previous.is_some_and(ChunkKind::is_macro)
    }

    /// Returns `true` if the previous chunk is raw.
    #[must_use]
    pub fn is_previous_raw_chunk(&self) -> bool {
        self.is_previous_chunk_of_kind(ChunkKind::Raw)
    }
}

/// One composable piece of SQL generation.
///
/// `init` is called on every chunk of a chain before `process` is called
/// on any of them. Both may run again when the chain is rendered again, so
/// `init` has to overwrite rather than accumulate state.
pub trait SqlChunk: fmt::Debug {
    /// Returns the kind of this chunk. Must never change.
    fn kind(&self) -> ChunkKind;

    /// Performs one-time preparation against the template context.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if metadata the chunk depends on is missing.
    fn init(&mut self, scope: &mut ChunkScope<'_>) -> Result<()> {
        let _ = scope;
        Ok(())
    }

    /// Appends this chunk's SQL to `out`.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if metadata the chunk depends on is missing.
    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()>;
}

/// Services available to a chunk while it is initialized or processed.
///
/// A scope borrows the entity provider and the one template context shared
/// by the whole chain, and knows the chunk's position in it.
pub struct ChunkScope<'s> {
    entities: &'s dyn EntityProvider,
    template: &'s mut TemplateData,
    position: ChunkPosition,
}

impl<'s> ChunkScope<'s> {
    /// Creates a scope for a chunk at the given position.
    #[must_use]
    pub const fn new(
        entities: &'s dyn EntityProvider,
        template: &'s mut TemplateData,
        position: ChunkPosition,
    ) -> Self {
        Self {
            entities,
            template,
            position,
        }
    }

    /// Returns the chunk's position.
    #[must_use]
    pub const fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Returns the template context.
    #[must_use]
    pub const fn template(&self) -> &TemplateData {
        &*self.template
    }

    /// Returns the template context for modification.
    pub const fn template_mut(&mut self) -> &mut TemplateData {
        &mut *self.template
    }

    /// See [`ChunkPosition::is_previous_chunk_of_kind`].
    #[must_use]
    pub fn is_previous_chunk_of_kind(&self, kind: ChunkKind) -> bool {
        self.position.is_previous_chunk_of_kind(kind)
    }

    /// See [`ChunkPosition::is_previous_chunk_of_same_kind`].
    #[must_use]
    pub fn is_previous_chunk_of_same_kind(&self) -> bool {
        self.position.is_previous_chunk_of_same_kind()
    }

    /// See [`ChunkPosition::is_previous_macro_chunk`].
    #[must_use]
    pub fn is_previous_macro_chunk(&self) -> bool {
        self.position.is_previous_macro_chunk()
    }

    /// See [`ChunkPosition::is_previous_raw_chunk`].
    #[must_use]
    pub fn is_previous_raw_chunk(&self) -> bool {
        self.position.is_previous_raw_chunk()
    }

    /// Looks up an entity by name.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::UnknownEntity`] if the name is not registered.
    pub fn lookup_name(&self, entity_name: &str) -> Result<Arc<EntityDescriptor>> {
        self.entities
            .lookup_name(entity_name)
            .ok_or_else(|| SqlGenError::UnknownEntity(String::from(entity_name)))
    }

    /// Looks up an entity by type token or by instance.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::InvalidEntity`] if the type is not registered.
    pub fn lookup_type<E: ResolveEntityType + ?Sized>(
        &self,
        entity: &E,
    ) -> Result<Arc<EntityDescriptor>> {
        let entity_type = entity.resolve_entity_type();
        self.entities
            .lookup_type(entity_type)
            .ok_or_else(|| SqlGenError::InvalidEntity(String::from(entity_type.name())))
    }

    /// Looks up the entity bound to a table reference.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::UnknownTableRef`] if the reference is unbound.
    pub fn lookup_table_ref(&self, table_ref: &str) -> Result<Arc<EntityDescriptor>> {
        self.find_table_ref(table_ref)
            .ok_or_else(|| SqlGenError::UnknownTableRef(String::from(table_ref)))
    }

    /// Looks up the entity bound to a table reference, if any.
    #[must_use]
    pub fn find_table_ref(&self, table_ref: &str) -> Option<Arc<EntityDescriptor>> {
        self.template.table_descriptor(table_ref)
    }

    /// Finds the table in the context that declares a column.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::UnknownColumnRef`] if no table declares it.
    pub fn find_column_ref(&self, column_ref: &str) -> Result<Arc<EntityDescriptor>> {
        self.template
            .find_table_descriptor_by_column_ref(column_ref)
            .ok_or_else(|| SqlGenError::UnknownColumnRef(String::from(column_ref)))
    }

    /// Binds a table reference in the template context.
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
        self.template.register_table_ref(table_ref, descriptor, alias)
    }

    /// Returns the alias bound to `table_ref`, or the descriptor's table
    /// name when there is none.
    #[must_use]
    pub fn resolve_table(&self, table_ref: &str, descriptor: &EntityDescriptor) -> String {
        self.template
            .table_alias(table_ref)
            .map_or_else(|| descriptor.table_name_for_query(), String::from)
    }

    /// Writes a parameter placeholder and binds `value` under the same name.
    ///
    /// A fresh name is generated when `name` is `None`. Returns the name used.
    pub fn define_parameter(
        &mut self,
        out: &mut String,
        name: Option<&str>,
        value: SqlValue,
        column: Option<&ColumnDescriptor>,
    ) -> String {
        let name = name.map_or_else(|| self.template.next_parameter_name(), String::from);
        out.push(PARAMETER_MARKER);
        out.push_str(&name);
        self.template
            .add_parameter(name.clone(), value, column.cloned());
        name
    }

    /// Writes `, ` after a chunk of the same kind, otherwise a missing space.
    pub fn separate_by_comma_or_space(&self, out: &mut String) {
        if self.is_previous_chunk_of_same_kind() {
            out.push_str(", ");
        } else {
            append_missing_space(out);
        }
    }
}

/// Appends a space unless `out` is empty or already ends with whitespace.
pub fn append_missing_space(out: &mut String) {
    if out.chars().next_back().is_some_and(|c| !c.is_whitespace()) {
        out.push(' ');
    }
}

/// Returns `true` if `value` counts as "not set" for `column`.
///
/// A value is empty when it is NULL, when it is zero in an identity column
/// or in a plain numeric column, or when it is blank text.
#[must_use]
pub fn is_empty_column_value(column: &ColumnDescriptor, value: &SqlValue) -> bool {
    if value.is_null() {
        return true;
    }
    let is_zero = value.as_f64().is_some_and(|n| n == 0.0);
    if is_zero && (column.is_id() || column.is_primitive_numeric()) {
        return true;
    }
    value.as_text().is_some_and(|s| s.trim().is_empty())
}

/// Which columns of an entity a value-bearing chunk takes into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    /// Only columns whose value is not empty.
    #[default]
    OnlyExisting,
    /// Only identity columns.
    OnlyIds,
    /// All columns.
    All,
    /// All columns except identity columns.
    AllButId,
}

impl ColumnSelection {
    /// Returns whether `column`, currently holding `value`, is selected.
    #[must_use]
    pub fn includes(self, column: &ColumnDescriptor, value: &SqlValue) -> bool {
        match self {
            Self::OnlyExisting => !is_empty_column_value(column, value),
            Self::OnlyIds => column.is_id(),
            Self::All => true,
            Self::AllButId => !column.is_id(),
        }
    }
}

/// Reads a property of an entity, treating unknown properties as NULL.
fn column_value(entity: &dyn DbEntity, column: &ColumnDescriptor) -> SqlValue {
    entity
        .property_value(column.property_name())
        .unwrap_or(SqlValue::Null)
}

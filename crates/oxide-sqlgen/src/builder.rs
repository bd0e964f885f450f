//! Fluent statement builder over a chunk chain.

use std::fmt;

use tracing::debug;

use crate::chunk::{
    ChunkChain, ColumnSelection, InsertChunk, MatchChunk, RawChunk, ReferenceChunk,
    SelectColumnsChunk, SqlChunk, TableChunk, UpdateChunk, ValueChunk,
};
use crate::entity::{DbEntity, EntityProvider, ResolveEntityType};
use crate::error::Result;
use crate::generated::GeneratedSql;
use crate::template::TemplateData;
use crate::value::ToSqlValue;

/// Builds one statement by appending chunks in order.
///
/// The builder owns its chain and template context, so it can be generated
/// any number of times; every generation starts from a clean context.
///
/// # Example
///
/// ```rust
/// use oxide_sqlgen::{DbEntityManager, SqlBuilder};
///
/// let entities = DbEntityManager::new();
/// let generated = SqlBuilder::new(&entities)
///     .raw("select * from t where a in (")
///     .values([1, 2])
///     .raw(")")
///     .generate()
///     .unwrap();
///
/// assert_eq!(generated.sql(), "select * from t where a in ( :p0, :p1 )");
/// assert_eq!(generated.parameters().len(), 2);
/// ```
pub struct SqlBuilder<'a> {
    entities: &'a dyn EntityProvider,
    chain: ChunkChain<'a>,
    template: TemplateData,
}

impl fmt::Debug for SqlBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlBuilder")
            .field("chain", &self.chain)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl<'a> SqlBuilder<'a> {
    /// Creates an empty builder reading metadata from `entities`.
    #[must_use]
    pub fn new(entities: &'a dyn EntityProvider) -> Self {
        Self {
            entities,
            chain: ChunkChain::new(),
            template: TemplateData::new(),
        }
    }

    /// Appends any chunk.
    #[must_use]
    pub fn chain(mut self, chunk: impl SqlChunk + 'a) -> Self {
        self.chain.append(chunk);
        self
    }

    /// Appends verbatim SQL.
    #[must_use]
    pub fn raw(self, sql: impl Into<String>) -> Self {
        self.chain(RawChunk::new(sql))
    }

    /// Appends the table of a named entity, referenced by the entity name.
    #[must_use]
    pub fn table(self, entity_name: &str) -> Self {
        self.chain(TableChunk::by_name(entity_name, None))
    }

    /// Appends the table of a named entity, referenced by `alias`.
    #[must_use]
    pub fn table_as(self, entity_name: &str, alias: &str) -> Self {
        self.chain(TableChunk::by_name(entity_name, Some(alias)))
    }

    /// Appends the table of an entity type, given as a type token or an
    /// instance.
    #[must_use]
    pub fn table_of<E: ResolveEntityType + ?Sized>(self, entity: &E, alias: Option<&str>) -> Self {
        self.chain(TableChunk::of(entity, alias))
    }

    /// Appends a list of selected columns, e.g. `b.*` or `b.[id, name]`.
    #[must_use]
    pub fn columns(self, reference: &str) -> Self {
        self.chain(SelectColumnsChunk::new(reference))
    }

    /// Appends a column or table reference, e.g. `b.name`, `b.+` or `b`.
    #[must_use]
    pub fn reference(self, reference: &str) -> Self {
        self.chain(ReferenceChunk::new(reference))
    }

    /// Appends a match on the non-empty properties of `entity`.
    #[must_use]
    pub fn matches(self, table_ref: &str, entity: &'a dyn DbEntity) -> Self {
        self.chain(MatchChunk::new(table_ref, entity))
    }

    /// Appends a match on the selected properties of `entity`.
    #[must_use]
    pub fn matches_with(
        self,
        table_ref: Option<&str>,
        entity: &'a dyn DbEntity,
        selection: ColumnSelection,
    ) -> Self {
        self.chain(MatchChunk::with_selection(table_ref, entity, selection))
    }

    /// Appends a parameter with a generated name.
    #[must_use]
    pub fn value(self, value: impl ToSqlValue) -> Self {
        self.chain(ValueChunk::new(value))
    }

    /// Appends a parameter with an explicit name.
    #[must_use]
    pub fn named_value(self, name: &str, value: impl ToSqlValue) -> Self {
        self.chain(ValueChunk::named(name, value))
    }

    /// Appends one parameter per value, separated by commas.
    #[must_use]
    pub fn values<T: ToSqlValue>(self, values: impl IntoIterator<Item = T>) -> Self {
        self.chain(ValueChunk::list(values))
    }

    /// Appends a complete insert statement for `entity`.
    #[must_use]
    pub fn insert(self, entity: &'a dyn DbEntity) -> Self {
        self.chain(InsertChunk::new(entity))
    }

    /// Appends a `set` clause updating the table bound to `table_ref`.
    #[must_use]
    pub fn update_set(
        self,
        table_ref: &str,
        entity: &'a dyn DbEntity,
        selection: ColumnSelection,
    ) -> Self {
        self.chain(UpdateChunk::new(table_ref, entity, selection))
    }

    /// Returns the chunk chain built so far.
    #[must_use]
    pub const fn chunks(&self) -> &ChunkChain<'a> {
        &self.chain
    }

    /// Returns the chunk chain for rearrangement.
    pub const fn chunks_mut(&mut self) -> &mut ChunkChain<'a> {
        &mut self.chain
    }

    /// Generates the statement.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while initializing or processing a
    /// chunk; no SQL is produced in that case.
    pub fn generate(&mut self) -> Result<GeneratedSql> {
        let sql = self.chain.render(self.entities, &mut self.template)?;
        debug!(
            sql = %sql,
            parameters = self.template.parameters().len(),
            "generated sql"
        );
        Ok(GeneratedSql::new(sql, self.template.parameters().clone()))
    }
}

//! Conjunctions matching an entity's column values.

use crate::entity::DbEntity;
use crate::error::Result;

use super::{
    append_missing_space, column_value, ChunkKind, ChunkScope, ColumnSelection, SqlChunk,
};

/// Matches the columns of a table against the properties of an entity:
/// `(t.A=:p0 and t.B=:p1)`, or `1=1` when no column is selected.
///
/// Without a table reference the entity's own table is used, unaliased.
#[derive(Debug, Clone)]
pub struct MatchChunk<'a> {
    table_ref: Option<String>,
    entity: &'a dyn DbEntity,
    selection: ColumnSelection,
}

impl<'a> MatchChunk<'a> {
    /// Matches the non-empty properties of `entity` against a bound table.
    #[must_use]
    pub fn new(table_ref: &str, entity: &'a dyn DbEntity) -> Self {
        Self::with_selection(Some(table_ref), entity, ColumnSelection::OnlyExisting)
    }

    /// Matches the selected properties of `entity`.
    #[must_use]
    pub fn with_selection(
        table_ref: Option<&str>,
        entity: &'a dyn DbEntity,
        selection: ColumnSelection,
    ) -> Self {
        Self {
            table_ref: table_ref.map(String::from),
            entity,
            selection,
        }
    }
}

impl SqlChunk for MatchChunk<'_> {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Match
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let (descriptor, table) = match &self.table_ref {
            Some(table_ref) => {
                let descriptor = scope.lookup_table_ref(table_ref)?;
                let table = scope.resolve_table(table_ref, &descriptor);
                (descriptor, table)
            }
            None => {
                let descriptor = scope.lookup_type(self.entity)?;
                let table = descriptor.table_name_for_query();
                (descriptor, table)
            }
        };

        append_missing_space(out);
        let mut count = 0;
        for column in descriptor.columns() {
            let value = column_value(self.entity, column);
            if !self.selection.includes(column, &value) {
                continue;
            }
            out.push_str(if count == 0 { "(" } else { " and " });
            out.push_str(&table);
            out.push('.');
            out.push_str(column.column_name());
            out.push('=');
            scope.define_parameter(out, None, value, Some(column));
            count += 1;
        }
        if count == 0 {
            out.push_str("1=1");
        } else {
            out.push(')');
        }
        Ok(())
    }
}

//! Update `set` clauses.

use crate::entity::DbEntity;
use crate::error::{Result, SqlGenError};

use super::{
    append_missing_space, column_value, ChunkKind, ChunkScope, ColumnSelection, SqlChunk,
};

/// Writes `set C1=:p0, C2=:p1` from the properties of an entity.
///
/// Identity columns are never updated, whatever the selection. Selecting
/// no column at all is an error.
#[derive(Debug, Clone)]
pub struct UpdateChunk<'a> {
    table_ref: String,
    entity: &'a dyn DbEntity,
    selection: ColumnSelection,
}

impl<'a> UpdateChunk<'a> {
    /// Updates the columns of the table bound to `table_ref`.
    #[must_use]
    pub fn new(table_ref: &str, entity: &'a dyn DbEntity, selection: ColumnSelection) -> Self {
        Self {
            table_ref: String::from(table_ref),
            entity,
            selection,
        }
    }
}

impl SqlChunk for UpdateChunk<'_> {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Update
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let descriptor = scope.lookup_table_ref(&self.table_ref)?;
        let selected: Vec<_> = descriptor
            .columns()
            .iter()
            .filter(|c| !c.is_id())
            .map(|c| (c, column_value(self.entity, c)))
            .filter(|(c, value)| self.selection.includes(c, value))
            .collect();
        if selected.is_empty() {
            return Err(SqlGenError::NoColumns(String::from(
                descriptor.entity_name(),
            )));
        }

        append_missing_space(out);
        out.push_str("set");
        for (i, (column, value)) in selected.into_iter().enumerate() {
            out.push_str(if i == 0 { " " } else { ", " });
            out.push_str(column.column_name());
            out.push('=');
            scope.define_parameter(out, None, value, Some(column));
        }
        Ok(())
    }
}

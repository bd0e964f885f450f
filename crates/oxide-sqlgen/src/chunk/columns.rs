//! Selected column lists.

use crate::entity::{ColumnDescriptor, EntityDescriptor};
use crate::error::{Result, SqlGenError};

use super::{ChunkKind, ChunkScope, SqlChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Columns {
    All,
    Ids,
    Properties(Vec<String>),
}

/// Columns of a bound table, written as `table.COLUMN` items.
///
/// The reference syntax is `ref.*` (all columns), `ref.+` (identity
/// columns), `ref.property`, `ref.[property, property]`, or a bare `ref`
/// meaning all columns. Consecutive column chunks form one list; an empty
/// selection such as `ref.[]` writes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumnsChunk {
    table_ref: String,
    columns: Columns,
}

impl SelectColumnsChunk {
    /// Parses a column reference.
    #[must_use]
    pub fn new(reference: &str) -> Self {
        let reference = reference.trim();
        let Some((table_ref, selector)) = reference.split_once('.') else {
            return Self {
                table_ref: String::from(reference),
                columns: Columns::All,
            };
        };
        let columns = match selector.trim() {
            "*" => Columns::All,
            "+" => Columns::Ids,
            list if list.starts_with('[') && list.ends_with(']') => Columns::Properties(
                list[1..list.len() - 1]
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            property => Columns::Properties(vec![String::from(property)]),
        };
        Self {
            table_ref: String::from(table_ref.trim()),
            columns,
        }
    }

    fn select<'d>(&self, descriptor: &'d EntityDescriptor) -> Result<Vec<&'d ColumnDescriptor>> {
        match &self.columns {
            Columns::All => Ok(descriptor.columns().iter().collect()),
            Columns::Ids => Ok(descriptor.id_columns().collect()),
            Columns::Properties(properties) => properties
                .iter()
                .map(|property| {
                    descriptor
                        .find_by_property_name(property)
                        .ok_or_else(|| SqlGenError::UnknownProperty {
                            entity: String::from(descriptor.entity_name()),
                            property: property.clone(),
                        })
                })
                .collect(),
        }
    }
}

impl SqlChunk for SelectColumnsChunk {
    fn kind(&self) -> ChunkKind {
        ChunkKind::SelectColumns
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let descriptor = scope.lookup_table_ref(&self.table_ref)?;
        let columns = self.select(&descriptor)?;
        if columns.is_empty() {
            return Ok(());
        }
        let table = scope.resolve_table(&self.table_ref, &descriptor);

        scope.separate_by_comma_or_space(out);
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&table);
            out.push('.');
            out.push_str(column.column_name());
        }
        Ok(())
    }
}

//! Complete insert statements.

use crate::entity::DbEntity;
use crate::error::{Result, SqlGenError};

use super::{
    append_missing_space, column_value, ChunkKind, ChunkScope, ColumnSelection, SqlChunk,
};

/// Writes `insert into TABLE (C1, C2) values (:p0, :p1)` for the non-empty
/// properties of an entity. An entity with no such property is an error.
#[derive(Debug, Clone)]
pub struct InsertChunk<'a> {
    entity: &'a dyn DbEntity,
}

impl<'a> InsertChunk<'a> {
    /// Inserts `entity` into the table of its own type.
    #[must_use]
    pub const fn new(entity: &'a dyn DbEntity) -> Self {
        Self { entity }
    }
}

impl SqlChunk for InsertChunk<'_> {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Insert
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let descriptor = scope.lookup_type(self.entity)?;

        let mut columns = String::new();
        let mut values = String::new();
        for column in descriptor.columns() {
            let value = column_value(self.entity, column);
            if !ColumnSelection::OnlyExisting.includes(column, &value) {
                continue;
            }
            if !columns.is_empty() {
                columns.push_str(", ");
                values.push_str(", ");
            }
            columns.push_str(column.column_name());
            scope.define_parameter(&mut values, None, value, Some(column));
        }
        if columns.is_empty() {
            return Err(SqlGenError::NoColumns(String::from(
                descriptor.entity_name(),
            )));
        }

        append_missing_space(out);
        out.push_str("insert into ");
        out.push_str(&descriptor.table_name_for_query());
        out.push_str(" (");
        out.push_str(&columns);
        out.push_str(") values (");
        out.push_str(&values);
        out.push(')');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkChain;
    use crate::config::OomConfig;
    use crate::entity::fixtures::{Boy, Ghost, Girl};
    use crate::entity::DbEntityManager;
    use crate::error::SqlGenError;
    use crate::template::TemplateData;
    use crate::value::SqlValue;

    #[test]
    fn test_insert_skips_empty_values() {
        let entities = crate::entity::fixtures::manager();
        let mut template = TemplateData::new();
        let girl = Girl {
            id: 0,
            name: None,
            speciality: String::from("swim"),
            age: 0,
        };
        let mut chain = ChunkChain::new();
        chain.append(InsertChunk::new(&girl));

        let sql = chain.render(&entities, &mut template).unwrap();
        assert_eq!(sql, "insert into GIRLS (SPECIALITY) values (:p0)");
        let p0 = template.parameter("p0").unwrap();
        assert_eq!(p0.value, SqlValue::Text(String::from("swim")));
        assert_eq!(p0.column.as_ref().unwrap().column_name(), "SPECIALITY");
    }

    #[test]
    fn test_insert_with_schema() {
        let mut entities = DbEntityManager::with_config(OomConfig::new().schema("school"));
        entities.register::<Boy>().unwrap();
        let mut template = TemplateData::new();
        let boy = Boy {
            id: 3,
            name: String::from("Johny"),
            girl_id: Some(0),
        };
        let mut chain = ChunkChain::new();
        chain.append(InsertChunk::new(&boy));

        let sql = chain.render(&entities, &mut template).unwrap();
        assert_eq!(
            sql,
            "insert into school.boy (id, name, girl_id) values (:p0, :p1, :p2)"
        );
        assert_eq!(template.parameter("p2").unwrap().value, SqlValue::Int(0));
    }

    #[test]
    fn test_insert_unregistered_entity() {
        let entities = crate::entity::fixtures::manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(InsertChunk::new(&Ghost));
        assert!(matches!(
            chain.render(&entities, &mut template),
            Err(SqlGenError::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_insert_without_values() {
        let entities = crate::entity::fixtures::manager();
        let mut template = TemplateData::new();
        let girl = Girl {
            id: 0,
            name: None,
            speciality: String::new(),
            age: 0,
        };
        let mut chain = ChunkChain::new();
        chain.append(InsertChunk::new(&girl));
        assert!(matches!(
            chain.render(&entities, &mut template),
            Err(SqlGenError::NoColumns(e)) if e == "Girl"
        ));
    }
}

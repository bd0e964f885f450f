//! Column and table references.

use crate::error::{Result, SqlGenError};

use super::{ChunkKind, ChunkScope, SqlChunk};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Table(String),
    Property(String, String),
    Id(String),
    Column(String),
}

/// A reference resolved against the bound tables.
///
/// - `ref.property` becomes `table.COLUMN`;
/// - `ref.+` becomes the qualified identity column;
/// - `ref` becomes the table alias, or the table name;
/// - `.property` becomes the bare column name of whichever bound table
///   declares the property.
///
/// Consecutive references form a `, ` separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceChunk {
    target: Target,
}

impl ReferenceChunk {
    /// Parses a reference.
    #[must_use]
    pub fn new(reference: &str) -> Self {
        let target = match reference.trim().split_once('.') {
            None => Target::Table(String::from(reference.trim())),
            Some(("", property)) => Target::Column(String::from(property)),
            Some((table_ref, "+")) => Target::Id(String::from(table_ref)),
            Some((table_ref, property)) => {
                Target::Property(String::from(table_ref), String::from(property))
            }
        };
        Self { target }
    }
}

impl SqlChunk for ReferenceChunk {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Reference
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        let text = match &self.target {
            Target::Table(table_ref) => {
                let descriptor = scope.lookup_table_ref(table_ref)?;
                scope.resolve_table(table_ref, &descriptor)
            }
            Target::Property(table_ref, property) => {
                let descriptor = scope.lookup_table_ref(table_ref)?;
                let column = descriptor.find_by_property_name(property).ok_or_else(|| {
                    SqlGenError::UnknownProperty {
                        entity: String::from(descriptor.entity_name()),
                        property: property.clone(),
                    }
                })?;
                format!(
                    "{}.{}",
                    scope.resolve_table(table_ref, &descriptor),
                    column.column_name()
                )
            }
            Target::Id(table_ref) => {
                let descriptor = scope.lookup_table_ref(table_ref)?;
                let column = descriptor.id_columns().next().ok_or_else(|| {
                    SqlGenError::UnknownProperty {
                        entity: String::from(descriptor.entity_name()),
                        property: String::from("+"),
                    }
                })?;
                format!(
                    "{}.{}",
                    scope.resolve_table(table_ref, &descriptor),
                    column.column_name()
                )
            }
            Target::Column(property) => {
                let descriptor = scope.find_column_ref(property)?;
                let column = descriptor
                    .find_by_property_name(property)
                    .or_else(|| descriptor.find_by_column_name(property))
                    .ok_or_else(|| SqlGenError::UnknownColumnRef(property.clone()))?;
                String::from(column.column_name())
            }
        };
        scope.separate_by_comma_or_space(out);
        out.push_str(&text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{ChunkChain, RawChunk, TableChunk};
    use crate::entity::fixtures::manager;
    use crate::template::TemplateData;

    fn render(parts: Vec<Box<dyn crate::chunk::SqlChunk>>) -> Result<String> {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        for part in parts {
            chain.append_boxed(part);
        }
        chain.render(&entities, &mut template)
    }

    #[test]
    fn test_property_and_id_references() {
        let sql = render(vec![
            Box::new(RawChunk::new("select ")),
            Box::new(ReferenceChunk::new("g.name")),
            Box::new(RawChunk::new("from")),
            Box::new(TableChunk::by_name("Girl", Some("g"))),
            Box::new(RawChunk::new("order by")),
            Box::new(ReferenceChunk::new("g.age")),
            Box::new(ReferenceChunk::new("g.+")),
        ])
        .unwrap();
        assert_eq!(sql, "select g.NAME from GIRLS g order by g.AGE, g.ID");
    }

    #[test]
    fn test_bare_column_reference() {
        let sql = render(vec![
            Box::new(RawChunk::new("select count(*) from")),
            Box::new(TableChunk::by_name("Boy", None)),
            Box::new(RawChunk::new("where")),
            Box::new(ReferenceChunk::new(".girl_id")),
            Box::new(RawChunk::new("is null")),
        ])
        .unwrap();
        assert_eq!(sql, "select count(*) from boy where girl_id is null");
    }

    #[test]
    fn test_table_reference() {
        let sql = render(vec![
            Box::new(TableChunk::by_name("Boy", Some("b"))),
            Box::new(TableChunk::by_name("Girl", None)),
            Box::new(RawChunk::new("--")),
            Box::new(ReferenceChunk::new("b")),
            Box::new(ReferenceChunk::new("Girl")),
        ])
        .unwrap();
        assert_eq!(sql, "boy b, GIRLS -- b, GIRLS");
    }

    #[test]
    fn test_reference_errors() {
        assert!(matches!(
            render(vec![Box::new(ReferenceChunk::new("g.name"))]),
            Err(SqlGenError::UnknownTableRef(r)) if r == "g"
        ));
        assert!(matches!(
            render(vec![Box::new(ReferenceChunk::new(".name"))]),
            Err(SqlGenError::UnknownColumnRef(c)) if c == "name"
        ));
        assert!(matches!(
            render(vec![
                Box::new(TableChunk::by_name("Boy", Some("b"))),
                Box::new(ReferenceChunk::new("b.age")),
            ]),
            Err(SqlGenError::UnknownProperty { entity, property }) if entity == "Boy" && property == "age"
        ));
    }
}

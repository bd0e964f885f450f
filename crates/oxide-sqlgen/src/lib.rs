//! # oxide-sqlgen
//!
//! Chunk-based SQL generation over entity metadata.
//!
//! A statement is assembled from a chain of chunks: verbatim SQL, tables,
//! column lists, references, entity matches, parameters, inserts and
//! updates. Chunks resolve table and column names from registered entity
//! metadata and bind every value as a named parameter, so generated SQL
//! never inlines user data.
//!
//! ```rust
//! use oxide_sqlgen::{DbEntity, DbEntityManager, SqlBuilder, SqlValue};
//!
//! #[derive(DbEntity)]
//! #[entity(table = "USERS")]
//! struct User {
//!     #[column(id)]
//!     id: i64,
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let mut entities = DbEntityManager::new();
//! entities.register::<User>().unwrap();
//!
//! let example = User { id: 0, name: String::from("alice"), email: None };
//! let generated = SqlBuilder::new(&entities)
//!     .raw("select")
//!     .columns("u.[id, email]")
//!     .raw("from")
//!     .table_as("User", "u")
//!     .raw("where")
//!     .matches("u", &example)
//!     .generate()
//!     .unwrap();
//!
//! assert_eq!(generated.sql(), "select u.id, u.email from USERS u where (u.name=:p0)");
//! assert_eq!(generated.parameter("p0"), Some(&SqlValue::Text(String::from("alice"))));
//!
//! let (sql, values) = generated.to_positional();
//! assert_eq!(sql, "select u.id, u.email from USERS u where (u.name=?)");
//! assert_eq!(values.len(), 1);
//! ```

pub mod builder;
pub mod chunk;
pub mod config;
pub mod entity;
pub mod error;
pub mod generated;
pub mod template;
pub mod value;

pub use builder::SqlBuilder;
pub use config::{NamingStrategy, OomConfig};
pub use entity::{DbEntity, DbEntityManager, DescribeEntity, EntityProvider, EntityType};
pub use error::{Result, SqlGenError};
pub use generated::GeneratedSql;
pub use oxide_sqlgen_derive::DbEntity;
pub use template::TemplateData;
pub use value::{SqlValue, ToSqlValue};

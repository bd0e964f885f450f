//! Error types for SQL generation.

use thiserror::Error;

use crate::chunk::ChunkId;

/// Errors raised while assembling a statement from chunks.
///
/// Every variant aborts the whole generation: no partially built SQL is
/// ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum SqlGenError {
    /// An entity name has no metadata registration.
    #[error("entity name not registered: {0}")]
    UnknownEntity(String),

    /// A runtime type is not a registered persistent entity.
    #[error("invalid or not-persistent entity: {0}")]
    InvalidEntity(String),

    /// A table reference has no binding in the current template context.
    #[error("invalid table reference: {0}")]
    UnknownTableRef(String),

    /// No table in the current template context declares the column.
    #[error("invalid column reference: [{0}]")]
    UnknownColumnRef(String),

    /// A reference names a property the entity does not declare.
    #[error("entity '{entity}' has no property '{property}'")]
    UnknownProperty {
        /// Entity name.
        entity: String,
        /// The missing property.
        property: String,
    },

    /// The same table reference was registered twice in one context.
    #[error("duplicated table reference: {0}")]
    DuplicateTableRef(String),

    /// A different type is already registered under this entity name.
    #[error("entity name already registered for another type: {0}")]
    DuplicateEntity(String),

    /// An insert or update selected no column to write.
    #[error("entity '{0}' has no column to write")]
    NoColumns(String),

    /// `insert_after` targeted a chunk that is not linked into the chain.
    #[error("chunk {0} is not linked into the chain")]
    DetachedChunk(ChunkId),

    /// A chain was processed before being initialized.
    #[error("chunk chain processed before init")]
    NotInitialized,
}

/// Result type alias for SQL generation.
pub type Result<T> = std::result::Result<T, SqlGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SqlGenError::UnknownEntity(String::from("Boy")).to_string(),
            "entity name not registered: Boy"
        );
        assert_eq!(
            SqlGenError::UnknownColumnRef(String::from("name")).to_string(),
            "invalid column reference: [name]"
        );
        assert_eq!(
            SqlGenError::UnknownProperty {
                entity: String::from("Girl"),
                property: String::from("speed"),
            }
            .to_string(),
            "entity 'Girl' has no property 'speed'"
        );
        assert_eq!(
            SqlGenError::NoColumns(String::from("Girl")).to_string(),
            "entity 'Girl' has no column to write"
        );
    }
}

//! Verbatim SQL text.

use crate::error::Result;

use super::{append_missing_space, ChunkKind, ChunkScope, SqlChunk};

/// A piece of SQL written as is.
///
/// Raw text is glued to preceding raw text unchanged, but separated by a
/// space from a preceding macro chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    sql: String,
}

impl RawChunk {
    /// Creates a raw chunk.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl SqlChunk for RawChunk {
    fn kind(&self) -> ChunkKind {
        ChunkKind::Raw
    }

    fn process(&self, scope: &mut ChunkScope<'_>, out: &mut String) -> Result<()> {
        if scope.is_previous_macro_chunk() {
            append_missing_space(out);
        }
        out.push_str(&self.sql);
        Ok(())
    }
}

//! Ordered chain of chunks.
//!
//! Chunks are owned by the chain and addressed through [`ChunkId`] handles.
//! Neighbour links are handles too, so splicing a chunk somewhere else only
//! rewrites indices.

use std::fmt;

use tracing::trace;

use crate::entity::EntityProvider;
use crate::error::{Result, SqlGenError};
use crate::template::TemplateData;

use super::{ChunkKind, ChunkPosition, ChunkScope, SqlChunk};

/// Handle of a chunk inside its [`ChunkChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ChunkNode<'a> {
    chunk: Box<dyn SqlChunk + 'a>,
    kind: ChunkKind,
    previous: Option<ChunkId>,
    next: Option<ChunkId>,
}

/// A doubly linked sequence of chunks forming one statement template.
///
/// Chunks are either linked (reachable from the head) or detached. Only
/// linked chunks take part in [`init`](Self::init) and
/// [`process`](Self::process).
///
/// # Panics
///
/// Methods taking a [`ChunkId`] panic when given a handle that was not
/// issued by this chain.
#[derive(Default)]
pub struct ChunkChain<'a> {
    nodes: Vec<ChunkNode<'a>>,
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
    initialized: bool,
}

impl fmt::Debug for ChunkChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, chunk)| chunk))
            .finish()
    }
}

impl<'a> ChunkChain<'a> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached chunk and returns its handle.
    pub fn add(&mut self, chunk: impl SqlChunk + 'a) -> ChunkId {
        self.add_boxed(Box::new(chunk))
    }

    /// Adds a detached boxed chunk and returns its handle.
    pub fn add_boxed(&mut self, chunk: Box<dyn SqlChunk + 'a>) -> ChunkId {
        let id = ChunkId(self.nodes.len());
        let kind = chunk.kind();
        self.nodes.push(ChunkNode {
            chunk,
            kind,
            previous: None,
            next: None,
        });
        self.initialized = false;
        id
    }

    /// Adds a chunk at the end of the chain and returns its handle.
    pub fn append(&mut self, chunk: impl SqlChunk + 'a) -> ChunkId {
        self.append_boxed(Box::new(chunk))
    }

    /// Adds a boxed chunk at the end of the chain and returns its handle.
    pub fn append_boxed(&mut self, chunk: Box<dyn SqlChunk + 'a>) -> ChunkId {
        let id = self.add_boxed(chunk);
        match self.tail {
            Some(tail) => self.splice_after(id, tail),
            None => {
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
        id
    }

    /// Moves `chunk` right after `target`.
    ///
    /// `chunk` is first cut out of its current place, its old neighbours
    /// being linked to each other, and then placed between `target` and
    /// `target`'s former successor. A detached `target` is accepted only
    /// while the chain is otherwise empty; it then becomes the head.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::DetachedChunk`] if `target` is detached and
    /// the chain already has a head.
    pub fn insert_after(&mut self, chunk: ChunkId, target: ChunkId) -> Result<()> {
        if chunk == target {
            return Ok(());
        }
        let target_linked = self.is_linked(target);
        let chain_left = self
            .head
            .is_some_and(|head| head != chunk || self.nodes[chunk.0].next.is_some());
        if !target_linked && chain_left {
            return Err(SqlGenError::DetachedChunk(target));
        }
        self.unlink(chunk);
        if !target_linked {
            self.head = Some(target);
            self.tail = Some(target);
        }
        self.splice_after(chunk, target);
        self.initialized = false;
        Ok(())
    }

    fn splice_after(&mut self, chunk: ChunkId, target: ChunkId) {
        let old_next = self.nodes[target.0].next;
        self.nodes[target.0].next = Some(chunk);
        self.nodes[chunk.0].previous = Some(target);
        self.nodes[chunk.0].next = old_next;
        match old_next {
            Some(next) => self.nodes[next.0].previous = Some(chunk),
            None => self.tail = Some(chunk),
        }
    }

    fn unlink(&mut self, chunk: ChunkId) {
        let node = &mut self.nodes[chunk.0];
        let previous = node.previous.take();
        let next = node.next.take();
        match previous {
            Some(previous) => self.nodes[previous.0].next = next,
            None if self.head == Some(chunk) => self.head = next,
            None => {}
        }
        match next {
            Some(next) => self.nodes[next.0].previous = previous,
            None if self.tail == Some(chunk) => self.tail = previous,
            None => {}
        }
    }

    fn is_linked(&self, chunk: ChunkId) -> bool {
        self.head == Some(chunk) || self.nodes[chunk.0].previous.is_some()
    }

    /// Returns the first linked chunk.
    #[must_use]
    pub const fn head(&self) -> Option<ChunkId> {
        self.head
    }

    /// Returns the chunk preceding `chunk`.
    #[must_use]
    pub fn previous(&self, chunk: ChunkId) -> Option<ChunkId> {
        self.nodes[chunk.0].previous
    }

    /// Returns the chunk following `chunk`.
    #[must_use]
    pub fn next(&self, chunk: ChunkId) -> Option<ChunkId> {
        self.nodes[chunk.0].next
    }

    /// Returns the kind of `chunk`.
    #[must_use]
    pub fn kind(&self, chunk: ChunkId) -> ChunkKind {
        self.nodes[chunk.0].kind
    }

    /// Returns the chunk behind a handle.
    #[must_use]
    pub fn get(&self, chunk: ChunkId) -> &(dyn SqlChunk + 'a) {
        self.nodes[chunk.0].chunk.as_ref()
    }

    /// Returns `chunk`'s kind together with its predecessor's.
    #[must_use]
    pub fn position(&self, chunk: ChunkId) -> ChunkPosition {
        ChunkPosition {
            kind: self.kind(chunk),
            previous: self.previous(chunk).map(|previous| self.kind(previous)),
        }
    }

    /// See [`ChunkPosition::is_previous_chunk_of_kind`].
    #[must_use]
    pub fn is_previous_chunk_of_kind(&self, chunk: ChunkId, kind: ChunkKind) -> bool {
        self.position(chunk).is_previous_chunk_of_kind(kind)
    }

    /// See [`ChunkPosition::is_previous_chunk_of_same_kind`].
    #[must_use]
    pub fn is_previous_chunk_of_same_kind(&self, chunk: ChunkId) -> bool {
        self.position(chunk).is_previous_chunk_of_same_kind()
    }

    /// See [`ChunkPosition::is_previous_macro_chunk`].
    #[must_use]
    pub fn is_previous_macro_chunk(&self, chunk: ChunkId) -> bool {
        self.position(chunk).is_previous_macro_chunk()
    }

    /// See [`ChunkPosition::is_previous_raw_chunk`].
    #[must_use]
    pub fn is_previous_raw_chunk(&self, chunk: ChunkId) -> bool {
        self.position(chunk).is_previous_raw_chunk()
    }

    /// Returns the handles of linked chunks, head first.
    #[must_use]
    pub fn ids(&self) -> Vec<ChunkId> {
        let mut ids = Vec::new();
        let mut current = self.head;
        while let Some(id) = current {
            ids.push(id);
            current = self.nodes[id.0].next;
        }
        ids
    }

    /// Iterates over linked chunks, head first.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &(dyn SqlChunk + 'a))> + '_ {
        self.ids().into_iter().map(|id| (id, self.get(id)))
    }

    /// Returns the number of chunks, linked or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the chain holds no chunk.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Initializes every linked chunk against the shared template context.
    ///
    /// `template` is reset first, so a chain may be initialized again with
    /// the context of an earlier run.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a chunk.
    pub fn init(
        &mut self,
        entities: &dyn EntityProvider,
        template: &mut TemplateData,
    ) -> Result<()> {
        self.initialized = false;
        template.reset();
        for id in self.ids() {
            let position = self.position(id);
            trace!(chunk = %id, kind = %position.kind, "init chunk");
            let mut scope = ChunkScope::new(entities, template, position);
            self.nodes[id.0].chunk.init(&mut scope)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Lets every linked chunk append its SQL to `out`.
    ///
    /// Parameters bound by an earlier run are dropped first. A chunk that
    /// appends nothing is invisible to its successor, which then sees the
    /// chunk before it as its predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`SqlGenError::NotInitialized`] if [`init`](Self::init) did
    /// not succeed since the chain last changed, or the first error raised
    /// by a chunk.
    pub fn process(
        &self,
        entities: &dyn EntityProvider,
        template: &mut TemplateData,
        out: &mut String,
    ) -> Result<()> {
        if !self.initialized {
            return Err(SqlGenError::NotInitialized);
        }
        template.reset_parameters();
        let mut previous = None;
        for id in self.ids() {
            let kind = self.kind(id);
            trace!(chunk = %id, kind = %kind, "process chunk");
            let mut scope = ChunkScope::new(entities, template, ChunkPosition { kind, previous });
            let written = out.len();
            self.nodes[id.0].chunk.process(&mut scope, out)?;
            if out.len() > written {
                previous = Some(kind);
            }
        }
        Ok(())
    }

    /// Initializes and processes the chain.
    ///
    /// Returns the generated SQL; bound parameters are left in `template`.
    /// On error `template` is left empty.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a chunk.
    pub fn render(
        &mut self,
        entities: &dyn EntityProvider,
        template: &mut TemplateData,
    ) -> Result<String> {
        let mut out = String::new();
        let result = self
            .init(entities, template)
            .and_then(|()| self.process(entities, template, &mut out));
        if let Err(e) = result {
            template.reset();
            return Err(e);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{RawChunk, ReferenceChunk, TableChunk, ValueChunk};
    use crate::entity::fixtures::manager;
    use crate::value::SqlValue;

    fn raw(chain: &mut ChunkChain<'_>, sql: &str) -> ChunkId {
        chain.add(RawChunk::new(sql))
    }

    fn order(chain: &ChunkChain<'_>) -> Vec<ChunkId> {
        chain.ids()
    }

    #[test]
    fn test_append_links_both_ways() {
        let mut chain = ChunkChain::new();
        let a = chain.append(RawChunk::new("a"));
        let b = chain.append(RawChunk::new("b"));

        assert_eq!(chain.head(), Some(a));
        assert_eq!(chain.next(a), Some(b));
        assert_eq!(chain.previous(b), Some(a));
        assert_eq!(chain.previous(a), None);
        assert_eq!(chain.next(b), None);
    }

    #[test]
    fn test_insert_after_splices_between() {
        let mut chain = ChunkChain::new();
        let t = chain.append(RawChunk::new("t"));
        let s = chain.append(RawChunk::new("s"));
        let c = raw(&mut chain, "c");

        chain.insert_after(c, t).unwrap();

        assert_eq!(chain.next(t), Some(c));
        assert_eq!(chain.previous(c), Some(t));
        assert_eq!(chain.next(c), Some(s));
        assert_eq!(chain.previous(s), Some(c));
        assert_eq!(order(&chain), [t, c, s]);
    }

    #[test]
    fn test_insert_after_last_becomes_tail() {
        let mut chain = ChunkChain::new();
        let t = chain.append(RawChunk::new("t"));
        let c = raw(&mut chain, "c");
        chain.insert_after(c, t).unwrap();
        let d = chain.append(RawChunk::new("d"));

        assert_eq!(chain.next(c), Some(d));
        assert_eq!(order(&chain), [t, c, d]);
    }

    #[test]
    fn test_reinsert_detaches_from_old_position() {
        let mut chain = ChunkChain::new();
        let a = chain.append(RawChunk::new("a"));
        let b = chain.append(RawChunk::new("b"));
        let c = chain.append(RawChunk::new("c"));
        let d = chain.append(RawChunk::new("d"));

        chain.insert_after(b, c).unwrap();

        assert_eq!(order(&chain), [a, c, b, d]);
        assert_eq!(chain.next(a), Some(c));
        assert_eq!(chain.previous(c), Some(a));
        assert_eq!(chain.previous(b), Some(c));
        assert_eq!(chain.previous(d), Some(b));
    }

    #[test]
    fn test_reinsert_head_and_tail() {
        let mut chain = ChunkChain::new();
        let a = chain.append(RawChunk::new("a"));
        let b = chain.append(RawChunk::new("b"));
        let c = chain.append(RawChunk::new("c"));

        chain.insert_after(a, c).unwrap();
        assert_eq!(chain.head(), Some(b));
        assert_eq!(order(&chain), [b, c, a]);
        assert_eq!(chain.previous(b), None);

        chain.insert_after(a, b).unwrap();
        assert_eq!(order(&chain), [b, a, c]);
        assert_eq!(chain.next(c), None);
        let d = chain.append(RawChunk::new("d"));
        assert_eq!(order(&chain), [b, a, c, d]);
    }

    #[test]
    fn test_insert_after_itself_is_noop() {
        let mut chain = ChunkChain::new();
        let a = chain.append(RawChunk::new("a"));
        chain.insert_after(a, a).unwrap();
        assert_eq!(order(&chain), [a]);
    }

    #[test]
    fn test_detached_target() {
        let mut chain = ChunkChain::new();
        let first = raw(&mut chain, "first");
        let second = raw(&mut chain, "second");
        chain.insert_after(second, first).unwrap();
        assert_eq!(order(&chain), [first, second]);

        let loose = raw(&mut chain, "loose");
        let other = raw(&mut chain, "other");
        let result = chain.insert_after(other, loose);
        assert!(matches!(result, Err(SqlGenError::DetachedChunk(id)) if id == loose));
        assert_eq!(order(&chain), [first, second]);
    }

    #[test]
    fn test_chain_predicates() {
        let mut chain = ChunkChain::new();
        let a = chain.append(RawChunk::new("a"));
        let v1 = chain.append(ValueChunk::new(SqlValue::Int(1)));
        let v2 = chain.append(ValueChunk::new(SqlValue::Int(2)));

        assert!(!chain.is_previous_chunk_of_kind(a, ChunkKind::Raw));
        assert!(!chain.is_previous_chunk_of_same_kind(a));
        assert!(!chain.is_previous_macro_chunk(a));
        assert!(!chain.is_previous_raw_chunk(a));

        assert!(chain.is_previous_raw_chunk(v1));
        assert!(!chain.is_previous_chunk_of_same_kind(v1));
        assert!(chain.is_previous_chunk_of_same_kind(v2));
        assert!(chain.is_previous_macro_chunk(v2));
    }

    #[test]
    fn test_process_requires_init() {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(RawChunk::new("select 1"));

        let mut out = String::new();
        assert!(matches!(
            chain.process(&entities, &mut template, &mut out),
            Err(SqlGenError::NotInitialized)
        ));

        chain.init(&entities, &mut template).unwrap();
        chain.process(&entities, &mut template, &mut out).unwrap();
        assert_eq!(out, "select 1");

        chain.append(RawChunk::new("from dual"));
        assert!(matches!(
            chain.process(&entities, &mut template, &mut out),
            Err(SqlGenError::NotInitialized)
        ));
    }

    #[test]
    fn test_render_twice_gives_same_output() {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(RawChunk::new("values ("));
        chain.append(ValueChunk::new(SqlValue::Int(1)));
        chain.append(ValueChunk::new(SqlValue::Int(2)));
        chain.append(RawChunk::new(")"));

        let first = chain.render(&entities, &mut template).unwrap();
        let second = chain.render(&entities, &mut template).unwrap();
        assert_eq!(first, "values ( :p0, :p1 )");
        assert_eq!(first, second);
        assert_eq!(template.parameters().len(), 2);
    }

    #[test]
    fn test_init_and_process_twice() {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(RawChunk::new("select * from"));
        chain.append(TableChunk::by_name("Boy", Some("b")));
        chain.append(RawChunk::new("where b.id ="));
        chain.append(ValueChunk::new(SqlValue::Int(4)));

        for _ in 0..2 {
            chain.init(&entities, &mut template).unwrap();
            let mut out = String::new();
            chain.process(&entities, &mut template, &mut out).unwrap();
            assert_eq!(out, "select * from boy b where b.id = :p0");
            assert_eq!(template.parameters().len(), 1);
        }

        let mut again = String::new();
        chain.process(&entities, &mut template, &mut again).unwrap();
        assert_eq!(again, "select * from boy b where b.id = :p0");
        assert_eq!(template.parameters().len(), 1);
    }

    #[test]
    fn test_empty_contribution_is_skipped() {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(RawChunk::new("in ("));
        chain.append(ValueChunk::list(Vec::<i64>::new()));
        chain.append(ValueChunk::new(SqlValue::Int(1)));
        chain.append(ValueChunk::list(Vec::<i64>::new()));
        chain.append(ValueChunk::new(SqlValue::Int(2)));
        chain.append(RawChunk::new(")"));

        let sql = chain.render(&entities, &mut template).unwrap();
        assert_eq!(sql, "in ( :p0, :p1 )");
    }

    #[test]
    fn test_failed_render_leaves_empty_template() {
        let entities = manager();
        let mut template = TemplateData::new();
        let mut chain = ChunkChain::new();
        chain.append(TableChunk::by_name("Boy", Some("b")));
        chain.append(ValueChunk::new(SqlValue::Int(1)));
        chain.append(TableChunk::by_name("Nobody", None));

        assert!(chain.render(&entities, &mut template).is_err());
        assert!(template.parameters().is_empty());
        assert_eq!(template.table_refs().count(), 0);

        let mut chain = ChunkChain::new();
        chain.append(ValueChunk::new(SqlValue::Int(1)));
        chain.append(ReferenceChunk::new("x.id"));
        assert!(matches!(
            chain.render(&entities, &mut template),
            Err(SqlGenError::UnknownTableRef(_))
        ));
        assert!(template.parameters().is_empty());
    }
}

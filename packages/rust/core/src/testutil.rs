//! Outline fixtures shared by the unit tests of this crate.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use roamgraph_outline::{JsonOutline, UidGenerator};
use roamgraph_shared::{Block, Page, Result};

use crate::fetcher::TreeFetcher;
use crate::graph::{DEPENDS_ON_MARKER, wrap_reference};

/// A block with a `Depends On::` child listing `deps` as references.
/// No marker child at all when `deps` is empty.
pub(crate) fn task(uid: &str, text: &str, deps: &[&str]) -> Block {
    let block = Block::new(uid, text);
    if deps.is_empty() {
        return block;
    }
    let references = deps.iter().map(|dep| wrap_reference(dep)).collect();
    block.with_children(vec![marker(&format!("{uid}-deps"), references)])
}

/// A `Depends On::` block with the given raw child texts.
pub(crate) fn marker(uid: &str, children: Vec<String>) -> Block {
    let children = children
        .into_iter()
        .enumerate()
        .map(|(i, text)| Block::new(format!("{uid}-{i}"), text))
        .collect();
    Block::new(uid, DEPENDS_ON_MARKER).with_children(children)
}

/// One untitled page holding `blocks` at top level.
pub(crate) fn outline(blocks: Vec<Block>) -> JsonOutline {
    JsonOutline::from_pages(vec![Page {
        title: "Tasks".into(),
        uid: Some("tasks-page".into()),
        children: blocks,
    }])
}

/// uid1 → uid2 → uid3.
pub(crate) fn chain_outline() -> JsonOutline {
    outline(vec![
        task("uid1", "Task 1", &["uid2"]),
        task("uid2", "Task 2", &["uid3"]),
        task("uid3", "Task 3", &[]),
    ])
}

/// Records how often each uid was fetched.
pub(crate) struct CountingFetcher<'a> {
    inner: &'a JsonOutline,
    counts: RefCell<HashMap<String, usize>>,
}

impl<'a> CountingFetcher<'a> {
    pub(crate) fn new(inner: &'a JsonOutline) -> Self {
        Self {
            inner,
            counts: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn count(&self, uid: &str) -> usize {
        self.counts.borrow().get(uid).copied().unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.counts.borrow().values().sum()
    }
}

impl TreeFetcher for CountingFetcher<'_> {
    fn fetch_tree(&self, uid: &str) -> Result<Block> {
        *self.counts.borrow_mut().entry(uid.to_string()).or_default() += 1;
        roamgraph_outline::OutlineStore::fetch_tree(self.inner, uid)
    }
}

/// Deterministic `g0`, `g1`, ... identifiers.
#[derive(Default)]
pub(crate) struct SequentialUids {
    next: Cell<usize>,
}

impl UidGenerator for SequentialUids {
    fn generate_uid(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("g{n}")
    }
}

/// Replays a fixed list of identifiers, then falls back to `fresh<n>`.
pub(crate) struct ScriptedUids {
    script: RefCell<Vec<String>>,
    fallback: SequentialUids,
}

impl ScriptedUids {
    pub(crate) fn new(script: &[&str]) -> Self {
        Self {
            script: RefCell::new(script.iter().rev().map(|s| s.to_string()).collect()),
            fallback: SequentialUids::default(),
        }
    }
}

impl UidGenerator for ScriptedUids {
    fn generate_uid(&self) -> String {
        self.script
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| format!("fresh{}", self.fallback.generate_uid()))
    }
}

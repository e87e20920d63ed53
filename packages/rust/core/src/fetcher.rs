//! Tree fetcher: the read side of the outline, as seen by the graph builder.

use roamgraph_outline::OutlineStore;
use roamgraph_shared::{Block, Result};
use tracing::trace;

/// Fetches the full subtree rooted at a uid.
pub trait TreeFetcher {
    /// Fails with `NotFound` when `uid` does not exist.
    fn fetch_tree(&self, uid: &str) -> Result<Block>;
}

/// [`TreeFetcher`] over any [`OutlineStore`].
pub struct StoreFetcher<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: OutlineStore + ?Sized> StoreFetcher<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: OutlineStore + ?Sized> TreeFetcher for StoreFetcher<'_, S> {
    fn fetch_tree(&self, uid: &str) -> Result<Block> {
        let tree = self.store.fetch_tree(uid)?;
        trace!(uid, children = tree.children.len(), "fetched tree");
        Ok(tree)
    }
}

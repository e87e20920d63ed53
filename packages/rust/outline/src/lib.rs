//! Outline store layer.
//!
//! [`OutlineStore`] is the seam between the graph pipeline and wherever the
//! outline actually lives. [`JsonOutline`] implements it over a Roam-style
//! JSON export held in memory and written back on [`JsonOutline::save`].
//!
//! **Access rules:**
//! - graph building only reads (`fetch_tree`)
//! - the render pipeline is the sole writer (`create_block`, `update_block`,
//!   `delete_block`)

mod json;

use roamgraph_shared::{Block, Result};
use uuid::Uuid;

pub use json::JsonOutline;

/// Read/write access to a hierarchical outline of blocks.
pub trait OutlineStore {
    /// Full subtree rooted at `uid`. Fails with `NotFound` for unknown uids.
    fn fetch_tree(&self, uid: &str) -> Result<Block>;

    /// Insert `block` (with its children) under `parent_uid` at `order`.
    /// An order past the end appends.
    fn create_block(&mut self, parent_uid: &str, order: usize, block: Block) -> Result<()>;

    /// Replace the text (and optionally the open state) of an existing block.
    fn update_block(&mut self, uid: &str, text: &str, open: Option<bool>) -> Result<()>;

    /// Remove a block and its whole subtree.
    fn delete_block(&mut self, uid: &str) -> Result<()>;
}

/// Source of fresh block identifiers.
pub trait UidGenerator {
    /// A new identifier, unique across the outline.
    fn generate_uid(&self) -> String;
}

/// Time-sortable UUID v7 identifiers in their hyphen-free form.
///
/// Hex only, so the ids are also valid Mermaid node names.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UidGenerator for UuidGenerator {
    fn generate_uid(&self) -> String {
        Uuid::now_v7().simple().to_string()
    }
}

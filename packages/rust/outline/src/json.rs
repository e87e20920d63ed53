//! In-memory outline backed by a Roam JSON export file.

use std::path::{Path, PathBuf};

use roamgraph_shared::{Block, Page, Result, RoamGraphError};
use tracing::{debug, info};

use crate::OutlineStore;

/// Outline pages loaded from (and saved back to) a JSON export.
#[derive(Debug, Clone, Default)]
pub struct JsonOutline {
    pages: Vec<Page>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl JsonOutline {
    /// Load an export file.
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RoamGraphError::io(path, e))?;
        let pages: Vec<Page> = serde_json::from_str(&content).map_err(|e| {
            RoamGraphError::parse(format!("failed to parse outline {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), pages = pages.len(), "loaded outline");

        Ok(Self {
            pages,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Build an outline that is not tied to a file.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            path: None,
            dirty: false,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Whether any write happened since loading or the last save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write back to the file this outline was opened from.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| RoamGraphError::Storage("outline has no backing file".into()))?;
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Serialize to `path` through a sibling temp file and a rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.pages)
            .map_err(|e| RoamGraphError::parse(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| RoamGraphError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| RoamGraphError::io(path, e))?;

        info!(path = %path.display(), "saved outline");
        Ok(())
    }

    fn contains(&self, uid: &str) -> bool {
        self.pages.iter().any(|page| page.uid.as_deref() == Some(uid))
            || self.pages.iter().any(|page| find_block(&page.children, uid).is_some())
    }

    /// Children list of a page or block, for inserting under it.
    fn children_mut(&mut self, uid: &str) -> Option<&mut Vec<Block>> {
        if let Some(index) = self
            .pages
            .iter()
            .position(|page| page.uid.as_deref() == Some(uid))
        {
            return Some(&mut self.pages[index].children);
        }
        self.pages
            .iter_mut()
            .find_map(|page| find_block_mut(&mut page.children, uid))
            .map(|block| &mut block.children)
    }
}

impl OutlineStore for JsonOutline {
    fn fetch_tree(&self, uid: &str) -> Result<Block> {
        if let Some(page) = self
            .pages
            .iter()
            .find(|page| page.uid.as_deref() == Some(uid))
        {
            return Ok(Block {
                uid: uid.to_string(),
                text: page.title.clone(),
                open: None,
                children: page.children.clone(),
            });
        }

        self.pages
            .iter()
            .find_map(|page| find_block(&page.children, uid))
            .cloned()
            .ok_or_else(|| RoamGraphError::not_found(uid))
    }

    fn create_block(&mut self, parent_uid: &str, order: usize, block: Block) -> Result<()> {
        if self.contains(&block.uid) {
            return Err(RoamGraphError::Storage(format!(
                "block {} already exists",
                block.uid
            )));
        }

        let children = self
            .children_mut(parent_uid)
            .ok_or_else(|| RoamGraphError::not_found(parent_uid))?;
        let order = order.min(children.len());
        debug!(parent_uid, order, uid = %block.uid, "creating block");
        children.insert(order, block);

        self.dirty = true;
        Ok(())
    }

    fn update_block(&mut self, uid: &str, text: &str, open: Option<bool>) -> Result<()> {
        if let Some(page) = self
            .pages
            .iter_mut()
            .find(|page| page.uid.as_deref() == Some(uid))
        {
            page.title = text.to_string();
        } else {
            let block = self
                .pages
                .iter_mut()
                .find_map(|page| find_block_mut(&mut page.children, uid))
                .ok_or_else(|| RoamGraphError::not_found(uid))?;
            block.text = text.to_string();
            if open.is_some() {
                block.open = open;
            }
        }

        debug!(uid, "updated block");
        self.dirty = true;
        Ok(())
    }

    fn delete_block(&mut self, uid: &str) -> Result<()> {
        let removed = self
            .pages
            .iter_mut()
            .find_map(|page| remove_block(&mut page.children, uid));

        match removed {
            Some(_) => {
                debug!(uid, "deleted block");
                self.dirty = true;
                Ok(())
            }
            None => Err(RoamGraphError::not_found(uid)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Depth-first search over a forest of blocks.
fn find_block<'a>(blocks: &'a [Block], uid: &str) -> Option<&'a Block> {
    let mut stack: Vec<&Block> = blocks.iter().rev().collect();
    while let Some(block) = stack.pop() {
        if block.uid == uid {
            return Some(block);
        }
        stack.extend(block.children.iter().rev());
    }
    None
}

fn find_block_mut<'a>(blocks: &'a mut [Block], uid: &str) -> Option<&'a mut Block> {
    for block in blocks {
        if block.uid == uid {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.children, uid) {
            return Some(found);
        }
    }
    None
}

fn remove_block(blocks: &mut Vec<Block>, uid: &str) -> Option<Block> {
    if let Some(index) = blocks.iter().position(|block| block.uid == uid) {
        return Some(blocks.remove(index));
    }
    blocks
        .iter_mut()
        .find_map(|block| remove_block(&mut block.children, uid))
}

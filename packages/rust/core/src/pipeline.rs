//! End-to-end `render` pipeline: root uid → graph → diagram → outline + sidebar.
//!
//! The diagram is stored under the root block as
//!
//! ```text
//! roam/js/roam-graph::
//!     {{mermaid}}
//!         graph LR ...
//! ```
//!
//! Re-rendering replaces the children of the `{{mermaid}}` block, so the
//! stored markup always reflects the current graph.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use roamgraph_outline::{OutlineStore, UidGenerator};
use roamgraph_shared::{Block, RenderConfig, Result};

use crate::fetcher::StoreFetcher;
use crate::graph::{GraphNodes, build_graph};
use crate::mermaid::{NodeLinks, render_diagram};

/// Text of the block whose child holds the diagram markup.
pub const MERMAID_BLOCK: &str = "{{mermaid}}";

/// Display surface for rendered diagrams.
pub trait Sidebar {
    /// Number of windows currently open.
    fn window_count(&self) -> usize;
    /// Open a window showing `block_uid`, whose rendered content is `markup`.
    fn add_block_window(&self, block_uid: &str, markup: &str);
}

/// Sidebar that is never shown, for headless/test usage.
pub struct NoSidebar;

impl Sidebar for NoSidebar {
    fn window_count(&self) -> usize {
        0
    }
    fn add_block_window(&self, _block_uid: &str, _markup: &str) {}
}

/// Result of [`render_block_graph`].
#[derive(Debug)]
pub struct RenderReport {
    pub root_uid: String,
    /// Number of graph nodes in the diagram.
    pub node_count: usize,
    /// `roam/js/roam-graph::` block.
    pub attribute_uid: String,
    /// `{{mermaid}}` block.
    pub mermaid_uid: String,
    /// Block holding the markup text.
    pub markup_uid: String,
    /// Whether the attribute block was created by this render.
    pub created: bool,
    /// Whether the sidebar was asked to open the diagram.
    pub opened_in_sidebar: bool,
    /// Rendered diagram.
    pub markup: String,
    pub elapsed: Duration,
}

/// Build the graph rooted at `root_uid` and render it, without writing anything.
pub fn diagram_for<S: OutlineStore + ?Sized>(
    store: &S,
    uids: &dyn UidGenerator,
    config: &RenderConfig,
    root_uid: &str,
) -> Result<(GraphNodes, String)> {
    let nodes = build_graph(&StoreFetcher::new(store), root_uid)?;
    let markup = render_diagram(&nodes, &NodeLinks::from_config(config), uids);
    Ok((nodes, markup))
}

/// Run the full `render` pipeline.
///
/// 1. Build the dependency graph and render it
/// 2. Find or create the attribute and `{{mermaid}}` blocks under the root
/// 3. Replace the markup children
/// 4. Open the diagram in the sidebar if nothing is open there yet
///
/// A failed traversal returns before anything is written.
#[instrument(skip(store, uids, sidebar, config))]
pub fn render_block_graph<S: OutlineStore + ?Sized>(
    store: &mut S,
    uids: &dyn UidGenerator,
    sidebar: &dyn Sidebar,
    config: &RenderConfig,
    root_uid: &str,
) -> Result<RenderReport> {
    let start = Instant::now();

    let (nodes, markup) = diagram_for(&*store, uids, config, root_uid)?;

    let root = store.fetch_tree(root_uid)?;
    let attribute_text = config.attribute_text();

    let (attribute_uid, mermaid_uid, markup_uid, created) =
        match root.child_with_text(&attribute_text) {
            Some(attribute) => {
                let (mermaid_uid, markup_uid) = match attribute.child_with_text(MERMAID_BLOCK) {
                    Some(mermaid) => {
                        let markup_uid =
                            replace_markup(store, uids, &mermaid.uid, &mermaid.children, &markup)?;
                        (mermaid.uid.clone(), markup_uid)
                    }
                    None => {
                        debug!(attribute_uid = %attribute.uid, "attribute block has no mermaid block");
                        create_mermaid(store, uids, &attribute.uid, &markup)?
                    }
                };
                (attribute.uid.clone(), mermaid_uid, markup_uid, false)
            }
            None => {
                let attribute_uid = uids.generate_uid();
                store.create_block(root_uid, 0, collapsed(&attribute_uid, &attribute_text))?;
                let (mermaid_uid, markup_uid) = create_mermaid(store, uids, &attribute_uid, &markup)?;
                (attribute_uid, mermaid_uid, markup_uid, true)
            }
        };

    let opened_in_sidebar = config.open_in_sidebar && sidebar.window_count() == 0;
    if opened_in_sidebar {
        sidebar.add_block_window(&mermaid_uid, &markup);
    }

    let report = RenderReport {
        root_uid: root_uid.to_string(),
        node_count: nodes.len(),
        attribute_uid,
        mermaid_uid,
        markup_uid,
        created,
        opened_in_sidebar,
        markup,
        elapsed: start.elapsed(),
    };

    info!(
        root_uid,
        nodes = report.node_count,
        created = report.created,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "rendered block graph"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn collapsed(uid: &str, text: &str) -> Block {
    Block {
        open: Some(false),
        ..Block::new(uid, text)
    }
}

/// Create `{{mermaid}}` under `parent_uid` with one markup child.
fn create_mermaid<S: OutlineStore + ?Sized>(
    store: &mut S,
    uids: &dyn UidGenerator,
    parent_uid: &str,
    markup: &str,
) -> Result<(String, String)> {
    let mermaid_uid = uids.generate_uid();
    store.create_block(parent_uid, 0, collapsed(&mermaid_uid, MERMAID_BLOCK))?;

    let markup_uid = uids.generate_uid();
    store.create_block(&mermaid_uid, 0, collapsed(&markup_uid, markup))?;

    Ok((mermaid_uid, markup_uid))
}

/// Make `markup` the only child of the mermaid block; the first existing
/// child is reused.
fn replace_markup<S: OutlineStore + ?Sized>(
    store: &mut S,
    uids: &dyn UidGenerator,
    mermaid_uid: &str,
    children: &[Block],
    markup: &str,
) -> Result<String> {
    let Some((first, rest)) = children.split_first() else {
        let markup_uid = uids.generate_uid();
        store.create_block(mermaid_uid, 0, collapsed(&markup_uid, markup))?;
        return Ok(markup_uid);
    };

    store.update_block(&first.uid, markup, Some(false))?;
    for stale in rest {
        debug!(uid = %stale.uid, "removing stale markup block");
        store.delete_block(&stale.uid)?;
    }
    Ok(first.uid.clone())
}

//! Dependency graph extraction.
//!
//! A block declares its dependencies with a child whose text is exactly
//! `Depends On::`; each child of that marker block is a reference token
//! `((uid))`. [`build_graph`] walks those references depth-first from a root
//! block and collects one [`GraphNode`] per reachable uid.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use roamgraph_shared::{Block, Result};

use crate::fetcher::TreeFetcher;

/// Text of the block that scopes a node's dependency references.
pub const DEPENDS_ON_MARKER: &str = "Depends On::";

const REF_OPEN: &str = "((";
const REF_CLOSE: &str = "))";

// ---------------------------------------------------------------------------
// Graph types
// ---------------------------------------------------------------------------

/// One vertex of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub uid: String,
    /// Text of the source block.
    pub text: String,
    /// Referenced uids in source order. Empty unless every child of the
    /// marker block was a reference.
    pub depends_on: Vec<String>,
}

/// Graph nodes keyed by uid, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GraphNodes(IndexMap<String, GraphNode>);

impl GraphNodes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.0.contains_key(uid)
    }

    pub fn get(&self, uid: &str) -> Option<&GraphNode> {
        self.0.get(uid)
    }

    /// Nodes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.0.values()
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Record a node; the first record for a uid wins.
    fn record(&mut self, node: GraphNode) {
        self.0.entry(node.uid.clone()).or_insert(node);
    }
}

impl<'a> IntoIterator for &'a GraphNodes {
    type Item = &'a GraphNode;
    type IntoIter = indexmap::map::Values<'a, String, GraphNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

impl FromIterator<GraphNode> for GraphNodes {
    fn from_iter<I: IntoIterator<Item = GraphNode>>(iter: I) -> Self {
        let mut nodes = Self::default();
        for node in iter {
            nodes.record(node);
        }
        nodes
    }
}

// ---------------------------------------------------------------------------
// Reference tokens
// ---------------------------------------------------------------------------

/// The uid inside a `((uid))` token, or `None` if `token` is not one.
///
/// No surrounding whitespace is tolerated.
pub fn extract_reference(token: &str) -> Option<&str> {
    token.strip_prefix(REF_OPEN)?.strip_suffix(REF_CLOSE)
}

/// Serialize a uid as a reference token.
pub fn wrap_reference(uid: &str) -> String {
    format!("{REF_OPEN}{uid}{REF_CLOSE}")
}

/// What a block's marker child declares.
#[derive(Debug, Default, PartialEq, Eq)]
struct Declared {
    /// All-or-nothing dependency list.
    depends_on: Vec<String>,
    /// Every well-formed reference, to be visited even when the list was discarded.
    references: Vec<String>,
}

fn declared_dependencies(tree: &Block) -> Declared {
    let Some(marker) = tree.child_with_text(DEPENDS_ON_MARKER) else {
        return Declared::default();
    };

    let parsed: Vec<Option<&str>> = marker
        .children
        .iter()
        .map(|child| extract_reference(&child.text))
        .collect();
    let references: Vec<String> = parsed.iter().flatten().map(|uid| uid.to_string()).collect();

    let depends_on = if references.len() == parsed.len() {
        references.clone()
    } else {
        warn!(
            uid = %tree.uid,
            children = parsed.len(),
            references = references.len(),
            "dependency list has non-reference entries, ignoring it"
        );
        Vec::new()
    };

    Declared {
        depends_on,
        references,
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Collect every node reachable from `root_uid` through dependency references.
///
/// Depth-first with an explicit stack; the result is in pre-order discovery
/// order (root first). Each uid is fetched at most once, so reference cycles
/// terminate. Any fetch error aborts the whole traversal.
#[instrument(skip(fetcher))]
pub fn build_graph<F: TreeFetcher + ?Sized>(fetcher: &F, root_uid: &str) -> Result<GraphNodes> {
    let mut nodes = GraphNodes::default();
    let mut stack = vec![root_uid.to_string()];

    while let Some(uid) = stack.pop() {
        if nodes.contains(&uid) {
            continue;
        }

        let tree = fetcher.fetch_tree(&uid)?;
        let Declared {
            depends_on,
            references,
        } = declared_dependencies(&tree);

        debug!(%uid, depends_on = depends_on.len(), "visited node");

        nodes.record(GraphNode {
            uid,
            text: tree.text,
            depends_on,
        });

        // Reversed so the first reference is explored first.
        stack.extend(
            references
                .into_iter()
                .rev()
                .filter(|reference| !nodes.contains(reference)),
        );
    }

    debug!(nodes = nodes.len(), "graph built");
    Ok(nodes)
}

//! Mermaid flowchart rendering for dependency graphs.
//!
//! Output shape, one block per node in discovery order:
//!
//! ```text
//! graph LR
//!     uid1("Task 1:")
//!     click uid1 "https://roamresearch.com/#/app/my-graph/page/uid1"
//!     uid1-->|Depends On:|uid2
//! ```
//!
//! Nodes with more than [`DIRECT_EDGE_LIMIT`] dependencies are routed through
//! a single `Depends On:` junction node instead of one labeled edge.

use std::collections::HashSet;

use roamgraph_outline::UidGenerator;
use roamgraph_shared::RenderConfig;
use tracing::debug;

use crate::graph::{GraphNode, GraphNodes};

/// First line of every diagram.
pub const DIAGRAM_HEADER: &str = "graph LR";

/// Largest fan-out drawn as a direct labeled edge.
pub const DIRECT_EDGE_LIMIT: usize = 2;

const INDENT: &str = "    ";
const DEPENDS_ON_LABEL: &str = "Depends On:";
const TARGET_JOIN: &str = " & ";

/// Attempts at drawing a fresh junction id before falling back to suffixing.
const MAX_UID_ATTEMPTS: usize = 16;

/// Builds the click URL of a node.
#[derive(Debug, Clone)]
pub struct NodeLinks {
    base: String,
    graph: String,
}

impl NodeLinks {
    pub fn new(base: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            graph: graph.into(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.link_base.clone(), config.graph_name.clone())
    }

    /// `<base>/<graph>/page/<uid>`
    pub fn page_url(&self, uid: &str) -> String {
        format!("{}/{}/page/{uid}", self.base, self.graph)
    }
}

/// Render the whole graph. `uids` is only consulted for junction nodes.
pub fn render_diagram(nodes: &GraphNodes, links: &NodeLinks, uids: &dyn UidGenerator) -> String {
    let mut junctions = JunctionIds::new(nodes, uids);
    let mut diagram = String::from(DIAGRAM_HEADER);

    for node in nodes {
        let junction = (node.depends_on.len() > DIRECT_EDGE_LIMIT).then(|| junctions.next());
        diagram.push('\n');
        diagram.push_str(&render_node(node, links, junction.as_deref()));
    }

    debug!(nodes = nodes.len(), junctions = junctions.used.len(), "rendered diagram");
    diagram
}

/// Declaration, click link and (optional) edge line of one node.
fn render_node(node: &GraphNode, links: &NodeLinks, junction: Option<&str>) -> String {
    let uid = &node.uid;
    let mut lines = vec![
        format!("{INDENT}{uid}(\"{}:\")", node.text),
        format!("{INDENT}click {uid} \"{}\"", links.page_url(uid)),
    ];

    if !node.depends_on.is_empty() {
        let targets = node.depends_on.join(TARGET_JOIN);
        let edge = match junction {
            None => format!("{INDENT}{uid}-->|{DEPENDS_ON_LABEL}|{targets}"),
            Some(junction) => {
                format!("{INDENT}{uid}-->{junction}(\"{DEPENDS_ON_LABEL}\")-->{targets}")
            }
        };
        lines.push(edge);
    }

    lines.join("\n")
}

/// Junction ids that collide with no graph node and with each other.
struct JunctionIds<'a> {
    nodes: &'a GraphNodes,
    uids: &'a dyn UidGenerator,
    used: HashSet<String>,
}

impl<'a> JunctionIds<'a> {
    fn new(nodes: &'a GraphNodes, uids: &'a dyn UidGenerator) -> Self {
        Self {
            nodes,
            uids,
            used: HashSet::new(),
        }
    }

    fn is_free(&self, candidate: &str) -> bool {
        !self.nodes.contains(candidate) && !self.used.contains(candidate)
    }

    fn next(&mut self) -> String {
        let mut candidate = self.uids.generate_uid();
        for _ in 1..MAX_UID_ATTEMPTS {
            if self.is_free(&candidate) {
                break;
            }
            candidate = self.uids.generate_uid();
        }

        if !self.is_free(&candidate) {
            let base = candidate;
            let mut n = 1;
            candidate = loop {
                let suffixed = format!("{base}_{n}");
                if self.is_free(&suffixed) {
                    break suffixed;
                }
                n += 1;
            };
        }

        self.used.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedUids, SequentialUids};

    fn node(uid: &str, text: &str, deps: &[&str]) -> GraphNode {
        GraphNode {
            uid: uid.into(),
            text: text.into(),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn links() -> NodeLinks {
        NodeLinks::new("https://roamresearch.com/#/app", "my-graph")
    }

    #[test]
    fn page_url_format() {
        assert_eq!(
            links().page_url("abc"),
            "https://roamresearch.com/#/app/my-graph/page/abc"
        );
        assert_eq!(
            NodeLinks::new("https://example.com/", "g").page_url("x"),
            "https://example.com/g/page/x"
        );
    }

    #[test]
    fn chain_diagram() {
        let nodes: GraphNodes = [
            node("uid1", "Task 1", &["uid2"]),
            node("uid2", "Task 2", &["uid3"]),
            node("uid3", "Task 3", &[]),
        ]
        .into_iter()
        .collect();

        let diagram = render_diagram(&nodes, &links(), &SequentialUids::default());
        let expected = "graph LR\n\
            \x20   uid1(\"Task 1:\")\n\
            \x20   click uid1 \"https://roamresearch.com/#/app/my-graph/page/uid1\"\n\
            \x20   uid1-->|Depends On:|uid2\n\
            \x20   uid2(\"Task 2:\")\n\
            \x20   click uid2 \"https://roamresearch.com/#/app/my-graph/page/uid2\"\n\
            \x20   uid2-->|Depends On:|uid3\n\
            \x20   uid3(\"Task 3:\")\n\
            \x20   click uid3 \"https://roamresearch.com/#/app/my-graph/page/uid3\"";
        assert_eq!(diagram, expected);
    }

    #[test]
    fn two_dependencies_use_direct_edge() {
        let nodes: GraphNodes = [node("a", "A", &["b", "c"])].into_iter().collect();
        let uids = SequentialUids::default();
        let diagram = render_diagram(&nodes, &links(), &uids);

        assert!(diagram.ends_with("\n    a-->|Depends On:|b & c"));
        assert!(!diagram.contains("(\"Depends On:\")"));
        assert_eq!(uids.generate_uid(), "g0", "no junction id should be drawn");
    }

    #[test]
    fn three_dependencies_use_one_junction() {
        let nodes: GraphNodes = [node("a", "A", &["b", "c", "d"])].into_iter().collect();
        let diagram = render_diagram(&nodes, &links(), &SequentialUids::default());

        assert!(diagram.ends_with("\n    a-->g0(\"Depends On:\")-->b & c & d"));
        assert_eq!(diagram.matches("(\"Depends On:\")").count(), 1);
    }

    #[test]
    fn no_dependencies_no_edge() {
        let nodes: GraphNodes = [node("solo", "Solo", &[])].into_iter().collect();
        let diagram = render_diagram(&nodes, &links(), &SequentialUids::default());
        assert_eq!(diagram.lines().count(), 3);
        assert!(!diagram.contains("-->"));
    }

    #[test]
    fn junction_never_collides_with_graph_nodes() {
        let nodes: GraphNodes = [
            node("a", "A", &["b", "c", "d"]),
            node("b", "B", &["a", "c", "d"]),
            node("c", "C", &[]),
            node("d", "D", &[]),
        ]
        .into_iter()
        .collect();

        // The generator first proposes existing node ids, then the same id twice.
        let uids = ScriptedUids::new(&["b", "c", "j1", "j1", "d", "j2"]);
        let diagram = render_diagram(&nodes, &links(), &uids);

        assert!(diagram.contains("a-->j1(\"Depends On:\")-->b & c & d"));
        assert!(diagram.contains("b-->j2(\"Depends On:\")-->a & c & d"));
    }

    #[test]
    fn stuck_generator_falls_back_to_suffix() {
        let nodes: GraphNodes = [node("a", "A", &["x", "y", "z"])].into_iter().collect();
        let script = vec!["a"; MAX_UID_ATTEMPTS];
        let uids = ScriptedUids::new(&script);
        let diagram = render_diagram(&nodes, &links(), &uids);
        assert!(diagram.contains("a-->a_1(\"Depends On:\")"));
    }

    #[test]
    fn empty_graph_is_header_only() {
        let diagram = render_diagram(&GraphNodes::default(), &links(), &SequentialUids::default());
        assert_eq!(diagram, DIAGRAM_HEADER);
    }
}

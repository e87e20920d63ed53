//! Dependency-graph extraction and Mermaid rendering for roamgraph.
//!
//! The pipeline is linear: [`fetcher`] reads block trees, [`graph`] walks
//! `Depends On::` references into a [`GraphNodes`] map, [`mermaid`] renders
//! that map, and [`pipeline`] writes the result back under the root block.

pub mod fetcher;
pub mod graph;
pub mod mermaid;
pub mod pipeline;

#[cfg(test)]
mod testutil;

pub use fetcher::{StoreFetcher, TreeFetcher};
pub use graph::{DEPENDS_ON_MARKER, GraphNode, GraphNodes, build_graph, extract_reference, wrap_reference};
pub use mermaid::{DIAGRAM_HEADER, NodeLinks, render_diagram};
pub use pipeline::{MERMAID_BLOCK, NoSidebar, RenderReport, Sidebar, diagram_for, render_block_graph};

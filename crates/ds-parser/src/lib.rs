#![forbid(unsafe_code)]

//! Parser for hand-drawn ASCII revision graphs.
//!
//! ```text
//!   a-b-c
//!    \: :
//!     d-e
//! ```
//!
//! Labels (`[A-Za-z0-9']`, optionally `^O`/`^T`) are revisions. `-`, `|`,
//! `\` and `/` draw ancestry; `.`, `:`, `<` and `>` mark the revision on
//! their earlier side as obsoleted by the one on their later side. Lines
//! starting with `||` carry commentary, and `{ node: ..., key: value }`
//! blocks attach rendering attributes to revisions drawn above them.

mod assembler;
mod edges;
mod grid;
mod lexer;
mod style;

use ds_core::{DagError, Graph};
use serde_json::json;
use tracing::debug;

pub use edges::{EdgeKind, Geometry};
pub use grid::{Cell, Grid, StyleId, build_grid};
pub use style::{GLOBAL_SELECTOR, NODE_KEY, Selector, StyleBlock};

use assembler::GraphAssembler;

/// Parse a whole diagram. The first syntax error aborts the parse.
pub fn parse(input: &str) -> Result<Graph, DagError> {
    let grid = build_grid(input);
    debug!(
        "grid: {} rows, {} nodes, {} style blocks",
        grid.height(),
        grid.nodes().len(),
        grid.styles().len()
    );
    let graph = GraphAssembler::new(grid).assemble()?;
    debug!(
        "graph: {} revisions, {} transition texts",
        graph.revisions().count(),
        graph.transitions().count()
    );
    Ok(graph)
}

/// Compact JSON summary of a parsed graph.
#[must_use]
pub fn graph_summary_json(graph: &Graph) -> String {
    let revisions: Vec<_> = graph.revisions().map(|(_, node)| node).collect();
    json!({
        "node_count": graph.len(),
        "revision_count": revisions.len(),
        "transition_count": graph.transitions().count(),
        "parent_edge_count": revisions.iter().map(|n| n.parents.len()).sum::<usize>(),
        "precursor_edge_count": revisions.iter().map(|n| n.precursors.len()).sum::<usize>(),
        "obsolete_count": revisions.iter().filter(|n| n.obsolete).count(),
    })
    .to_string()
}

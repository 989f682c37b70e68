#![forbid(unsafe_code)]

//! TikZ renderer for parsed revision graphs.
//!
//! Each revision becomes a `\node` at `(col, -row)` scaled by the config,
//! each relation a `\draw` between node names, and each transition text a
//! double implication arrow with its commentary beside it.

mod config;
mod document;
mod escape;

pub use config::TikzRenderConfig;
pub use document::{TIKZ_STYLES, TikzDocument};
pub use escape::escape_latex;

use std::fmt::Write;

use ds_core::{Graph, Node, NodeKind};
use tracing::debug;

use document::write_picture;
use escape::node_name;

/// Render the drawing commands of a `tikzpicture` body.
///
/// All nodes are emitted before any connector so every connector refers
/// to a defined name.
#[must_use]
pub fn render_tikz(graph: &Graph, config: &TikzRenderConfig) -> String {
    let mut out = String::with_capacity(64 * graph.len());

    for (_, node) in graph.iter() {
        match node.kind {
            NodeKind::Revision => write_revision(&mut out, node, config),
            NodeKind::Transition => write_transition(&mut out, node, config),
        }
    }

    let mut connectors = 0_usize;
    for (_, node) in graph.revisions() {
        let target = revision_name(node);
        for parent in node.parents.iter().filter_map(|id| graph.node(*id)) {
            let _ = writeln!(
                out,
                "\\draw[{}] ({}) -- ({target});",
                config.edge_style,
                revision_name(parent)
            );
            connectors += 1;
        }
        for precursor in node.precursors.iter().filter_map(|id| graph.node(*id)) {
            let _ = writeln!(
                out,
                "\\draw[{}] ({}) -- ({target});",
                config.marker_edge_style,
                revision_name(precursor)
            );
            connectors += 1;
        }
    }

    debug!(
        "rendered {} node(s) and {connectors} connector(s) as TikZ",
        graph.len()
    );
    out
}

/// Render a complete output: a standalone LaTeX document when
/// `config.standalone` is set, else a bare `tikzpicture` environment.
#[must_use]
pub fn render_tikz_document(graph: &Graph, config: &TikzRenderConfig) -> String {
    let body = render_tikz(graph, config);
    if config.standalone {
        let mut document = config
            .libraries
            .iter()
            .fold(TikzDocument::new(), |document, name| document.library(name));
        if !config.emit_styles {
            document = document.styles(None);
        }
        document.body(body).to_string()
    } else {
        let mut out = String::with_capacity(body.len() + 64);
        write_picture(&mut out, &body);
        out
    }
}

fn revision_name(node: &Node) -> String {
    node_name('n', node.row(), node.col())
}

fn write_revision(out: &mut String, node: &Node, config: &TikzRenderConfig) {
    let style = node
        .class()
        .unwrap_or_else(|| config.revision_style(node.obsolete, node.is_temporary()));
    let x = coord(node.col() as f32 * config.scale_x);
    let y = coord(-(node.row() as f32) * config.scale_y);
    let _ = writeln!(
        out,
        "\\node[{style}] at ({x},{y}) ({}) {{{}}};",
        revision_name(node),
        escape_latex(&node.text)
    );
}

fn write_transition(out: &mut String, node: &Node, config: &TikzRenderConfig) {
    let lines: Vec<String> = node
        .text
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let font = if idx == 0 {
                &config.text_command_style
            } else {
                &config.text_subtext_style
            };
            format!("{font}{{{}}}", escape_latex(line))
        })
        .collect();

    // The arrow starts one row up and one column left of the text.
    let x = coord((node.col() as f32 - 1.0) * config.scale_x);
    let y = coord(-(node.row() as f32 - 1.0) * config.scale_y);
    let length = coord(-((lines.len() + 1) as f32) * config.scale_y);
    let _ = writeln!(
        out,
        "\\draw[double, double equal sign distance, -Implies] ({x},{y}) -- \
         node[anchor=west, align=left] ({}) {{{}}} ++(0,{length});",
        node_name('t', node.row(), node.col()),
        lines.join("\\\\")
    );
}

/// Format a coordinate without a trailing `.0` or a negative zero.
fn coord(value: f32) -> String {
    if value == 0.0 {
        String::from("0")
    } else {
        format!("{value}")
    }
}

#![forbid(unsafe_code)]

//! Revision graph model shared by the dagsketch parser, renderer and CLI.
//!
//! A [`Graph`] overlays two relations on one node set: the parent/child
//! ancestry drawn with `-`, `|`, `\` and `/`, and the obsolescence relation
//! drawn with `.`, `:`, `<` and `>`. The second one may contain cycles.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Annotation codes that mark a revision as obsolete from the start.
pub const OBSOLETE_ANNOTATIONS: [&str; 2] = ["O", "T"];

/// Annotation code for a temporary revision.
pub const TEMPORARY_ANNOTATION: &str = "T";

/// Zero-based cell coordinate in the diagram grid.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DagErrorCode {
    Boundary,
    Garbage,
    Style,
}

impl DagErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boundary => "dag/error/boundary",
            Self::Garbage => "dag/error/garbage",
            Self::Style => "dag/error/style",
        }
    }
}

/// Fatal syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum DagError {
    /// An edge or marker has no valid neighbour on one side.
    #[error("Syntax error at ({row}, {col}): {message}")]
    Boundary {
        row: usize,
        col: usize,
        message: String,
    },
    /// An edge or marker touches something that is not a revision.
    #[error("Syntax error at ({row}, {col}): {message}")]
    Garbage {
        row: usize,
        col: usize,
        message: String,
    },
    /// A style block is malformed.
    #[error("Syntax error at ({row}, {col}): {message}")]
    Style {
        row: usize,
        col: usize,
        message: String,
    },
}

impl DagError {
    #[must_use]
    pub fn boundary(at: GridPosition, message: impl Into<String>) -> Self {
        Self::Boundary {
            row: at.row,
            col: at.col,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn garbage(at: GridPosition, message: impl Into<String>) -> Self {
        Self::Garbage {
            row: at.row,
            col: at.col,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn style(at: GridPosition, message: impl Into<String>) -> Self {
        Self::Style {
            row: at.row,
            col: at.col,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> DagErrorCode {
        match self {
            Self::Boundary { .. } => DagErrorCode::Boundary,
            Self::Garbage { .. } => DagErrorCode::Garbage,
            Self::Style { .. } => DagErrorCode::Style,
        }
    }

    #[must_use]
    pub const fn position(&self) -> GridPosition {
        match self {
            Self::Boundary { row, col, .. }
            | Self::Garbage { row, col, .. }
            | Self::Style { row, col, .. } => GridPosition::new(*row, *col),
        }
    }

    /// The violated rule, without the position prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Boundary { message, .. }
            | Self::Garbage { message, .. }
            | Self::Style { message, .. } => message,
        }
    }
}

/// Index of a node in [`Graph::nodes`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Free-form rendering attributes attached by style blocks.
pub type StyleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// A changeset drawn as an alphanumeric label.
    #[default]
    Revision,
    /// Commentary drawn with `||`. Never takes part in either relation.
    Transition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    /// Suffix after `^` in the label, if any.
    pub annotation: Option<String>,
    /// Where the node was first seen during the scan.
    pub position: GridPosition,
    pub parents: Vec<NodeId>,
    pub precursors: Vec<NodeId>,
    pub obsolete: bool,
    pub style: StyleMap,
    /// Display text: the label for revisions (unless a style overrides it),
    /// the commentary for transition texts.
    pub text: String,
}

impl Node {
    /// Build a revision from a raw label such as `b'` or `c^T`.
    #[must_use]
    pub fn revision(label: &str, position: GridPosition) -> Self {
        let (name, annotation) = match label.split_once('^') {
            Some((name, annotation)) => (name, Some(annotation.to_string())),
            None => (label, None),
        };
        let obsolete = annotation
            .as_deref()
            .is_some_and(|code| OBSOLETE_ANNOTATIONS.contains(&code));

        Self {
            kind: NodeKind::Revision,
            name: name.to_string(),
            annotation,
            position,
            parents: Vec::new(),
            precursors: Vec::new(),
            obsolete,
            style: StyleMap::new(),
            text: name.to_string(),
        }
    }

    #[must_use]
    pub fn transition(text: &str, position: GridPosition) -> Self {
        Self {
            kind: NodeKind::Transition,
            text: text.to_string(),
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_revision(&self) -> bool {
        matches!(self.kind, NodeKind::Revision)
    }

    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(self.kind, NodeKind::Transition)
    }

    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.annotation.as_deref() == Some(TEMPORARY_ANNOTATION)
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.position.row
    }

    #[must_use]
    pub const fn col(&self) -> usize {
        self.position.col
    }

    /// Name qualified by position; unique within a graph.
    #[must_use]
    pub fn key(&self) -> String {
        let name = match self.kind {
            NodeKind::Revision => self.name.as_str(),
            NodeKind::Transition => "text",
        };
        format!("{name}@{}:{}", self.position.row, self.position.col)
    }

    /// Append a parent, keeping the list free of duplicates.
    pub fn push_parent(&mut self, parent: NodeId) -> bool {
        push_unique(&mut self.parents, parent)
    }

    /// Append a precursor, keeping the list free of duplicates.
    pub fn push_precursor(&mut self, precursor: NodeId) -> bool {
        push_unique(&mut self.precursors, precursor)
    }

    /// Fold a continuation line into this transition text.
    pub fn append_text(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    /// Merge style attributes; a `text` attribute replaces the display text.
    pub fn apply_style(&mut self, attributes: &StyleMap) {
        for (key, value) in attributes {
            self.style.insert(key.clone(), value.clone());
        }
        if let Some(text) = attributes.get("text") {
            self.text.clone_from(text);
        }
    }

    /// Style class requested by a style block, if any.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.style.get("class").map(String::as_str)
    }
}

fn push_unique(list: &mut Vec<NodeId>, id: NodeId) -> bool {
    if list.contains(&id) {
        false
    } else {
        list.push(id);
        true
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelationKind {
    Parent,
    Precursor,
}

/// One edge of either relation, by node name. `from` is the earlier
/// participant (the parent or the obsoleted revision).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relation {
    pub kind: RelationKind,
    pub from: String,
    pub to: String,
}

/// Parsed diagram: nodes in discovery order plus a name index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: BTreeMap<String, NodeId>,
}

impl Graph {
    /// Freeze a fully scanned node list and index it by name.
    ///
    /// The first revision with a given name is indexed by that name, later
    /// homonyms by [`Node::key`]. Transition texts are not indexed.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut index = BTreeMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            if !node.is_revision() {
                continue;
            }
            let key = if index.contains_key(&node.name) {
                node.key()
            } else {
                node.name.clone()
            };
            index.insert(key, NodeId(idx));
        }
        Self { nodes, index }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revisions(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.iter().filter(|(_, node)| node.is_revision())
    }

    pub fn transitions(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.iter().filter(|(_, node)| node.is_transition())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// Lookup keys of all revisions.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Find a revision by index key, falling back to its display text.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        if let Some(id) = self.index.get(name) {
            return Some(*id);
        }
        self.revisions()
            .find(|(_, node)| node.text == name)
            .map(|(id, _)| id)
    }

    #[must_use]
    pub fn parent_names(&self, name: &str) -> Option<Vec<String>> {
        let node = self.node(self.find(name)?)?;
        Some(self.names_of(&node.parents))
    }

    #[must_use]
    pub fn precursor_names(&self, name: &str) -> Option<Vec<String>> {
        let node = self.node(self.find(name)?)?;
        Some(self.names_of(&node.precursors))
    }

    fn names_of(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.node(*id))
            .map(|node| node.name.clone())
            .collect()
    }

    /// Both relations as an order-independent set.
    #[must_use]
    pub fn relations(&self) -> BTreeSet<Relation> {
        let mut relations = BTreeSet::new();
        for (_, node) in self.revisions() {
            for parent in self.names_of(&node.parents) {
                relations.insert(Relation {
                    kind: RelationKind::Parent,
                    from: parent,
                    to: node.name.clone(),
                });
            }
            for precursor in self.names_of(&node.precursors) {
                relations.insert(Relation {
                    kind: RelationKind::Precursor,
                    from: precursor,
                    to: node.name.clone(),
                });
            }
        }
        relations
    }

    /// Human-readable listing: one line per revision, one `TEXT` line per
    /// line of commentary.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_dump(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn write_dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for node in &self.nodes {
            match node.kind {
                NodeKind::Revision => {
                    let parents = self.names_of(&node.parents).join(",");
                    write!(
                        out,
                        "{}[{}, {}] -> {parents}",
                        node.name,
                        node.row(),
                        node.col()
                    )?;
                    if !node.precursors.is_empty() {
                        let precursors = self.names_of(&node.precursors).join(",");
                        write!(out, " (obsoletes {precursors})")?;
                    }
                    writeln!(out)?;
                }
                NodeKind::Transition => {
                    for line in node.text.lines() {
                        writeln!(out, "TEXT[{}, {}]: {line}", node.row(), node.col())?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DagError, DagErrorCode, Graph, GridPosition, Node, NodeId, NodeKind, Relation,
        RelationKind, StyleMap,
    };

    fn at(row: usize, col: usize) -> GridPosition {
        GridPosition::new(row, col)
    }

    fn chain() -> Graph {
        let a = Node::revision("a", at(0, 0));
        let mut b = Node::revision("b", at(0, 2));
        b.push_parent(NodeId(0));
        let mut c = Node::revision("c", at(1, 2));
        c.push_precursor(NodeId(1));
        Graph::from_nodes(vec![a, b, c])
    }

    #[test]
    fn revision_label_splits_annotation() {
        let plain = Node::revision("b'", at(0, 0));
        assert_eq!(plain.name, "b'");
        assert_eq!(plain.annotation, None);
        assert!(!plain.obsolete);

        let temp = Node::revision("c^T", at(0, 0));
        assert_eq!(temp.name, "c");
        assert_eq!(temp.annotation.as_deref(), Some("T"));
        assert!(temp.obsolete);
        assert!(temp.is_temporary());

        let obs = Node::revision("d^O", at(0, 0));
        assert!(obs.obsolete);
        assert!(!obs.is_temporary());

        let other = Node::revision("e^X", at(0, 0));
        assert!(!other.obsolete);
    }

    #[test]
    fn parents_stay_unique() {
        let mut node = Node::revision("x", at(0, 0));
        assert!(node.push_parent(NodeId(3)));
        assert!(!node.push_parent(NodeId(3)));
        assert!(node.push_parent(NodeId(1)));
        assert_eq!(node.parents, vec![NodeId(3), NodeId(1)]);
    }

    #[test]
    fn style_text_overrides_display_text() {
        let mut node = Node::revision("a", at(0, 0));
        let mut style = StyleMap::new();
        style.insert("text".to_string(), "root".to_string());
        style.insert("class".to_string(), "hot".to_string());
        node.apply_style(&style);
        assert_eq!(node.name, "a");
        assert_eq!(node.text, "root");
        assert_eq!(node.class(), Some("hot"));
    }

    #[test]
    fn lookup_falls_back_to_display_text() {
        let mut a = Node::revision("a", at(0, 0));
        let mut style = StyleMap::new();
        style.insert("text".to_string(), "base".to_string());
        a.apply_style(&style);
        let graph = Graph::from_nodes(vec![a]);
        assert_eq!(graph.find("a"), Some(NodeId(0)));
        assert_eq!(graph.find("base"), Some(NodeId(0)));
        assert_eq!(graph.find("nope"), None);
    }

    #[test]
    fn homonyms_are_indexed_by_position() {
        let first = Node::revision("a", at(0, 0));
        let second = Node::revision("a", at(2, 2));
        let graph = Graph::from_nodes(vec![first, second]);
        let names: Vec<&str> = graph.names().collect();
        assert_eq!(names, vec!["a", "a@2:2"]);
        assert_eq!(graph.find("a@2:2"), Some(NodeId(1)));
    }

    #[test]
    fn transitions_are_not_indexed() {
        let text = Node::transition("hg amend", at(1, 2));
        let graph = Graph::from_nodes(vec![Node::revision("a", at(0, 0)), text]);
        assert_eq!(graph.names().count(), 1);
        assert_eq!(graph.transitions().count(), 1);
        assert_eq!(graph.nodes()[1].kind, NodeKind::Transition);
    }

    #[test]
    fn queries_return_names_in_order() {
        let graph = chain();
        assert_eq!(graph.parent_names("b"), Some(vec!["a".to_string()]));
        assert_eq!(graph.parent_names("a"), Some(vec![]));
        assert_eq!(graph.precursor_names("c"), Some(vec!["b".to_string()]));
        assert_eq!(graph.parent_names("zz"), None);
    }

    #[test]
    fn relations_cover_both_overlays() {
        let relations = chain().relations();
        assert_eq!(relations.len(), 2);
        assert!(relations.contains(&Relation {
            kind: RelationKind::Parent,
            from: "a".to_string(),
            to: "b".to_string(),
        }));
        assert!(relations.contains(&Relation {
            kind: RelationKind::Precursor,
            from: "b".to_string(),
            to: "c".to_string(),
        }));
    }

    #[test]
    fn dump_lists_positions_parents_and_obsoletes() {
        let mut nodes = chain().nodes().to_vec();
        let mut text = Node::transition("hg commit --amend", at(3, 2));
        text.append_text("(safe)");
        nodes.push(text);
        let graph = Graph::from_nodes(nodes);
        assert_eq!(
            graph.dump(),
            "a[0, 0] -> \n\
             b[0, 2] -> a\n\
             c[1, 2] ->  (obsoletes b)\n\
             TEXT[3, 2]: hg commit --amend\n\
             TEXT[3, 2]: (safe)\n"
        );
    }

    #[test]
    fn error_carries_code_and_position() {
        let err = DagError::boundary(at(4, 0), "horizontal edge at start of line");
        assert_eq!(err.code(), DagErrorCode::Boundary);
        assert_eq!(err.code().as_str(), "dag/error/boundary");
        assert_eq!(err.position(), at(4, 0));
        assert_eq!(
            err.to_string(),
            "Syntax error at (4, 0): horizontal edge at start of line"
        );
        assert_eq!(err.message(), "horizontal edge at start of line");
    }

    #[test]
    fn graph_json_round_trips() {
        let graph = chain();
        let encoded = serde_json::to_string(&graph).expect("serialize graph");
        let decoded: Graph = serde_json::from_str(&encoded).expect("deserialize graph");
        assert_eq!(decoded, graph);
    }
}

use ds_core::{DagError, Graph, GridPosition, Node, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::grid::{Cell, Grid, StyleId};

/// Drives the single row-major scan over a built grid.
pub(crate) struct GraphAssembler {
    grid: Grid,
    seen: FxHashSet<NodeId>,
    /// Nodes in the order the scan first met them.
    discovered: Vec<NodeId>,
    /// Folded transition text -> the topmost text of its run.
    folded: FxHashMap<NodeId, NodeId>,
    /// Style blocks met so far, with how many nodes existed at that point.
    styles: Vec<(StyleId, usize)>,
}

impl GraphAssembler {
    pub(crate) fn new(grid: Grid) -> Self {
        Self {
            grid,
            seen: FxHashSet::default(),
            discovered: Vec::new(),
            folded: FxHashMap::default(),
            styles: Vec::new(),
        }
    }

    pub(crate) fn assemble(mut self) -> Result<Graph, DagError> {
        for row in 0..self.grid.height() {
            for col in 0..self.grid.row_len(row) {
                let at = GridPosition::new(row, col);
                let Some(cell) = self.grid.cell(at) else {
                    continue;
                };
                self.visit(cell, at)?;
            }
        }
        if let Some(opened_at) = self.grid.unclosed_style() {
            return Err(DagError::style(opened_at, "style block is never closed"));
        }
        self.apply_styles();
        Ok(self.finish())
    }

    fn visit(&mut self, cell: Cell, at: GridPosition) -> Result<(), DagError> {
        match cell {
            Cell::Spacer(_) | Cell::TransitionMarker => {}
            Cell::Edge(kind) => kind.resolve(&mut self.grid, at)?,
            Cell::Node(id) => {
                self.register(id);
            }
            Cell::Transition(id) => {
                if self.register(id) {
                    self.fold_transition(id, at);
                }
            }
            Cell::Style(style) => {
                if let Some(Err(err)) = self.grid.style(style) {
                    return Err(err.clone());
                }
                self.styles.push((style, self.discovered.len()));
            }
        }
        Ok(())
    }

    /// Record a node the first time the scan reaches it.
    fn register(&mut self, id: NodeId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.discovered.push(id);
        trace!("registered {id:?}");
        true
    }

    /// Merge a transition text into the one directly above it, if any.
    fn fold_transition(&mut self, id: NodeId, at: GridPosition) {
        let Some(above_row) = at.row.checked_sub(1) else {
            return;
        };
        let Some(Cell::Transition(above)) = self.grid.cell(GridPosition::new(above_row, at.col))
        else {
            return;
        };
        let root = self.folded.get(&above).copied().unwrap_or(above);

        let Some(line) = self.grid.node(id).map(|node| node.text.clone()) else {
            return;
        };
        if let Some(target) = self.grid.node_mut(root) {
            target.append_text(&line);
            self.folded.insert(id, root);
            debug!("folded transition text at {at} into {root:?}");
        }
    }

    /// A block styles only the nodes found before it in the scan.
    fn apply_styles(&mut self) {
        for (style, discovered) in std::mem::take(&mut self.styles) {
            let Some(Ok(block)) = self.grid.style(style).cloned() else {
                continue;
            };
            let mut matched = 0_usize;
            for id in &self.discovered[..discovered] {
                if let Some(node) = self.grid.node_mut(*id)
                    && block.matches(node)
                {
                    node.apply_style(&block.attributes);
                    matched += 1;
                }
            }
            debug!(
                "style block at {} applied to {matched} node(s)",
                block.position
            );
        }
    }

    /// Drop folded texts and renumber the rest in discovery order.
    fn finish(self) -> Graph {
        let Self {
            grid,
            discovered,
            folded,
            ..
        } = self;

        let mut slots: Vec<Option<Node>> = grid.into_nodes().into_iter().map(Some).collect();
        let mut remap: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        let mut nodes = Vec::with_capacity(discovered.len());

        for id in discovered {
            if folded.contains_key(&id) {
                continue;
            }
            if let Some(node) = slots.get_mut(id.0).and_then(Option::take) {
                remap.insert(id, NodeId(nodes.len()));
                nodes.push(node);
            }
        }

        for node in &mut nodes {
            node.parents = renumber(&node.parents, &remap);
            node.precursors = renumber(&node.precursors, &remap);
        }

        Graph::from_nodes(nodes)
    }
}

fn renumber(ids: &[NodeId], remap: &FxHashMap<NodeId, NodeId>) -> Vec<NodeId> {
    ids.iter().filter_map(|id| remap.get(id).copied()).collect()
}

//! The 2-D cell grid built from raw lines.
//!
//! Rows keep their own length. A multi-character label stores the same
//! [`NodeId`] in every column it covers, so neighbour lookups from any
//! column land on one shared node.

use std::fmt;

use chumsky::prelude::{Parser, Rich, extra};
use ds_core::{DagError, GridPosition, Node, NodeId};
use tracing::{debug, trace};

use crate::edges::EdgeKind;
use crate::lexer::{LineKind, RowToken, classify_line, row_lexer, tokenize_row};
use crate::style::StyleBlock;

/// Index into [`Grid::styles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Blank, or a character with no meaning of its own.
    Spacer(char),
    Edge(EdgeKind),
    /// A revision label; repeated over the label's width.
    Node(NodeId),
    /// One of the two `|` of a `||` marker.
    TransitionMarker,
    /// Commentary after `||`; repeated over the rest of the line.
    Transition(NodeId),
    /// A closed style block, placed on its closing brace. Its body is
    /// checked when the scan reaches this cell.
    Style(StyleId),
}

impl Cell {
    fn from_symbol(symbol: char) -> Self {
        EdgeKind::from_symbol(symbol).map_or(Self::Spacer(symbol), Self::Edge)
    }

    /// Character shown for this cell in grid dumps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Spacer(ch) => ch,
            Self::Edge(kind) => kind.symbol(),
            Self::Node(_) => '#',
            Self::TransitionMarker => '|',
            Self::Transition(_) => '~',
            Self::Style(_) => '}',
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    nodes: Vec<Node>,
    styles: Vec<Result<StyleBlock, DagError>>,
    /// Opening brace of a block still open at end of input.
    unclosed_style: Option<GridPosition>,
}

impl Grid {
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn row_len(&self, row: usize) -> usize {
        self.row(row).len()
    }

    #[must_use]
    pub fn cell(&self, at: GridPosition) -> Option<Cell> {
        self.rows.get(at.row)?.get(at.col).copied()
    }

    /// Every node created while building, in creation order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Parse results of every closed style block, in input order.
    #[must_use]
    pub fn styles(&self) -> &[Result<StyleBlock, DagError>] {
        &self.styles
    }

    #[must_use]
    pub fn style(&self, id: StyleId) -> Option<&Result<StyleBlock, DagError>> {
        self.styles.get(id.0)
    }

    #[must_use]
    pub const fn unclosed_style(&self) -> Option<GridPosition> {
        self.unclosed_style
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().map(|cell| cell.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Style block still waiting for its closing brace.
#[derive(Debug)]
struct PendingStyle {
    opened_at: GridPosition,
    body: String,
}

#[derive(Debug, Default)]
struct GridBuilder {
    grid: Grid,
    pending_style: Option<PendingStyle>,
}

impl GridBuilder {
    fn push_line<'a, P>(&mut self, lexer: &P, line: &'a str)
    where
        P: Parser<'a, &'a str, Vec<RowToken<'a>>, extra::Err<Rich<'a, char>>>,
    {
        let row = self.grid.rows.len();
        let cells = match classify_line(line, self.pending_style.is_some()) {
            LineKind::Transition { indent, rest } => self.transition_row(row, indent, rest),
            LineKind::Style => self.style_row(row, line),
            LineKind::Plain => self.plain_row(row, tokenize_row(lexer, line)),
        };
        self.grid.rows.push(cells);
    }

    fn plain_row(&mut self, row: usize, tokens: Vec<RowToken<'_>>) -> Vec<Cell> {
        let mut cells = Vec::new();
        for token in tokens {
            match token {
                RowToken::Label(label) => {
                    let position = GridPosition::new(row, cells.len());
                    let id = self.grid.push_node(Node::revision(label, position));
                    cells.extend(std::iter::repeat_n(Cell::Node(id), token.width()));
                }
                RowToken::Symbol(symbol) => cells.push(Cell::from_symbol(symbol)),
            }
        }
        cells
    }

    fn transition_row(&mut self, row: usize, indent: usize, rest: &str) -> Vec<Cell> {
        let mut cells = vec![Cell::Spacer(' '); indent];
        cells.extend([Cell::TransitionMarker, Cell::TransitionMarker]);

        let width = rest.chars().count();
        if width > 0 {
            let position = GridPosition::new(row, cells.len());
            let id = self
                .grid
                .push_node(Node::transition(rest.trim(), position));
            cells.extend(std::iter::repeat_n(Cell::Transition(id), width));
        }
        cells
    }

    fn style_row(&mut self, row: usize, line: &str) -> Vec<Cell> {
        let mut cells: Vec<Cell> = line.chars().map(Cell::Spacer).collect();

        let mut content = line;
        if self.pending_style.is_none() {
            let stripped = content.trim_start();
            let col = line[..line.len() - stripped.len()].chars().count();
            content = stripped.strip_prefix('{').unwrap_or(stripped);
            self.pending_style = Some(PendingStyle {
                opened_at: GridPosition::new(row, col),
                body: String::new(),
            });
        }

        let closing = content.strip_suffix('}');
        if let Some(pending) = self.pending_style.as_mut() {
            pending.body.push_str(closing.unwrap_or(content));
            pending.body.push('\n');
        }

        if closing.is_some()
            && let Some(pending) = self.pending_style.take()
        {
            let block = StyleBlock::parse(&pending.body, pending.opened_at);
            match &block {
                Ok(block) => debug!(
                    "style block at {} targets {:?}",
                    pending.opened_at, block.selector
                ),
                Err(err) => debug!("deferring style block error: {err}"),
            }
            let id = StyleId(self.grid.styles.len());
            self.grid.styles.push(block);
            if let Some(last) = cells.last_mut() {
                *last = Cell::Style(id);
            }
        }

        cells
    }

    fn finish(mut self) -> Grid {
        self.grid.unclosed_style = self.pending_style.map(|pending| pending.opened_at);
        self.grid
    }
}

/// Classify every line of `input` and assemble the grid. Lines are
/// right-trimmed first.
/// Broken style blocks are kept in the grid and reported by the scan.
#[must_use]
pub fn build_grid(input: &str) -> Grid {
    let lexer = row_lexer();
    let mut builder = GridBuilder::default();
    for line in input.lines() {
        builder.push_line(&lexer, line.trim_end());
    }
    let grid = builder.finish();
    trace!("grid:\n{grid}");
    grid
}

//! Edge and marker symbols and how each one connects its neighbours.

use ds_core::{DagError, GridPosition, NodeId};

use crate::grid::{Cell, Grid};

/// Every punctuation symbol that links two revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `-`
    Horizontal,
    /// `|`
    Vertical,
    /// `\`
    LowerDiagonal,
    /// `/`
    UpperDiagonal,
    /// `.`
    HorizontalMarker,
    /// `:`
    VerticalMarker,
    /// `<`
    LowerDiagonalMarker,
    /// `>`
    UpperDiagonalMarker,
}

/// Shape of the neighbourhood a symbol reaches into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Horizontal,
    Vertical,
    Diagonal,
}

impl EdgeKind {
    pub const ALL: [Self; 8] = [
        Self::Horizontal,
        Self::Vertical,
        Self::LowerDiagonal,
        Self::UpperDiagonal,
        Self::HorizontalMarker,
        Self::VerticalMarker,
        Self::LowerDiagonalMarker,
        Self::UpperDiagonalMarker,
    ];

    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '-' => Some(Self::Horizontal),
            '|' => Some(Self::Vertical),
            '\\' => Some(Self::LowerDiagonal),
            '/' => Some(Self::UpperDiagonal),
            '.' => Some(Self::HorizontalMarker),
            ':' => Some(Self::VerticalMarker),
            '<' => Some(Self::LowerDiagonalMarker),
            '>' => Some(Self::UpperDiagonalMarker),
            _ => None,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Horizontal => '-',
            Self::Vertical => '|',
            Self::LowerDiagonal => '\\',
            Self::UpperDiagonal => '/',
            Self::HorizontalMarker => '.',
            Self::VerticalMarker => ':',
            Self::LowerDiagonalMarker => '<',
            Self::UpperDiagonalMarker => '>',
        }
    }

    /// Name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal edge",
            Self::Vertical => "vertical edge",
            Self::LowerDiagonal => "lower diagonal edge",
            Self::UpperDiagonal => "upper diagonal edge",
            Self::HorizontalMarker => "horizontal marker",
            Self::VerticalMarker => "vertical marker",
            Self::LowerDiagonalMarker => "lower diagonal marker",
            Self::UpperDiagonalMarker => "upper diagonal marker",
        }
    }

    #[must_use]
    pub const fn geometry(self) -> Geometry {
        match self {
            Self::Horizontal | Self::HorizontalMarker => Geometry::Horizontal,
            Self::Vertical | Self::VerticalMarker => Geometry::Vertical,
            Self::LowerDiagonal
            | Self::UpperDiagonal
            | Self::LowerDiagonalMarker
            | Self::UpperDiagonalMarker => Geometry::Diagonal,
        }
    }

    /// Markers record obsolescence instead of ancestry.
    #[must_use]
    pub const fn is_marker(self) -> bool {
        matches!(
            self,
            Self::HorizontalMarker
                | Self::VerticalMarker
                | Self::LowerDiagonalMarker
                | Self::UpperDiagonalMarker
        )
    }

    /// Row/column offsets of the earlier and the later participant.
    const fn offsets(self) -> ((isize, isize), (isize, isize)) {
        match self {
            Self::Horizontal | Self::HorizontalMarker => ((0, -1), (0, 1)),
            Self::Vertical => ((1, 0), (-1, 0)),
            Self::VerticalMarker => ((-1, 0), (1, 0)),
            Self::LowerDiagonal | Self::LowerDiagonalMarker => ((-1, -1), (1, 1)),
            Self::UpperDiagonal => ((1, -1), (-1, 1)),
            Self::UpperDiagonalMarker => ((-1, 1), (1, -1)),
        }
    }

    /// Validate, look up both participants and record the relation.
    pub(crate) fn resolve(self, grid: &mut Grid, at: GridPosition) -> Result<(), DagError> {
        self.check_bounds(grid, at)?;
        let (earlier, later) = self.participants(grid, at)?;
        self.connect(grid, earlier, later);
        Ok(())
    }

    fn check_bounds(self, grid: &Grid, at: GridPosition) -> Result<(), DagError> {
        let GridPosition { row, col } = at;
        let last_row = grid.height().saturating_sub(1);

        match self.geometry() {
            Geometry::Horizontal => {
                if col == 0 {
                    return Err(DagError::boundary(
                        at,
                        format!("{} at start of line", self.as_str()),
                    ));
                }
                if col + 1 >= grid.row_len(row) {
                    return Err(DagError::boundary(
                        at,
                        format!("{} at end of line", self.as_str()),
                    ));
                }
            }
            Geometry::Vertical | Geometry::Diagonal => {
                if row == 0 {
                    return Err(DagError::boundary(
                        at,
                        format!("{} on first line", self.as_str()),
                    ));
                }
                if row >= last_row {
                    return Err(DagError::boundary(
                        at,
                        format!("{} on last line", self.as_str()),
                    ));
                }
            }
        }

        if self.geometry() == Geometry::Diagonal {
            if col == 0 {
                return Err(DagError::boundary(
                    at,
                    format!("{} at start of line", self.as_str()),
                ));
            }
            // The participant to the right sits on the row the symbol leans
            // towards; that row must reach it.
            let (earlier, later) = self.offsets();
            let right_row = if earlier.1 > 0 { earlier.0 } else { later.0 };
            let adjacent = offset(at, (right_row, 0)).map_or(0, |pos| grid.row_len(pos.row));
            if col + 1 >= adjacent {
                return Err(DagError::boundary(
                    at,
                    format!("{} points past end of next line", self.as_str()),
                ));
            }
        }

        Ok(())
    }

    fn participants(self, grid: &Grid, at: GridPosition) -> Result<(NodeId, NodeId), DagError> {
        let (earlier, later) = self.offsets();
        let lookup = |delta: (isize, isize)| match offset(at, delta).and_then(|pos| grid.cell(pos)) {
            Some(Cell::Node(id)) => Some(id),
            _ => None,
        };

        match (lookup(earlier), lookup(later)) {
            (Some(earlier), Some(later)) => Ok((earlier, later)),
            _ => Err(DagError::garbage(
                at,
                format!("{} connected to garbage", self.as_str()),
            )),
        }
    }

    fn connect(self, grid: &mut Grid, earlier: NodeId, later: NodeId) {
        if self.is_marker() {
            if let Some(successor) = grid.node_mut(later) {
                successor.push_precursor(earlier);
            }
            if let Some(precursor) = grid.node_mut(earlier) {
                precursor.obsolete = true;
            }
            return;
        }

        // A `|` under a node that already has a parent continues the line
        // downwards: the lower node becomes the child instead.
        let reversed = self == Self::Vertical
            && grid
                .node(later)
                .is_some_and(|upper| !upper.parents.is_empty());
        let (parent, child) = if reversed {
            (later, earlier)
        } else {
            (earlier, later)
        };

        if let Some(node) = grid.node_mut(child) {
            node.push_parent(parent);
        }
        tracing::trace!(
            "{}: {:?} -> {:?}{}",
            self.as_str(),
            parent,
            child,
            if reversed { " (continuation)" } else { "" }
        );
    }
}

fn offset(at: GridPosition, (d_row, d_col): (isize, isize)) -> Option<GridPosition> {
    Some(GridPosition::new(
        at.row.checked_add_signed(d_row)?,
        at.col.checked_add_signed(d_col)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::{EdgeKind, Geometry};

    #[test]
    fn symbol_table_round_trips() {
        for kind in EdgeKind::ALL {
            assert_eq!(EdgeKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(EdgeKind::from_symbol('x'), None);
        assert_eq!(EdgeKind::from_symbol(' '), None);
    }

    #[test]
    fn markers_and_edges_are_split_evenly() {
        let markers = EdgeKind::ALL.iter().filter(|k| k.is_marker()).count();
        assert_eq!(markers, 4);
    }

    #[test]
    fn geometry_groups_symbols() {
        assert_eq!(EdgeKind::Horizontal.geometry(), Geometry::Horizontal);
        assert_eq!(EdgeKind::HorizontalMarker.geometry(), Geometry::Horizontal);
        assert_eq!(EdgeKind::VerticalMarker.geometry(), Geometry::Vertical);
        assert_eq!(EdgeKind::UpperDiagonalMarker.geometry(), Geometry::Diagonal);
    }

    #[test]
    fn diagnostics_name_the_construct() {
        assert_eq!(EdgeKind::LowerDiagonal.as_str(), "lower diagonal edge");
        assert_eq!(EdgeKind::UpperDiagonalMarker.as_str(), "upper diagonal marker");
    }
}

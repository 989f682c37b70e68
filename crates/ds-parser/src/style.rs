//! `{ node: a, class: hot, text: base }` style blocks.

use ds_core::{DagError, GridPosition, Node, StyleMap};
use tracing::warn;

/// Reserved key naming the node a block targets.
pub const NODE_KEY: &str = "node";

/// Selector value that matches every revision.
pub const GLOBAL_SELECTOR: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Global,
    Name(String),
}

impl Selector {
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_revision() {
            return false;
        }
        match self {
            Self::Global => true,
            Self::Name(name) => node.name == *name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBlock {
    pub selector: Selector,
    /// Every pair except `node`.
    pub attributes: StyleMap,
    /// Position of the opening brace.
    pub position: GridPosition,
}

impl StyleBlock {
    /// Parse the text between the braces: comma-separated `key: value`
    /// pairs, split on the first colon, blank entries skipped.
    pub fn parse(body: &str, position: GridPosition) -> Result<Self, DagError> {
        let mut selector = None;
        let mut attributes = StyleMap::new();

        for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let Some((key, value)) = entry.split_once(':') else {
                warn!("style block at {position}: ignoring entry without ':': {entry}");
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim();

            if key == NODE_KEY {
                if !value.is_empty() {
                    selector = Some(if value == GLOBAL_SELECTOR {
                        Selector::Global
                    } else {
                        Selector::Name(value.to_string())
                    });
                }
            } else {
                attributes.insert(key.to_string(), value.to_string());
            }
        }

        let Some(selector) = selector else {
            return Err(DagError::style(
                position,
                "style found but no node specified",
            ));
        };

        Ok(Self {
            selector,
            attributes,
            position,
        })
    }

    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        self.selector.matches(node)
    }
}

#[cfg(test)]
mod tests {
    use ds_core::{DagErrorCode, GridPosition, Node};

    use super::{Selector, StyleBlock};

    fn at(row: usize, col: usize) -> GridPosition {
        GridPosition::new(row, col)
    }

    #[test]
    fn parses_pairs_and_selector() {
        let block = StyleBlock::parse("node: a, class: hot, text: base", at(3, 0))
            .expect("valid style block");
        assert_eq!(block.selector, Selector::Name("a".to_string()));
        assert_eq!(block.attributes.len(), 2);
        assert_eq!(block.attributes.get("class").map(String::as_str), Some("hot"));
        assert_eq!(block.attributes.get("text").map(String::as_str), Some("base"));
        assert!(!block.attributes.contains_key("node"));
    }

    #[test]
    fn colon_splits_only_once() {
        let block = StyleBlock::parse("node: a, text: 12:30", at(0, 0)).expect("valid");
        assert_eq!(block.attributes.get("text").map(String::as_str), Some("12:30"));
    }

    #[test]
    fn blank_entries_and_newlines_are_skipped() {
        let block = StyleBlock::parse("\n node: global,,\n class: x,\n", at(0, 0)).expect("valid");
        assert_eq!(block.selector, Selector::Global);
        assert_eq!(block.attributes.len(), 1);
    }

    #[test]
    fn missing_node_is_fatal() {
        let err = StyleBlock::parse("class: hot", at(5, 2)).expect_err("no selector");
        assert_eq!(err.code(), DagErrorCode::Style);
        assert_eq!(err.position(), at(5, 2));

        let err = StyleBlock::parse("node: , class: hot", at(0, 0)).expect_err("empty selector");
        assert_eq!(err.code(), DagErrorCode::Style);
    }

    #[test]
    fn selectors_match_revisions_only() {
        let a = Node::revision("a", at(0, 0));
        let b = Node::revision("b", at(0, 2));
        let text = Node::transition("note", at(1, 2));

        let global = Selector::Global;
        assert!(global.matches(&a));
        assert!(global.matches(&b));
        assert!(!global.matches(&text));

        let named = Selector::Name("a".to_string());
        assert!(named.matches(&a));
        assert!(!named.matches(&b));
    }
}

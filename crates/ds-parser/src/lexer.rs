//! Line classification: decides what kind of row a raw line is and splits
//! plain rows into label runs and single-character symbols.

use chumsky::prelude::*;

/// Marker that starts a transition-text line.
pub(crate) const TRANSITION_MARKER: &str = "||";

/// Token of a plain diagram row. Every input character belongs to exactly
/// one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowToken<'a> {
    /// Maximal run of label characters, annotation included.
    Label(&'a str),
    Symbol(char),
}

impl RowToken<'_> {
    pub(crate) fn width(&self) -> usize {
        match self {
            Self::Label(run) => run.chars().count(),
            Self::Symbol(_) => 1,
        }
    }
}

/// What a single (right-trimmed) line turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// `<indent>|| text`
    Transition {
        /// Characters before the marker.
        indent: usize,
        /// Everything after the marker, untrimmed.
        rest: &'a str,
    },
    /// Part of a `{ ... }` style block.
    Style,
    Plain,
}

pub(crate) const fn is_label_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '\'' | '^')
}

/// Classify a line. `style_open` is true while a style block from an
/// earlier line is still waiting for its closing brace.
pub(crate) fn classify_line(line: &str, style_open: bool) -> LineKind<'_> {
    if style_open {
        return LineKind::Style;
    }

    let stripped = line.trim_start();
    if let Some(rest) = stripped.strip_prefix(TRANSITION_MARKER) {
        let indent = line[..line.len() - stripped.len()].chars().count();
        return LineKind::Transition { indent, rest };
    }
    if stripped.starts_with('{') {
        return LineKind::Style;
    }
    LineKind::Plain
}

/// Build the row tokenizer. Constructed once per parse call and reused for
/// every plain row.
pub(crate) fn row_lexer<'a>()
-> impl Parser<'a, &'a str, Vec<RowToken<'a>>, extra::Err<Rich<'a, char>>> {
    let label = any()
        .filter(|c: &char| is_label_char(*c))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(RowToken::Label);
    let symbol = any().map(RowToken::Symbol);

    label
        .or(symbol)
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

/// Tokenize one plain row, falling back to one symbol per character if the
/// tokenizer rejects it.
pub(crate) fn tokenize_row<'a, P>(lexer: &P, line: &'a str) -> Vec<RowToken<'a>>
where
    P: Parser<'a, &'a str, Vec<RowToken<'a>>, extra::Err<Rich<'a, char>>>,
{
    match lexer.parse(line).into_result() {
        Ok(tokens) => tokens,
        Err(errors) => {
            tracing::debug!(
                "row tokenizer rejected {line:?} ({} errors); splitting per character",
                errors.len()
            );
            line.chars().map(RowToken::Symbol).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LineKind, RowToken, classify_line, row_lexer, tokenize_row};

    #[test]
    fn splits_labels_and_symbols() {
        let lexer = row_lexer();
        let tokens = tokenize_row(&lexer, "  a-b'.c^T");
        assert_eq!(
            tokens,
            vec![
                RowToken::Symbol(' '),
                RowToken::Symbol(' '),
                RowToken::Label("a"),
                RowToken::Symbol('-'),
                RowToken::Label("b'"),
                RowToken::Symbol('.'),
                RowToken::Label("c^T"),
            ]
        );
    }

    #[test]
    fn label_runs_are_maximal() {
        let lexer = row_lexer();
        let tokens = tokenize_row(&lexer, "abc12-x");
        assert_eq!(tokens[0], RowToken::Label("abc12"));
        assert_eq!(tokens[0].width(), 5);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn token_widths_cover_every_character() {
        let lexer = row_lexer();
        let line = "a-b \\ é/ 7:x";
        let tokens = tokenize_row(&lexer, line);
        let width: usize = tokens.iter().map(RowToken::width).sum();
        assert_eq!(width, line.chars().count());
    }

    #[test]
    fn empty_row_has_no_tokens() {
        let lexer = row_lexer();
        assert!(tokenize_row(&lexer, "").is_empty());
    }

    #[test]
    fn classifies_transition_lines() {
        assert_eq!(
            classify_line("  || hg commit --amend", false),
            LineKind::Transition {
                indent: 2,
                rest: " hg commit --amend",
            }
        );
        assert_eq!(
            classify_line("||", false),
            LineKind::Transition { indent: 0, rest: "" }
        );
    }

    #[test]
    fn classifies_style_lines() {
        assert_eq!(classify_line("  {node: a", false), LineKind::Style);
        assert_eq!(classify_line("class: x}", true), LineKind::Style);
        assert_eq!(classify_line("|| inside", true), LineKind::Style);
        assert_eq!(classify_line("a-b", false), LineKind::Plain);
        assert_eq!(classify_line(" | ", false), LineKind::Plain);
    }
}

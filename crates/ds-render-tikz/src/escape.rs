/// Escape LaTeX special characters in node labels and commentary.
pub fn escape_latex(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str(r"\textbackslash{}"),
            '~' => result.push_str(r"\textasciitilde{}"),
            '^' => result.push_str(r"\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// TikZ node name for the node first seen at `(row, col)`. Labels may
/// repeat or contain characters TikZ rejects in names, positions cannot.
pub fn node_name(prefix: char, row: usize, col: usize) -> String {
    format!("{prefix}{row}x{col}")
}

#[cfg(test)]
mod tests {
    use super::{escape_latex, node_name};

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_latex("a_b & 50%"), r"a\_b \& 50\%");
        assert_eq!(escape_latex("{x}"), r"\{x\}");
        assert_eq!(escape_latex(r"c:\tmp"), r"c:\textbackslash{}tmp");
        assert_eq!(escape_latex("~^"), r"\textasciitilde{}\textasciicircum{}");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(escape_latex("hg commit --amend"), "hg commit --amend");
        assert_eq!(escape_latex("b'"), "b'");
    }

    #[test]
    fn node_names_are_positional() {
        assert_eq!(node_name('n', 3, 12), "n3x12");
        assert_eq!(node_name('t', 0, 4), "t0x4");
    }
}

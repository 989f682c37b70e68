//! Standalone LaTeX document wrapping a TikZ picture.

use std::fmt::{self, Write};
use std::io;

/// Style definitions for every node and connector style the renderer emits.
pub const TIKZ_STYLES: &str = r"\tikzset{
  changeset/.style={
    draw=#1,
    thick,
    minimum width=3em,
    minimum height=2em
  },
  changeset/.default={black},
%
  obschangeset/.style={
    draw=#1,
    thick,
    dashed,
    minimum width=3em,
    minimum height=2em
  },
  obschangeset/.default={black},
%
  upperT/.style={
    fill=white,
    minimum width=0,
    minimum height=0,
  },
%
  tmpchangeset/.style={
    obschangeset,
    postaction={
      decorate,
      decoration={
        markings,
        mark=at position 0.5 with {\node[upperT] {\tiny{\textbf{T}}};},
      },
    },
  },
  tmpchangeset/.default={black},
%
  nodenote/.style={
    fill=red!20,
    line width=2mm
  },
%
  edge/.style={
    draw=#1,
    latex-,
    thick
  },
  edge/.default={black},
%
  obsedge/.style={
    draw=#1,
    latex-,
    thick
  },
  obsedge/.default={black},
%
  markeredge/.style={
    draw=#1,
    latex-,
    thick,
    dotted
  },
  markeredge/.default={black},
}";

const DEFAULT_LIBRARIES: [&str; 6] = [
    "arrows.meta",
    "fadings",
    "graphs",
    "shapes",
    "decorations.markings",
    "calc",
];

/// LaTeX document builder around one `tikzpicture`.
#[derive(Debug, Clone)]
pub struct TikzDocument {
    libraries: Vec<String>,
    styles: Option<String>,
    body: String,
}

impl TikzDocument {
    /// Document with the default libraries and style definitions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            libraries: DEFAULT_LIBRARIES.iter().map(ToString::to_string).collect(),
            styles: Some(TIKZ_STYLES.to_string()),
            body: String::new(),
        }
    }

    /// Load an extra TikZ library.
    #[must_use]
    pub fn library(mut self, name: &str) -> Self {
        if !self.libraries.iter().any(|lib| lib == name) {
            self.libraries.push(name.to_string());
        }
        self
    }

    /// Replace the `\tikzset` block. `None` omits it.
    #[must_use]
    pub fn styles(mut self, styles: Option<String>) -> Self {
        self.styles = styles;
        self
    }

    /// Set the picture body (the drawing commands).
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn write_to_string(&self, output: &mut String) {
        output.push_str("\\documentclass[tikz]{standalone}\n\n");
        let _ = writeln!(
            output,
            "\\usetikzlibrary{{{}}}\n",
            self.libraries.join(", ")
        );
        if let Some(ref styles) = self.styles {
            output.push_str(styles);
            output.push_str("\n\n");
        }
        output.push_str("\\begin{document}\n\n");
        write_picture(output, &self.body);
        output.push_str("\\end{document}\n");
    }

    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

impl Default for TikzDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TikzDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::with_capacity(2048 + self.body.len());
        self.write_to_string(&mut output);
        f.write_str(&output)
    }
}

/// Wrap drawing commands in a `tikzpicture` environment.
pub(crate) fn write_picture(output: &mut String, body: &str) {
    output.push_str("\\begin{tikzpicture}\n\n");
    output.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        output.push('\n');
    }
    output.push_str("\n\\end{tikzpicture}\n");
}

#[cfg(test)]
mod tests {
    use super::TikzDocument;

    #[test]
    fn wraps_body_in_document() {
        let doc = TikzDocument::new().body("\\node at (0,0) (a) {a};");
        let tex = doc.to_string();
        assert!(tex.starts_with("\\documentclass[tikz]{standalone}"));
        assert!(tex.contains("\\begin{tikzpicture}\n\n\\node at (0,0) (a) {a};\n"));
        assert!(tex.trim_end().ends_with("\\end{document}"));
    }

    #[test]
    fn defines_every_emitted_style() {
        let tex = TikzDocument::new().to_string();
        for style in ["changeset", "obschangeset", "tmpchangeset", "edge", "markeredge"] {
            assert!(tex.contains(&format!("  {style}/.style=")), "{style}");
        }
        assert!(tex.contains(
            "\\usetikzlibrary{arrows.meta, fadings, graphs, shapes, decorations.markings, calc}"
        ));
    }

    #[test]
    fn extra_libraries_are_deduplicated() {
        let tex = TikzDocument::new()
            .library("calc")
            .library("positioning")
            .to_string();
        assert_eq!(tex.matches("calc").count(), 1);
        assert!(tex.contains(", positioning}"));
    }

    #[test]
    fn styles_can_be_omitted() {
        let tex = TikzDocument::new().styles(None).to_string();
        assert!(!tex.contains("\\tikzset"));
    }

    #[test]
    fn write_to_matches_display() {
        let doc = TikzDocument::new().body("x");
        let mut out = Vec::new();
        doc.write_to(&mut out).expect("write to vec");
        assert_eq!(String::from_utf8(out).expect("utf8"), doc.to_string());
    }
}

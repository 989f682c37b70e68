//! TikZ renderer configuration types.

use serde::Deserialize;

/// Configuration for TikZ rendering.
///
/// Every field has a default, so a partial TOML table only overrides the
/// keys it names.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TikzRenderConfig {
    /// Horizontal distance per grid column, in TikZ units.
    pub scale_x: f32,
    /// Vertical distance per grid row, in TikZ units.
    pub scale_y: f32,
    /// Wrap the picture in the full LaTeX document template.
    pub standalone: bool,
    /// Node style for plain revisions.
    pub changeset_style: String,
    /// Node style for obsolete revisions.
    pub obsolete_style: String,
    /// Node style for temporary (`^T`) revisions.
    pub temporary_style: String,
    /// Connector style for parent relations.
    pub edge_style: String,
    /// Connector style for precursor relations.
    pub marker_edge_style: String,
    /// Font commands for the first line of a transition text.
    pub text_command_style: String,
    /// Font commands for the remaining lines of a transition text.
    pub text_subtext_style: String,
    /// Extra TikZ libraries for the standalone document.
    pub libraries: Vec<String>,
    /// Include the `\tikzset` style definitions in the standalone document.
    pub emit_styles: bool,
}

impl Default for TikzRenderConfig {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            standalone: false,
            changeset_style: String::from("changeset"),
            obsolete_style: String::from("obschangeset"),
            temporary_style: String::from("tmpchangeset"),
            edge_style: String::from("edge"),
            marker_edge_style: String::from("markeredge"),
            text_command_style: String::from(r"\small\texttt"),
            text_subtext_style: String::from(r"\scriptsize\emph"),
            libraries: Vec::new(),
            emit_styles: true,
        }
    }
}

impl TikzRenderConfig {
    /// Tighter spacing for dense diagrams.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            scale_x: 0.75,
            scale_y: 0.75,
            text_command_style: String::from(r"\scriptsize\texttt"),
            text_subtext_style: String::from(r"\tiny\emph"),
            ..Self::default()
        }
    }

    /// Default layout wrapped in a compilable document.
    #[must_use]
    pub fn standalone() -> Self {
        Self {
            standalone: true,
            ..Self::default()
        }
    }

    /// Node style for a revision, given its resolved state.
    #[must_use]
    pub fn revision_style(&self, obsolete: bool, temporary: bool) -> &str {
        if temporary {
            &self.temporary_style
        } else if obsolete {
            &self.obsolete_style
        } else {
            &self.changeset_style
        }
    }
}

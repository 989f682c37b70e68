#![forbid(unsafe_code)]

//! dagsketch CLI - parse, dump and render ASCII revision graphs.
//!
//! # Commands
//!
//! - (none): Read a diagram from stdin and print the text dump
//! - `dump`: Print the text dump of a diagram
//! - `parse`: Output the parsed graph as JSON
//! - `render`: Convert a diagram to TikZ
//! - `validate`: Check a diagram and report the first syntax error

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ds_core::{DagError, Graph};
use ds_parser::{graph_summary_json, parse};
use ds_render_tikz::{TikzRenderConfig, render_tikz_document};
use serde::Serialize;
use tracing::{debug, info};

/// dagsketch CLI - parse, dump and render ASCII revision graphs.
#[derive(Debug, Parser)]
#[command(
    name = "dagsketch",
    version,
    about = "dagsketch CLI - parse, dump and render ASCII revision graphs",
    long_about = "Reads revision graphs drawn as ASCII art (labels joined by\n\
        -, |, \\ and / for ancestry and ., :, < and > for obsolescence).\n\n\
        Without a subcommand, reads stdin and prints the text dump."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one line per revision with its position, parents and precursors.
    Dump {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,
    },

    /// Parse a diagram and output the graph as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output relation counts only
        #[arg(long)]
        summary: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Render a diagram as TikZ.
    Render {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Wrap the picture in a compilable LaTeX document
        #[arg(long)]
        standalone: bool,

        /// Use the compact layout preset
        #[arg(long, conflicts_with = "config")]
        compact: bool,

        /// TOML file with renderer settings
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a diagram and report the first syntax error.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Result of validating a diagram.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    revision_count: usize,
    transition_count: usize,
    parent_edge_count: usize,
    precursor_edge_count: usize,
    error: Option<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: String,
    message: String,
    row: usize,
    column: usize,
}

impl From<&DagError> for ValidationError {
    fn from(err: &DagError) -> Self {
        let position = err.position();
        Self {
            code: err.code().as_str().to_string(),
            message: err.message().to_string(),
            row: position.row,
            column: position.col,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        None => cmd_dump("-"),

        Some(Command::Dump { input }) => cmd_dump(&input),

        Some(Command::Parse {
            input,
            summary,
            pretty,
        }) => cmd_parse(&input, summary, pretty),

        Some(Command::Render {
            input,
            output,
            standalone,
            compact,
            config,
        }) => cmd_render(
            &input,
            output.as_deref(),
            standalone,
            compact,
            config.as_deref(),
        ),

        Some(Command::Validate { input, json }) => cmd_validate(&input, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline diagram text
        Ok(input.to_string())
    }
}

fn load_config(path: Option<&str>, compact: bool) -> Result<TikzRenderConfig> {
    let Some(path) = path else {
        return Ok(if compact {
            TikzRenderConfig::compact()
        } else {
            TikzRenderConfig::default()
        });
    };
    let text =
        std::fs::read_to_string(path).context(format!("Failed to read config file: {path}"))?;
    let config = toml::from_str(&text).context(format!("Invalid config file: {path}"))?;
    debug!("Loaded render config from {path}");
    Ok(config)
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn parse_source(source: &str) -> Result<Graph> {
    let graph = parse(source).context("Failed to parse diagram")?;
    info!(
        "Parsed {} revisions and {} transition texts",
        graph.revisions().count(),
        graph.transitions().count()
    );
    Ok(graph)
}

// =============================================================================
// Command: dump
// =============================================================================

fn cmd_dump(input: &str) -> Result<()> {
    let source = load_input(input)?;
    let graph = parse_source(&source)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    graph
        .write_dump(&mut out)
        .context("Failed to write to stdout")?;
    out.flush().context("Failed to write to stdout")?;
    Ok(())
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, summary: bool, pretty: bool) -> Result<()> {
    let source = load_input(input)?;
    let graph = parse_source(&source)?;

    let output = if summary {
        if pretty {
            let value: serde_json::Value = serde_json::from_str(&graph_summary_json(&graph))?;
            serde_json::to_string_pretty(&value)?
        } else {
            graph_summary_json(&graph)
        }
    } else if pretty {
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string(&graph)?
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &str,
    output: Option<&str>,
    standalone: bool,
    compact: bool,
    config_path: Option<&str>,
) -> Result<()> {
    let source = load_input(input)?;
    let graph = parse_source(&source)?;

    let mut config = load_config(config_path, compact)?;
    if standalone {
        config.standalone = true;
    }

    let tikz = render_tikz_document(&graph, &config);
    write_output(output, &tikz)
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, json_output: bool) -> Result<()> {
    let source = load_input(input)?;

    let result = match parse(&source) {
        Ok(graph) => {
            let revisions: Vec<_> = graph.revisions().map(|(_, node)| node).collect();
            ValidateResult {
                valid: true,
                revision_count: revisions.len(),
                transition_count: graph.transitions().count(),
                parent_edge_count: revisions.iter().map(|n| n.parents.len()).sum(),
                precursor_edge_count: revisions.iter().map(|n| n.precursors.len()).sum(),
                error: None,
            }
        }
        Err(err) => ValidateResult {
            valid: false,
            revision_count: 0,
            transition_count: 0,
            parent_edge_count: 0,
            precursor_edge_count: 0,
            error: Some(ValidationError::from(&err)),
        },
    };

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else if let Some(err) = &result.error {
        println!("✗ Invalid diagram");
        println!(
            "  [{}] {} (row {}, col {})",
            err.code, err.message, err.row, err.column
        );
    } else {
        println!("✓ Valid diagram");
        println!("  Revisions: {}", result.revision_count);
        println!("  Transition texts: {}", result.transition_count);
        println!("  Parent edges: {}", result.parent_edge_count);
        println!("  Obsolescence markers: {}", result.precursor_edge_count);
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ds_core::{DagError, GridPosition};

    use clap::Parser;
    use ds_render_tikz::TikzRenderConfig;

    use super::{Cli, ValidationError, load_config, load_input};

    #[test]
    fn missing_config_path_uses_defaults() {
        let config = load_config(None, false).expect("default config");
        assert_eq!(config.edge_style, "edge");
        assert!(!config.standalone);
    }

    #[test]
    fn compact_flag_selects_the_compact_preset() {
        let config = load_config(None, true).expect("compact config");
        assert_eq!(config, TikzRenderConfig::compact());
    }

    #[test]
    fn compact_conflicts_with_config_file() {
        let result = Cli::try_parse_from(["dagsketch", "render", "--compact", "-c", "x.toml"]);
        assert!(result.is_err());
    }

    #[test]
    fn config_file_overrides_named_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "standalone = true\nmarker_edge_style = \"obsedge\"").expect("write");
        let path = file.path().to_string_lossy().into_owned();

        let config = load_config(Some(path.as_str()), false).expect("valid config");
        assert!(config.standalone);
        assert_eq!(config.marker_edge_style, "obsedge");
        assert_eq!(config.edge_style, "edge");
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "scale_x = \"wide\"").expect("write");
        let path = file.path().to_string_lossy().into_owned();
        assert!(load_config(Some(path.as_str()), false).is_err());
    }

    #[test]
    fn input_reads_existing_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "a-b").expect("write");
        let path = file.path().to_string_lossy().into_owned();
        assert_eq!(load_input(&path).expect("read file"), "a-b");
    }

    #[test]
    fn input_that_is_not_a_path_is_inline_text() {
        assert_eq!(load_input("a-b-c").expect("inline"), "a-b-c");
    }

    #[test]
    fn validation_error_carries_code_and_position() {
        let err = DagError::garbage(GridPosition::new(2, 5), "vertical edge connected to garbage");
        let reported = ValidationError::from(&err);
        assert_eq!(reported.code, "dag/error/garbage");
        assert_eq!(reported.row, 2);
        assert_eq!(reported.column, 5);
        assert_eq!(reported.message, "vertical edge connected to garbage");
    }
}

//! SeqRing - Circular Sequence Viewer
//!
//! Draws sequences as circular diagrams in the terminal.
//!
//! ## Usage
//!
//! ```bash
//! seqring ACGTACGT                       # one DNA sequence
//! seqring ACGT GGCC --title a --title b  # two titled diagrams
//! seqring --protein MKVLA                # protein
//! ```
//!
//! ## Controls
//!
//! - Mouse wheel: zoom about the pointer
//! - `Shift` + mouse wheel or `[` / `]`: rotate every diagram
//! - Left drag or arrows: pan
//! - `r`: reset view, `?`: help, `q`: quit

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use seqring::config::{parse_size, ViewerConfig, DEFAULT_ROTATION_SENSITIVITY};
use seqring::controller::run_app;
use seqring::geometry::Size;
use seqring::logging;
use seqring::model::{DefaultLayout, SequenceInput};
use seqring::viewer::SequenceViewer;

/// Diagram layout requested for DNA sequences
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Circular diagram
    Circular,
    /// Linear map (drawn circularly for now)
    Linear,
}

impl From<LayoutArg> for DefaultLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Circular => DefaultLayout::Circular,
            LayoutArg::Linear => DefaultLayout::Linear,
        }
    }
}

/// SeqRing - A terminal viewer drawing sequences as rotatable circular diagrams
///
/// Scroll to zoom, hold Shift while scrolling to rotate.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Sequences to display, one diagram each
    sequences: Vec<String>,

    /// Treat every sequence as a protein
    #[arg(short = 'p', long = "protein")]
    protein: bool,

    /// Default layout of DNA sequences
    #[arg(short = 'l', long = "layout", value_enum)]
    layout: Option<LayoutArg>,

    /// Diagram title, matched to sequences by position (repeatable)
    #[arg(short = 't', long = "title")]
    titles: Vec<String>,

    /// Radians of rotation per pixel of Shift+wheel delta
    #[arg(
        short = 'k',
        long = "rotation-sensitivity",
        default_value_t = DEFAULT_ROTATION_SENSITIVITY,
        allow_hyphen_values = true
    )]
    rotation_sensitivity: f64,

    /// Size of one diagram in world pixels, as WIDTHxHEIGHT
    #[arg(long = "diagram-size", value_parser = parse_size, default_value = "800x600")]
    diagram_size: Size,

    /// Turn off the viewport's Shift+wheel gate; the rotation listener then
    /// blocks the zoom itself
    #[arg(long = "no-stop-shift-wheel")]
    no_stop_shift_wheel: bool,

    /// Write a log file to the temporary directory
    #[arg(long = "log")]
    log: bool,

    /// Log level when --log is given (RUST_LOG overrides it)
    #[arg(long = "log-level", default_value = "debug")]
    log_level: String,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        ViewerConfig {
            rotation_sensitivity: self.rotation_sensitivity,
            stop_shift_wheel: !self.no_stop_shift_wheel,
            diagram_size: self.diagram_size,
            ..ViewerConfig::default()
        }
    }

    /// True when the command line is just one bare sequence.
    fn is_single_plain(&self) -> bool {
        self.sequences.len() == 1 && !self.protein && self.layout.is_none() && self.titles.is_empty()
    }

    fn inputs(&self) -> Vec<SequenceInput> {
        self.sequences
            .iter()
            .enumerate()
            .map(|(i, symbols)| {
                let mut input = if self.protein {
                    SequenceInput::protein(symbols.as_str())
                } else {
                    SequenceInput::dna(symbols.as_str())
                };
                if let Some(layout) = self.layout {
                    input = input.with_layout(layout.into());
                }
                if let Some(title) = self.titles.get(i) {
                    input = input.with_title(title.as_str());
                }
                input
            })
            .collect()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.titles.len() > args.sequences.len() {
        anyhow::bail!(
            "{} titles given for {} sequences",
            args.titles.len(),
            args.sequences.len()
        );
    }

    if args.log {
        let path = logging::init(&std::env::temp_dir(), &args.log_level)?;
        eprintln!("Logging to {}", path.display());
    }

    let config = args.config();
    let viewer = if args.is_single_plain() {
        SequenceViewer::from_sequence(&args.sequences[0], config)?
    } else {
        SequenceViewer::new(args.inputs(), config)?
    };

    run_app(viewer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["seqring", "ACGT"]).unwrap();
        assert!(args.is_single_plain());
        let config = args.config();
        assert_eq!(config.rotation_sensitivity, DEFAULT_ROTATION_SENSITIVITY);
        assert!(config.stop_shift_wheel);
        assert_eq!(config.diagram_size, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_args_titles_and_layout() {
        let args = Args::try_parse_from([
            "seqring", "ACGT", "GG", "--title", "first", "--layout", "linear", "-k", "-0.002",
        ])
        .unwrap();
        assert!(!args.is_single_plain());
        assert_eq!(args.rotation_sensitivity, -0.002);

        let inputs = args.inputs();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].title.as_deref(), Some("first"));
        assert!(inputs[1].title.is_none());
        assert_eq!(inputs[0].kind.default_layout(), Some(DefaultLayout::Linear));
    }

    #[test]
    fn test_args_protein_and_size() {
        let args = Args::try_parse_from([
            "seqring",
            "--protein",
            "MKV",
            "--diagram-size",
            "400x300",
            "--no-stop-shift-wheel",
        ])
        .unwrap();
        let inputs = args.inputs();
        assert!(inputs[0].kind.is_protein());
        let config = args.config();
        assert_eq!(config.diagram_size, Size::new(400.0, 300.0));
        assert!(!config.stop_shift_wheel);
    }

    #[test]
    fn test_args_bad_size_rejected() {
        assert!(Args::try_parse_from(["seqring", "--diagram-size", "wide"]).is_err());
    }
}

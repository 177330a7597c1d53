//! Scene composition.
//!
//! Turns the registry, the shared view state and the viewport metrics into a
//! declarative [`SceneDescription`] that the renderer draws every frame.
//! Composition is pure: the same inputs always give the same scene.
//!
//! Each diagram is laid out in its own local space (origin at the backdrop's
//! top-left corner), then placed in the world by its grid cell and turned
//! about its center by the shared rotation. Zoom is left to the viewport.

use ratatui::style::Color;
use tracing::trace;

use crate::config::ViewerConfig;
use crate::geometry::{Point, Size};
use crate::grid::{self, GridCell};
use crate::layout::{layout_symbols, Backdrop, BackdropStyle};
use crate::model::{DefaultLayout, SequenceId, SequenceKind, SequenceRegistry, ViewState};
use crate::viewport::ViewportMetrics;

/// Color scheme for sequence symbols.
///
/// This trait allows for different color schemes for nucleotides and
/// amino acids.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' | 'U' => Color::Blue,
            _ => Color::White,
        }
    }
}

/// Amino acid color scheme, grouped by physicochemical properties.
pub struct AminoAcidColorScheme;

impl ColorScheme for AminoAcidColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            // Hydrophobic
            'A' | 'V' | 'I' | 'L' | 'M' | 'F' | 'W' | 'P' => Color::Yellow,
            // Polar
            'S' | 'T' | 'N' | 'Q' | 'C' | 'G' | 'Y' => Color::Green,
            // Charged positive
            'K' | 'R' | 'H' => Color::Blue,
            // Charged negative
            'D' | 'E' => Color::Red,
            // Gap, stop or unknown
            _ => Color::White,
        }
    }
}

/// Picks the color scheme matching a sequence kind.
pub fn color_scheme_for(kind: SequenceKind) -> &'static dyn ColorScheme {
    match kind {
        SequenceKind::Dna { .. } => &DnaColorScheme,
        SequenceKind::Protein => &AminoAcidColorScheme,
    }
}

/// Text style of a glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphStyle {
    pub fill: Color,
    pub font_size: f64,
    /// Anchor inside the text box, (0.5, 0.5) is centered
    pub anchor: Point,
}

/// One rendered symbol, in diagram-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphNode {
    pub index: usize,
    pub position: Point,
    /// Own rotation of the text, equal to its ring angle
    pub rotation: f64,
    pub text: char,
    pub style: GlyphStyle,
}

/// One diagram: backdrop plus ring of glyphs, placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    pub sequence_id: SequenceId,
    pub label: String,
    pub cell: GridCell,
    /// World position of the pivot
    pub position: Point,
    /// Local point the diagram turns about (its center)
    pub pivot: Point,
    /// Rotation of the whole diagram, in radians
    pub rotation: f64,
    pub backdrop: Backdrop,
    pub glyphs: Vec<GlyphNode>,
}

impl DiagramNode {
    /// Maps a diagram-local point into world coordinates.
    pub fn to_world(&self, local: Point) -> Point {
        self.position + (local - self.pivot).rotated(self.rotation)
    }

    /// World coordinates of the backdrop corners, clockwise from top-left.
    pub fn backdrop_corners(&self) -> [Point; 4] {
        let Size { width, height } = self.backdrop.size;
        [
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
        ]
        .map(|corner| self.to_world(corner))
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    pub frame: Size,
    pub diagrams: Vec<DiagramNode>,
}

impl SceneDescription {
    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    pub fn glyph_count(&self) -> usize {
        self.diagrams.iter().map(|d| d.glyphs.len()).sum()
    }
}

/// Visual parameters of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStyle {
    pub diagram_size: Size,
    pub backdrop: BackdropStyle,
    pub font_size: f64,
}

impl From<&ViewerConfig> for SceneStyle {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            diagram_size: config.diagram_size,
            backdrop: BackdropStyle::default(),
            font_size: config.font_size,
        }
    }
}

/// Builds the scene for the current registry and view state.
pub fn compose(
    registry: &SequenceRegistry,
    view: &ViewState,
    metrics: &ViewportMetrics,
    style: &SceneStyle,
) -> SceneDescription {
    let cells = grid::place(registry.len());

    let diagrams = registry
        .sequences()
        .iter()
        .zip(cells)
        .map(|(sequence, cell)| {
            if sequence.kind.default_layout() == Some(DefaultLayout::Linear) {
                trace!(id = %sequence.id, "linear layout requested, drawing circular");
            }
            let layout = layout_symbols(&sequence.symbols, style.diagram_size, style.backdrop);
            let scheme = color_scheme_for(sequence.kind);
            let glyphs = layout
                .glyphs
                .iter()
                .map(|placement| GlyphNode {
                    index: placement.index,
                    position: placement.position,
                    rotation: placement.angle,
                    text: placement.symbol,
                    style: GlyphStyle {
                        fill: scheme.get_color(placement.symbol),
                        font_size: style.font_size,
                        anchor: Point::new(0.5, 0.5),
                    },
                })
                .collect();

            DiagramNode {
                sequence_id: sequence.id,
                label: sequence.label(),
                cell,
                position: grid::cell_offset(cell, metrics.screen),
                pivot: layout.center,
                rotation: view.rotation,
                backdrop: layout.backdrop,
                glyphs,
            }
        })
        .collect();

    SceneDescription {
        frame: metrics.screen,
        diagrams,
    }
}

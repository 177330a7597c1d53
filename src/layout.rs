//! Circular layout engine.
//!
//! Places every symbol of a sequence on a circle inscribed in the diagram:
//!
//! ```text
//! theta_i = (i / n) * 2pi + pi/2
//! r       = height / 2
//! center  = (width / 2, height / 2)
//! ```
//!
//! Placement is closed-form. Nothing is done about overlap, so very long
//! sequences simply crowd the ring.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::style::Color;

use crate::geometry::{Point, Size};
use crate::model::Sequence;

/// Where one symbol lands inside its diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    /// Position of the symbol in the sequence
    pub index: usize,
    /// The symbol itself
    pub symbol: char,
    /// Diagram-local position of the glyph anchor
    pub position: Point,
    /// Angle on the ring, also the glyph's own rotation
    pub angle: f64,
}

/// One step of the imperative draw protocol used by custom shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Clear,
    SetFill(Color),
    Rect { origin: Point, size: Size },
    Fill,
    Stroke { width: f64, color: Color },
}

/// Look of the backdrop rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropStyle {
    pub fill: Color,
    pub stroke_width: f64,
    pub stroke_color: Color,
}

impl Default for BackdropStyle {
    fn default() -> Self {
        Self {
            fill: Color::DarkGray,
            stroke_width: 10.0,
            stroke_color: Color::Gray,
        }
    }
}

/// The rectangle drawn behind the ring of glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub size: Size,
    pub style: BackdropStyle,
}

impl Backdrop {
    /// Draw callback as a command list: clear, set fill, path, fill, stroke.
    pub fn draw_commands(&self) -> [DrawCommand; 5] {
        [
            DrawCommand::Clear,
            DrawCommand::SetFill(self.style.fill),
            DrawCommand::Rect {
                origin: Point::ORIGIN,
                size: self.size,
            },
            DrawCommand::Fill,
            DrawCommand::Stroke {
                width: self.style.stroke_width,
                color: self.style.stroke_color,
            },
        ]
    }
}

/// Everything the layout engine produces for one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct CircularLayout {
    pub backdrop: Backdrop,
    pub center: Point,
    pub radius: f64,
    pub glyphs: Vec<GlyphPlacement>,
}

/// Angle of symbol `index` in a ring of `len` symbols.
pub fn glyph_angle(index: usize, len: usize) -> f64 {
    (index as f64 / len as f64) * TAU + FRAC_PI_2
}

/// Lays out raw symbols on a circle inside a `size` diagram.
pub fn layout_symbols(symbols: &str, size: Size, style: BackdropStyle) -> CircularLayout {
    let center = size.center();
    let radius = size.height / 2.0;
    let len = symbols.chars().count();

    let glyphs = symbols
        .chars()
        .enumerate()
        .map(|(index, symbol)| {
            let angle = glyph_angle(index, len);
            GlyphPlacement {
                index,
                symbol,
                position: Point::on_circle(center, radius, angle),
                angle,
            }
        })
        .collect();

    CircularLayout {
        backdrop: Backdrop { size, style },
        center,
        radius,
        glyphs,
    }
}

/// Lays out a registered sequence on a circle of a `width x height` diagram.
pub fn circular_layout(sequence: &Sequence, width: f64, height: f64) -> CircularLayout {
    layout_symbols(&sequence.symbols, Size::new(width, height), BackdropStyle::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SequenceInput, SequenceRegistry};
    use std::f64::consts::PI;

    fn registered(symbols: &str) -> Sequence {
        SequenceRegistry::register(vec![SequenceInput::dna(symbols)]).sequences()[0].clone()
    }

    fn normalize(angle: f64) -> f64 {
        angle.rem_euclid(TAU)
    }

    #[test]
    fn test_acgt_on_800_by_600() {
        let layout = circular_layout(&registered("ACGT"), 800.0, 600.0);
        assert_eq!(layout.glyphs.len(), 4);
        assert_eq!(layout.radius, 300.0);
        assert_eq!(layout.center, Point::new(400.0, 300.0));

        let expected = [PI / 2.0, PI, 3.0 * PI / 2.0, 2.0 * PI];
        for (glyph, want) in layout.glyphs.iter().zip(expected) {
            assert!((normalize(glyph.angle) - normalize(want)).abs() < 1e-9);
            let dx = glyph.position.x - 400.0;
            let dy = glyph.position.y - 300.0;
            assert!(((dx * dx + dy * dy).sqrt() - 300.0).abs() < 1e-9);
        }
        let symbols: String = layout.glyphs.iter().map(|g| g.symbol).collect();
        assert_eq!(symbols, "ACGT");
    }

    #[test]
    fn test_empty_sequence_has_no_glyphs() {
        let layout = circular_layout(&registered(""), 800.0, 600.0);
        assert!(layout.glyphs.is_empty());
        assert_eq!(layout.backdrop.size, Size::new(800.0, 600.0));
    }

    #[test]
    fn test_angles_evenly_spaced_and_unique() {
        for n in [1usize, 2, 3, 7, 64, 1000] {
            let symbols = "A".repeat(n);
            let layout = layout_symbols(&symbols, Size::new(100.0, 100.0), BackdropStyle::default());
            assert_eq!(layout.glyphs.len(), n);

            let step = TAU / n as f64;
            for pair in layout.glyphs.windows(2) {
                assert!((pair[1].angle - pair[0].angle - step).abs() < 1e-9);
            }
            let first = layout.glyphs[0].angle;
            let last = layout.glyphs[n - 1].angle;
            assert!((first - FRAC_PI_2).abs() < 1e-12);
            assert!(last < FRAC_PI_2 + TAU);
        }
    }

    #[test]
    fn test_glyph_orientation_matches_angle() {
        let layout = layout_symbols("MKVL", Size::new(200.0, 100.0), BackdropStyle::default());
        for glyph in &layout.glyphs {
            assert_eq!(glyph.angle, glyph_angle(glyph.index, 4));
        }
    }

    #[test]
    fn test_backdrop_draw_protocol() {
        let layout = circular_layout(&registered("A"), 800.0, 600.0);
        let commands = layout.backdrop.draw_commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert_eq!(commands[1], DrawCommand::SetFill(Color::DarkGray));
        assert!(matches!(commands[2], DrawCommand::Rect { size, .. } if size == Size::new(800.0, 600.0)));
        assert_eq!(commands[3], DrawCommand::Fill);
        assert!(matches!(commands[4], DrawCommand::Stroke { width, .. } if width == 10.0));
    }
}

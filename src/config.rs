//! Viewer configuration.
//!
//! Every tunable of the viewer lives here with its default. The binary builds
//! a [`ViewerConfig`] from command-line arguments; library users construct one
//! directly or start from `ViewerConfig::default()`.

use std::time::Duration;

use crate::error::{ViewerError, ViewerResult};
use crate::geometry::Size;

/// Rotation per pixel of wheel delta, in radians.
///
/// One terminal wheel notch is reported as [`DEFAULT_WHEEL_LINE_DELTA`]
/// pixels, so a notch turns the diagrams by 0.1 rad (about 5.7 degrees).
pub const DEFAULT_ROTATION_SENSITIVITY: f64 = 0.001;

/// Pixel delta reported for one wheel notch.
pub const DEFAULT_WHEEL_LINE_DELTA: f64 = 100.0;

/// Tunables for a [`crate::viewer::SequenceViewer`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Radians of rotation per pixel of shift-wheel delta
    pub rotation_sensitivity: f64,
    /// Refuse shift-wheel at the viewport gate rather than in the listener
    pub stop_shift_wheel: bool,
    /// Pixel delta of one wheel notch
    pub wheel_line_delta: f64,
    /// Zoom change per wheel notch or zoom key (0.1 = 10%)
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Size of one diagram (backdrop) in world pixels
    pub diagram_size: Size,
    /// Size of the world plane behind the viewport
    pub world_size: Size,
    /// Glyph font size in pixels
    pub font_size: f64,
    /// Nominal pixel size of one terminal cell
    pub cell_size: Size,
    /// Screen pixels moved per keyboard pan step
    pub pan_step: f64,
    /// Event poll timeout
    pub tick_rate: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rotation_sensitivity: DEFAULT_ROTATION_SENSITIVITY,
            stop_shift_wheel: true,
            wheel_line_delta: DEFAULT_WHEEL_LINE_DELTA,
            zoom_step: 0.1,
            min_zoom: 0.05,
            max_zoom: 40.0,
            diagram_size: Size::new(800.0, 600.0),
            world_size: Size::new(1600.0, 1200.0),
            font_size: 12.0,
            cell_size: Size::new(10.0, 20.0),
            pan_step: 40.0,
            tick_rate: Duration::from_millis(50),
        }
    }
}

impl ViewerConfig {
    /// Checks that every value is usable. Called when a viewer is built.
    pub fn validate(&self) -> ViewerResult<()> {
        if !self.rotation_sensitivity.is_finite() {
            return Err(ViewerError::Config(format!(
                "rotation sensitivity must be finite (got {})",
                self.rotation_sensitivity
            )));
        }
        if !(self.wheel_line_delta.is_finite() && self.wheel_line_delta > 0.0) {
            return Err(ViewerError::Config(format!(
                "wheel line delta must be positive (got {})",
                self.wheel_line_delta
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(ViewerError::Config(format!(
                "zoom step must be positive (got {})",
                self.zoom_step
            )));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return Err(ViewerError::Config(format!(
                "zoom limits must satisfy 0 < min <= max (got {}..{})",
                self.min_zoom, self.max_zoom
            )));
        }
        for (name, size) in [
            ("diagram size", self.diagram_size),
            ("world size", self.world_size),
            ("cell size", self.cell_size),
        ] {
            if !size.is_positive() {
                return Err(ViewerError::Config(format!(
                    "{} must be positive (got {}x{})",
                    name, size.width, size.height
                )));
            }
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ViewerError::Config(format!(
                "font size must be positive (got {})",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Parses a `WIDTHxHEIGHT` size such as `800x600`.
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    let size = Size::new(width, height);
    if !size.is_positive() {
        return Err(format!("size must be positive, got '{}'", s));
    }
    Ok(size)
}

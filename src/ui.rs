//! TUI rendering module.
//!
//! This module draws the scene with ratatui:
//! - A square viewer area, centered in the terminal
//! - Diagrams on a Braille canvas whose bounds follow the viewport
//! - Status bar with rotation, zoom and last gesture
//! - Help overlay
//!
//! Terminal cells are treated as `cell_size` pixels so the scene keeps the
//! same world units it would have on a real canvas. Text cannot be rotated in
//! a terminal cell; glyph orientation is carried by the scene but not drawn.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Borders, Clear, Paragraph,
    },
    symbols::Marker,
    Frame,
};

use crate::controller::AppState;
use crate::geometry::{Point, Rect as WorldRect, Size};
use crate::interaction::WheelClass;
use crate::layout::DrawCommand;
use crate::scene::{DiagramNode, SceneDescription};

/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
/// Number of hatch lines used to fill a backdrop.
const FILL_LINES: usize = 16;
/// Width of the help popup, including borders.
const HELP_WIDTH: u16 = 52;

const HELP_TEXT: &[&str] = &[
    "Mouse wheel zooms about the pointer. Hold Shift while scrolling to rotate every diagram instead.",
    "Drag with the left button to pan.",
    "[ and ] rotate one wheel notch. + and - zoom. Arrows or h/j/k/l pan.",
    "r resets rotation, zoom and pan. q quits.",
    "",
    "Press any key to close this help.",
];

/// Terminal regions used by the viewer, recomputed on resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerAreas {
    /// Square frame around the canvas (with border)
    pub frame: Rect,
    /// Canvas cells inside the border
    pub canvas: Rect,
    pub status: Rect,
}

/// Splits the terminal into a square viewer and a status bar.
///
/// The viewer is as wide as possible and as tall as it is wide, measured in
/// pixels with `cell` as the size of one terminal cell.
pub fn layout_areas(area: Rect, cell: Size) -> ViewerAreas {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    let content = main_layout[0];
    let status = main_layout[1];

    let side_px = (f64::from(content.width) * cell.width).min(f64::from(content.height) * cell.height);
    let cols = ((side_px / cell.width).floor() as u16).min(content.width);
    let rows = ((side_px / cell.height).floor() as u16).min(content.height);
    let frame = Rect::new(
        content.x + (content.width - cols) / 2,
        content.y + (content.height - rows) / 2,
        cols,
        rows,
    );
    let canvas = Block::default().borders(Borders::ALL).inner(frame);

    ViewerAreas {
        frame,
        canvas,
        status,
    }
}

/// Pixel size of a canvas area.
pub fn screen_size(canvas: Rect, cell: Size) -> Size {
    Size::new(
        f64::from(canvas.width) * cell.width,
        f64::from(canvas.height) * cell.height,
    )
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let areas = state.areas;

    render_viewer(frame, state, areas);
    render_status_bar(frame, state, areas.status);

    if state.show_help {
        render_help(frame, frame.area());
    }
}

/// Renders the scene inside the square viewer frame.
fn render_viewer(frame: &mut Frame, state: &AppState, areas: ViewerAreas) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" SeqRing [{} sequences] ", state.viewer.registry().len()));

    let (Ok(scene), Ok(viewport)) = (state.viewer.scene(), state.viewer.viewport()) else {
        frame.render_widget(Paragraph::new("Waiting for the viewport...").block(block), areas.frame);
        return;
    };

    let visible = viewport.visible_world_rect();
    // Canvas y grows upward, world y grows downward: plot at -y.
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([visible.min.x, visible.max.x])
        .y_bounds([-visible.max.y, -visible.min.y])
        .paint(|ctx| paint_scene(ctx, &scene, visible));

    frame.render_widget(canvas, areas.frame);
}

/// Paints backdrops first, then glyphs and labels on top.
fn paint_scene(ctx: &mut Context, scene: &SceneDescription, visible: WorldRect) {
    for diagram in &scene.diagrams {
        paint_backdrop(ctx, diagram);
    }
    ctx.layer();

    for diagram in &scene.diagrams {
        for glyph in &diagram.glyphs {
            let p = diagram.to_world(glyph.position);
            if visible.contains(p) {
                let style = Style::default()
                    .fg(glyph.style.fill)
                    .add_modifier(Modifier::BOLD);
                ctx.print(p.x, -p.y, Span::styled(glyph.text.to_string(), style));
            }
        }

        let label_at = diagram.position;
        if visible.contains(label_at) {
            ctx.print(
                label_at.x,
                -label_at.y,
                Span::styled(diagram.label.clone(), Style::default().fg(Color::Cyan)),
            );
        }
    }
}

/// Interprets the backdrop's draw commands on the canvas.
///
/// Fill is approximated with horizontal hatch lines; stroke width collapses to
/// one Braille dot.
fn paint_backdrop(ctx: &mut Context, diagram: &DiagramNode) {
    let mut fill = Color::Reset;
    let mut path: Option<(Point, Size)> = None;

    for command in diagram.backdrop.draw_commands() {
        match command {
            DrawCommand::Clear => {
                fill = Color::Reset;
                path = None;
            }
            DrawCommand::SetFill(color) => fill = color,
            DrawCommand::Rect { origin, size } => path = Some((origin, size)),
            DrawCommand::Fill => {
                let Some((origin, size)) = path else { continue };
                for i in 1..FILL_LINES {
                    let y = origin.y + size.height * i as f64 / FILL_LINES as f64;
                    let a = diagram.to_world(Point::new(origin.x, y));
                    let b = diagram.to_world(Point::new(origin.x + size.width, y));
                    draw_segment(ctx, a, b, fill);
                }
            }
            DrawCommand::Stroke { color, .. } => {
                let Some((origin, size)) = path else { continue };
                let corners = [
                    origin,
                    Point::new(origin.x + size.width, origin.y),
                    Point::new(origin.x + size.width, origin.y + size.height),
                    Point::new(origin.x, origin.y + size.height),
                ]
                .map(|corner| diagram.to_world(corner));
                for i in 0..corners.len() {
                    draw_segment(ctx, corners[i], corners[(i + 1) % corners.len()], color);
                }
            }
        }
    }
}

fn draw_segment(ctx: &mut Context, a: Point, b: Point, color: Color) {
    ctx.draw(&CanvasLine {
        x1: a.x,
        y1: -a.y,
        x2: b.x,
        y2: -b.y,
        color,
    });
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let mode_str = match state.viewer.last_gesture() {
        Some(WheelClass::RotateIntercept) => "ROTATE",
        Some(WheelClass::PassThrough) => "ZOOM",
        None => "VIEW",
    };

    let zoom = state.viewer.viewport().map(|vp| vp.zoom()).unwrap_or(1.0);
    let position_info = format!(
        "Rot {:.1}° | Zoom {:.0}% | ? help ",
        state.viewer.rotation().to_degrees(),
        zoom * 100.0
    );

    // Show status message if present
    let message = state.status_message.as_deref().unwrap_or("");
    let left_content = format!(" {} | {} ", mode_str, message);

    let left_len = left_content.chars().count();
    let right_len = position_info.chars().count();
    let status_line = Line::from(vec![
        Span::styled(
            left_content,
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + right_len)),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let paragraph = Paragraph::new(status_line);
    frame.render_widget(paragraph, area);
}

/// Wraps the help text to fit `width` columns.
pub fn help_lines(width: u16) -> Vec<String> {
    let width = usize::from(width.max(10));
    HELP_TEXT
        .iter()
        .flat_map(|paragraph| {
            if paragraph.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(paragraph, width)
                    .into_iter()
                    .map(|line| line.into_owned())
                    .collect()
            }
        })
        .collect()
}

/// Renders the help overlay centered over `area`.
fn render_help(frame: &mut Frame, area: Rect) {
    let width = HELP_WIDTH.min(area.width);
    let lines = help_lines(width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default().borders(Borders::ALL).title(" Help ");
    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_areas_square_in_pixels() {
        let cell = Size::new(10.0, 20.0);
        // 120 x 41 cells: content is 1200 x 800 px, so the square is 800 px.
        let areas = layout_areas(Rect::new(0, 0, 120, 41), cell);
        assert_eq!(areas.frame, Rect::new(20, 0, 80, 40));
        assert_eq!(areas.canvas, Rect::new(21, 1, 78, 38));
        assert_eq!(areas.status, Rect::new(0, 40, 120, 1));
    }

    #[test]
    fn test_layout_areas_tall_terminal() {
        let cell = Size::new(10.0, 20.0);
        // 40 x 81 cells: content 400 x 1600 px, square of 400 px = 40 x 20 cells.
        let areas = layout_areas(Rect::new(0, 0, 40, 81), cell);
        assert_eq!(areas.frame.width, 40);
        assert_eq!(areas.frame.height, 20);
        assert_eq!(areas.frame.y, 30);
    }

    #[test]
    fn test_screen_size() {
        let size = screen_size(Rect::new(5, 5, 78, 38), Size::new(10.0, 20.0));
        assert_eq!(size, Size::new(780.0, 760.0));
    }

    #[test]
    fn test_help_lines_wrap() {
        let lines = help_lines(20);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert!(lines.len() > HELP_TEXT.len());
    }
}

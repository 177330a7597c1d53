//! Application controller.
//!
//! This module orchestrates the main application loop:
//! - Terminal initialization and cleanup (raw mode, alternate screen, mouse)
//! - Mounting the viewer once the terminal size is known
//! - Event polling and handling
//! - State updates and rendering

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::info;

use crate::event::{apply_action, handle_event, poll_event, Action};
use crate::geometry::Point;
use crate::ui::{layout_areas, render, screen_size, ViewerAreas};
use crate::viewer::SequenceViewer;

/// The complete application state.
#[derive(Debug)]
pub struct AppState {
    /// The viewer being displayed
    pub viewer: SequenceViewer,
    /// Terminal regions from the last layout pass
    pub areas: ViewerAreas,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
}

impl AppState {
    /// Creates a new application state around a (not yet mounted) viewer.
    pub fn new(viewer: SequenceViewer) -> Self {
        let status_message = if viewer.registry().is_empty() {
            Some("No sequences given".to_string())
        } else {
            None
        };
        Self {
            viewer,
            areas: ViewerAreas::default(),
            show_help: false,
            should_quit: false,
            status_message,
        }
    }

    /// Recomputes the layout for a terminal area, mounting the viewer on the
    /// first call and resizing it afterwards.
    pub fn update_layout(&mut self, terminal_area: Rect) {
        let cell = self.viewer.config().cell_size;
        self.areas = layout_areas(terminal_area, cell);
        let screen = screen_size(self.areas.canvas, cell);
        if self.viewer.is_mounted() {
            self.viewer.resize(screen);
        } else {
            self.viewer.mount(screen);
        }
    }

    /// Pixel position of a terminal cell inside the canvas, or `None` if the
    /// cell lies outside it.
    pub fn screen_point(&self, column: u16, row: u16) -> Option<Point> {
        let canvas = self.areas.canvas;
        let inside = column >= canvas.x
            && column < canvas.x + canvas.width
            && row >= canvas.y
            && row < canvas.y + canvas.height;
        if inside {
            self.screen_point_unclamped(column, row)
        } else {
            None
        }
    }

    /// Pixel position of a terminal cell relative to the canvas origin, even
    /// outside it (drags may leave the canvas).
    pub fn screen_point_unclamped(&self, column: u16, row: u16) -> Option<Point> {
        let canvas = self.areas.canvas;
        let cell = self.viewer.config().cell_size;
        let x = (f64::from(column) - f64::from(canvas.x) + 0.5) * cell.width;
        let y = (f64::from(row) - f64::from(canvas.y) + 0.5) * cell.height;
        Some(Point::new(x, y))
    }

    /// Pixel position of the canvas center.
    pub fn screen_center(&self) -> Point {
        screen_size(self.areas.canvas, self.viewer.config().cell_size).center()
    }
}

/// The main application controller.
pub struct App {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    state: AppState,
    /// Event poll timeout
    tick_rate: Duration,
}

impl App {
    /// Creates a new application with the given viewer.
    pub fn new(viewer: SequenceViewer) -> Result<Self> {
        let tick_rate = viewer.config().tick_rate;

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state: AppState::new(viewer),
            tick_rate,
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        // The viewport can only be built once the terminal size is known
        self.update_layout()?;

        loop {
            // Render
            self.terminal.draw(|frame| {
                render(frame, &self.state);
            })?;

            // Handle events
            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event, self.state.show_help);

                // Handle resize specially to update the viewport
                if let Action::Resize(_, _) = action {
                    self.update_layout()?;
                }

                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        info!("quitting");
        Ok(())
    }

    /// Updates the viewer layout based on terminal dimensions.
    fn update_layout(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.state
            .update_layout(Rect::new(0, 0, size.width, size.height));
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.state.viewer.unmount();

        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Convenience function to run the application with a viewer.
pub fn run_app(viewer: SequenceViewer) -> Result<()> {
    let mut app = App::new(viewer)?;
    app.run()
}

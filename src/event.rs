//! Terminal event handling.
//!
//! This module turns crossterm events into viewer actions:
//! - mouse wheel: zoom about the pointer
//! - `Shift` + mouse wheel: rotate every diagram
//! - left drag: pan
//! - `[` / `]`: rotate one wheel notch (same path as `Shift` + wheel)
//! - `+` / `-`: zoom in / out about the center
//! - arrows or `h/j/k/l`: pan
//! - `r`: reset rotation, zoom and pan
//! - `?`: show help
//! - `q` or `Ctrl+C`: quit

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

use crate::controller::AppState;
use crate::viewport::WheelEvent;

/// Actions that can be triggered by terminal input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No action (event not recognized)
    None,
    /// Quit the application
    Quit,
    /// Wheel notches (positive = down) at a terminal cell
    Wheel {
        notches: i8,
        column: u16,
        row: u16,
        modifiers: KeyModifiers,
    },
    /// Wheel notches at the center of the viewer
    WheelAtCenter { notches: i8, modifiers: KeyModifiers },
    /// Left button pressed
    DragStart { column: u16, row: u16 },
    /// Mouse moved with the left button held
    Drag { column: u16, row: u16 },
    /// Left button released
    DragEnd,
    /// Zoom in one step
    ZoomIn,
    /// Zoom out one step
    ZoomOut,
    /// Pan by whole steps
    Pan(i32, i32),
    /// Reset rotation, zoom and pan
    ResetView,
    /// Show the help overlay
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for terminal events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action.
pub fn handle_event(event: Event, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, show_help),
        Event::Mouse(mouse_event) if !show_help => handle_mouse_event(mouse_event),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event.
fn handle_key_event(key: KeyEvent, show_help: bool) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    // Handle Ctrl+C for emergency quit
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,

        // Rotation through the shift-wheel path
        KeyCode::Char('[') => Action::WheelAtCenter {
            notches: -1,
            modifiers: KeyModifiers::SHIFT,
        },
        KeyCode::Char(']') => Action::WheelAtCenter {
            notches: 1,
            modifiers: KeyModifiers::SHIFT,
        },

        KeyCode::Char('+') | KeyCode::Char('=') => Action::ZoomIn,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::ZoomOut,

        // Panning moves the content, Vim-style directions
        KeyCode::Char('h') | KeyCode::Left => Action::Pan(1, 0),
        KeyCode::Char('l') | KeyCode::Right => Action::Pan(-1, 0),
        KeyCode::Char('k') | KeyCode::Up => Action::Pan(0, 1),
        KeyCode::Char('j') | KeyCode::Down => Action::Pan(0, -1),

        KeyCode::Char('r') | KeyCode::Char('0') | KeyCode::Home => Action::ResetView,
        KeyCode::Char('?') => Action::ShowHelp,

        _ => Action::None,
    }
}

/// Handles a mouse event.
fn handle_mouse_event(mouse: MouseEvent) -> Action {
    let (column, row, modifiers) = (mouse.column, mouse.row, mouse.modifiers);
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel {
            notches: 1,
            column,
            row,
            modifiers,
        },
        MouseEventKind::ScrollUp => Action::Wheel {
            notches: -1,
            column,
            row,
            modifiers,
        },
        MouseEventKind::Down(MouseButton::Left) => Action::DragStart { column, row },
        MouseEventKind::Drag(MouseButton::Left) => Action::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => Action::DragEnd,
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::Wheel {
            notches,
            column,
            row,
            modifiers,
        } => {
            if let Some(position) = state.screen_point(column, row) {
                let delta_y = f64::from(notches) * state.viewer.config().wheel_line_delta;
                state.viewer.wheel(WheelEvent::new(delta_y, position, modifiers));
            }
        }
        Action::WheelAtCenter { notches, modifiers } => {
            let position = state.screen_center();
            let delta_y = f64::from(notches) * state.viewer.config().wheel_line_delta;
            state.viewer.wheel(WheelEvent::new(delta_y, position, modifiers));
        }
        Action::DragStart { column, row } => {
            if let Some(position) = state.screen_point(column, row) {
                state.viewer.drag_start(position);
            }
        }
        Action::Drag { column, row } => {
            if let Some(position) = state.screen_point_unclamped(column, row) {
                state.viewer.drag_move(position);
            }
        }
        Action::DragEnd => {
            state.viewer.drag_end();
        }
        Action::ZoomIn => {
            state.viewer.zoom_in();
        }
        Action::ZoomOut => {
            state.viewer.zoom_out();
        }
        Action::Pan(dx, dy) => {
            state.viewer.pan_steps(dx, dy);
        }
        Action::ResetView => {
            state.viewer.reset_view();
            state.status_message = Some("View reset".to_string());
        }
        Action::ShowHelp => {
            state.show_help = true;
        }
        Action::DismissHelp => {
            state.show_help = false;
        }
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
    }

    !state.should_quit
}

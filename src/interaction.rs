//! Interaction controller: routes wheel input to rotation or viewport zoom.
//!
//! Each wheel event is classified on its own, synchronously, before the
//! viewport sees it:
//! - Shift held: **rotate-intercept**. The shared rotation grows by
//!   `delta_y * k` and the viewport does not zoom. Either the viewport's
//!   stop-wheel gate refuses the event, or, with the gate off, the listener
//!   suppresses its default action.
//! - Otherwise: **pass-through**. The viewport zooms as usual.
//!
//! There is no persistent mode; holding Shift only matters for the event
//! being processed.
//!
//! The controller owns the viewport slot. The viewport arrives late (it
//! needs the screen size), so the wheel listener follows an explicit state
//! machine:
//!
//! ```text
//! Uninitialized --attach--> Attached --release--> Released
//!                              |  ^                  |
//!                              +--+ attach (new id)  +--attach--> Attached
//! ```
//!
//! Releasing detaches the listener and destroys the viewport exactly once.

use std::rc::Rc;

use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::geometry::{Point, Size};
use crate::model::SharedViewState;
use crate::viewport::{ListenerId, Viewport, ViewportId, WheelEvent, WheelOptions, WheelOutcome};

/// Classification of a single wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelClass {
    /// Redirected to diagram rotation
    RotateIntercept,
    /// Left to the viewport's zoom handling
    PassThrough,
}

/// Classifies a wheel event by its modifiers.
pub fn classify(event: &WheelEvent) -> WheelClass {
    if event.shift() {
        WheelClass::RotateIntercept
    } else {
        WheelClass::PassThrough
    }
}

/// Lifecycle of the wheel listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// No viewport has been attached yet
    Uninitialized,
    /// Listening on the given viewport
    Attached {
        viewport: ViewportId,
        listener: ListenerId,
    },
    /// Listener removed and viewport destroyed
    Released,
}

/// Settings the controller applies to each viewport it attaches to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Radians of rotation per pixel of wheel delta
    pub rotation_sensitivity: f64,
    /// Refuse shift-wheel at the viewport gate rather than in the listener
    pub stop_shift_wheel: bool,
    pub wheel: WheelOptions,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl From<&ViewerConfig> for InteractionConfig {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            rotation_sensitivity: config.rotation_sensitivity,
            stop_shift_wheel: config.stop_shift_wheel,
            wheel: WheelOptions {
                percent: config.zoom_step,
            },
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

/// Owns the viewport and the rotation side of the shared view state.
#[derive(Debug)]
pub struct InteractionController {
    view: SharedViewState,
    config: InteractionConfig,
    viewport: Option<Viewport>,
    state: ListenerState,
    last_gesture: Option<WheelClass>,
}

impl InteractionController {
    /// Creates a controller writing rotation into `view`.
    pub fn new(view: SharedViewState, config: InteractionConfig) -> Self {
        Self {
            view,
            config,
            viewport: None,
            state: ListenerState::Uninitialized,
            last_gesture: None,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Current shared rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.view.borrow().rotation
    }

    /// Classification of the most recent wheel event, if any.
    pub fn last_gesture(&self) -> Option<WheelClass> {
        self.last_gesture
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Takes ownership of a ready viewport and starts listening on it.
    ///
    /// A previously attached viewport with a different identity is released
    /// first. Attaching the viewport that is already attached does nothing.
    pub fn attach(&mut self, mut viewport: Viewport) {
        if let ListenerState::Attached { viewport: current, .. } = self.state {
            if current == viewport.id() {
                return;
            }
            self.release();
        }

        viewport
            .wheel(self.config.wheel)
            .drag()
            .set_zoom_limits(self.config.min_zoom, self.config.max_zoom);
        // With the gate on, the viewport refuses shift-wheel itself and the
        // listener only rotates. Without it the listener suppresses the zoom.
        let gated = self.config.stop_shift_wheel;
        if gated {
            viewport.stop_wheel(|event| event.shift());
        }

        let view = Rc::clone(&self.view);
        let k = self.config.rotation_sensitivity;
        let listener = viewport.input_surface_mut().add_wheel_listener(move |event| {
            if classify(event) == WheelClass::RotateIntercept {
                if !gated {
                    event.prevent_default();
                }
                view.borrow_mut().rotation += event.delta_y * k;
            }
        });

        info!(viewport = %viewport.id(), "wheel listener attached");
        self.state = ListenerState::Attached {
            viewport: viewport.id(),
            listener,
        };
        self.viewport = Some(viewport);
    }

    /// Detaches the listener and destroys the viewport.
    ///
    /// Returns true if something was released. Calling it again, or before
    /// any viewport was attached, is a no-op.
    pub fn release(&mut self) -> bool {
        let ListenerState::Attached { listener, .. } = self.state else {
            return false;
        };
        if let Some(mut viewport) = self.viewport.take() {
            viewport.input_surface_mut().remove_wheel_listener(listener);
            viewport.destroy();
            info!(viewport = %viewport.id(), "wheel listener released");
        }
        self.state = ListenerState::Released;
        self.last_gesture = None;
        true
    }

    /// Feeds a wheel event through the attached viewport.
    ///
    /// Returns `None` when no viewport is attached.
    pub fn handle_wheel(&mut self, event: WheelEvent) -> Option<WheelOutcome> {
        let viewport = self.viewport.as_mut()?;
        let class = classify(&event);
        let outcome = viewport.dispatch_wheel(event);
        debug!(?class, ?outcome, delta_y = event.delta_y, "wheel event");
        self.last_gesture = Some(class);
        Some(outcome)
    }

    pub fn drag_start(&mut self, pos: Point) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.drag_start(pos);
        }
    }

    pub fn drag_move(&mut self, pos: Point) -> bool {
        self.viewport.as_mut().is_some_and(|viewport| viewport.drag_move(pos))
    }

    pub fn drag_end(&mut self) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.drag_end();
        }
    }

    /// Zooms about the screen center (keyboard zoom).
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        self.viewport.as_mut().is_some_and(|viewport| viewport.zoom_centered(factor))
    }

    /// Pans by a screen-pixel delta (keyboard pan).
    pub fn pan_by(&mut self, delta: Point) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.pan_by_view(delta);
        }
    }

    pub fn resize(&mut self, screen: Size) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.resize(screen);
        }
    }

    /// Resets rotation and the viewport transform.
    pub fn reset(&mut self) {
        self.view.borrow_mut().rotation = 0.0;
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.reset();
        }
        self.last_gesture = None;
    }
}

impl Drop for InteractionController {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ViewState;
    use crossterm::event::KeyModifiers;
    use std::cell::RefCell;

    fn config(k: f64) -> InteractionConfig {
        InteractionConfig {
            rotation_sensitivity: k,
            stop_shift_wheel: true,
            wheel: WheelOptions::default(),
            min_zoom: 0.05,
            max_zoom: 40.0,
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(Size::new(1600.0, 1200.0), Size::new(800.0, 800.0))
    }

    fn shift_wheel(delta_y: f64) -> WheelEvent {
        WheelEvent::new(delta_y, Point::new(400.0, 400.0), KeyModifiers::SHIFT)
    }

    fn plain_wheel(delta_y: f64) -> WheelEvent {
        WheelEvent::new(delta_y, Point::new(400.0, 400.0), KeyModifiers::NONE)
    }

    fn attached(k: f64) -> (InteractionController, SharedViewState) {
        let view = Rc::new(RefCell::new(ViewState::default()));
        let mut controller = InteractionController::new(Rc::clone(&view), config(k));
        controller.attach(viewport());
        (controller, view)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(&shift_wheel(1.0)), WheelClass::RotateIntercept);
        assert_eq!(classify(&plain_wheel(1.0)), WheelClass::PassThrough);
        let ctrl_shift = WheelEvent::new(1.0, Point::ORIGIN, KeyModifiers::SHIFT | KeyModifiers::CONTROL);
        assert_eq!(classify(&ctrl_shift), WheelClass::RotateIntercept);
    }

    #[test]
    fn test_rotation_accumulates_additively() {
        let (mut controller, view) = attached(0.001);
        view.borrow_mut().rotation = 0.5;

        for delta in [100.0, -30.0, 250.0] {
            assert_eq!(controller.handle_wheel(shift_wheel(delta)), Some(WheelOutcome::Refused));
        }
        let expected = 0.5 + 0.001 * (100.0 - 30.0 + 250.0);
        assert!((controller.rotation() - expected).abs() < 1e-12);
        assert_eq!(controller.viewport().unwrap().zoom(), 1.0);
        assert_eq!(controller.last_gesture(), Some(WheelClass::RotateIntercept));
    }

    #[test]
    fn test_plain_wheel_zooms_without_rotating() {
        let (mut controller, _view) = attached(0.01);
        let outcome = controller.handle_wheel(plain_wheel(-100.0));
        assert_eq!(outcome, Some(WheelOutcome::Zoomed));
        assert_eq!(controller.rotation(), 0.0);
        assert!(controller.viewport().unwrap().zoom() > 1.0);
        assert_eq!(controller.last_gesture(), Some(WheelClass::PassThrough));
    }

    #[test]
    fn test_listener_alone_suppresses_zoom_without_gate() {
        let view = Rc::new(RefCell::new(ViewState::default()));
        let mut cfg = config(0.01);
        cfg.stop_shift_wheel = false;
        let mut controller = InteractionController::new(Rc::clone(&view), cfg);
        controller.attach(viewport());

        let outcome = controller.handle_wheel(shift_wheel(100.0));
        assert_eq!(outcome, Some(WheelOutcome::Intercepted));
        assert_eq!(controller.viewport().unwrap().zoom(), 1.0);
        assert!((controller.rotation() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_refuses_shift_wheel_listener_only_rotates() {
        let (mut controller, _view) = attached(0.01);
        let outcome = controller.handle_wheel(shift_wheel(100.0));
        assert_eq!(outcome, Some(WheelOutcome::Refused));
        assert_eq!(controller.viewport().unwrap().zoom(), 1.0);
        assert!((controller.rotation() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_release_forgets_last_gesture() {
        let (mut controller, _view) = attached(0.01);
        controller.handle_wheel(shift_wheel(10.0));
        assert_eq!(controller.last_gesture(), Some(WheelClass::RotateIntercept));
        controller.release();
        assert_eq!(controller.last_gesture(), None);
        controller.attach(viewport());
        assert_eq!(controller.last_gesture(), None);
    }

    #[test]
    fn test_wheel_before_attach_is_dropped() {
        let view = Rc::new(RefCell::new(ViewState::default()));
        let mut controller = InteractionController::new(Rc::clone(&view), config(0.01));
        assert_eq!(controller.state(), ListenerState::Uninitialized);
        assert_eq!(controller.handle_wheel(shift_wheel(100.0)), None);
        assert_eq!(controller.rotation(), 0.0);
    }

    #[test]
    fn test_attach_registers_one_listener() {
        let (controller, _view) = attached(0.01);
        let vp = controller.viewport().unwrap();
        assert_eq!(vp.input_surface().listener_count(), 1);
        match controller.state() {
            ListenerState::Attached { viewport, listener } => {
                assert_eq!(viewport, vp.id());
                assert!(vp.input_surface().has_listener(listener));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let (mut controller, _view) = attached(0.01);
        assert!(controller.release());
        assert_eq!(controller.state(), ListenerState::Released);
        assert!(controller.viewport().is_none());
        assert!(!controller.release());
        assert_eq!(controller.state(), ListenerState::Released);
    }

    #[test]
    fn test_release_without_viewport_is_noop() {
        let view = Rc::new(RefCell::new(ViewState::default()));
        let mut controller = InteractionController::new(view, config(0.01));
        assert!(!controller.release());
        assert_eq!(controller.state(), ListenerState::Uninitialized);
    }

    #[test]
    fn test_replacing_viewport_reacquires() {
        let (mut controller, _view) = attached(0.01);
        let first = controller.viewport().unwrap().id();

        let replacement = viewport();
        let second = replacement.id();
        controller.attach(replacement);

        assert_ne!(first, second);
        let vp = controller.viewport().unwrap();
        assert_eq!(vp.id(), second);
        assert_eq!(vp.input_surface().listener_count(), 1);
        assert!(matches!(controller.state(), ListenerState::Attached { viewport, .. } if viewport == second));
    }

    #[test]
    fn test_attach_after_release() {
        let (mut controller, _view) = attached(0.01);
        controller.release();
        controller.attach(viewport());
        assert!(matches!(controller.state(), ListenerState::Attached { .. }));
        controller.handle_wheel(shift_wheel(10.0));
        assert!((controller.rotation() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reset_clears_rotation_and_zoom() {
        let (mut controller, _view) = attached(0.01);
        controller.handle_wheel(shift_wheel(50.0));
        controller.handle_wheel(plain_wheel(-100.0));
        controller.reset();
        assert_eq!(controller.rotation(), 0.0);
        assert_eq!(controller.viewport().unwrap().zoom(), 1.0);
        assert_eq!(controller.last_gesture(), None);
    }

    #[test]
    fn test_drag_forwarded_to_viewport() {
        let (mut controller, _view) = attached(0.01);
        controller.drag_start(Point::new(0.0, 0.0));
        assert!(controller.drag_move(Point::new(5.0, 7.0)));
        controller.drag_end();
        assert_eq!(controller.viewport().unwrap().pan(), Point::new(5.0, 7.0));
    }
}

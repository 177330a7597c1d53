//! Sequence viewer: the composition root.
//!
//! A [`SequenceViewer`] builds the registry and the view state, hands them
//! explicitly to the interaction controller and the scene composer, and
//! exposes the viewer's lifecycle:
//!
//! 1. construct with [`SequenceViewer::new`] (or the single-string
//!    [`SequenceViewer::from_sequence`] entry point),
//! 2. [`SequenceViewer::mount`] once the screen size is known, which creates
//!    the viewport and attaches the wheel listener,
//! 3. feed input and call [`SequenceViewer::scene`] once per frame,
//! 4. [`SequenceViewer::unmount`] (or drop) to release everything.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{info, warn};

use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::geometry::{Point, Size};
use crate::interaction::{InteractionConfig, InteractionController, ListenerState, WheelClass};
use crate::model::{
    DefaultLayout, Sequence, SequenceId, SequenceInput, SequenceRegistry, SharedViewState,
    ViewState,
};
use crate::scene::{compose, SceneDescription, SceneStyle};
use crate::viewport::{Viewport, ViewportMetrics, WheelEvent, WheelOutcome};

/// A circular sequence viewer.
#[derive(Debug)]
pub struct SequenceViewer {
    config: ViewerConfig,
    registry: SequenceRegistry,
    view: SharedViewState,
    interaction: InteractionController,
    style: SceneStyle,
}

impl SequenceViewer {
    /// Creates a viewer for any number of sequences (including none).
    pub fn new(sequences: Vec<SequenceInput>, config: ViewerConfig) -> ViewerResult<Self> {
        config.validate()?;

        for input in &sequences {
            if input.kind.default_layout() == Some(DefaultLayout::Linear) {
                warn!("linear layout is not implemented; drawing the sequence circularly");
            }
        }

        let registry = SequenceRegistry::register(sequences);
        let view: SharedViewState = Rc::new(RefCell::new(ViewState::default()));
        let interaction = InteractionController::new(Rc::clone(&view), InteractionConfig::from(&config));
        let style = SceneStyle::from(&config);

        info!(sequences = registry.len(), "viewer created");
        Ok(Self {
            config,
            registry,
            view,
            interaction,
            style,
        })
    }

    /// Single-sequence entry point: one DNA sequence, no layout, no title.
    pub fn from_sequence(sequence: &str, config: ViewerConfig) -> ViewerResult<Self> {
        Self::new(vec![SequenceInput::dna(sequence)], config)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SequenceRegistry {
        &mut self.registry
    }

    /// Shortcut for [`SequenceRegistry::update`].
    pub fn update_sequence<F>(&mut self, id: SequenceId, transform: F) -> bool
    where
        F: FnOnce(Sequence) -> Sequence,
    {
        self.registry.update(id, transform)
    }

    pub fn rotation(&self) -> f64 {
        self.view.borrow().rotation
    }

    pub fn listener_state(&self) -> ListenerState {
        self.interaction.state()
    }

    pub fn last_gesture(&self) -> Option<WheelClass> {
        self.interaction.last_gesture()
    }

    pub fn is_mounted(&self) -> bool {
        self.interaction.viewport().is_some()
    }

    /// Creates the viewport for a `screen` pixel area and starts listening.
    ///
    /// Mounting again replaces the viewport; the old one is released first.
    pub fn mount(&mut self, screen: Size) {
        let viewport = Viewport::new(self.config.world_size, screen);
        info!(viewport = %viewport.id(), ?screen, "viewer mounted");
        self.interaction.attach(viewport);
    }

    /// Releases the viewport and resets the view state.
    pub fn unmount(&mut self) {
        if self.interaction.release() {
            info!("viewer unmounted");
        }
        *self.view.borrow_mut() = ViewState::default();
    }

    /// Updates the screen size of the mounted viewport.
    pub fn resize(&mut self, screen: Size) {
        self.interaction.resize(screen);
    }

    /// The mounted viewport. Asking before [`SequenceViewer::mount`] is an error.
    pub fn viewport(&self) -> ViewerResult<&Viewport> {
        self.interaction
            .viewport()
            .ok_or(ViewerError::NotMounted("viewport"))
    }

    pub fn metrics(&self) -> ViewerResult<ViewportMetrics> {
        self.viewport().map(Viewport::metrics)
    }

    /// Composes the scene for the current frame.
    pub fn scene(&self) -> ViewerResult<SceneDescription> {
        let metrics = self.metrics()?;
        Ok(compose(&self.registry, &self.view.borrow(), &metrics, &self.style))
    }

    /// Delivers a wheel event. Returns `None` when not mounted.
    pub fn wheel(&mut self, event: WheelEvent) -> Option<WheelOutcome> {
        self.interaction.handle_wheel(event)
    }

    pub fn drag_start(&mut self, pos: Point) {
        self.interaction.drag_start(pos);
    }

    pub fn drag_move(&mut self, pos: Point) -> bool {
        self.interaction.drag_move(pos)
    }

    pub fn drag_end(&mut self) {
        self.interaction.drag_end();
    }

    /// Zooms in one step about the screen center.
    pub fn zoom_in(&mut self) -> bool {
        self.interaction.zoom_by(1.0 + self.config.zoom_step)
    }

    /// Zooms out one step about the screen center.
    pub fn zoom_out(&mut self) -> bool {
        self.interaction.zoom_by(1.0 / (1.0 + self.config.zoom_step))
    }

    /// Pans by whole keyboard steps (`dx`, `dy` in steps, not pixels).
    pub fn pan_steps(&mut self, dx: i32, dy: i32) {
        let step = self.config.pan_step;
        self.interaction
            .pan_by(Point::new(f64::from(dx) * step, f64::from(dy) * step));
    }

    /// Resets rotation, zoom, and pan.
    pub fn reset_view(&mut self) {
        self.interaction.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn screen() -> Size {
        Size::new(800.0, 800.0)
    }

    fn mounted(inputs: Vec<SequenceInput>) -> SequenceViewer {
        let mut viewer = SequenceViewer::new(inputs, ViewerConfig::default()).unwrap();
        viewer.mount(screen());
        viewer
    }

    fn shift_wheel(delta_y: f64) -> WheelEvent {
        WheelEvent::new(delta_y, Point::new(400.0, 400.0), KeyModifiers::SHIFT)
    }

    #[test]
    fn test_empty_viewer_mounts() {
        let viewer = mounted(Vec::new());
        let scene = viewer.scene().unwrap();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_legacy_entry_point() {
        let viewer = SequenceViewer::from_sequence("ACGT", ViewerConfig::default()).unwrap();
        let seq = &viewer.registry().sequences()[0];
        assert_eq!(seq.symbols, "ACGT");
        assert_eq!(seq.kind, crate::model::SequenceKind::DNA);
        assert!(seq.title.is_none());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = ViewerConfig {
            rotation_sensitivity: f64::INFINITY,
            ..ViewerConfig::default()
        };
        let result = SequenceViewer::new(vec![SequenceInput::dna("A")], config);
        assert!(matches!(result, Err(ViewerError::Config(_))));
    }

    #[test]
    fn test_scene_before_mount_is_an_error() {
        let viewer = SequenceViewer::from_sequence("ACGT", ViewerConfig::default()).unwrap();
        assert!(matches!(viewer.scene(), Err(ViewerError::NotMounted(_))));
        assert!(viewer.viewport().is_err());
    }

    #[test]
    fn test_shift_wheel_rotates_scene() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT"), SequenceInput::dna("GG")]);
        viewer.wheel(shift_wheel(100.0));
        viewer.wheel(shift_wheel(100.0));

        let expected = 2.0 * 100.0 * ViewerConfig::default().rotation_sensitivity;
        assert!((viewer.rotation() - expected).abs() < 1e-12);
        let scene = viewer.scene().unwrap();
        assert!(scene.diagrams.iter().all(|d| (d.rotation - expected).abs() < 1e-12));
        assert_eq!(viewer.viewport().unwrap().zoom(), 1.0);
    }

    #[test]
    fn test_unmount_resets_rotation() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT")]);
        viewer.wheel(shift_wheel(500.0));
        assert!(viewer.rotation() != 0.0);

        assert_eq!(viewer.last_gesture(), Some(WheelClass::RotateIntercept));

        viewer.unmount();
        viewer.unmount();
        assert_eq!(viewer.rotation(), 0.0);
        assert_eq!(viewer.last_gesture(), None);
        assert!(!viewer.is_mounted());
        assert_eq!(viewer.listener_state(), ListenerState::Released);
        assert_eq!(viewer.wheel(shift_wheel(100.0)), None);

        viewer.mount(screen());
        assert_eq!(viewer.rotation(), 0.0);
        assert!(viewer.is_mounted());
    }

    #[test]
    fn test_shift_wheel_outcome_follows_stop_gate() {
        for (stop_shift_wheel, expected) in [
            (true, WheelOutcome::Refused),
            (false, WheelOutcome::Intercepted),
        ] {
            let config = ViewerConfig {
                stop_shift_wheel,
                ..ViewerConfig::default()
            };
            let mut viewer = SequenceViewer::new(vec![SequenceInput::dna("ACGT")], config).unwrap();
            viewer.mount(screen());

            assert_eq!(viewer.wheel(shift_wheel(100.0)), Some(expected));
            assert!((viewer.rotation() - 0.1).abs() < 1e-12);
            assert_eq!(viewer.viewport().unwrap().zoom(), 1.0);
        }
    }

    #[test]
    fn test_remount_replaces_viewport() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT")]);
        let first = viewer.viewport().unwrap().id();
        viewer.mount(screen());
        let vp = viewer.viewport().unwrap();
        assert_ne!(vp.id(), first);
        assert_eq!(vp.input_surface().listener_count(), 1);
    }

    #[test]
    fn test_resize_keeps_viewport_identity() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT")]);
        let id = viewer.viewport().unwrap().id();
        viewer.resize(Size::new(400.0, 400.0));
        assert_eq!(viewer.viewport().unwrap().id(), id);
        let scene = viewer.scene().unwrap();
        assert_eq!(scene.diagrams[0].position, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_update_flows_into_next_scene() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT")]);
        let id = viewer.registry().ids()[0];
        assert!(viewer.update_sequence(id, |mut s| {
            s.symbols = "AAAAAAAA".to_string();
            s
        }));
        assert_eq!(viewer.scene().unwrap().glyph_count(), 8);
    }

    #[test]
    fn test_keyboard_zoom_and_reset() {
        let mut viewer = mounted(vec![SequenceInput::dna("ACGT")]);
        assert!(viewer.zoom_in());
        viewer.pan_steps(1, -1);
        viewer.wheel(shift_wheel(100.0));
        viewer.reset_view();
        let vp = viewer.viewport().unwrap();
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.pan(), Point::ORIGIN);
        assert_eq!(viewer.rotation(), 0.0);
    }
}

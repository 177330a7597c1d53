//! Pan/zoom/drag viewport over the diagram world.
//!
//! The viewport maps world coordinates to screen pixels with a uniform
//! zoom and a pan offset:
//!
//! ```text
//! screen = world * zoom + pan
//! ```
//!
//! It also owns the input surface that wheel listeners attach to. Every
//! wheel event goes to the listeners first, in attach order; the viewport's
//! own zoom handling only runs afterwards, and only when no listener
//! suppressed the default action and the stop-wheel gate lets it through.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::KeyModifiers;
use tracing::{debug, trace};

use crate::geometry::{Point, Rect, Size};

static NEXT_VIEWPORT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a viewport instance. A new viewport always gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportId(u64);

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport#{}", self.0)
    }
}

/// Handle returned when a listener is attached to an input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A mouse wheel event in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    /// Pointer position relative to the viewport's screen origin
    pub position: Point,
    pub modifiers: KeyModifiers,
    default_prevented: bool,
}

impl WheelEvent {
    /// Creates a vertical wheel event.
    pub fn new(delta_y: f64, position: Point, modifiers: KeyModifiers) -> Self {
        Self {
            delta_x: 0.0,
            delta_y,
            position,
            modifiers,
            default_prevented: false,
        }
    }

    /// Returns true if either shift key was held when the event fired.
    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }

    /// Suppresses the viewport's own handling of this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Boxed wheel listener.
pub type WheelListener = Box<dyn FnMut(&mut WheelEvent)>;

/// Boxed stop-wheel predicate.
pub type WheelPredicate = Box<dyn Fn(&WheelEvent) -> bool>;

/// Registry of raw input listeners attached to a viewport.
#[derive(Default)]
pub struct InputSurface {
    listeners: Vec<(ListenerId, WheelListener)>,
    next_id: u64,
}

impl InputSurface {
    /// Attaches a wheel listener and returns its handle.
    pub fn add_wheel_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&mut WheelEvent) + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detaches a listener. Returns false if it was not attached.
    pub fn remove_wheel_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }

    /// Runs every listener on `event`, in attach order.
    pub fn dispatch_wheel(&mut self, event: &mut WheelEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for InputSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSurface")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Wheel zoom settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelOptions {
    /// Zoom change per wheel notch (0.1 = 10%)
    pub percent: f64,
}

impl Default for WheelOptions {
    fn default() -> Self {
        Self { percent: 0.1 }
    }
}

/// What the viewport did with a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// A listener suppressed the default action
    Intercepted,
    /// The stop-wheel gate refused the event
    Refused,
    /// The viewport zoomed
    Zoomed,
    /// Nothing happened (wheel disabled, zero delta, zoom limit, destroyed)
    Ignored,
}

/// Drag tracking: movement deltas between successive pointer positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    start_pos: Option<Point>,
    last_pos: Option<Point>,
}

impl DragState {
    /// Starts tracking a drag from `pos`.
    pub fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Records a new position and returns the delta since the last one.
    pub fn update(&mut self, pos: Point) -> Option<Point> {
        if !self.is_dragging() {
            return None;
        }
        let delta = self.last_pos.map(|last| pos - last);
        self.last_pos = Some(pos);
        delta
    }

    pub fn end(&mut self) {
        self.start_pos = None;
        self.last_pos = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}

/// Screen and world metrics the scene composer reads from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    pub screen: Size,
    pub world: Size,
    pub zoom: f64,
}

/// Pan/zoom/drag viewport.
pub struct Viewport {
    id: ViewportId,
    world: Size,
    screen: Size,
    zoom: f64,
    pan: Point,
    min_zoom: f64,
    max_zoom: f64,
    wheel: Option<WheelOptions>,
    drag_enabled: bool,
    drag: DragState,
    stop_wheel: Option<WheelPredicate>,
    surface: InputSurface,
    destroyed: bool,
}

impl Viewport {
    /// Creates a viewport over a `world` plane shown in a `screen` area.
    ///
    /// Gestures start disabled; call [`Viewport::wheel`] and
    /// [`Viewport::drag`] to enable them.
    pub fn new(world: Size, screen: Size) -> Self {
        let id = ViewportId(NEXT_VIEWPORT_ID.fetch_add(1, Ordering::Relaxed));
        debug!(%id, ?world, ?screen, "viewport created");
        Self {
            id,
            world,
            screen,
            zoom: 1.0,
            pan: Point::ORIGIN,
            min_zoom: 0.05,
            max_zoom: 40.0,
            wheel: None,
            drag_enabled: false,
            drag: DragState::default(),
            stop_wheel: None,
            surface: InputSurface::default(),
            destroyed: false,
        }
    }

    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Enables wheel zoom.
    pub fn wheel(&mut self, options: WheelOptions) -> &mut Self {
        self.wheel = Some(options);
        self
    }

    /// Enables drag panning.
    pub fn drag(&mut self) -> &mut Self {
        self.drag_enabled = true;
        self
    }

    /// Refuses wheel events matching `predicate`; the viewport will not zoom
    /// on them, leaving them to listeners.
    pub fn stop_wheel<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&WheelEvent) -> bool + 'static,
    {
        self.stop_wheel = Some(Box::new(predicate));
        self
    }

    /// Sets zoom limits, normalizing their order, and clamps the current zoom.
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        let (lo, hi) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        self.min_zoom = lo;
        self.max_zoom = hi;
        self.zoom = self.zoom.clamp(lo, hi);
    }

    /// Input surface that listeners attach to.
    pub fn input_surface_mut(&mut self) -> &mut InputSurface {
        &mut self.surface
    }

    pub fn input_surface(&self) -> &InputSurface {
        &self.surface
    }

    pub fn metrics(&self) -> ViewportMetrics {
        ViewportMetrics {
            screen: self.screen,
            world: self.world,
            zoom: self.zoom,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    /// Updates the screen size. Zoom, pan, and identity are kept.
    pub fn resize(&mut self, screen: Size) {
        self.screen = screen;
    }

    /// Restores the initial transform.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Point::ORIGIN;
    }

    pub fn world_to_view(&self, world: Point) -> Point {
        world.scaled(self.zoom) + self.pan
    }

    pub fn view_to_world(&self, view: Point) -> Point {
        (view - self.pan).scaled(1.0 / self.zoom)
    }

    /// World-space rectangle currently covered by the screen.
    pub fn visible_world_rect(&self) -> Rect {
        Rect {
            min: self.view_to_world(Point::ORIGIN),
            max: self.view_to_world(Point::new(self.screen.width, self.screen.height)),
        }
    }

    /// Pans the view by a delta in screen pixels.
    pub fn pan_by_view(&mut self, delta: Point) {
        self.pan = self.pan + delta;
    }

    /// Zooms by `factor` keeping `anchor` (screen pixels) fixed on screen.
    /// Returns false if the zoom did not change.
    pub fn zoom_about_view_point(&mut self, anchor: Point, factor: f64) -> bool {
        if factor <= 0.0 || !factor.is_finite() {
            return false;
        }
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() < f64::EPSILON {
            return false;
        }
        let anchor_world = self.view_to_world(anchor);
        self.zoom = new_zoom;
        let moved = self.world_to_view(anchor_world);
        self.pan_by_view(anchor - moved);
        true
    }

    /// Zooms about the screen center.
    pub fn zoom_centered(&mut self, factor: f64) -> bool {
        self.zoom_about_view_point(self.screen.center(), factor)
    }

    /// Delivers a wheel event: listeners first, then the viewport's own zoom.
    pub fn dispatch_wheel(&mut self, mut event: WheelEvent) -> WheelOutcome {
        if self.destroyed {
            return WheelOutcome::Ignored;
        }

        self.surface.dispatch_wheel(&mut event);
        if event.is_default_prevented() {
            trace!(id = %self.id, "wheel intercepted by listener");
            return WheelOutcome::Intercepted;
        }
        if self.stop_wheel.as_ref().is_some_and(|stop| stop(&event)) {
            trace!(id = %self.id, "wheel refused by stop gate");
            return WheelOutcome::Refused;
        }

        let Some(options) = self.wheel else {
            return WheelOutcome::Ignored;
        };
        if event.delta_y == 0.0 {
            return WheelOutcome::Ignored;
        }
        // Scrolling down (positive delta) zooms out.
        let factor = (1.0 + options.percent).powf(-event.delta_y.signum());
        if self.zoom_about_view_point(event.position, factor) {
            WheelOutcome::Zoomed
        } else {
            WheelOutcome::Ignored
        }
    }

    /// Starts a drag at `pos` (screen pixels). No-op if drag is disabled.
    pub fn drag_start(&mut self, pos: Point) {
        if self.drag_enabled && !self.destroyed {
            self.drag.start(pos);
        }
    }

    /// Moves an ongoing drag, panning by the pointer delta.
    /// Returns true if the view moved.
    pub fn drag_move(&mut self, pos: Point) -> bool {
        match self.drag.update(pos) {
            Some(delta) if delta != Point::ORIGIN => {
                self.pan_by_view(delta);
                true
            }
            _ => false,
        }
    }

    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    /// Releases listeners and disables every gesture. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.surface.clear();
        self.wheel = None;
        self.drag_enabled = false;
        self.drag.end();
        self.stop_wheel = None;
        self.destroyed = true;
        debug!(id = %self.id, "viewport destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("id", &self.id)
            .field("world", &self.world)
            .field("screen", &self.screen)
            .field("zoom", &self.zoom)
            .field("pan", &self.pan)
            .field("wheel", &self.wheel)
            .field("drag_enabled", &self.drag_enabled)
            .field("stop_wheel", &self.stop_wheel.is_some())
            .field("surface", &self.surface)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

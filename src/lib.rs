//! # SeqRing - Circular Sequence Viewer
//!
//! A terminal viewer that draws DNA and protein sequences as circular
//! diagrams on a grid, inside a pannable, zoomable and rotatable viewport.
//!
//! ## Architecture
//!
//! Data flows one way, from the sequences to the screen:
//! - `model`: sequences, the registry that ids them, and the shared view state
//! - `grid`: placement of diagrams on a square grid
//! - `layout`: circular placement of glyphs and the backdrop draw protocol
//! - `scene`: composition of a declarative scene from the above
//! - `ui`: drawing the scene with ratatui
//!
//! Input flows back through:
//! - `viewport`: pan/zoom transform, wheel listeners and drag tracking
//! - `interaction`: the shift-wheel rotation listener and its lifecycle
//! - `event`: terminal events to viewer actions
//! - `controller`: the application loop
//!
//! `viewer` ties them together; `config`, `error` and `logging` carry the
//! ambient concerns.

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod layout;
pub mod logging;
pub mod model;
pub mod scene;
pub mod ui;
pub mod viewer;
pub mod viewport;

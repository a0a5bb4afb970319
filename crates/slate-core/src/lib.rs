//! Core of the slate toolkit: a retained-mode component tree for embedded
//! touchscreen displays, layered over an injected 2D rendering/input
//! platform.
//!
//! The pieces fit together like this: a [`Display`] owns the component tree
//! under its [`Root`] and drives one frame at a time - sampling the
//! pointer into the touch state machine, routing the sample through
//! focus-locked dispatch and depth-first hit-testing, ticking every
//! [`FrameListener`], and finally drawing the tree while a [`Canvas`] tracks
//! the nested coordinate frames and clip regions. Gesture helpers
//! ([`Presser`], [`InertialScroller`]) plug into components through the
//! capability traits.

/// Coordinate-frame stack for draw and hit-test traversals.
mod canvas;
/// The component/container tree and its capability contracts.
mod component;
/// Display and toolkit configuration.
mod config;
/// The display and its frame loop.
mod display;
/// Error types.
pub mod error;
/// The injected platform boundary.
mod platform;
/// Press-gesture recognition.
mod press;
/// Sample window for the scroller.
mod ring;
/// Inertial scrolling.
mod scroll;
/// Pointer state machine and touch capability.
mod touch;
/// Test doubles.
pub mod tutils;

pub use canvas::Canvas;
pub use component::{
    Children, Component, ComponentCore, Container, ContainerCore, FrameListener, PostDraw, attach,
};
pub use config::{Config, DisplayConfig};
pub use display::{CancelToken, Display, Root};
pub use error::{Error, Result};
pub use platform::{Color, Font, Platform, Texture};
pub use press::Presser;
pub use scroll::{InertialScroller, ScrollAxes, Scrollable, default_deceleration};
pub use touch::{TouchHandler, TouchPhase, TouchResponse, TouchSample};

// Re-export the geometry types at the root, like the crates that consume
// them do.
pub use geom::{Point, Rect, Vec2};

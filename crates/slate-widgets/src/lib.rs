//! Stock widgets for the slate toolkit.
//!
//! Every widget here is a consumer of the core's capability contracts: it
//! owns a [`slate_core::ComponentCore`] or [`slate_core::ContainerCore`] for
//! its place in the tree, plus whatever gesture/scroll helpers it needs, and
//! forwards the relevant capability queries to them explicitly.

/// Push button built on the press recognizer.
mod button;
/// Static text line.
mod label;
/// Plain grouping container.
mod panel;
/// Inertially scrolled container with overlay scrollbars.
mod scroll_pane;
/// Passive styling configuration.
mod style;

pub use button::{Button, ButtonStyle};
pub use label::Label;
pub use panel::Panel;
pub use scroll_pane::{ScrollBars, ScrollPane, ScrollPaneOptions};
pub use style::Style;

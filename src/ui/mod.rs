//! Overlay state, input routing, and the split-pane render engine.

pub mod input;
pub mod layout;
mod overlay;
mod render;
pub(crate) mod selection;
pub(crate) mod text;

pub use input::InputAction;
pub use layout::{Layout, MIN_WIDTH, layout};
pub use overlay::{FinderOverlay, ListPhase, OverlayOutcome};

//! Controller layer: UI events, event queue orchestration, and the top panel controller.

pub mod events;
pub mod orchestration;
pub mod top_panel;

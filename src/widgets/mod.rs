//! UI Widgets - modular, reusable UI components
//!
//! Each widget is self-contained and learns about the player through EventBus

pub mod status;
pub mod viewer;

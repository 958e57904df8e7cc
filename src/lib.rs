//! Turntable - 360° frame-sequence product viewer library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (loader, events, player, workers)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod headless;
pub mod widgets;

// Re-export commonly used types from core
pub use core::event_bus::{BoxedEvent, EventBus, EventEmitter, PlayerEmitter, downcast_event};
pub use core::player::{Player, PlayerSettings};

// Re-export entities
pub use entities::{Catalog, Frame, Product, Sequence};

//! Core engine modules - loader, events, player, workers
//!
//! These modules form the viewer engine, independent of UI.

pub mod event_bus;
pub mod loader;
pub mod player;
pub mod player_events;
pub mod tick;
pub mod workers;

// Re-exports for convenience
pub use event_bus::{EventBus, EventEmitter, PlayerEmitter, downcast_event};
pub use loader::{LoadHandle, SequenceLoader, SlotResolved};
pub use player::{Player, PlayerSettings, PointerInput, TouchPhase};
pub use tick::TickSchedule;
pub use workers::Workers;

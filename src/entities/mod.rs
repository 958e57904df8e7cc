//! Domain entities: frames, sequences, asset resolution and the catalog.
//!
//! Nothing here owns threads or UI; `core` wires these together.

pub mod frame;
pub mod image_source;
pub mod placeholder;
pub mod product;
pub mod sequence;
pub mod traits;

pub use frame::{Frame, FrameError};
pub use image_source::{AssetPolicy, FsImageSource, resolve_slot};
pub use product::{Catalog, Product};
pub use sequence::{FrameOrigin, FrameSlot, LoadProgress, Sequence, SequenceState, SlotOutcome, SlotStatus, wrap_index};
pub use traits::{FitRect, FrameRenderer, ImageSource, WorkerPool};

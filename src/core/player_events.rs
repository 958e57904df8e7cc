//! Events emitted by the player for host UIs.

/// One more slot reached a terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgressEvent {
    pub generation: u64,
    pub product: String,
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgressEvent {
    pub fn percent(&self) -> u32 {
        crate::entities::LoadProgress { loaded: self.loaded, total: self.total }.percent()
    }
}

/// Every slot is terminal; the sequence can be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReadyEvent {
    pub generation: u64,
    pub product: String,
    pub total: usize,
    /// Slots served by the generic image or a synthesized placeholder
    pub fallbacks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChangedEvent {
    pub frame: usize,
    pub total: usize,
}

/// Auto-rotate toggled by the control or interrupted by a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRotateChangedEvent {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOpenedEvent {
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerClosedEvent;

//! Frame-sequence player: the 360° viewer's state machine.
//!
//! **Architecture**: The player owns the sequence, the current frame, the
//! interaction state and the auto-rotate schedule. Collaborators come in at
//! construction: a `SequenceLoader` (images), a `FrameRenderer` (surface) and
//! a `PlayerEmitter` (observers). The host calls the control methods from its
//! UI thread and `update(now)` once per paint; nothing else mutates state.
//!
//! # Lifecycle
//!
//! ```text
//! open(product) ──> Loading ──(all slots terminal)──> Ready
//!        ^                                              │
//!        └──────────── open(other product) <────────────┘
//! ```
//!
//! # Rendering
//!
//! Navigation requests a render. While loading, requests coalesce into one
//! render when the sequence becomes ready, showing the latest frame.
//!
//! # Interaction
//!
//! `Idle -> Dragging -> Idle`. Pointer-down anchors the drag and stops
//! auto-rotate; moves map `floor(dx / sensitivity)` frames onto the anchor
//! frame; up/leave ends the drag. No inertia.

use log::{debug, info, trace};
use std::time::{Duration, Instant};

use super::event_bus::PlayerEmitter;
use super::loader::{LoadHandle, SequenceLoader, SlotResolved};
use super::player_events::{
    AutoRotateChangedEvent, FrameChangedEvent, LoadProgressEvent, SequenceReadyEvent, ViewerClosedEvent,
    ViewerOpenedEvent,
};
use super::tick::{DEFAULT_FPS, TickSchedule};
use crate::entities::{FitRect, FrameOrigin, FrameRenderer, LoadProgress, Sequence, SequenceState, wrap_index};

/// Default drag sensitivity (pixels per frame; lower = more sensitive)
pub const DEFAULT_SENSITIVITY: f32 = 2.0;

/// Default sequence length
pub const DEFAULT_TOTAL_FRAMES: usize = 36;

/// Playback parameters fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    pub total_frames: usize,
    pub sensitivity: f32,
    pub fps: f32,
    /// Auto-rotate state applied on every `open()`
    pub auto_rotate: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            total_frames: DEFAULT_TOTAL_FRAMES,
            sensitivity: DEFAULT_SENSITIVITY,
            fps: DEFAULT_FPS,
            auto_rotate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { anchor_x: f32, frame_at_start: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub drag: DragState,
    pub auto_rotate: bool,
}

/// Pointer input in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { x: f32 },
    Move { x: f32 },
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// What the host should do with the platform event after the player saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    pub handled: bool,
    /// Cancel the platform's scroll/pan gesture
    pub suppress_default: bool,
}

pub struct Player<R: FrameRenderer> {
    loader: SequenceLoader,
    renderer: R,
    emitter: PlayerEmitter,
    settings: PlayerSettings,

    sequence: Option<Sequence>,
    handle: Option<LoadHandle>,
    current_frame: usize,
    interaction: Interaction,
    schedule: TickSchedule,
    render_pending: bool,
    is_open: bool,
    renders: u64,
}

impl<R: FrameRenderer> Player<R> {
    pub fn new(settings: PlayerSettings, loader: SequenceLoader, renderer: R, emitter: PlayerEmitter) -> Self {
        let settings = PlayerSettings {
            total_frames: settings.total_frames.max(1),
            sensitivity: if settings.sensitivity > 0.0 { settings.sensitivity } else { DEFAULT_SENSITIVITY },
            ..settings
        };
        info!(
            "Player initialized: {} frames, {} px/frame, {} fps",
            settings.total_frames, settings.sensitivity, settings.fps
        );
        Self {
            loader,
            renderer,
            emitter,
            settings,
            sequence: None,
            handle: None,
            current_frame: 0,
            interaction: Interaction { drag: DragState::Idle, auto_rotate: settings.auto_rotate },
            schedule: TickSchedule::from_fps(settings.fps),
            render_pending: false,
            is_open: false,
            renders: 0,
        }
    }

    // === Accessors ===

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn total_frames(&self) -> usize {
        self.sequence.as_ref().map_or(self.settings.total_frames, |s| s.total())
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub fn state(&self) -> Option<SequenceState> {
        self.sequence.as_ref().map(|s| s.state())
    }

    pub fn is_ready(&self) -> bool {
        self.sequence.as_ref().is_some_and(|s| s.is_ready())
    }

    pub fn progress(&self) -> LoadProgress {
        self.sequence.as_ref().map(|s| s.progress()).unwrap_or_default()
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction.drag, DragState::Dragging { .. })
    }

    pub fn auto_rotate(&self) -> bool {
        self.interaction.auto_rotate
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_pending
    }

    /// Completed `render()` calls that painted a frame
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // === Lifecycle ===

    /// Show the viewer for `product`: start loading its sequence and, if the
    /// configured default is on, the auto-rotate loop.
    pub fn open(&mut self, product: &str, now: Instant) -> LoadHandle {
        self.is_open = true;
        self.interaction.drag = DragState::Idle;
        let handle = self.load_sequence(product);
        self.emitter.emit(ViewerOpenedEvent { generation: handle.generation() });
        self.set_auto_rotate(self.settings.auto_rotate, now);
        handle
    }

    /// Hide the viewer. Stops the tick schedule; in-flight loads finish and
    /// are applied or discarded as usual.
    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.interaction.drag = DragState::Idle;
        self.schedule.cancel();
        info!("Viewer closed at frame {}", self.current_frame);
        self.emitter.emit(ViewerClosedEvent);
    }

    /// Replace the sequence with a fresh load for `product`.
    ///
    /// Results of any earlier load are ignored from here on.
    pub fn load_sequence(&mut self, product: &str) -> LoadHandle {
        if let Some(prev) = self.handle.take()
            && prev.is_current()
        {
            debug!("Superseding load {} ('{}') with '{}'", prev.generation(), prev.product(), product);
            prev.cancel();
        }
        let handle = self.loader.load_sequence(product, self.settings.total_frames);
        let sequence = Sequence::new(product, handle.generation(), handle.total());
        self.current_frame = wrap_index(self.current_frame, 0, sequence.total());

        self.emitter.emit(LoadProgressEvent {
            generation: handle.generation(),
            product: product.to_string(),
            loaded: 0,
            total: sequence.total(),
        });

        self.sequence = Some(sequence);
        self.handle = Some(handle.clone());
        self.render_pending = true;
        handle
    }

    // === Event loop ===

    /// Apply finished slot loads and run the auto-rotate tick if due.
    pub fn update(&mut self, now: Instant) {
        for resolved in self.loader.drain() {
            self.apply_slot(resolved);
        }

        if self.is_open && self.interaction.auto_rotate && !self.is_dragging() && self.schedule.poll(now) {
            trace!("Auto-rotate tick at frame {}", self.current_frame);
            self.step_frame(1);
            self.schedule.reschedule(now);
        }
    }

    /// Block up to `timeout` for loader results, then apply everything
    /// available. Returns false on timeout. For hosts without a paint loop.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        let Some(first) = self.loader.wait(timeout) else {
            return false;
        };
        self.apply_slot(first);
        for resolved in self.loader.drain() {
            self.apply_slot(resolved);
        }
        true
    }

    /// Delay until the next auto-rotate tick, for the host's repaint timer
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        if !self.is_open || !self.interaction.auto_rotate || self.is_dragging() {
            return None;
        }
        self.schedule.time_until(now)
    }

    fn apply_slot(&mut self, resolved: SlotResolved) {
        let Some(seq) = self.sequence.as_mut() else {
            return;
        };
        if resolved.generation != seq.generation() {
            trace!(
                "Discarding slot {} of superseded load {} (current {})",
                resolved.index,
                resolved.generation,
                seq.generation()
            );
            return;
        }

        let was_ready = seq.is_ready();
        let Some(progress) = seq.resolve(resolved.index, resolved.outcome) else {
            return;
        };

        self.emitter.emit(LoadProgressEvent {
            generation: seq.generation(),
            product: seq.product().to_string(),
            loaded: progress.loaded,
            total: progress.total,
        });

        if !was_ready && seq.is_ready() {
            let fallbacks = seq.total() - seq.count_origin(FrameOrigin::Canonical);
            info!(
                "Sequence '{}' ready: {} frames ({} fallbacks)",
                seq.product(),
                seq.total(),
                fallbacks
            );
            self.emitter.emit(SequenceReadyEvent {
                generation: seq.generation(),
                product: seq.product().to_string(),
                total: seq.total(),
                fallbacks,
            });
            if self.render_pending {
                self.render();
            }
        }
    }

    // === Navigation ===

    /// Jump to `index` (wrapped into range)
    pub fn set_frame(&mut self, index: i64) {
        let total = self.total_frames();
        self.change_frame(wrap_index(0, index, total));
    }

    /// Move by `delta` frames (wrapped)
    pub fn step_frame(&mut self, delta: i64) {
        let total = self.total_frames();
        self.change_frame(wrap_index(self.current_frame, delta, total));
    }

    /// Back to frame 0
    pub fn reset(&mut self) {
        self.set_frame(0);
    }

    fn change_frame(&mut self, frame: usize) {
        self.current_frame = frame;
        self.emitter.emit(FrameChangedEvent { frame, total: self.total_frames() });
        self.request_render();
    }

    /// Render now if ready, otherwise once loading completes
    pub fn request_render(&mut self) {
        if self.is_ready() {
            self.render();
        } else {
            self.render_pending = true;
        }
    }

    /// Surface size changed
    pub fn resize(&mut self) {
        self.request_render();
    }

    // === Auto-rotate ===

    pub fn set_auto_rotate(&mut self, enabled: bool, now: Instant) {
        let changed = self.interaction.auto_rotate != enabled;
        self.interaction.auto_rotate = enabled;
        if enabled && self.is_open {
            self.schedule.start(now);
        } else {
            self.schedule.cancel();
        }
        if changed {
            debug!("Auto-rotate {}", if enabled { "on" } else { "off" });
        }
        self.emitter.emit(AutoRotateChangedEvent { enabled });
    }

    pub fn toggle_auto_rotate(&mut self, now: Instant) {
        self.set_auto_rotate(!self.interaction.auto_rotate, now);
    }

    // === Interaction ===

    pub fn pointer(&mut self, input: PointerInput) -> InputResponse {
        match input {
            PointerInput::Down { x } => {
                self.start_drag(x);
                InputResponse { handled: true, suppress_default: false }
            }
            PointerInput::Move { x } => {
                let handled = self.drag_to(x);
                InputResponse { handled, suppress_default: false }
            }
            PointerInput::Up | PointerInput::Leave => {
                let handled = self.end_drag();
                InputResponse { handled, suppress_default: false }
            }
        }
    }

    /// Touch events; `xs` holds the x of each active touch point, primary first.
    pub fn touch(&mut self, phase: TouchPhase, xs: &[f32]) -> InputResponse {
        match phase {
            TouchPhase::Start => match xs.first() {
                Some(&x) => self.pointer(PointerInput::Down { x }),
                None => InputResponse::default(),
            },
            TouchPhase::Move => match xs.first() {
                Some(&x) if self.is_dragging() => {
                    self.drag_to(x);
                    InputResponse { handled: true, suppress_default: true }
                }
                _ => InputResponse::default(),
            },
            TouchPhase::End | TouchPhase::Cancel => self.pointer(PointerInput::Up),
        }
    }

    fn start_drag(&mut self, x: f32) {
        self.interaction.drag = DragState::Dragging {
            anchor_x: x,
            frame_at_start: self.current_frame,
        };
        trace!("Drag start at x={} frame={}", x, self.current_frame);
        // Dragging always interrupts auto-rotation
        self.schedule.cancel();
        self.interaction.auto_rotate = false;
        self.emitter.emit(AutoRotateChangedEvent { enabled: false });
    }

    fn drag_to(&mut self, x: f32) -> bool {
        let DragState::Dragging { anchor_x, frame_at_start } = self.interaction.drag else {
            return false;
        };
        let frame_delta = ((x - anchor_x) / self.settings.sensitivity).floor() as i64;
        let total = self.total_frames();
        self.change_frame(wrap_index(frame_at_start, frame_delta, total));
        true
    }

    fn end_drag(&mut self) -> bool {
        if !self.is_dragging() {
            return false;
        }
        self.interaction.drag = DragState::Idle;
        trace!("Drag end at frame {}", self.current_frame);
        true
    }

    // === Rendering ===

    /// Paint the current frame, fit-scaled and centered.
    ///
    /// No-op (returns false) unless the sequence is ready, the slot holds a
    /// decoded frame and the surface has area. Safe to call repeatedly.
    pub fn render(&mut self) -> bool {
        let Some(seq) = self.sequence.as_ref() else {
            return false;
        };
        if !seq.is_ready() {
            return false;
        }
        let Some(frame) = seq.frame(self.current_frame) else {
            return false;
        };
        if !frame.is_decoded() {
            return false;
        }

        let (sw, sh) = self.renderer.surface_size();
        let Some(dest) = FitRect::fit(sw, sh, frame.width() as f32, frame.height() as f32) else {
            return false;
        };

        self.renderer.clear();
        self.renderer.draw(self.current_frame, frame, dest);
        self.render_pending = false;
        self.renders += 1;
        true
    }
}

//! Frame sequence model: cyclic slots, per-slot status and load progress.
//!
//! A `Sequence` is created empty when a load starts and is replaced wholesale
//! by the next load. Each slot transitions `Pending -> Loaded | Fallback`
//! exactly once; the sequence becomes `Ready` when every slot is terminal.

use super::frame::Frame;

/// Wrap `current + delta` into `[0, total)`.
///
/// Works for any sign or magnitude of `delta`. `total == 0` yields 0.
pub fn wrap_index(current: usize, delta: i64, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    // Reduce both operands first so the sum cannot overflow
    let base = (current % total) as i64;
    let total = total as i64;
    (base + delta.rem_euclid(total)).rem_euclid(total) as usize
}

/// Slot loading status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Pending,
    /// Canonical per-frame asset
    Loaded,
    /// Generic product image or synthesized placeholder
    Fallback,
}

/// Which step of the fallback chain produced a slot's image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameOrigin {
    Canonical,
    Generic,
    Placeholder,
}

impl FrameOrigin {
    pub fn status(self) -> SlotStatus {
        match self {
            FrameOrigin::Canonical => SlotStatus::Loaded,
            FrameOrigin::Generic | FrameOrigin::Placeholder => SlotStatus::Fallback,
        }
    }
}

/// Terminal result of resolving one slot
#[derive(Debug, Clone)]
pub struct SlotOutcome {
    pub frame: Frame,
    pub origin: FrameOrigin,
}

/// Loading state for one frame
#[derive(Debug, Clone)]
pub struct FrameSlot {
    status: SlotStatus,
    frame: Option<Frame>,
    origin: Option<FrameOrigin>,
}

impl FrameSlot {
    fn pending() -> Self {
        Self {
            status: SlotStatus::Pending,
            frame: None,
            origin: None,
        }
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn origin(&self) -> Option<FrameOrigin> {
        self.origin
    }

    pub fn is_terminal(&self) -> bool {
        self.status != SlotStatus::Pending
    }
}

/// Monotonic load counter exposed to the host's progress readout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub loaded: usize,
    pub total: usize,
}

impl LoadProgress {
    /// Rounded percentage 0..=100
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.loaded as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Loading,
    Ready,
}

/// Ordered, cyclic set of frame slots for one product
#[derive(Debug, Clone)]
pub struct Sequence {
    product: String,
    generation: u64,
    slots: Vec<FrameSlot>,
    progress: LoadProgress,
}

impl Sequence {
    /// Empty sequence with `total` pending slots (at least one)
    pub fn new(product: &str, generation: u64, total: usize) -> Self {
        let total = total.max(1);
        Self {
            product: product.to_string(),
            generation,
            slots: (0..total).map(|_| FrameSlot::pending()).collect(),
            progress: LoadProgress { loaded: 0, total },
        }
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    pub fn state(&self) -> SequenceState {
        if self.progress.is_complete() {
            SequenceState::Ready
        } else {
            SequenceState::Loading
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SequenceState::Ready
    }

    pub fn slot(&self, index: usize) -> Option<&FrameSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    /// Resolved frame at `index`, if its slot is terminal
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.slots.get(index).and_then(|s| s.frame.as_ref())
    }

    /// Record a slot's terminal outcome.
    ///
    /// Returns the updated progress, or `None` if the index is out of range or
    /// the slot already reached a terminal state (second outcomes are ignored).
    pub fn resolve(&mut self, index: usize, outcome: SlotOutcome) -> Option<LoadProgress> {
        let slot = self.slots.get_mut(index)?;
        if slot.is_terminal() {
            return None;
        }
        slot.status = outcome.origin.status();
        slot.origin = Some(outcome.origin);
        slot.frame = Some(outcome.frame);
        self.progress.loaded += 1;
        Some(self.progress)
    }

    /// Number of slots produced by a given tier
    pub fn count_origin(&self, origin: FrameOrigin) -> usize {
        self.slots.iter().filter(|s| s.origin == Some(origin)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(origin: FrameOrigin) -> SlotOutcome {
        SlotOutcome {
            frame: Frame::solid(2, 2, [255, 0, 0, 255]),
            origin,
        }
    }

    #[test]
    fn test_wrap_index_always_in_range() {
        for total in 1..=40usize {
            for current in [0usize, 1, total - 1] {
                for delta in [-1000i64, -73, -36, -1, 0, 1, 35, 36, 37, 1000, i64::MAX, i64::MIN] {
                    let idx = wrap_index(current, delta, total);
                    assert!(idx < total, "wrap({current}, {delta}, {total}) = {idx}");
                }
            }
        }
    }

    #[test]
    fn test_wrap_index_values() {
        assert_eq!(wrap_index(5, 10, 36), 15);
        assert_eq!(wrap_index(5, -50, 36), 27);
        assert_eq!(wrap_index(0, -1, 36), 35);
        assert_eq!(wrap_index(35, 1, 36), 0);
        assert_eq!(wrap_index(0, 72, 36), 0);
        assert_eq!(wrap_index(3, -1, 1), 0);
        assert_eq!(wrap_index(3, 4, 0), 0);
    }

    #[test]
    fn test_wrap_index_extreme_deltas() {
        // i64::MAX = 7 (mod 36), i64::MIN = 28 (mod 36)
        assert_eq!(wrap_index(5, i64::MAX, 36), 12);
        assert_eq!(wrap_index(5, i64::MIN, 36), 33);
        assert_eq!(wrap_index(35, i64::MAX, 36), 6);
        assert_eq!(wrap_index(0, i64::MIN, 36), 28);
        assert_eq!(wrap_index(usize::MAX, 0, 36), usize::MAX % 36);
        assert_eq!(wrap_index(2, i64::MAX, 1), 0);
    }

    #[test]
    fn test_new_sequence_is_loading() {
        let seq = Sequence::new("ring", 1, 4);
        assert_eq!(seq.total(), 4);
        assert_eq!(seq.state(), SequenceState::Loading);
        assert!(seq.slots().iter().all(|s| s.status() == SlotStatus::Pending));
        assert_eq!(seq.progress(), LoadProgress { loaded: 0, total: 4 });
    }

    #[test]
    fn test_zero_total_clamped_to_one() {
        let seq = Sequence::new("ring", 1, 0);
        assert_eq!(seq.total(), 1);
    }

    #[test]
    fn test_resolve_transitions_once() {
        let mut seq = Sequence::new("ring", 1, 2);

        let p = seq.resolve(0, outcome(FrameOrigin::Canonical)).unwrap();
        assert_eq!(p.loaded, 1);
        assert_eq!(seq.slot(0).unwrap().status(), SlotStatus::Loaded);

        // Second outcome for same slot is ignored
        assert!(seq.resolve(0, outcome(FrameOrigin::Placeholder)).is_none());
        assert_eq!(seq.slot(0).unwrap().origin(), Some(FrameOrigin::Canonical));
        assert_eq!(seq.progress().loaded, 1);

        assert!(seq.resolve(5, outcome(FrameOrigin::Canonical)).is_none());

        seq.resolve(1, outcome(FrameOrigin::Generic)).unwrap();
        assert_eq!(seq.slot(1).unwrap().status(), SlotStatus::Fallback);
        assert!(seq.is_ready());
        assert_eq!(seq.count_origin(FrameOrigin::Generic), 1);
    }

    #[test]
    fn test_progress_percent_rounding() {
        let p = LoadProgress { loaded: 1, total: 36 };
        assert_eq!(p.percent(), 3);
        let p = LoadProgress { loaded: 35, total: 36 };
        assert_eq!(p.percent(), 97);
        let p = LoadProgress { loaded: 36, total: 36 };
        assert_eq!(p.percent(), 100);
        assert!(p.is_complete());
    }
}

// One-shot latches. Armed -> Fired, never back.

/// A gate that lets exactly one event through for the lifetime of a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latch {
    #[default]
    Armed,
    Fired,
}

impl Latch {
    /// Fires the latch. Returns `true` only for the call that performed the transition.
    pub fn trip(&mut self) -> bool {
        match self {
            Latch::Armed => {
                *self = Latch::Fired;
                true
            }
            Latch::Fired => false,
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, Latch::Fired)
    }
}

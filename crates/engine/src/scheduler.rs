/// Coalesces redraw requests so bursts of input produce one frame.
///
/// Any number of [`request`](Self::request) calls between two frames collapse
/// into a single `true` from [`take`](Self::take).
#[derive(Debug, Clone)]
pub struct RedrawScheduler {
    dirty: bool,
    revision: u64,
    frames: u64,
    coalesced: u64,
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RedrawScheduler {
    pub fn new() -> Self {
        // The first frame is always due.
        Self {
            dirty: true,
            revision: 1,
            frames: 0,
            coalesced: 0,
        }
    }

    pub fn request(&mut self) {
        if self.dirty {
            self.coalesced += 1;
        }
        self.dirty = true;
        self.revision += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Claims the pending frame, if any.
    pub fn take(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.frames += 1;
        true
    }

    /// Bumped on every state change; hosts compare it to decide whether to pull a frame.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of frames handed out so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Requests that were folded into an already pending frame.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

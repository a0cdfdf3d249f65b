/// Smallest time credited to an accumulated frame. Keeps
/// `frame_count == 0 ⇔ elapsed == 0` even when the clock reports a zero delta.
pub const MIN_FRAME_TIME: f32 = 1e-6;

/// Accumulation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No frames blended yet; the shader ignores the previous target
    Reset,
    /// `frame_count` frames are blended into the previous target
    Accumulating,
}

/// Temporal accumulation counters.
///
/// `frame_count` is the blend-weight denominator handed to the shader,
/// `elapsed` is for display only. Both reset together.
#[derive(Debug, Clone)]
pub struct Accumulation {
    frame_count: u32,
    elapsed: f32,
    enabled: bool,
    pending_reset: bool,
}

impl Accumulation {
    pub fn new(enabled: bool) -> Self {
        Self {
            frame_count: 0,
            elapsed: 0.0,
            enabled,
            pending_reset: false,
        }
    }

    /// Advance once per frame, after every mutation source has reported.
    pub fn tick(&mut self, delta_time: f32, invalidated: bool) {
        let invalidated = invalidated || std::mem::take(&mut self.pending_reset);

        if invalidated || !self.enabled {
            self.clear();
            return;
        }

        let delta = if delta_time.is_finite() {
            delta_time.max(MIN_FRAME_TIME)
        } else {
            MIN_FRAME_TIME
        };
        self.frame_count = self.frame_count.saturating_add(1);
        self.elapsed += delta;
    }

    /// Zero the counters now and make the next `tick` behave as invalidated.
    pub fn reset(&mut self) {
        self.clear();
        self.pending_reset = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.reset();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn phase(&self) -> Phase {
        if self.frame_count == 0 {
            Phase::Reset
        } else {
            Phase::Accumulating
        }
    }

    fn clear(&mut self) {
        self.frame_count = 0;
        self.elapsed = 0.0;
    }
}

impl Default for Accumulation {
    fn default() -> Self {
        Self::new(true)
    }
}

use std::time::Instant;

/// Wall clock measuring the time between redraws
#[derive(Debug)]
pub struct FrameClock {
    last_frame_time: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame_time: Instant::now(),
        }
    }

    /// Seconds since the previous call (or since creation)
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Averages frame rate over `FPS_UPDATE_INTERVAL` windows
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    timer: f32,
    fps: f32,
}

impl FpsCounter {
    /// Record one frame. Returns true when a new estimate is available.
    pub fn update(&mut self, delta: f32) -> bool {
        self.frames += 1;
        self.timer += delta;

        if self.timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames as f32 / self.timer;
            self.frames = 0;
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

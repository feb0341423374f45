/// Frames-per-second readout refreshed once per second of supplied time.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_start: f64,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new(now_ms: f64) -> Self {
        Self {
            window_start: now_ms,
            frames: 0,
            fps: 0,
        }
    }

    /// Counts one frame. Returns the new reading when a full second has elapsed.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        self.frames += 1;
        if now_ms - self.window_start < 1000.0 {
            return None;
        }
        self.fps = self.frames;
        self.frames = 0;
        self.window_start = now_ms;
        Some(self.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

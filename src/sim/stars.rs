use fastrand::Rng;
use std::f32::consts::TAU;

/// Background star drifting rightwards across the upper sky.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub opacity: f32,
    pub twinkle: f32,
}

/// Stars stay within the top 70% of the sky.
const SKY_FRACTION: f32 = 0.7;

impl Star {
    pub fn new(width: f32, height: f32, rng: &mut Rng) -> Self {
        Self {
            x: rng.f32() * width,
            y: rng.f32() * height * SKY_FRACTION,
            size: 0.5 + rng.f32() * 1.5,
            speed: 0.1 + rng.f32() * 0.3,
            opacity: 0.3 + rng.f32() * 0.5,
            twinkle: rng.f32() * TAU,
        }
    }

    pub fn update(&mut self, width: f32, height: f32, rng: &mut Rng) {
        self.twinkle += 0.02;
        self.x += self.speed;
        if self.x > width {
            self.x = 0.0;
            self.y = rng.f32() * height * SKY_FRACTION;
        }
    }

    /// Current brightness after twinkling, in 0..=1.
    pub fn brightness(&self) -> f32 {
        self.opacity * (self.twinkle.sin() * 0.2 + 0.8)
    }
}

pub fn star_field(count: usize, width: f32, height: f32, rng: &mut Rng) -> Vec<Star> {
    (0..count).map(|_| Star::new(width, height, rng)).collect()
}

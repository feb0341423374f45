use fastrand::Rng;
use noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;

pub type Rgb = (u8, u8, u8);

/// Petal palette as (outer, inner).
pub const FLOWER_COLORS: [(Rgb, Rgb); 10] = [
    ((0xff, 0x40, 0x81), (0xff, 0x80, 0xab)), // pink
    ((0xf4, 0x43, 0x36), (0xef, 0x9a, 0x9a)), // red
    ((0xff, 0x98, 0x00), (0xff, 0xcc, 0x80)), // orange
    ((0xff, 0xeb, 0x3b), (0xff, 0xf5, 0x9d)), // yellow
    ((0x4c, 0xaf, 0x50), (0xa5, 0xd6, 0xa7)), // green
    ((0x21, 0x96, 0xf3), (0x90, 0xca, 0xf9)), // blue
    ((0x9c, 0x27, 0xb0), (0xce, 0x93, 0xd8)), // purple
    ((0xe9, 0x1e, 0x63), (0xf4, 0x8f, 0xb1)), // magenta
    ((0x00, 0xbc, 0xd4), (0x80, 0xde, 0xea)), // cyan
    ((0x8b, 0xc3, 0x4a), (0xc5, 0xe1, 0xa5)), // light green
];

const BLOOM_MS: f64 = 2000.0;
/// Flower dimensions are authored against a 900 unit tall sky.
const REFERENCE_HEIGHT: f32 = 900.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Height up the stem as a fraction of stem height.
    pub at: f32,
    pub length: f32,
    /// -1 for left, 1 for right.
    pub side: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Petal {
    pub angle: f32,
    pub length: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flower {
    pub x: f32,
    /// Distance of the stem base above the bottom edge.
    pub lift: f32,
    pub size: f32,
    pub stem_height: f32,
    pub outer: Rgb,
    pub inner: Rgb,
    pub leaves: Vec<Leaf>,
    pub petals: Vec<Petal>,
    pub bloom_at: f64,
    pub wave_phase: f32,
    pub sway: f32,
    noise_offset: f64,
}

impl Flower {
    /// A flower somewhere along the bottom of a `width` x `height` sky.
    pub fn random(width: f32, height: f32, now: f64, rng: &mut Rng) -> Self {
        let margin = 75.0_f32.min(width / 2.0);
        let x = margin + rng.f32() * (width - 2.0 * margin).max(0.0);
        let scale = height / REFERENCE_HEIGHT;
        let size = (80.0 + rng.f32() * 60.0) * scale;
        let stem_height = (180.0 + rng.f32() * 150.0) * scale;
        let (outer, inner) = FLOWER_COLORS[rng.usize(0..FLOWER_COLORS.len())];

        let leaves = (0..rng.usize(2..5))
            .map(|i| Leaf {
                at: 0.1 + rng.f32() * 0.7,
                length: (20.0 + rng.f32() * 30.0) * scale,
                side: if i % 2 == 0 { -1.0 } else { 1.0 },
            })
            .collect();

        let petal_count = rng.usize(8..12);
        let radius = size / 2.0;
        let petals = (0..petal_count)
            .map(|i| Petal {
                angle: i as f32 / petal_count as f32 * TAU,
                length: radius * (0.8 + rng.f32() * 0.4),
                width: radius * (0.6 + rng.f32() * 0.4),
            })
            .collect();

        Self {
            x,
            lift: rng.f32() * 80.0 * scale,
            size,
            stem_height,
            outer,
            inner,
            leaves,
            petals,
            bloom_at: now + rng.f64() * 2000.0,
            wave_phase: rng.f32() * TAU,
            sway: 0.0,
            noise_offset: rng.f64() * 1000.0,
        }
    }

    /// Eased bloom amount: 0 while budding, overshoots slightly past 1, then settles at 1.
    pub fn bloom_progress(&self, now: f64) -> f32 {
        let t = ((now - self.bloom_at) / BLOOM_MS).clamp(0.0, 1.0) as f32;
        ease_out_back(t)
    }

    pub fn is_bloomed(&self, now: f64) -> bool {
        now >= self.bloom_at
    }

    pub fn update(&mut self, now: f64, noise: &Perlin) {
        if self.is_bloomed(now) {
            self.wave_phase += 0.02;
        }
        let sample = noise.get([self.noise_offset, now / 4000.0]) as f32;
        self.sway = sample * self.size * 0.15;
    }

    /// Centre pulse factor, 1 ± 0.1 once fully open.
    pub fn pulse(&self, now: f64) -> f32 {
        1.0 + ((now / 1000.0).sin() as f32) * 0.1
    }

    /// Sideways tilt in degrees of petal `i`, swaying gently once bloomed.
    pub fn petal_wave(&self, i: usize) -> f32 {
        (self.wave_phase + i as f32 * 0.5).sin() * 3.0
    }
}

// Matches cubic-bezier(.175, .885, .32, 1.275) closely enough on screen.
fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u * u * u + C1 * u * u
}

/// Shifts each channel down by `percent` of full scale, saturating at black.
pub fn darken(color: Rgb, percent: f32) -> Rgb {
    let amount = (2.55 * percent).round() as i32;
    let channel = |c: u8| (c as i32 - amount).clamp(0, 255) as u8;
    (channel(color.0), channel(color.1), channel(color.2))
}

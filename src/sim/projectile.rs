use super::particle::Particle;
use fastrand::Rng;
use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, TAU};

pub const GRAVITY: f32 = 0.15;
pub const TRAIL_LEN: usize = 8;
pub const STOP_RADIUS: f32 = 15.0;
pub const MAX_RISE: f32 = 500.0;
/// Glow particles added to every burst on top of the text glyphs.
pub const BURST_EXTRAS: usize = 30;
pub const SECONDARY_BURSTS: usize = 3;
pub const SECONDARY_STAGGER_MS: f64 = 200.0;
const SECONDARY_HUE_SHIFT: f32 = 30.0;
const SPARKLES_PER_EMISSION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f32,
    pub y: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Climbing,
    Detonate,
}

/// How per-glyph burst angles are spaced around the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstAngles {
    /// Evenly spaced over a full turn.
    #[default]
    Even,
    /// `i * 360 / n` fed straight into radian trig, which bunches glyphs unevenly.
    Legacy,
}

impl BurstAngles {
    fn angle(self, i: usize, count: usize) -> f32 {
        let step = i as f32 / count as f32;
        match self {
            BurstAngles::Even => step * TAU,
            BurstAngles::Legacy => step * 360.0,
        }
    }
}

/// Follow-up bursts a super shell leaves behind, delivered later by the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryBursts {
    pub x: f32,
    pub y: f32,
    pub hue: f32,
    pub brightness: f32,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    start_y: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub vx: f32,
    pub vy: f32,
    pub gravity: f32,
    pub hue: f32,
    pub brightness: f32,
    pub trail: VecDeque<TrailPoint>,
    pub size: f32,
    pub is_super: bool,
    launched_upward: bool,
    sparkle_interval_ms: f64,
    last_sparkle: f64,
}

impl Projectile {
    pub fn new(
        origin: (f32, f32),
        target: (f32, f32),
        is_super: bool,
        rng: &mut Rng,
    ) -> Self {
        let (x, y) = origin;
        let (dx, dy) = (target.0 - x, target.1 - y);
        let angle = if dx.hypot(dy) > f32::EPSILON {
            dy.atan2(dx)
        } else {
            -FRAC_PI_2
        };
        let speed = if is_super {
            12.0 + rng.f32() * 8.0
        } else {
            8.0 + rng.f32() * 6.0
        };
        let vy = angle.sin() * speed;

        Self {
            x,
            y,
            start_y: y,
            target_x: target.0,
            target_y: target.1,
            vx: angle.cos() * speed,
            vy,
            gravity: GRAVITY,
            hue: rng.u32(0..360) as f32,
            brightness: rng.u32(60..91) as f32,
            trail: VecDeque::with_capacity(TRAIL_LEN + 1),
            size: if is_super { 5.0 } else { 3.0 },
            is_super,
            launched_upward: vy < 0.0,
            sparkle_interval_ms: (0.3 + rng.f64() * 0.5) * 1000.0,
            last_sparkle: f64::NEG_INFINITY,
        }
    }

    #[cfg(test)]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.target_x - self.x).hypot(self.target_y - self.y)
    }

    /// Moves one tick, dropping in-flight sparkles into `out`.
    pub fn advance(&mut self, now: f64, rng: &mut Rng, out: &mut Vec<Particle>) -> Flight {
        if now - self.last_sparkle > self.sparkle_interval_ms {
            for _ in 0..SPARKLES_PER_EMISSION {
                out.push(Particle::sparkle(
                    self.x + (rng.f32() - 0.5) * 10.0,
                    self.y + (rng.f32() - 0.5) * 10.0,
                    self.hue,
                    self.brightness,
                    rng,
                ));
            }
            self.last_sparkle = now;
        }

        self.trail.push_back(TrailPoint {
            x: self.x,
            y: self.y,
            alpha: 1.0,
        });
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop_front();
        }
        for point in &mut self.trail {
            point.alpha -= 0.1;
        }

        self.x += self.vx;
        self.y += self.vy;
        self.vy += self.gravity;

        let near_target = self.distance_to_target() < STOP_RADIUS;
        let too_high = self.start_y - self.y > MAX_RISE;
        let past_apex = self.launched_upward && self.vy >= 0.0;
        if near_target || too_high || past_apex {
            Flight::Detonate
        } else {
            Flight::Climbing
        }
    }

    /// Spells the glyphs out radially and adds the glow ring.
    pub fn detonate(
        &self,
        glyphs: &[char],
        angles: BurstAngles,
        rng: &mut Rng,
        out: &mut Vec<Particle>,
    ) -> Option<SecondaryBursts> {
        let max_speed = if self.is_super { 15.0 } else { 10.0 };
        for (i, &glyph) in glyphs.iter().enumerate() {
            let angle = angles.angle(i, glyphs.len());
            let speed = rng.f32() * max_speed + 3.0;
            out.push(Particle::text(
                self.x,
                self.y,
                self.hue,
                self.brightness,
                (angle.cos() * speed, angle.sin() * speed),
                glyph,
                rng,
            ));
        }
        glow_ring(self.x, self.y, self.hue, self.brightness, rng, out);

        tracing::debug!(
            x = self.x,
            y = self.y,
            is_super = self.is_super,
            glyphs = glyphs.len(),
            "firework detonated"
        );

        self.is_super.then_some(SecondaryBursts {
            x: self.x,
            y: self.y,
            hue: self.hue,
            brightness: self.brightness,
        })
    }
}

impl SecondaryBursts {
    /// One of the offset mini bursts that trail a super shell.
    pub fn mini_burst(
        &self,
        glyphs: &[char],
        angles: BurstAngles,
        rng: &mut Rng,
        out: &mut Vec<Particle>,
    ) {
        let x = self.x + (rng.f32() - 0.5) * 100.0;
        let y = self.y + (rng.f32() - 0.5) * 100.0;
        let hue = (self.hue + SECONDARY_HUE_SHIFT) % 360.0;

        for (i, &glyph) in glyphs.iter().enumerate() {
            let angle = angles.angle(i, glyphs.len());
            let speed = rng.f32() * 8.0 + 2.0;
            out.push(Particle::text(
                x,
                y,
                hue,
                self.brightness,
                (angle.cos() * speed, angle.sin() * speed),
                glyph,
                rng,
            ));
        }
        glow_ring(x, y, hue, self.brightness, rng, out);
    }
}

fn glow_ring(x: f32, y: f32, hue: f32, brightness: f32, rng: &mut Rng, out: &mut Vec<Particle>) {
    for _ in 0..BURST_EXTRAS {
        let angle = rng.f32() * TAU;
        let speed = rng.f32() * 8.0 + 2.0;
        out.push(Particle::glow(
            x,
            y,
            hue,
            brightness,
            (angle.cos() * speed, angle.sin() * speed),
            rng,
        ));
    }
}

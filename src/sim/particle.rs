use fastrand::Rng;
use std::f32::consts::TAU;

const FRICTION: f32 = 0.96;
const GRAVITY: f32 = 0.1;
const SPARKLE_DECAY: f32 = 0.1;
const TEXT_DEATH_ALPHA: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub enum ParticleKind {
    /// Short-lived stationary twinkle left behind a rising shell.
    Sparkle { size: f32 },
    /// Radiant dot with a sideways wobble.
    Glow {
        size: f32,
        wobble: f32,
        wobble_speed: f32,
    },
    /// One glyph of the display text.
    Text {
        glyph: char,
        size: f32,
        rotation: f32,
        rotation_speed: f32,
        wobble: f32,
        wobble_speed: f32,
        wave: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hue: f32,
    pub brightness: f32,
    pub alpha: f32,
    pub decay: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn sparkle(x: f32, y: f32, hue: f32, brightness: f32, rng: &mut Rng) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            hue,
            brightness,
            alpha: 1.0,
            decay: SPARKLE_DECAY,
            kind: ParticleKind::Sparkle {
                size: 1.0 + rng.f32() * 2.0,
            },
        }
    }

    pub fn glow(
        x: f32,
        y: f32,
        hue: f32,
        brightness: f32,
        velocity: (f32, f32),
        rng: &mut Rng,
    ) -> Self {
        Self {
            x,
            y,
            vx: velocity.0,
            vy: velocity.1,
            hue,
            brightness,
            alpha: 1.0,
            decay: 0.01 + rng.f32() * 0.02,
            kind: ParticleKind::Glow {
                size: 1.0 + rng.f32() * 3.0,
                wobble: rng.f32() * TAU,
                wobble_speed: 0.05 + rng.f32() * 0.1,
            },
        }
    }

    pub fn text(
        x: f32,
        y: f32,
        hue: f32,
        brightness: f32,
        velocity: (f32, f32),
        glyph: char,
        rng: &mut Rng,
    ) -> Self {
        Self {
            x,
            y,
            vx: velocity.0,
            vy: velocity.1,
            hue,
            brightness,
            alpha: 1.0,
            decay: 0.005 + rng.f32() * 0.005,
            kind: ParticleKind::Text {
                glyph,
                size: 25.0 + rng.f32() * 20.0,
                rotation: rng.f32() * TAU,
                rotation_speed: (rng.f32() - 0.5) * 0.05,
                wobble: rng.f32() * TAU,
                wobble_speed: 0.05 + rng.f32() * 0.1,
                wave: rng.f32() * TAU,
            },
        }
    }

    /// Alpha at or below which the particle is culled.
    pub fn death_alpha(&self) -> f32 {
        match self.kind {
            ParticleKind::Text { .. } => TEXT_DEATH_ALPHA,
            ParticleKind::Sparkle { .. } | ParticleKind::Glow { .. } => 0.0,
        }
    }

    #[cfg(test)]
    pub fn is_burst(&self) -> bool {
        !matches!(self.kind, ParticleKind::Sparkle { .. })
    }

    /// Advances one tick. Returns `false` once the particle should be removed.
    pub fn update(&mut self) -> bool {
        match &mut self.kind {
            ParticleKind::Sparkle { .. } => {}
            ParticleKind::Glow {
                wobble,
                wobble_speed,
                ..
            } => {
                *wobble += *wobble_speed;
                let drift = wobble.sin() * 0.5;
                self.vx *= FRICTION;
                self.vy *= FRICTION;
                self.vy += GRAVITY;
                self.x += self.vx + drift;
                self.y += self.vy;
            }
            ParticleKind::Text {
                rotation,
                rotation_speed,
                wobble,
                wobble_speed,
                wave,
                ..
            } => {
                *wobble += *wobble_speed;
                *rotation += *rotation_speed;
                *wave += 0.05;
                let drift = wave.sin() * 0.5;
                self.vx *= FRICTION;
                self.vy *= FRICTION;
                self.vy += GRAVITY;
                self.x += self.vx + drift;
                self.y += self.vy;
            }
        }

        self.alpha -= self.decay;
        self.alpha > self.death_alpha()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_death(mut particle: Particle) -> (usize, Particle) {
        let mut ticks = 0;
        let mut last_alpha = particle.alpha;
        loop {
            ticks += 1;
            let alive = particle.update();
            assert!(particle.alpha <= last_alpha, "alpha increased");
            last_alpha = particle.alpha;
            if !alive {
                return (ticks, particle);
            }
            assert!(particle.alpha > particle.death_alpha());
            assert!(ticks < 10_000, "particle never died");
        }
    }

    #[test]
    fn sparkle_dies_in_about_ten_ticks_and_stays_put() {
        let mut rng = Rng::with_seed(1);
        let sparkle = Particle::sparkle(10.0, 20.0, 120.0, 70.0, &mut rng);
        let (ticks, dead) = run_to_death(sparkle);
        assert!((10..=11).contains(&ticks), "ticks = {ticks}");
        assert!(dead.alpha <= 0.0);
        assert_eq!((dead.x, dead.y), (10.0, 20.0));
    }

    #[test]
    fn glow_removed_once_alpha_reaches_zero() {
        let mut rng = Rng::with_seed(2);
        let glow = Particle::glow(0.0, 0.0, 30.0, 80.0, (3.0, -4.0), &mut rng);
        let (ticks, dead) = run_to_death(glow);
        assert!(dead.alpha <= 0.0);
        assert!(dead.alpha > -dead.decay);
        assert!((33..=101).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn text_removed_at_point_one() {
        let mut rng = Rng::with_seed(3);
        let text = Particle::text(0.0, 0.0, 200.0, 75.0, (1.0, 1.0), 'A', &mut rng);
        let (ticks, dead) = run_to_death(text);
        assert!(dead.alpha <= 0.1);
        assert!(dead.alpha > 0.1 - dead.decay);
        // 0.9 of alpha at 0.005..0.01 per tick
        assert!((90..=181).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn text_outlives_glow() {
        let mut rng = Rng::with_seed(4);
        let glow = Particle::glow(0.0, 0.0, 0.0, 60.0, (0.0, 0.0), &mut rng);
        let text = Particle::text(0.0, 0.0, 0.0, 60.0, (0.0, 0.0), 'x', &mut rng);
        assert!(text.decay < glow.decay);
    }

    #[test]
    fn friction_then_gravity() {
        let mut rng = Rng::with_seed(5);
        let mut glow = Particle::glow(0.0, 0.0, 0.0, 60.0, (10.0, -10.0), &mut rng);
        glow.update();
        assert!((glow.vx - 9.6).abs() < 1e-5);
        assert!((glow.vy - (-9.6 + 0.1)).abs() < 1e-5);
        assert!((glow.y - glow.vy).abs() < 1e-5);
        // x also carries the wobble drift, bounded by 0.5
        assert!((glow.x - 9.6).abs() <= 0.5 + 1e-5);
    }

    #[test]
    fn text_accumulates_rotation() {
        let mut rng = Rng::with_seed(6);
        let mut text = Particle::text(0.0, 0.0, 0.0, 60.0, (0.0, 0.0), 'z', &mut rng);
        let ParticleKind::Text {
            rotation: start,
            rotation_speed,
            ..
        } = text.kind
        else {
            unreachable!()
        };
        for _ in 0..10 {
            text.update();
        }
        let ParticleKind::Text { rotation, .. } = text.kind else {
            unreachable!()
        };
        assert!((rotation - (start + rotation_speed * 10.0)).abs() < 1e-4);
    }

    #[test]
    fn burst_flag_excludes_sparkles() {
        let mut rng = Rng::with_seed(7);
        assert!(!Particle::sparkle(0.0, 0.0, 0.0, 60.0, &mut rng).is_burst());
        assert!(Particle::glow(0.0, 0.0, 0.0, 60.0, (0.0, 0.0), &mut rng).is_burst());
        assert!(Particle::text(0.0, 0.0, 0.0, 60.0, (0.0, 0.0), 'q', &mut rng).is_burst());
    }
}

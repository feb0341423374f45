//! Fireworks, falling text, stars and flowers advanced on one shared clock.
//!
//! [`Simulation::tick`] is the single writer of every collection. Deferred work
//! (staggered volleys, secondary bursts, periodic triggers) goes through a
//! [`Schedule`] that is drained at the start of each tick, before any collection
//! is iterated.

pub mod clock;
pub mod flower;
pub mod particle;
pub mod projectile;
pub mod schedule;
pub mod spawn;
pub mod stars;

use crate::config::ShowConfig;
use fastrand::Rng;
use flower::Flower;
use noise::Perlin;
use particle::Particle;
use projectile::{
    BurstAngles, Flight, Projectile, SECONDARY_BURSTS, SECONDARY_STAGGER_MS, SecondaryBursts,
};
use schedule::Schedule;
use spawn::{Point, Trigger};
use stars::Star;

/// One fixed simulation step at 60 Hz.
pub const TICK_MS: f64 = 1000.0 / 60.0;

const INITIAL_FLOWER_STAGGER_MS: f64 = 400.0;
const BARRAGE_SHELLS: usize = 5;
const BARRAGE_STAGGER_MS: f64 = 150.0;

/// Discrete user commands, one per on-screen action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddFlowers,
    LaunchVolley,
    LaunchSuperVolley,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    AutoLaunch,
    AutoFlower,
    LaunchRandom { is_super: bool },
    Barrage { x: f32, y: f32 },
    Secondary(SecondaryBursts),
    MiniBurst(SecondaryBursts),
    SpawnFlower,
}

/// Running totals, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub launched: u64,
    pub detonations: u64,
    /// Text and glow particles created by bursts.
    pub burst_particles: u64,
}

pub struct Simulation {
    width: f32,
    height: f32,
    now: f64,
    rng: Rng,
    noise: Perlin,
    glyphs: Vec<char>,
    angles: BurstAngles,
    launch: Trigger,
    super_probability: f32,
    flower_trigger: Trigger,
    flower_ceiling: usize,
    star_count: usize,
    initial_flowers: usize,
    projectiles: Vec<Projectile>,
    particles: Vec<Particle>,
    flowers: Vec<Flower>,
    stars: Vec<Star>,
    schedule: Schedule<Action>,
    spawned: Vec<Particle>,
    stats: Stats,
}

impl Simulation {
    pub fn new(config: &ShowConfig, width: f32, height: f32) -> Self {
        let mut rng = match config.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        let noise = Perlin::new(rng.u32(..));

        let mut sim = Self {
            width: width.max(1.0),
            height: height.max(1.0),
            now: 0.0,
            rng,
            noise,
            glyphs: config.glyphs(),
            angles: if config.legacy_burst_angles {
                BurstAngles::Legacy
            } else {
                BurstAngles::Even
            },
            launch: Trigger {
                interval_ms: config.launch.interval_ms,
                probability: config.launch.probability,
            },
            super_probability: config.launch.super_probability,
            flower_trigger: Trigger {
                interval_ms: config.flowers.interval_ms,
                probability: config.flowers.probability,
            },
            flower_ceiling: config.flowers.ceiling,
            star_count: config.star_count,
            initial_flowers: config.initial_flowers,
            projectiles: Vec::new(),
            particles: Vec::new(),
            flowers: Vec::new(),
            stars: Vec::new(),
            schedule: Schedule::new(),
            spawned: Vec::new(),
            stats: Stats::default(),
        };
        sim.reset();
        sim
    }

    #[cfg(test)]
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Clears the scene, cancels pending events and starts over.
    pub fn reset(&mut self) {
        let cancelled = self.schedule.len();
        self.schedule.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.spawned.clear();
        self.flowers.clear();
        self.stars = stars::star_field(self.star_count, self.width, self.height, &mut self.rng);

        for i in 0..self.initial_flowers {
            self.schedule.push(
                self.now + i as f64 * INITIAL_FLOWER_STAGGER_MS,
                Action::SpawnFlower,
            );
        }
        self.schedule
            .push(self.now + self.launch.interval_ms, Action::AutoLaunch);
        self.schedule
            .push(self.now + self.flower_trigger.interval_ms, Action::AutoFlower);

        tracing::info!(
            width = self.width,
            height = self.height,
            cancelled,
            "scene reset"
        );
    }

    /// Adopts a new viewport size, which also resets the scene.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        tracing::info!(width = self.width, height = self.height, "viewport resized");
        self.reset();
    }

    pub fn command(&mut self, command: Command) {
        tracing::debug!(?command, "command");
        match command {
            Command::AddFlowers => self.stagger(5, 200.0, Action::SpawnFlower),
            Command::LaunchVolley => {
                self.stagger(4, 250.0, Action::LaunchRandom { is_super: false })
            }
            Command::LaunchSuperVolley => {
                self.stagger(3, 300.0, Action::LaunchRandom { is_super: true })
            }
            Command::Reset => self.reset(),
        }
    }

    /// Single click: one shell from the bottom edge toward the point.
    pub fn click(&mut self, x: f32, y: f32) {
        let (origin, target) = spawn::click_launch(x, y, self.height, &mut self.rng);
        self.launch_from(origin, target, false);
    }

    /// Double click: a staggered barrage of super shells around the point.
    pub fn double_click(&mut self, x: f32, y: f32) {
        self.stagger(BARRAGE_SHELLS, BARRAGE_STAGGER_MS, Action::Barrage { x, y });
    }

    pub fn launch_from(&mut self, origin: Point, target: Point, is_super: bool) {
        let projectile = Projectile::new(origin, target, is_super, &mut self.rng);
        self.launch(projectile);
    }

    pub fn launch(&mut self, projectile: Projectile) {
        tracing::debug!(
            x = projectile.x,
            y = projectile.y,
            target_x = projectile.target_x,
            target_y = projectile.target_y,
            speed = projectile.speed(),
            is_super = projectile.is_super,
            "firework launched"
        );
        self.stats.launched += 1;
        self.projectiles.push(projectile);
    }

    /// Advances one fixed step.
    pub fn tick(&mut self) {
        self.now += TICK_MS;
        self.run_due();

        for star in &mut self.stars {
            star.update(self.width, self.height, &mut self.rng);
        }

        self.advance_projectiles();

        self.particles.append(&mut self.spawned);
        self.particles.retain_mut(Particle::update);

        for flower in &mut self.flowers {
            flower.update(self.now, &self.noise);
        }
    }

    fn advance_projectiles(&mut self) {
        let now = self.now;
        let glyphs = &self.glyphs;
        let angles = self.angles;
        let rng = &mut self.rng;
        let spawned = &mut self.spawned;
        let mut secondaries = Vec::new();

        self.projectiles.retain_mut(|projectile| {
            match projectile.advance(now, rng, spawned) {
                Flight::Climbing => true,
                Flight::Detonate => {
                    let before = spawned.len();
                    if let Some(secondary) = projectile.detonate(glyphs, angles, rng, spawned) {
                        secondaries.push(secondary);
                    }
                    self.stats.detonations += 1;
                    self.stats.burst_particles += (spawned.len() - before) as u64;
                    false
                }
            }
        });

        for secondary in secondaries {
            let delay = 300.0 + self.rng.f64() * 400.0;
            self.schedule.push(now + delay, Action::Secondary(secondary));
        }
    }

    fn run_due(&mut self) {
        while let Some((at, action)) = self.schedule.pop_due(self.now) {
            self.apply(at, action);
        }
    }

    fn apply(&mut self, at: f64, action: Action) {
        match action {
            Action::AutoLaunch => {
                if self.launch.roll(&mut self.rng) {
                    let is_super = self.rng.f32() < self.super_probability;
                    tracing::trace!(is_super, "auto launch fired");
                    self.launch_random(is_super);
                }
                self.schedule
                    .push(at + self.launch.interval_ms, Action::AutoLaunch);
            }
            Action::AutoFlower => {
                if self.flower_trigger.roll(&mut self.rng)
                    && self.flowers.len() < self.flower_ceiling
                {
                    tracing::trace!(flowers = self.flowers.len(), "auto flower fired");
                    self.spawn_flower();
                }
                self.schedule
                    .push(at + self.flower_trigger.interval_ms, Action::AutoFlower);
            }
            Action::LaunchRandom { is_super } => self.launch_random(is_super),
            Action::Barrage { x, y } => {
                let (origin, target) = spawn::barrage_launch(x, y, self.height, &mut self.rng);
                self.launch_from(origin, target, true);
            }
            Action::Secondary(bursts) => {
                tracing::debug!(x = bursts.x, y = bursts.y, "secondary bursts");
                for i in 0..SECONDARY_BURSTS {
                    self.schedule.push(
                        at + i as f64 * SECONDARY_STAGGER_MS,
                        Action::MiniBurst(bursts),
                    );
                }
            }
            Action::MiniBurst(bursts) => {
                let before = self.particles.len();
                bursts.mini_burst(&self.glyphs, self.angles, &mut self.rng, &mut self.particles);
                self.stats.burst_particles += (self.particles.len() - before) as u64;
            }
            Action::SpawnFlower => self.spawn_flower(),
        }
    }

    fn stagger(&mut self, count: usize, gap_ms: f64, action: Action) {
        for i in 0..count {
            self.schedule.push(self.now + i as f64 * gap_ms, action);
        }
    }

    fn launch_random(&mut self, is_super: bool) {
        let (origin, target) =
            spawn::random_launch(self.width, self.height, is_super, &mut self.rng);
        self.launch_from(origin, target, is_super);
    }

    fn spawn_flower(&mut self) {
        let flower = Flower::random(self.width, self.height, self.now, &mut self.rng);
        self.flowers.push(flower);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowerTrigger, LaunchTrigger};
    use super::particle::ParticleKind;

    fn quiet_config(text: &str) -> ShowConfig {
        ShowConfig {
            text: text.to_string(),
            seed: Some(99),
            initial_flowers: 0,
            launch: LaunchTrigger {
                probability: 0.0,
                ..LaunchTrigger::default()
            },
            flowers: FlowerTrigger {
                probability: 0.0,
                ..FlowerTrigger::default()
            },
            ..ShowConfig::default()
        }
    }

    fn burst_count(sim: &Simulation) -> usize {
        sim.particles().iter().filter(|p| p.is_burst()).count()
    }

    fn run_until_quiet(sim: &mut Simulation) {
        let mut ticks = 0;
        while !sim.projectiles().is_empty() {
            sim.tick();
            ticks += 1;
            assert!(ticks < 1000, "projectile never detonated");
        }
    }

    #[test]
    fn single_shell_spells_text_plus_ring() {
        let text = "Happy 22";
        let mut sim = Simulation::new(&quiet_config(text), 800.0, 600.0);
        let projectile = Projectile::new((400.0, 600.0), (400.0, 100.0), false, &mut Rng::with_seed(5));
        assert_eq!(projectile.gravity, 0.15);
        sim.launch(projectile);

        assert_eq!(burst_count(&sim), 0);
        run_until_quiet(&mut sim);
        assert_eq!(burst_count(&sim), text.chars().count() + projectile::BURST_EXTRAS);
        assert_eq!(sim.stats().detonations, 1);

        let texts = sim
            .particles()
            .iter()
            .filter(|p| matches!(p.kind, ParticleKind::Text { .. }))
            .count();
        assert_eq!(texts, text.chars().count());
    }

    #[test]
    fn super_shell_adds_three_secondary_bursts() {
        let text = "WOW";
        let per_burst = (text.len() + projectile::BURST_EXTRAS) as u64;
        let mut sim = Simulation::new(&quiet_config(text), 800.0, 600.0);
        sim.launch_from((400.0, 600.0), (400.0, 150.0), true);
        run_until_quiet(&mut sim);
        assert_eq!(sim.stats().burst_particles, per_burst);

        // Secondary bursts land within 700 ms plus two 200 ms staggers.
        for _ in 0..(1200.0 / TICK_MS) as usize {
            sim.tick();
        }
        assert_eq!(sim.stats().burst_particles, per_burst * 4);
    }

    #[test]
    fn plain_shell_has_no_secondary_bursts() {
        let mut sim = Simulation::new(&quiet_config("ok"), 800.0, 600.0);
        sim.launch_from((400.0, 600.0), (400.0, 150.0), false);
        run_until_quiet(&mut sim);
        for _ in 0..120 {
            sim.tick();
        }
        assert_eq!(sim.stats().burst_particles, 2 + projectile::BURST_EXTRAS as u64);
    }

    #[test]
    fn particles_expire_and_registry_empties() {
        let mut sim = Simulation::new(&quiet_config("bye"), 800.0, 600.0);
        sim.launch_from((400.0, 600.0), (400.0, 300.0), false);
        run_until_quiet(&mut sim);
        assert!(!sim.particles().is_empty());
        for _ in 0..400 {
            sim.tick();
        }
        assert!(sim.particles().is_empty());
        assert_eq!(sim.stars().len(), 50);
    }

    #[test]
    fn auto_flowers_stop_at_ceiling() {
        let config = ShowConfig {
            flowers: FlowerTrigger {
                interval_ms: 20.0,
                probability: 1.0,
                ceiling: 25,
            },
            ..quiet_config("x")
        };
        let mut sim = Simulation::new(&config, 800.0, 600.0);
        for _ in 0..600 {
            sim.tick();
            assert!(sim.flowers().len() <= 25);
        }
        assert_eq!(sim.flowers().len(), 25);
    }

    #[test]
    fn add_flowers_command_is_staggered() {
        let mut sim = Simulation::new(&quiet_config("x"), 800.0, 600.0);
        sim.command(Command::AddFlowers);
        sim.tick();
        assert_eq!(sim.flowers().len(), 1);
        for _ in 0..(800.0 / TICK_MS) as usize + 1 {
            sim.tick();
        }
        assert_eq!(sim.flowers().len(), 5);
    }

    #[test]
    fn initial_flowers_arrive_every_400ms() {
        let config = ShowConfig {
            initial_flowers: 10,
            ..quiet_config("x")
        };
        let mut sim = Simulation::new(&config, 800.0, 600.0);
        sim.tick();
        assert_eq!(sim.flowers().len(), 1);
        for _ in 0..(3600.0 / TICK_MS) as usize + 1 {
            sim.tick();
        }
        assert_eq!(sim.flowers().len(), 10);
    }

    #[test]
    fn volleys_launch_expected_counts() {
        let mut sim = Simulation::new(&quiet_config("x"), 800.0, 600.0);
        sim.command(Command::LaunchVolley);
        sim.command(Command::LaunchSuperVolley);
        for _ in 0..(800.0 / TICK_MS) as usize + 1 {
            sim.tick();
        }
        assert_eq!(sim.stats().launched, 7);
    }

    #[test]
    fn double_click_launches_five_super_shells() {
        let mut sim = Simulation::new(&quiet_config("x"), 800.0, 600.0);
        sim.double_click(400.0, 200.0);
        sim.tick();
        assert_eq!(sim.stats().launched, 1);
        assert!(sim.projectiles()[0].is_super);
        for _ in 0..(600.0 / TICK_MS) as usize + 1 {
            sim.tick();
        }
        assert_eq!(sim.stats().launched, 5);
    }

    #[test]
    fn click_launches_plain_shell_from_bottom() {
        let mut sim = Simulation::new(&quiet_config("x"), 800.0, 600.0);
        sim.click(200.0, 100.0);
        let shell = &sim.projectiles()[0];
        assert!(!shell.is_super);
        assert_eq!(shell.y, 600.0);
        assert_eq!((shell.target_x, shell.target_y), (200.0, 100.0));
    }

    #[test]
    fn reset_cancels_pending_launches() {
        let mut sim = Simulation::new(&quiet_config("x"), 800.0, 600.0);
        sim.command(Command::LaunchSuperVolley);
        sim.tick();
        assert_eq!(sim.projectiles().len(), 1);
        sim.command(Command::Reset);
        assert!(sim.projectiles().is_empty());
        for _ in 0..120 {
            sim.tick();
        }
        assert_eq!(sim.stats().launched, 1);
    }

    #[test]
    fn resize_rebuilds_scene() {
        let config = ShowConfig {
            initial_flowers: 3,
            ..quiet_config("x")
        };
        let mut sim = Simulation::new(&config, 800.0, 600.0);
        for _ in 0..120 {
            sim.tick();
        }
        assert_eq!(sim.flowers().len(), 3);
        sim.resize(400.0, 300.0);
        assert!(sim.flowers().is_empty());
        assert_eq!((sim.width(), sim.height()), (400.0, 300.0));
        assert!(sim.stars().iter().all(|s| s.x <= 400.0 && s.y <= 210.0));
    }

    #[test]
    fn auto_launch_fires_on_interval() {
        let config = ShowConfig {
            launch: LaunchTrigger {
                interval_ms: 2000.0,
                probability: 1.0,
                super_probability: 0.0,
            },
            ..quiet_config("x")
        };
        let mut sim = Simulation::new(&config, 800.0, 600.0);
        for _ in 0..(1990.0 / TICK_MS) as usize {
            sim.tick();
        }
        assert_eq!(sim.stats().launched, 0);
        for _ in 0..(4100.0 / TICK_MS) as usize {
            sim.tick();
        }
        assert_eq!(sim.stats().launched, 3);
    }

    #[test]
    fn same_seed_same_show() {
        let config = ShowConfig {
            launch: LaunchTrigger {
                probability: 1.0,
                ..LaunchTrigger::default()
            },
            ..quiet_config("seeded")
        };
        let mut a = Simulation::new(&config, 800.0, 600.0);
        let mut b = Simulation::new(&config, 800.0, 600.0);
        for _ in 0..600 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.stats(), b.stats());
    }
}

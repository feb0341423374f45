use fastrand::Rng;

pub type Point = (f32, f32);

/// Spread of click launches around the click column.
const CLICK_SPREAD: f32 = 100.0;

/// A trigger that is armed every `interval_ms` and then fires with some probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub interval_ms: f64,
    pub probability: f32,
}

impl Trigger {
    pub fn roll(&self, rng: &mut Rng) -> bool {
        rng.f32() < self.probability
    }
}

/// Random launch from the bottom edge into the upper part of the sky.
pub fn random_launch(width: f32, height: f32, is_super: bool, rng: &mut Rng) -> (Point, Point) {
    let x = rng.f32() * width;
    let spread = if is_super { 300.0 } else { 150.0 };
    let reach = if is_super { 0.3 } else { 0.4 };
    let target = (x + (rng.f32() - 0.5) * spread, rng.f32() * height * reach);
    ((x, height), target)
}

/// Launch aimed at a clicked point, starting roughly below it.
pub fn click_launch(x: f32, y: f32, height: f32, rng: &mut Rng) -> (Point, Point) {
    let start_x = x + (rng.f32() - 0.5) * CLICK_SPREAD;
    ((start_x, height), (x, y))
}

/// One shell of a double-click barrage, scattered around the clicked point.
pub fn barrage_launch(x: f32, y: f32, height: f32, rng: &mut Rng) -> (Point, Point) {
    let origin = (x + (rng.f32() - 0.5) * CLICK_SPREAD, height);
    let target = (x + (rng.f32() - 0.5) * 200.0, y + (rng.f32() - 0.5) * 100.0);
    (origin, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_probability_extremes() {
        let mut rng = Rng::with_seed(1);
        let never = Trigger {
            interval_ms: 1.0,
            probability: 0.0,
        };
        let always = Trigger {
            interval_ms: 1.0,
            probability: 1.0,
        };
        for _ in 0..1000 {
            assert!(!never.roll(&mut rng));
            assert!(always.roll(&mut rng));
        }
    }

    #[test]
    fn trigger_rate_is_roughly_probability() {
        let mut rng = Rng::with_seed(2);
        let trigger = Trigger {
            interval_ms: 2000.0,
            probability: 0.4,
        };
        let hits = (0..10_000).filter(|_| trigger.roll(&mut rng)).count();
        assert!((3600..4400).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn random_launch_targets_upper_sky() {
        let mut rng = Rng::with_seed(3);
        for _ in 0..500 {
            let ((x, y), (tx, ty)) = random_launch(800.0, 600.0, false, &mut rng);
            assert_eq!(y, 600.0);
            assert!((0.0..=800.0).contains(&x));
            assert!((tx - x).abs() <= 75.0);
            assert!((0.0..=240.0).contains(&ty));

            let ((x, _), (tx, ty)) = random_launch(800.0, 600.0, true, &mut rng);
            assert!((tx - x).abs() <= 150.0);
            assert!((0.0..=180.0).contains(&ty));
        }
    }

    #[test]
    fn click_launch_starts_below_click() {
        let mut rng = Rng::with_seed(4);
        let ((sx, sy), target) = click_launch(300.0, 120.0, 500.0, &mut rng);
        assert_eq!(sy, 500.0);
        assert!((sx - 300.0).abs() <= 50.0);
        assert_eq!(target, (300.0, 120.0));
    }

    #[test]
    fn barrage_scatters_around_click() {
        let mut rng = Rng::with_seed(5);
        for _ in 0..100 {
            let ((sx, _), (tx, ty)) = barrage_launch(300.0, 120.0, 500.0, &mut rng);
            assert!((sx - 300.0).abs() <= 50.0);
            assert!((tx - 300.0).abs() <= 100.0);
            assert!((ty - 120.0).abs() <= 50.0);
        }
    }
}

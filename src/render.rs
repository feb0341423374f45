//! Half-block terminal renderer. Each cell shows two stacked pixels: the top one as
//! background colour and the bottom one as the foreground of `▄`.

use crate::sim::Simulation;
use crate::sim::flower::{Flower, Rgb, darken};
use crate::sim::particle::{Particle, ParticleKind};
use crate::sim::projectile::Projectile;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

/// World units covered by one terminal pixel (half a cell vertically).
pub const WORLD_UNITS_PER_PIXEL: f32 = 4.0;
/// Share of the night sky painted over the previous frame, leaving fading streaks.
const FADE: f32 = 0.1;

const STEM: Rgb = (46, 125, 50);
const LEAF: Rgb = (76, 175, 80);
const POLLEN: Rgb = (255, 152, 0);

type Px = (f32, f32, f32);

#[derive(Clone, Copy)]
struct Glyph {
    ch: char,
    color: Rgb,
    outline: Rgb,
    alpha: f32,
    bold: bool,
    /// Takes this cell and the one to its right.
    wide: bool,
}

pub struct Canvas {
    /// Pixel columns; equals terminal columns.
    width: usize,
    /// Pixel rows; twice the terminal rows.
    height: usize,
    sky: Vec<Px>,
    frame: Vec<Px>,
    glyphs: Vec<Option<Glyph>>,
    output_buf: Vec<u8>,
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        let width = cols.max(1);
        let height = rows.max(1) * 2;
        let bg = to_px(crate::get_bg_color());
        Self {
            width,
            height,
            sky: vec![bg; width * height],
            frame: vec![bg; width * height],
            glyphs: vec![None; width * rows.max(1)],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    /// World size this canvas shows, for sizing the simulation.
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.width as f32 * WORLD_UNITS_PER_PIXEL,
            self.height as f32 * WORLD_UNITS_PER_PIXEL,
        )
    }

    /// World position of the centre of a terminal cell.
    pub fn cell_to_world(column: u16, row: u16) -> (f32, f32) {
        (
            (column as f32 + 0.5) * WORLD_UNITS_PER_PIXEL,
            (row as f32 * 2.0 + 1.0) * WORLD_UNITS_PER_PIXEL,
        )
    }

    pub fn render<W: Write>(&mut self, sim: &Simulation, fps: u32, out: &mut W) -> io::Result<()> {
        let bg = to_px(crate::get_bg_color());
        for px in &mut self.sky {
            *px = mix(*px, bg, FADE);
        }
        self.glyphs.fill(None);

        for star in sim.stars() {
            let (x, y) = to_pixel(star.x, star.y);
            blend(&mut self.sky, self.width, self.height, x, y, (255, 255, 255), star.brightness());
        }
        for projectile in sim.projectiles() {
            self.draw_projectile(projectile);
        }
        for particle in sim.particles() {
            self.draw_particle(particle);
        }

        // Flowers sit in front of the sky without smearing into it.
        self.frame.copy_from_slice(&self.sky);
        for flower in sim.flowers() {
            self.draw_flower(flower, sim.now(), sim.height());
        }

        self.compose(fps)?;
        out.write_all(&self.output_buf)?;
        out.flush()
    }

    fn draw_projectile(&mut self, projectile: &Projectile) {
        let color = hsl(projectile.hue, 100.0, projectile.brightness);
        for point in &projectile.trail {
            let (x, y) = to_pixel(point.x, point.y);
            blend(&mut self.sky, self.width, self.height, x, y, color, point.alpha * 0.5);
        }

        let (x, y) = to_pixel(projectile.x, projectile.y);
        let reach = ((projectile.size / 2.0) as i32).max(1);
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                blend(&mut self.sky, self.width, self.height, x + dx, y + dy, color, 0.2);
            }
        }
        blend(&mut self.sky, self.width, self.height, x, y, color, 1.0);
    }

    fn draw_particle(&mut self, particle: &Particle) {
        let alpha = particle.alpha.clamp(0.0, 1.0);
        let color = hsl(particle.hue, 100.0, particle.brightness);
        let (x, y) = to_pixel(particle.x, particle.y);

        match particle.kind {
            ParticleKind::Sparkle { size } => {
                blend(&mut self.sky, self.width, self.height, x, y, color, alpha);
                let arm = ((size * 2.0 / WORLD_UNITS_PER_PIXEL).ceil() as i32).max(1);
                for d in 1..=arm {
                    for (cx, cy) in [(x - d, y), (x + d, y), (x, y - d), (x, y + d)] {
                        blend(&mut self.sky, self.width, self.height, cx, cy, color, alpha * 0.6);
                    }
                }
            }
            ParticleKind::Glow { size, .. } => {
                let halo = if size > 2.5 { 2 } else { 1 };
                for dy in -halo..=halo {
                    for dx in -halo..=halo {
                        blend(&mut self.sky, self.width, self.height, x + dx, y + dy, color, alpha * 0.3);
                    }
                }
                blend(&mut self.sky, self.width, self.height, x, y, color, alpha);
            }
            ParticleKind::Text {
                glyph,
                size,
                rotation,
                ..
            } => {
                // Turning the glyph sweeps it across a +30° hue gradient.
                let sweep = 0.5 + 0.5 * rotation.sin();
                let fill = hsl(
                    particle.hue + 30.0 * sweep,
                    100.0,
                    particle.brightness + 10.0 * sweep,
                );
                let outline = hsl(particle.hue + 60.0, 100.0, particle.brightness - 20.0);
                blend(&mut self.sky, self.width, self.height, x, y, outline, alpha * 0.5);

                if glyph.is_whitespace() || x < 0 || y < 0 {
                    return;
                }
                let (col, row) = (x as usize, y as usize / 2);
                if col >= self.width || row >= self.height / 2 {
                    return;
                }
                let idx = row * self.width + col;
                let covered = col > 0 && self.glyphs[idx - 1].is_some_and(|g| g.wide);
                let fits = match glyph.width() {
                    Some(1) => true,
                    Some(2) => col + 1 < self.width && self.glyphs[idx + 1].is_none(),
                    _ => false,
                };
                if covered || !fits {
                    blend(&mut self.sky, self.width, self.height, x, y, fill, alpha);
                    return;
                }
                self.glyphs[idx] = Some(Glyph {
                    ch: glyph,
                    color: fill,
                    outline,
                    alpha,
                    bold: size > 35.0,
                    wide: glyph.width() == Some(2),
                });
            }
        }
    }

    fn draw_flower(&mut self, flower: &Flower, now: f64, sky_height: f32) {
        let (w, h) = (self.width, self.height);
        let frame = &mut self.frame;
        let base_y = (sky_height - flower.lift) / WORLD_UNITS_PER_PIXEL;
        let base_x = flower.x / WORLD_UNITS_PER_PIXEL;
        let stem_px = (flower.stem_height / WORLD_UNITS_PER_PIXEL).max(1.0);
        let sway_px = flower.sway / WORLD_UNITS_PER_PIXEL;

        // Stem bends more toward the head.
        let stem_x = |t: f32| base_x + sway_px * t * t;
        for step in 0..=stem_px as i32 {
            let t = step as f32 / stem_px;
            let y = base_y - step as f32;
            blend(frame, w, h, stem_x(t) as i32, y as i32, STEM, 1.0);
        }

        for leaf in &flower.leaves {
            let y = base_y - leaf.at * stem_px;
            let x = stem_x(leaf.at);
            let length = (leaf.length / WORLD_UNITS_PER_PIXEL).max(1.0) as i32;
            for d in 1..=length {
                let droop = (d as f32 / length as f32 * 0.8) as i32;
                blend(frame, w, h, (x + leaf.side * d as f32) as i32, y as i32 - droop, LEAF, 0.9);
            }
        }

        let head_x = stem_x(1.0);
        let head_y = base_y - stem_px;
        let open = flower.bloom_progress(now);
        let radius_px = flower.size / 2.0 / WORLD_UNITS_PER_PIXEL;

        if open < 0.05 {
            let bud = darken(flower.outer, 20.0);
            let bud_r = (radius_px * 0.4).max(1.0);
            fill_disc(frame, w, h, head_x, head_y, bud_r, bud, 1.0);
            return;
        }

        let edge = darken(flower.outer, 30.0);
        for (i, petal) in flower.petals.iter().enumerate() {
            let angle = petal.angle + flower.petal_wave(i).to_radians();
            let length = petal.length / WORLD_UNITS_PER_PIXEL * open;
            let thickness = (petal.width / WORLD_UNITS_PER_PIXEL * 0.5).max(0.5);
            let steps = (length.abs().ceil() as i32).max(1);
            let (dir_x, dir_y) = (angle.cos(), angle.sin());
            let (side_x, side_y) = (-dir_y, dir_x);
            for s in 0..=steps {
                let t = s as f32 / steps as f32;
                let color = if t < 0.5 {
                    lerp_rgb(flower.inner, flower.outer, t * 2.0)
                } else {
                    lerp_rgb(flower.outer, edge, (t - 0.5) * 2.0)
                };
                let along = length * t;
                // Petals are widest halfway out.
                let half = thickness * (t * std::f32::consts::PI).sin();
                let spread = half.ceil() as i32;
                for k in -spread..=spread {
                    let px = head_x + dir_x * along + side_x * k as f32 * 0.5;
                    let py = head_y + dir_y * along + side_y * k as f32 * 0.5;
                    blend(frame, w, h, px as i32, py as i32, color, 0.95);
                }
            }
        }

        let center_r = (radius_px * 0.25 * flower.pulse(now) * open.min(1.0)).max(0.5);
        fill_disc(frame, w, h, head_x, head_y, center_r, POLLEN, 1.0);
    }

    fn compose(&mut self, fps: u32) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        let mut prev_top_color: Rgb = (255, 255, 255);
        let mut prev_bot_color: Rgb = (255, 255, 255);

        for y in (0..self.height).step_by(2) {
            let mut covered = false;
            for x in 0..self.width {
                if std::mem::take(&mut covered) {
                    continue;
                }
                let top_idx = y * self.width + x;
                let bot_idx = if y + 1 < self.height {
                    (y + 1) * self.width + x
                } else {
                    top_idx
                };

                let top_color = to_rgb(self.frame[top_idx]);
                let bot_color = to_rgb(self.frame[bot_idx]);

                if let Some(glyph) = self.glyphs[(y / 2) * self.width + x] {
                    let back = to_rgb(mix(
                        mix(self.frame[top_idx], self.frame[bot_idx], 0.5),
                        to_px(glyph.outline),
                        glyph.alpha * 0.3,
                    ));
                    let fore = to_rgb(mix(to_px(back), to_px(glyph.color), glyph.alpha));
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m",
                        back.0, back.1, back.2, fore.0, fore.1, fore.2
                    )?;
                    if glyph.bold {
                        write!(self.output_buf, "\x1b[1m{}\x1b[22m", glyph.ch)?;
                    } else {
                        write!(self.output_buf, "{}", glyph.ch)?;
                    }
                    prev_top_color = back;
                    prev_bot_color = fore;
                    covered = glyph.wide;
                    continue;
                }

                if top_color != prev_top_color {
                    write!(
                        self.output_buf,
                        "\x1b[48;2;{};{};{}m",
                        top_color.0, top_color.1, top_color.2
                    )?;
                    prev_top_color = top_color;
                }
                if bot_color != prev_bot_color {
                    write!(
                        self.output_buf,
                        "\x1b[38;2;{};{};{}m",
                        bot_color.0, bot_color.1, bot_color.2
                    )?;
                    prev_bot_color = bot_color;
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            prev_top_color = (255, 255, 255);
            prev_bot_color = (255, 255, 255);
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        // FPS readout in the top left
        self.output_buf.extend_from_slice(b"\x1b[1;2H");
        self.output_buf.extend_from_slice(b"\x1b[38;2;200;200;200m");
        write!(self.output_buf, "FPS: {fps}")?;
        self.output_buf.extend_from_slice(b"\x1b[0m");
        Ok(())
    }
}

fn to_pixel(x: f32, y: f32) -> (i32, i32) {
    (
        (x / WORLD_UNITS_PER_PIXEL).floor() as i32,
        (y / WORLD_UNITS_PER_PIXEL).floor() as i32,
    )
}

fn blend(buf: &mut [Px], width: usize, height: usize, x: i32, y: i32, color: Rgb, alpha: f32) {
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height || alpha <= 0.0 {
        return;
    }
    let idx = y as usize * width + x as usize;
    buf[idx] = mix(buf[idx], to_px(color), alpha.min(1.0));
}

#[allow(clippy::too_many_arguments)]
fn fill_disc(buf: &mut [Px], width: usize, height: usize, cx: f32, cy: f32, r: f32, color: Rgb, alpha: f32) {
    let reach = r.ceil() as i32;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx * dx + dy * dy) as f32 <= r * r + 0.5 {
                blend(buf, width, height, cx as i32 + dx, cy as i32 + dy, color, alpha);
            }
        }
    }
}

fn mix(a: Px, b: Px, t: f32) -> Px {
    (
        a.0 + (b.0 - a.0) * t,
        a.1 + (b.1 - a.1) * t,
        a.2 + (b.2 - a.2) * t,
    )
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    to_rgb(mix(to_px(a), to_px(b), t))
}

fn to_px(c: Rgb) -> Px {
    (c.0 as f32, c.1 as f32, c.2 as f32)
}

fn to_rgb(p: Px) -> Rgb {
    (
        p.0.round().clamp(0.0, 255.0) as u8,
        p.1.round().clamp(0.0, 255.0) as u8,
        p.2.round().clamp(0.0, 255.0) as u8,
    )
}

/// HSL with hue in degrees and saturation/lightness in percent.
pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    to_rgb(((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0))
}

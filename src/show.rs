use crate::config::ShowConfig;
use crate::render::Canvas;
use crate::sim::clock::FpsCounter;
use crate::sim::{Command, Simulation};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use std::io::{self, Write};

/// Second click within this window on (nearly) the same cell counts as a double click.
const DOUBLE_CLICK_MS: f64 = 350.0;
const DOUBLE_CLICK_CELLS: u16 = 2;

/// The running show: simulation, canvas and input state for one terminal size.
pub struct Show {
    sim: Simulation,
    canvas: Canvas,
    fps: FpsCounter,
    last_click: Option<(f64, u16, u16)>,
}

impl Show {
    pub fn new(config: &ShowConfig, cols: usize, rows: usize) -> Self {
        let canvas = Canvas::new(cols, rows);
        let (width, height) = canvas.world_size();
        let sim = Simulation::new(config, width, height);
        Self {
            sim,
            canvas,
            fps: FpsCounter::new(0.0),
            last_click: None,
        }
    }

    /// Rebuilds the canvas for a new terminal size and resets the scene.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.canvas = Canvas::new(cols, rows);
        let (width, height) = self.canvas.world_size();
        self.sim.resize(width, height);
    }

    pub fn update(&mut self) {
        self.sim.tick();
    }

    /// Draws one frame; `now_ms` is wall-clock time used for the FPS readout.
    pub fn render<W: Write>(&mut self, now_ms: f64, out: &mut W) -> io::Result<()> {
        if let Some(fps) = self.fps.frame(now_ms) {
            tracing::trace!(fps, "frame rate");
        }
        self.canvas.render(&self.sim, self.fps.fps(), out)
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => self.click(*column, *row),
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                let command = match key_event.code {
                    KeyCode::Char('a') => Command::AddFlowers,
                    KeyCode::Char('f') => Command::LaunchVolley,
                    KeyCode::Char('s') => Command::LaunchSuperVolley,
                    KeyCode::Char('r') => Command::Reset,
                    _ => return,
                };
                self.sim.command(command);
            }
            _ => {}
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        let (x, y) = Canvas::cell_to_world(column, row);
        let now = self.sim.now();
        self.sim.click(x, y);

        let is_double = self.last_click.is_some_and(|(at, c, r)| {
            now - at <= DOUBLE_CLICK_MS
                && c.abs_diff(column) <= DOUBLE_CLICK_CELLS
                && r.abs_diff(row) <= DOUBLE_CLICK_CELLS
        });
        if is_double {
            self.sim.double_click(x, y);
            self.last_click = None;
        } else {
            self.last_click = Some((now, column, row));
        }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }
}

use crossterm::{
    cursor::{Hide, Show as ShowCursor},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod render;
mod show;
mod sim;

use config::ShowConfig;
use error::{Result, ShowError};
use show::Show;

/// Deep night blue behind everything unless `--bg-color` says otherwise.
const NIGHT_SKY: (u8, u8, u8) = (10, 14, 42);

static BG_COLOR: OnceLock<(u8, u8, u8)> = OnceLock::new();

pub fn get_bg_color() -> (u8, u8, u8) {
    *BG_COLOR.get().unwrap_or(&NIGHT_SKY)
}

fn print_usage() {
    eprintln!("skyshow - fireworks that spell out your text, with stars and flowers");
    eprintln!();
    eprintln!("Usage: skyshow [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --text TEXT        Text spelled out by each burst (default: {})", config::DEFAULT_TEXT);
    eprintln!("  --seed N           Seed the random generator for a repeatable show");
    eprintln!("  --config FILE      Load settings from a TOML file");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --legacy-angles    Scatter burst glyphs in the classic uneven pattern");
    eprintln!("  --log FILE         Write logs to FILE (filter with RUST_LOG)");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  click         Launch a firework toward the cursor");
    eprintln!("  double-click  Launch a barrage of super fireworks");
    eprintln!("  f             Launch four fireworks");
    eprintln!("  s             Launch three super fireworks");
    eprintln!("  a             Plant five flowers");
    eprintln!("  r             Reset the scene");
    eprintln!();
    eprintln!("Press 'q', ESC, or Ctrl+C to exit");
}

#[derive(Debug, Default)]
struct Args {
    help: bool,
    config: Option<PathBuf>,
    text: Option<String>,
    seed: Option<u64>,
    bg_color: Option<(u8, u8, u8)>,
    legacy_angles: bool,
    log: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = |name: &str| flag_value(args, i, name);
        match args[i].as_str() {
            "help" | "--help" | "-h" => {
                parsed.help = true;
                i += 1;
            }
            "--legacy-angles" => {
                parsed.legacy_angles = true;
                i += 1;
            }
            "--text" => {
                parsed.text = Some(value("--text")?);
                i += 2;
            }
            "--seed" => {
                let raw = value("--seed")?;
                let seed = raw
                    .parse()
                    .map_err(|_| ShowError::Usage(format!("invalid seed: {raw}")))?;
                parsed.seed = Some(seed);
                i += 2;
            }
            "--config" => {
                parsed.config = Some(PathBuf::from(value("--config")?));
                i += 2;
            }
            "--bg-color" => {
                let raw = value("--bg-color")?;
                let color = parse_hex_color(&raw).ok_or(ShowError::InvalidColor(raw))?;
                parsed.bg_color = Some(color);
                i += 2;
            }
            "--log" => {
                parsed.log = Some(PathBuf::from(value("--log")?));
                i += 2;
            }
            arg => return Err(ShowError::Usage(format!("Unknown option: {arg}"))),
        }
    }

    Ok(parsed)
}

fn flag_value(args: &[String], i: usize, name: &str) -> Result<String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| ShowError::Usage(format!("{name} requires a value")))
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| ShowError::Logging(e.to_string()))
}

fn build_config(args: &Args) -> Result<ShowConfig> {
    let mut config = match &args.config {
        Some(path) => ShowConfig::load(path)?,
        None => ShowConfig::default(),
    };
    if let Some(text) = &args.text {
        config.text = text.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.legacy_angles {
        config.legacy_burst_angles = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_show(config: &ShowConfig) -> Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let result = event_loop(config, &mut stdout);

    // Restore the terminal even when the loop failed.
    let restored = execute!(stdout, ShowCursor, LeaveAlternateScreen, DisableMouseCapture);
    terminal::disable_raw_mode()?;
    result?;
    restored?;
    Ok(())
}

fn event_loop(config: &ShowConfig, stdout: &mut BufWriter<Stdout>) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut show = Show::new(config, cols as usize, rows as usize);

    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    const FIXED_DT: f32 = 1.0 / 60.0;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    show.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    show.resize(*cols as usize, *rows as usize);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    show.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            show.update();
            accumulator -= FIXED_DT;
        }

        let wall_ms = started.elapsed().as_secs_f64() * 1000.0;
        show.render(wall_ms, stdout)?;
    }

    tracing::info!(stats = ?show.sim().stats(), "show finished");
    Ok(())
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args)?;

    if args.help {
        print_usage();
        return Ok(());
    }
    if let Some(path) = &args.log {
        init_logging(path)?;
    }
    if let Some(color) = args.bg_color {
        let _ = BG_COLOR.set(color);
    }

    let config = build_config(&args)?;
    run_show(&config)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(ShowError::Usage(message)) => {
            eprintln!("{message}");
            eprintln!();
            print_usage();
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

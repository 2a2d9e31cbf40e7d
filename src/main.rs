mod app;
mod braille;
mod canvas;
mod collision;
mod config;
mod error;
mod export;
mod font;
mod geometry;
mod globe;
mod host;
mod logging;
mod motion;
mod particles;
mod rng;
mod scheduler;
mod settings;
mod ui;

use app::{App, TerminalHost};
use canvas::Bitmap;
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use error::ConfigError;
use export::GifRecorder;
use geometry::Geometry;
use globe::SnowGlobe;
use host::{SystemClock, TiltEmulator};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use rng::DrawSource;
use settings::{ClockFormat, Speed};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Upper bound on how long the loop blocks, so the clock and the border flash stay current
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "snow-globe")]
#[command(about = "Tilt-driven falling snow with a clock overlay, in the terminal")]
struct Args {
    // === Simulation ===
    /// Number of snow particles (1-10000)
    #[arg(short = 'p', long)]
    particles: Option<usize>,

    /// Delay between frames in milliseconds (10-1000)
    #[arg(long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Seconds between clock redraws and settle passes (1-3600)
    #[arg(long = "settle-secs")]
    settle_secs: Option<u64>,

    /// Walk attempts per unit of tilt, as NUM/DEN (each 1-20)
    #[arg(long, value_parser = parse_speed)]
    speed: Option<Speed>,

    /// Fixed random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    // === Clock label ===
    /// Use a 12-hour clock
    #[arg(long = "twelve-hour")]
    twelve_hour: bool,

    /// Fixed glyph scale for the clock (1-16, default fits the label band)
    #[arg(long = "label-scale")]
    label_scale: Option<u32>,

    // === Config ===
    /// Config file to load instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the merged configuration to PATH and exit
    #[arg(long = "save-config")]
    save_config: Option<PathBuf>,

    // === Headless recording ===
    /// Record frames to a GIF instead of opening the terminal UI
    #[arg(long)]
    record: Option<PathBuf>,

    /// Number of frames to record
    #[arg(long, default_value = "200")]
    frames: usize,

    /// Canvas width in pixels for recording
    #[arg(long, default_value = "144")]
    width: u32,

    /// Canvas height in pixels for recording
    #[arg(long, default_value = "168")]
    height: u32,

    /// Fixed tilt in milli-g for recording, as X,Y
    #[arg(long, value_parser = parse_tilt, allow_hyphen_values = true)]
    tilt: Option<(i32, i32)>,

    // === Logging ===
    /// Directory for log files
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,
}

fn parse_speed(s: &str) -> Result<Speed, String> {
    Speed::parse(s).ok_or_else(|| format!("invalid speed '{}', expected NUM/DEN", s))
}

fn parse_tilt(s: &str) -> Result<(i32, i32), String> {
    let invalid = || format!("invalid tilt '{}', expected X,Y", s);
    let (x, y) = s.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

/// Defaults, then the config file, then command line overrides
fn load_config(args: &Args) -> Result<AppConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => match AppConfig::default_path() {
            Some(path) => AppConfig::load_or_default(&path).unwrap_or_else(|err| {
                warn!("ignoring config at {}: {}", path.display(), err);
                AppConfig::default()
            }),
            None => AppConfig::default(),
        },
    };
    apply_args(&mut config, args);
    Ok(config.sanitized())
}

fn apply_args(config: &mut AppConfig, args: &Args) {
    let settings = &mut config.settings;
    if let Some(particles) = args.particles {
        settings.num_particles = particles;
    }
    if let Some(interval) = args.interval_ms {
        settings.update_ms = interval;
    }
    if let Some(secs) = args.settle_secs {
        settings.settle_interval_secs = secs;
    }
    if let Some(speed) = args.speed {
        settings.speed = speed;
    }
    if args.twelve_hour {
        settings.clock_format = ClockFormat::TwelveHour;
    }
    if args.label_scale.is_some() {
        settings.label_scale = args.label_scale;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_dir = args.log_dir.clone().unwrap_or_else(logging::default_dir);
    let _logger = logging::setup(&log_dir)?;
    info!("snow-globe {} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;

    if let Some(path) = &args.save_config {
        config.save_to_file(path)?;
        info!("config saved to {}", path.display());
        println!("Saved config to {}", path.display());
        return Ok(());
    }

    if let Some(path) = &args.record {
        let (x, y) = args.tilt.unwrap_or((0, 0));
        let written = record_gif(&config, Geometry::from_bounds(args.width, args.height)?, (x, y), args.frames, path)?;
        println!("Recorded {} frames to {}", written, path.display());
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Get initial terminal size and create app
    let size = terminal.size()?;
    let (canvas_width, canvas_height) =
        ui::get_canvas_size(Rect::new(0, 0, size.width, size.height), false);

    let res: Result<(), Box<dyn Error>> = match App::new(config, canvas_width, canvas_height) {
        Ok(mut app) => {
            let res = run_app(&mut terminal, &mut app);
            // Cancel the pending redraw before the bitmap goes away
            app.globe.shutdown();
            res
        }
        Err(err) => Err(err.into()),
    };

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("terminal loop failed: {}", err);
        eprintln!("Error: {}", err);
    }
    info!("snow-globe exiting");

    Ok(())
}

/// Render `frames` frames under a fixed tilt into a GIF, without a terminal
fn record_gif(
    config: &AppConfig,
    geometry: Geometry,
    (x, y): (i32, i32),
    frames: usize,
    path: &Path,
) -> Result<usize, Box<dyn Error>> {
    let delay = Duration::from_millis(config.settings.update_ms);
    let mut bitmap = Bitmap::new(geometry);
    let mut globe = SnowGlobe::new(&config.settings, geometry, DrawSource::from_optional_seed(config.seed));
    let clock = SystemClock {
        format: config.settings.clock_format,
    };
    let mut host = TerminalHost::new(clock, TiltEmulator::new(x, y));
    let mut recorder = GifRecorder::create(path, &geometry, delay)?;

    info!("recording {} frames to {}", frames, path.display());
    let mut now = Instant::now();
    for _ in 0..frames {
        if globe.poll_timer(now) {
            globe.render_frame(&mut bitmap, &mut host, now);
            recorder.push(&bitmap)?;
        }
        now += delay;
    }
    globe.shutdown();
    let written = recorder.frames();
    recorder.finish()?.flush()?;
    Ok(written)
}

fn resize_to_terminal<B: ratatui::backend::Backend>(
    terminal: &Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    let (canvas_width, canvas_height) = ui::get_canvas_size(
        Rect::new(0, 0, size.width, size.height),
        app.fullscreen_mode,
    );
    app.resize(canvas_width, canvas_height)?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    loop {
        app.tick(Instant::now());

        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Sleep until the redraw trigger is due or input arrives
        if !event::poll(app.wait_timeout(Instant::now(), IDLE_POLL))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),

                    // Tilt
                    KeyCode::Left => app.tilt(-1, 0),
                    KeyCode::Right => app.tilt(1, 0),
                    KeyCode::Up => {
                        if app.show_help {
                            app.scroll_help_up();
                        } else {
                            app.tilt(0, 1);
                        }
                    }
                    KeyCode::Down => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        } else {
                            app.tilt(0, -1);
                        }
                    }
                    KeyCode::Char('0') => app.level_tilt(),

                    // Gestures and system controls
                    KeyCode::Char(' ') | KeyCode::Char('t') | KeyCode::Char('T') => app.shake(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_pause(),
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        // Failures land in the status line and the log
                        let _ = app.snapshot();
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_clock_format(),
                    KeyCode::Char('[') => app.adjust_particles(-500),
                    KeyCode::Char(']') => app.adjust_particles(500),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.increase_speed(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_speed(),
                    KeyCode::Char('v') | KeyCode::Char('V') => {
                        app.toggle_fullscreen();
                        resize_to_terminal(terminal, app)?;
                    }
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
            Event::Resize(width, height) => {
                let (canvas_width, canvas_height) =
                    ui::get_canvas_size(Rect::new(0, 0, width, height), app.fullscreen_mode);
                app.resize(canvas_width, canvas_height)?;
            }
            _ => {}
        }
    }
}

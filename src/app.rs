use crate::braille;
use crate::canvas::{Bitmap, Canvas};
use crate::config::AppConfig;
use crate::error::{ExportError, GeometryError};
use crate::export;
use crate::geometry::Geometry;
use crate::globe::{FrameReport, SnowGlobe};
use crate::host::{Acceleration, Host, SystemClock, TiltEmulator};
use crate::rng::DrawSource;
use log::{info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long the border stays lit after a shake
const FLASH_DURATION: Duration = Duration::from_millis(400);

/// Wall clock, emulated tilt and the border "backlight"
pub struct TerminalHost {
    pub clock: SystemClock,
    pub tilt: TiltEmulator,
    flash_until: Option<Instant>,
}

impl TerminalHost {
    pub fn new(clock: SystemClock, tilt: TiltEmulator) -> Self {
        Self {
            clock,
            tilt,
            flash_until: None,
        }
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        matches!(self.flash_until, Some(until) if now < until)
    }
}

impl Host for TerminalHost {
    fn now_secs(&self) -> u64 {
        self.clock.now_secs()
    }

    fn time_label(&self) -> String {
        self.clock.label()
    }

    fn peek_acceleration(&mut self) -> Option<Acceleration> {
        Some(self.tilt.sample())
    }

    fn interaction_feedback(&mut self) {
        self.flash_until = Some(Instant::now() + FLASH_DURATION);
    }
}

/// Main application state
pub struct App {
    pub config: AppConfig,
    pub bitmap: Bitmap,
    pub globe: SnowGlobe,
    pub host: TerminalHost,
    pub paused: bool,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub last_report: FrameReport,
    /// One-line message shown in the sidebar (snapshot path, errors)
    pub status: Option<String>,
    /// Where PNG snapshots are written
    pub snapshot_dir: PathBuf,
}

impl App {
    pub fn new(config: AppConfig, canvas_width: u16, canvas_height: u16) -> Result<Self, GeometryError> {
        let (width, height) = braille::calculate_bitmap_size(canvas_width, canvas_height);
        let geometry = Geometry::from_bounds(width, height)?;
        let clock = SystemClock {
            format: config.settings.clock_format,
        };
        Ok(Self {
            globe: Self::build_globe(&config, geometry),
            bitmap: Bitmap::new(geometry),
            host: TerminalHost::new(clock, TiltEmulator::default()),
            config,
            paused: false,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            last_report: FrameReport::default(),
            status: None,
            snapshot_dir: PathBuf::from("."),
        })
    }

    fn build_globe(config: &AppConfig, geometry: Geometry) -> SnowGlobe {
        SnowGlobe::new(&config.settings, geometry, DrawSource::from_optional_seed(config.seed))
    }

    /// Render a frame if the redraw trigger is due. Returns true if one was rendered.
    ///
    /// The trigger is polled while paused too, so a fired trigger drops back
    /// to idle instead of staying overdue.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.globe.poll_timer(now);
        if !due || self.paused {
            return false;
        }
        self.last_report = self.globe.render_frame(&mut self.bitmap, &mut self.host, now);
        true
    }

    /// Longest the event loop may block before `tick` has work
    pub fn wait_timeout(&self, now: Instant, idle: Duration) -> Duration {
        self.globe
            .time_until_redraw(now)
            .map_or(idle, |due| due.min(idle))
    }

    pub fn geometry(&self) -> Geometry {
        self.bitmap.geometry()
    }

    pub fn is_flashing(&self, now: Instant) -> bool {
        self.host.is_flashing(now)
    }

    /// Tap gesture
    pub fn shake(&mut self) {
        self.globe.request_shake();
    }

    pub fn tilt(&mut self, dx: i32, dy: i32) {
        let step = self.config.tilt_step;
        self.host.tilt.nudge(dx * step, dy * step);
    }

    pub fn level_tilt(&mut self) {
        self.host.tilt.level();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            self.globe.mark_dirty();
        }
    }

    /// Increase walk speed
    pub fn increase_speed(&mut self) {
        self.config.settings.adjust_speed(1);
        self.globe.set_speed(self.config.settings.speed);
    }

    /// Decrease walk speed
    pub fn decrease_speed(&mut self) {
        self.config.settings.adjust_speed(-1);
        self.globe.set_speed(self.config.settings.speed);
    }

    /// Switch between 24h and 12h labels; the label redraws on the next frame
    pub fn toggle_clock_format(&mut self) {
        self.config.settings.toggle_clock_format();
        self.host.clock.format = self.config.settings.clock_format;
        self.globe.refresh_label();
        self.globe.mark_dirty();
    }

    /// Change the flake count. The globe is rebuilt, so positions start over.
    pub fn adjust_particles(&mut self, delta: i64) {
        let before = self.config.settings.num_particles;
        self.config.settings.adjust_particles(delta);
        if self.config.settings.num_particles != before {
            self.rebuild(self.geometry());
        }
    }

    fn rebuild(&mut self, geometry: Geometry) {
        self.globe.shutdown();
        self.globe = Self::build_globe(&self.config, geometry);
        self.bitmap = Bitmap::new(geometry);
        self.last_report = FrameReport::default();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Write the current bitmap to a timestamped PNG
    pub fn snapshot(&mut self) -> Result<PathBuf, ExportError> {
        let path = export::snapshot_path(&self.snapshot_dir);
        match export::save_png(&self.bitmap, &path) {
            Ok(()) => {
                info!("snapshot saved to {}", path.display());
                self.status = Some(format!("saved {}", path.display()));
                Ok(path)
            }
            Err(err) => {
                warn!("snapshot failed: {}", err);
                self.status = Some(format!("snapshot failed: {}", err));
                Err(err)
            }
        }
    }

    /// Recreate bitmap and globe for a new canvas size.
    /// Particle positions do not survive; the new globe renders on the next tick.
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) -> Result<(), GeometryError> {
        let (width, height) = braille::calculate_bitmap_size(canvas_width, canvas_height);
        if (width, height) == (self.geometry().width, self.geometry().height) {
            return Ok(());
        }
        self.rebuild(Geometry::from_bounds(width, height)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::FrameStats;
    use tempfile::tempdir;

    fn app() -> App {
        let config = AppConfig {
            seed: Some(11),
            ..AppConfig::default()
        };
        // 72x42 cells -> 144x168 pixels
        App::new(config, 72, 42).unwrap()
    }

    #[test]
    fn test_new_app_sizes_bitmap_from_canvas() {
        let app = app();
        let geometry = app.geometry();
        assert_eq!((geometry.width, geometry.height, geometry.stride), (144, 168, 160));
        assert_eq!(app.globe.particles().len(), 3000);
    }

    #[test]
    fn test_tick_follows_redraw_timer() {
        let mut app = app();
        let start = Instant::now();
        assert!(app.tick(start));
        assert!(!app.tick(start));
        assert_eq!(app.wait_timeout(start, Duration::from_secs(1)), Duration::from_millis(50));
        assert!(app.tick(start + Duration::from_millis(50)));
        assert_eq!(app.globe.stats().frames, 2);
    }

    #[test]
    fn test_pause_skips_frames_and_resume_redraws() {
        let mut app = app();
        let start = Instant::now();
        app.tick(start);

        app.toggle_pause();
        assert!(!app.tick(start + Duration::from_millis(60)));
        assert_eq!(
            app.wait_timeout(start + Duration::from_millis(60), Duration::from_millis(250)),
            Duration::from_millis(250)
        );

        app.toggle_pause();
        assert!(app.tick(start + Duration::from_millis(70)));
        assert_eq!(app.globe.stats().frames, 2);
    }

    #[test]
    fn test_shake_flashes_border() {
        let mut app = app();
        let start = Instant::now();
        app.tick(start);
        assert!(!app.is_flashing(Instant::now()));

        app.shake();
        app.tick(start + Duration::from_millis(50));
        assert!(app.last_report.shaken.is_some());
        assert!(app.last_report.settle.is_some());
        assert!(app.is_flashing(Instant::now()));
        assert!(!app.is_flashing(Instant::now() + FLASH_DURATION * 2));
        assert_eq!(
            app.globe.stats(),
            FrameStats {
                frames: 2,
                settle_passes: 2,
                shakes: 1,
            }
        );
    }

    #[test]
    fn test_tilt_keys_step_and_clamp() {
        let mut app = app();
        app.tilt(1, 0);
        app.tilt(0, -1);
        assert_eq!(app.host.tilt.sample(), Acceleration { x: 100, y: -100, z: -1000 });
        for _ in 0..100 {
            app.tilt(1, 0);
        }
        assert_eq!(app.host.tilt.sample().x, TiltEmulator::LIMIT);
        app.level_tilt();
        assert_eq!(app.host.tilt.sample(), Acceleration { x: 0, y: 0, z: -1000 });
    }

    #[test]
    fn test_tilt_drives_the_walk() {
        let mut app = app();
        let start = Instant::now();
        app.tilt(10, 0);
        app.tick(start);
        // (1000 + 0 + 10) * 3 / 2
        assert_eq!(app.last_report.walk.attempts, 1515);
    }

    #[test]
    fn test_level_globe_stays_still() {
        let mut app = app();
        app.level_tilt();
        let start = Instant::now();
        for frame in 0..5 {
            app.tick(start + Duration::from_millis(50) * frame);
            assert_eq!(app.last_report.walk.moved, 0);
        }
        assert_eq!(app.globe.stats().frames, 5);
    }

    #[test]
    fn test_speed_keys_reach_the_globe() {
        let mut app = app();
        app.increase_speed();
        assert_eq!(app.globe.speed().numerator, 4);
        for _ in 0..30 {
            app.decrease_speed();
        }
        assert_eq!(app.globe.speed().numerator, 1);
        assert_eq!(app.config.settings.speed, app.globe.speed());
    }

    #[test]
    fn test_resize_rebuilds_globe() {
        let mut app = app();
        let start = Instant::now();
        app.tick(start);
        app.resize(40, 20).unwrap();
        assert_eq!((app.geometry().width, app.geometry().height), (80, 80));
        assert_eq!(app.globe.stats().frames, 0);
        assert!(app.tick(start));
        for &offset in app.globe.particles().as_slice() {
            assert!(app.geometry().contains(offset));
        }
    }

    #[test]
    fn test_particle_keys_rebuild_globe() {
        let mut app = app();
        app.adjust_particles(500);
        assert_eq!(app.globe.particles().len(), 3500);
        app.adjust_particles(-100_000);
        assert_eq!(app.globe.particles().len(), 1);
        assert_eq!(app.config.settings.num_particles, 1);
    }

    #[test]
    fn test_clock_format_toggle_redraws_label() {
        let mut app = app();
        let start = Instant::now();
        app.tick(start);
        app.toggle_clock_format();
        assert_eq!(app.host.clock.format, crate::settings::ClockFormat::TwelveHour);
        assert!(app.tick(start));
        assert!(app.last_report.settle.is_some());
    }

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempdir().unwrap();
        let mut app = app();
        app.snapshot_dir = dir.path().to_path_buf();
        app.tick(Instant::now());

        let path = app.snapshot().unwrap();
        assert!(path.exists());
        assert!(app.status.as_deref().unwrap_or("").starts_with("saved"));
    }

    #[test]
    fn test_help_scroll_is_bounded() {
        let mut app = app();
        app.toggle_help();
        app.scroll_help_up();
        assert_eq!(app.help_scroll, 0);
        for _ in 0..10 {
            app.scroll_help_down(3);
        }
        assert_eq!(app.help_scroll, 3);
        app.toggle_help();
        app.toggle_help();
        assert_eq!(app.help_scroll, 0);
    }
}

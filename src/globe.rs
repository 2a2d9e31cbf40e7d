use crate::canvas::{Canvas, PixelState};
use crate::geometry::Geometry;
use crate::host::Host;
use crate::motion::{self, SettleReport, WalkReport};
use crate::particles::{ParticleStore, MAX_PARTICLES};
use crate::rng::DrawSource;
use crate::scheduler::{RedrawTimer, TimerState};
use crate::settings::{SnowSettings, Speed};
use log::{debug, info, trace};
use std::time::{Duration, Instant};

/// Running totals since the globe was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub settle_passes: u64,
    pub shakes: u64,
}

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Particles relocated by a shake, if one was pending
    pub shaken: Option<usize>,
    /// Settle pass results, if the clock bucket advanced
    pub settle: Option<SettleReport>,
    pub walk: WalkReport,
}

/// Simulation context: owns the particles and all state carried between frames
pub struct SnowGlobe {
    particles: ParticleStore,
    draws: DrawSource,
    speed: Speed,
    settle_interval_secs: u64,
    label_scale: Option<u32>,
    /// Clock bucket of the last settle pass; `None` forces one
    last_bucket: Option<u64>,
    shake_pending: bool,
    timer: RedrawTimer,
    stats: FrameStats,
}

impl SnowGlobe {
    /// Scatter `settings.num_particles` flakes over `geometry`.
    ///
    /// Panics if the geometry is not self-consistent; a bad canvas would
    /// otherwise send pixel writes past the end of the bitmap.
    pub fn new(settings: &SnowSettings, geometry: Geometry, mut draws: DrawSource) -> Self {
        assert!(
            geometry.is_consistent(),
            "inconsistent canvas geometry {:?}",
            geometry
        );
        let count = settings.num_particles.min(MAX_PARTICLES);
        let particles = ParticleStore::seeded(count, &geometry, draws.rng());
        info!(
            "snow globe: {} particles on {}x{} (stride {})",
            count, geometry.width, geometry.height, geometry.stride
        );
        Self {
            particles,
            draws,
            speed: settings.speed,
            settle_interval_secs: settings.settle_interval_secs.max(1),
            label_scale: settings.label_scale,
            last_bucket: None,
            shake_pending: false,
            timer: RedrawTimer::new(Duration::from_millis(settings.update_ms)),
            stats: FrameStats::default(),
        }
    }

    /// Tap gesture: scatter the snow on the next frame. Draws nothing itself.
    pub fn request_shake(&mut self) {
        self.shake_pending = true;
    }

    pub fn is_shake_pending(&self) -> bool {
        self.shake_pending
    }

    /// Advance and render one frame
    pub fn render_frame<C, H>(&mut self, canvas: &mut C, host: &mut H, now: Instant) -> FrameReport
    where
        C: Canvas + ?Sized,
        H: Host + ?Sized,
    {
        let geometry = canvas.geometry();
        assert!(
            geometry.is_consistent(),
            "inconsistent canvas geometry {:?}",
            geometry
        );
        self.stats.frames += 1;
        let mut report = FrameReport::default();

        if std::mem::take(&mut self.shake_pending) {
            host.interaction_feedback();
            let moved = motion::shake_dispersal(canvas, &geometry, &mut self.particles, &mut self.draws);
            self.last_bucket = None;
            self.stats.shakes += 1;
            debug!("shake moved {} of {} particles", moved, self.particles.len());
            report.shaken = Some(moved);
        }

        let bucket = host.now_secs() / self.settle_interval_secs;
        if !matches!(self.last_bucket, Some(last) if bucket <= last) {
            self.last_bucket = Some(bucket);
            canvas.fill_rect(geometry.bounds(), PixelState::Unset);
            let label = host.time_label();
            canvas.draw_text(&label, geometry.label_rect(), self.label_scale);
            let settle = motion::settle_pass(canvas, &geometry, &mut self.particles, &mut self.draws);
            self.stats.settle_passes += 1;
            debug!(
                "settle pass for '{}': {} redrawn, {} relocated, {} dropped",
                label, settle.redrawn, settle.relocated, settle.dropped
            );
            report.settle = Some(settle);
        }

        let accel = host.peek_acceleration().unwrap_or_default();
        report.walk = motion::walk_step(
            canvas,
            &geometry,
            &mut self.particles,
            accel,
            self.speed,
            &mut self.draws,
        );
        trace!(
            "walk: tilt ({}, {}), {} attempts, {} moved",
            accel.x,
            accel.y,
            report.walk.attempts,
            report.walk.moved
        );

        self.timer.arm_if_idle(now);
        report
    }

    /// Redraw the label and settle on the next frame regardless of the clock bucket
    pub fn refresh_label(&mut self) {
        self.last_bucket = None;
    }

    /// Let the redraw trigger fire; true when the host should render a frame now
    pub fn poll_timer(&mut self, now: Instant) -> bool {
        self.timer.fire_due(now);
        self.timer.take_dirty()
    }

    /// How long the host may sleep before the next trigger
    pub fn time_until_redraw(&self, now: Instant) -> Option<Duration> {
        self.timer.time_until_due(now)
    }

    #[cfg(test)]
    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    /// Force a redraw on the next poll without waiting for the trigger
    pub fn mark_dirty(&mut self) {
        self.timer.mark_dirty();
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Cancel the pending redraw before the canvas goes away
    pub fn shutdown(&mut self) {
        if self.timer.state() != TimerState::Idle {
            debug!("cancelling pending redraw");
        }
        self.timer.cancel();
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.particles
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl Drop for SnowGlobe {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}

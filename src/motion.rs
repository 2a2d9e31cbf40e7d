use crate::canvas::{Canvas, PixelState};
use crate::collision::{can_move, shifted};
use crate::geometry::Geometry;
use crate::host::Acceleration;
use crate::particles::ParticleStore;
use crate::rng::DrawSource;
use crate::settings::Speed;

/// Attempts per particle when a shake scatters the snow
const SHAKE_ATTEMPTS: usize = 2;
/// Counter step between shake draws
const SHAKE_STEP: u32 = 31;
/// Neighbor candidates tried for a particle whose cell got covered
const SETTLE_ATTEMPTS: usize = 8;
/// Walk attempts made even when the device lies flat
const WALK_FLOOR: u64 = 10;

/// Outcome of one settle pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Drawn back at their stored offset
    pub redrawn: usize,
    /// Moved to a free neighbor and drawn there
    pub relocated: usize,
    /// Left undrawn until a later pass
    pub dropped: usize,
}

/// Outcome of one walk step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub attempts: u64,
    pub moved: u64,
}

/// Throw every particle to a random free spot, two tries each.
///
/// Nothing is drawn; the caller forces a settle pass afterwards which clears
/// the canvas and stamps the new arrangement. Returns how many particles moved.
pub fn shake_dispersal<C: Canvas + ?Sized>(
    canvas: &C,
    geometry: &Geometry,
    particles: &mut ParticleStore,
    draws: &mut DrawSource,
) -> usize {
    let max = geometry.max_offset as i64;
    let span = geometry.max_offset * 2;
    let mut jumps = draws.stream(SHAKE_STEP);
    let mut moved = 0;

    for index in 0..particles.len() {
        let current = particles.get(index);
        for _ in 0..SHAKE_ATTEMPTS {
            let jump = (jumps.next() % span) as i64 - max;
            if let Some(candidate) = shifted(current, jump) {
                if can_move(canvas, geometry, candidate) {
                    particles.set(index, candidate);
                    moved += 1;
                    break;
                }
            }
        }
        jumps.skip();
    }

    moved
}

/// Stamp every particle onto a freshly cleared canvas.
///
/// A particle whose cell is already lit (by the clock label or by another
/// particle) tries up to eight neighbors one settle hop away on a 3x3 pattern.
/// The pattern includes the center, which the collision rule always rejects
/// here since the center is the occupied cell.
pub fn settle_pass<C: Canvas + ?Sized>(
    canvas: &mut C,
    geometry: &Geometry,
    particles: &mut ParticleStore,
    draws: &mut DrawSource,
) -> SettleReport {
    let hop = geometry.settle_hop() as i64;
    let row_hop = hop * geometry.stride as i64;
    let mut picks = draws.stream(1);
    let mut report = SettleReport::default();

    for index in 0..particles.len() {
        let current = particles.get(index);
        if geometry.contains(current) && canvas.test_pixel(current) == PixelState::Unset {
            canvas.draw_pixel(current);
            report.redrawn += 1;
            continue;
        }

        let mut placed = false;
        for _ in 0..SETTLE_ATTEMPTS {
            let pick = picks.next();
            let dy = (pick % 9 / 3) as i64 - 1;
            let dx = (pick % 3) as i64 - 1;
            let Some(candidate) = shifted(current, dy * row_hop + dx * hop) else {
                continue;
            };
            if can_move(canvas, geometry, candidate) {
                particles.set(index, candidate);
                canvas.draw_pixel(candidate);
                placed = true;
                break;
            }
        }

        if placed {
            report.relocated += 1;
        } else {
            report.dropped += 1;
        }
    }

    report
}

/// True with probability about `threshold / modulus`; a zero modulus never fires
fn biased(draw: u32, modulus: u64, threshold: u64) -> bool {
    (draw as u64)
        .checked_rem(modulus)
        .is_some_and(|r| r < threshold)
}

/// Number of walk attempts a frame makes for the given tilt
pub fn walk_span(accel: Acceleration, speed: Speed) -> u64 {
    let magnitude = accel.x.unsigned_abs() as u64 + accel.y.unsigned_abs() as u64;
    speed.apply(magnitude + WALK_FLOOR)
}

/// Nudge randomly picked particles one pixel along the tilt.
///
/// The axis with the larger tilt always steps, the other steps with a
/// probability proportional to its share, so motion follows the tilt angle.
/// A third of the attempts rotate the tilt slightly to break up straight
/// streaks. Blocked moves are dropped, never retried.
pub fn walk_step<C: Canvas + ?Sized>(
    canvas: &mut C,
    geometry: &Geometry,
    particles: &mut ParticleStore,
    accel: Acceleration,
    speed: Speed,
    draws: &mut DrawSource,
) -> WalkReport {
    let span = walk_span(accel, speed);
    let mut report = WalkReport {
        attempts: span,
        moved: 0,
    };
    if particles.is_empty() {
        return report;
    }

    let (ax, ay) = (accel.x as i64, accel.y as i64);
    let stride = geometry.stride as i64;
    let mut picks = draws.stream(1);
    let mut turns = draws.stream(1);
    let mut tilts = draws.stream(1);

    for _ in 0..span {
        let (pick, turn, tilt) = (picks.next(), turns.next(), tilts.next());
        let index = pick as usize % particles.len();
        let current = particles.get(index);

        let sideway = if turn % 3 == 0 { (tilt % 5) as i64 - 2 } else { 0 };
        let acc_x = ax + ay * sideway;
        let acc_y = ay - ax * sideway;
        let abs_x = acc_x.unsigned_abs();
        let abs_y = acc_y.unsigned_abs();

        let mut delta = 0;
        if abs_x > abs_y || biased(turn, abs_y, abs_x) {
            delta += if acc_x > 0 { 1 } else { -1 };
        }
        if abs_y > abs_x || biased(tilt, abs_x, abs_y) {
            delta += if acc_y > 0 { -stride } else { stride };
        }
        if delta == 0 {
            continue;
        }

        let Some(candidate) = shifted(current, delta) else {
            continue;
        };
        if can_move(canvas, geometry, candidate) {
            canvas.clear_pixel(current);
            canvas.draw_pixel(candidate);
            particles.set(index, candidate);
            report.moved += 1;
        }
    }

    report
}

use std::time::{Duration, Instant};

/// Whether a redraw trigger is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Scheduled { deadline: Instant },
}

/// Fire-once redraw trigger re-armed by every frame.
///
/// Arming only happens from `Idle`, so a burst of redraws never stacks up
/// triggers. Firing marks the canvas dirty and drops back to `Idle`.
#[derive(Debug)]
pub struct RedrawTimer {
    delay: Duration,
    state: TimerState,
    dirty: bool,
}

impl RedrawTimer {
    /// New timer; starts dirty so the first frame renders right away
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: TimerState::Idle,
            dirty: true,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Schedule the next trigger unless one is already pending
    pub fn arm_if_idle(&mut self, now: Instant) -> bool {
        if self.state == TimerState::Idle {
            self.state = TimerState::Scheduled {
                deadline: now + self.delay,
            };
            true
        } else {
            false
        }
    }

    /// Fire the trigger if its deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Scheduled { deadline } if now >= deadline => {
                self.state = TimerState::Idle;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Consume the dirty mark
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Time left until the pending trigger fires, `None` when idle
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Scheduled { deadline } => Some(deadline.saturating_duration_since(now)),
            TimerState::Idle => None,
        }
    }

    /// Drop any pending trigger and dirty mark
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_fire_cycle() {
        let start = Instant::now();
        let mut timer = RedrawTimer::new(Duration::from_millis(50));
        assert!(timer.take_dirty());
        assert!(!timer.take_dirty());

        assert!(timer.arm_if_idle(start));
        assert!(!timer.arm_if_idle(start + Duration::from_millis(10)));
        assert_eq!(
            timer.time_until_due(start + Duration::from_millis(20)),
            Some(Duration::from_millis(30))
        );

        assert!(!timer.fire_due(start + Duration::from_millis(49)));
        assert!(timer.fire_due(start + Duration::from_millis(50)));
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.take_dirty());
        assert_eq!(timer.time_until_due(start), None);
    }

    #[test]
    fn test_cancel_discards_pending_trigger() {
        let start = Instant::now();
        let mut timer = RedrawTimer::new(Duration::from_millis(50));
        timer.arm_if_idle(start);
        timer.cancel();
        assert!(!timer.fire_due(start + Duration::from_secs(1)));
        assert!(!timer.take_dirty());
    }
}

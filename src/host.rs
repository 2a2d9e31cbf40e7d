use crate::settings::ClockFormat;
use chrono::Timelike;

/// Tilt sample in milli-g. Only `x` and `y` drive the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Acceleration {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Everything a frame needs from the outside world
pub trait Host {
    /// Wall clock in seconds
    fn now_secs(&self) -> u64;
    /// Short clock string drawn by the settle pass
    fn time_label(&self) -> String;
    /// Latest tilt sample, `None` when the sensor has nothing
    fn peek_acceleration(&mut self) -> Option<Acceleration>;
    /// Device feedback on shake (backlight, haptics)
    fn interaction_feedback(&mut self);
}

pub fn format_time_label<T: Timelike>(time: &T, format: ClockFormat) -> String {
    match format {
        ClockFormat::TwentyFourHour => format!("{:02}:{:02}", time.hour(), time.minute()),
        ClockFormat::TwelveHour => format!("{}:{:02}", time.hour12().1, time.minute()),
    }
}

/// Local wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    pub format: ClockFormat,
}

impl SystemClock {
    pub fn now_secs(&self) -> u64 {
        chrono::Local::now().timestamp().max(0) as u64
    }

    pub fn label(&self) -> String {
        format_time_label(&chrono::Local::now(), self.format)
    }
}

/// Keyboard-driven stand-in for an accelerometer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TiltEmulator {
    x: i32,
    y: i32,
}

impl TiltEmulator {
    pub const LIMIT: i32 = 4000;

    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: x.clamp(-Self::LIMIT, Self::LIMIT),
            y: y.clamp(-Self::LIMIT, Self::LIMIT),
        }
    }

    pub fn nudge(&mut self, dx: i32, dy: i32) {
        *self = Self::new(self.x + dx, self.y + dy);
    }

    pub fn level(&mut self) {
        *self = Self::default();
    }

    /// Sample as an accelerometer lying face up would report it
    pub fn sample(&self) -> Acceleration {
        Acceleration {
            x: self.x,
            y: self.y,
            z: -1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_format_time_label() {
        let morning = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        let evening = NaiveTime::from_hms_opt(19, 45, 0).unwrap();
        assert_eq!(format_time_label(&morning, ClockFormat::TwentyFourHour), "07:05");
        assert_eq!(format_time_label(&evening, ClockFormat::TwentyFourHour), "19:45");
        assert_eq!(format_time_label(&evening, ClockFormat::TwelveHour), "7:45");
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(format_time_label(&midnight, ClockFormat::TwelveHour), "12:00");
    }

    #[test]
    fn test_tilt_clamps() {
        let mut tilt = TiltEmulator::default();
        tilt.nudge(5000, -100);
        assert_eq!(tilt.sample(), Acceleration { x: 4000, y: -100, z: -1000 });
        tilt.level();
        assert_eq!(tilt.sample().x, 0);
    }
}

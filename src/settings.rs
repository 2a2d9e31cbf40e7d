use crate::particles::MAX_PARTICLES;
use serde::{Deserialize, Serialize};

/// How the clock label is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockFormat {
    /// "07:05", "19:05"
    #[default]
    TwentyFourHour,
    /// "7:05"
    TwelveHour,
}

impl ClockFormat {
    pub fn name(&self) -> &str {
        match self {
            ClockFormat::TwentyFourHour => "24h",
            ClockFormat::TwelveHour => "12h",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ClockFormat::TwentyFourHour => ClockFormat::TwelveHour,
            ClockFormat::TwelveHour => ClockFormat::TwentyFourHour,
        }
    }
}

/// Rational multiplier from sensed tilt to walk attempts per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speed {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            numerator: 3,
            denominator: 2,
        }
    }
}

impl Speed {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator: numerator.clamp(1, 20),
            denominator: denominator.clamp(1, 20),
        }
    }

    /// `base * numerator / denominator`, truncated
    pub fn apply(&self, base: u64) -> u64 {
        base * self.numerator as u64 / self.denominator.max(1) as u64
    }

    /// Parse "3/2" or "2"
    pub fn parse(s: &str) -> Option<Self> {
        let (num, den) = match s.split_once('/') {
            Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
            None => (s.trim().parse().ok()?, 1),
        };
        if den == 0 {
            return None;
        }
        Some(Self::new(num, den))
    }
}

/// All snow settings consolidated into one struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowSettings {
    /// Number of snow particles (1-10000)
    pub num_particles: usize,
    /// Delay between frames in milliseconds (10-1000)
    pub update_ms: u64,
    /// Seconds per clock bucket; the label and settle pass refresh once per bucket (1-3600)
    pub settle_interval_secs: u64,
    /// Walk attempts per unit of tilt
    pub speed: Speed,
    pub clock_format: ClockFormat,
    /// Fixed glyph scale for the label, `None` to fit the label band
    pub label_scale: Option<u32>,
}

impl Default for SnowSettings {
    fn default() -> Self {
        Self {
            num_particles: 3000,
            update_ms: 50,
            settle_interval_secs: 60,
            speed: Speed::default(),
            clock_format: ClockFormat::default(),
            label_scale: None,
        }
    }
}

impl SnowSettings {
    /// Clamp every field into its supported range
    pub fn sanitized(mut self) -> Self {
        self.num_particles = self.num_particles.clamp(1, MAX_PARTICLES);
        self.update_ms = self.update_ms.clamp(10, 1000);
        self.settle_interval_secs = self.settle_interval_secs.clamp(1, 3600);
        self.speed = Speed::new(self.speed.numerator, self.speed.denominator);
        self.label_scale = self.label_scale.map(|s| s.clamp(1, 16));
        self
    }

    /// Adjust particle count within bounds
    pub fn adjust_particles(&mut self, delta: i64) {
        self.num_particles = (self.num_particles as i64 + delta).clamp(1, MAX_PARTICLES as i64) as usize;
    }

    /// Adjust speed numerator within bounds
    pub fn adjust_speed(&mut self, delta: i32) {
        let numerator = (self.speed.numerator as i32 + delta).clamp(1, 20) as u32;
        self.speed = Speed::new(numerator, self.speed.denominator);
    }

    pub fn toggle_clock_format(&mut self) {
        self.clock_format = self.clock_format.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_truncates() {
        let speed = Speed::default();
        assert_eq!(speed.apply(10), 15);
        assert_eq!(speed.apply(11), 16);
        assert_eq!(Speed::new(1, 1).apply(7), 7);
    }

    #[test]
    fn test_speed_parse() {
        assert_eq!(Speed::parse("3/2"), Some(Speed::new(3, 2)));
        assert_eq!(Speed::parse(" 4 "), Some(Speed::new(4, 1)));
        assert_eq!(Speed::parse("1/0"), None);
        assert_eq!(Speed::parse("fast"), None);
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = SnowSettings {
            num_particles: 50_000,
            update_ms: 1,
            settle_interval_secs: 0,
            speed: Speed {
                numerator: 0,
                denominator: 0,
            },
            clock_format: ClockFormat::TwelveHour,
            label_scale: Some(99),
        }
        .sanitized();
        assert_eq!(settings.num_particles, MAX_PARTICLES);
        assert_eq!(settings.update_ms, 10);
        assert_eq!(settings.settle_interval_secs, 1);
        assert_eq!(settings.speed, Speed::new(1, 1));
        assert_eq!(settings.label_scale, Some(16));
    }

    #[test]
    fn test_adjusters() {
        let mut settings = SnowSettings::default();
        settings.adjust_particles(-10_000);
        assert_eq!(settings.num_particles, 1);
        settings.adjust_speed(100);
        assert_eq!(settings.speed.numerator, 20);
        settings.toggle_clock_format();
        assert_eq!(settings.clock_format, ClockFormat::TwelveHour);
    }
}

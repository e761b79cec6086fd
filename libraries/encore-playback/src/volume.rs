//! Volume control
//!
//! Backend volume is an integer in `0..=max` where 1000 is 100%.
//! Every change clamps into range; nothing ever fails.

/// Highest level a backend accepts (100%)
pub const MAX_VOLUME: u16 = 1000;

/// Clamped volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// Current level
    level: u16,

    /// Upper bound
    max: u16,
}

impl Volume {
    /// Create new volume controller, clamping `level` to `max`
    pub fn new(level: u16, max: u16) -> Self {
        Self {
            level: level.min(max),
            max,
        }
    }

    /// Set an absolute level (clamped)
    pub fn set_level(&mut self, level: u16) -> u16 {
        self.level = level.min(self.max);
        self.level
    }

    /// Shift the level by `delta`, clamped to `0..=max`
    pub fn adjust(&mut self, delta: i32) -> u16 {
        let target = i32::from(self.level)
            .saturating_add(delta)
            .clamp(0, i32::from(self.max));
        self.level = target as u16;
        self.level
    }

    /// Get current level
    pub fn level(&self) -> u16 {
        self.level
    }

    /// Get upper bound
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Level as a whole percentage of 1000
    pub fn percent(&self) -> u16 {
        self.level / 10
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1000, 1000)
    }
}

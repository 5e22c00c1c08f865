use instant::Duration;

/// Per-game synchronization tuning.
///
/// Snapshot cadence and blend factor are deliberately configuration, not
/// constants: different game types want different values and there is no
/// single correct one.
#[derive(Debug, Clone)]
pub struct SyncTuning {
    /// Fixed simulation tick rate
    pub tick_rate_hz: u32,

    /// Minimum interval between authoritative snapshots (bounds bandwidth;
    /// snapshots are NOT emitted every tick)
    pub snapshot_interval: Duration,

    /// Minimum interval between input-target reports from the
    /// non-authoritative side
    pub input_interval: Duration,

    /// Fraction of the remaining distance a rendered remote entity moves
    /// toward the latest snapshot per tick, in `(0, 1]`
    pub blend_factor: f32,

    /// Stiffness of the critically-damped paddle pursuit
    pub pursuit_stiffness: f32,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            snapshot_interval: Duration::from_millis(50),
            input_interval: Duration::from_millis(50),
            blend_factor: 0.25,
            pursuit_stiffness: 120.0,
        }
    }
}

impl SyncTuning {
    /// Simulation step size derived from the tick rate
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }

    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn with_input_interval(mut self, interval: Duration) -> Self {
        self.input_interval = interval;
        self
    }

    pub fn with_blend_factor(mut self, blend: f32) -> Self {
        self.blend_factor = blend.clamp(0.01, 1.0);
        self
    }

    pub fn with_pursuit_stiffness(mut self, stiffness: f32) -> Self {
        self.pursuit_stiffness = stiffness;
        self
    }
}

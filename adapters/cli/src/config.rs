//! Game tuning loaded from an optional TOML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use harvest_defence_system_spawning as spawning;
use harvest_defence_world::WorldConfig;
use serde::Deserialize;

/// Tunable cadences and durations, all in milliseconds. Every field falls
/// back to its default when the file omits it.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Cadence of simulation updates and frame refreshes.
    pub(crate) game_tick_ms: u64,
    /// Cadence of input polling.
    pub(crate) event_tick_ms: u64,
    /// Viewport extent in terminal rows.
    pub(crate) viewport_extent: u32,
    /// Minimum simulated time between rat steps.
    pub(crate) step_interval_ms: u64,
    /// Planted-soil growth duration.
    pub(crate) growth_ms: u64,
    /// Hole spill-check cadence.
    pub(crate) spill_interval_ms: u64,
    /// Upper bound on the water glisten delay.
    pub(crate) max_glisten_ms: u64,
    /// Time a rat survives without any crop in the world.
    pub(crate) starvation_ms: u64,
    /// Cooldown between a quiet field and the next rat wave.
    pub(crate) wave_cooldown_ms: u64,
    /// Base wave size before linear scaling.
    pub(crate) wave_base_count: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_tick_ms: 50,
            event_tick_ms: 120,
            viewport_extent: 40,
            step_interval_ms: 500,
            growth_ms: 12_000,
            spill_interval_ms: 2_000,
            max_glisten_ms: 4_000,
            starvation_ms: 10_000,
            wave_cooldown_ms: 8_000,
            wave_base_count: 4,
        }
    }
}

impl GameConfig {
    /// Reads and parses a TOML configuration file.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// World tuning derived from this configuration.
    pub(crate) fn world_config(&self, rng_seed: u64) -> WorldConfig {
        WorldConfig {
            step_interval: Duration::from_millis(self.step_interval_ms),
            growth: Duration::from_millis(self.growth_ms),
            spill_interval: Duration::from_millis(self.spill_interval_ms),
            max_glisten: Duration::from_millis(self.max_glisten_ms),
            starvation: Duration::from_millis(self.starvation_ms),
            viewport_extent: self.viewport_extent,
            rng_seed,
        }
    }

    /// Spawn-director tuning derived from this configuration.
    pub(crate) fn spawning_config(&self, rng_seed: u64) -> spawning::Config {
        spawning::Config::new(
            Duration::from_millis(self.wave_cooldown_ms),
            self.wave_base_count,
            rng_seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_missing_fields() {
        let config: GameConfig = toml::from_str("game_tick_ms = 25\n").expect("partial file");
        assert_eq!(config.game_tick_ms, 25);
        assert_eq!(config.wave_base_count, GameConfig::default().wave_base_count);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<GameConfig, _> = toml::from_str("tick_speed = 10\n");
        assert!(parsed.is_err());
    }
}

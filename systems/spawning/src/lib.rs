#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn director: arms rat attack waves and publishes off-screen alerts.
//!
//! The director arms a one-shot cooldown once the field is quiet and a crop
//! tempts the next wave, spawns a linearly scaled pack of rats on uniformly
//! sampled grass, and republishes a directional threat signal every tick,
//! with an explicit all-clear when nothing lurks off-screen.

use std::time::Duration;

use harvest_defence_core::{
    Command, CompassSet, DirectorAlert, Event, Position, RatView, Viewport,
};
use harvest_defence_world::Schedule;

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Configuration parameters required to construct the spawn director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    wave_cooldown: Duration,
    base_count: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cooldown, base wave
    /// size, and seed.
    #[must_use]
    pub const fn new(wave_cooldown: Duration, base_count: u32, rng_seed: u64) -> Self {
        Self {
            wave_cooldown,
            base_count,
            rng_seed,
        }
    }
}

/// One-shot payload carried by the director's wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveAction {
    Spawn,
}

/// Pure system that deterministically emits wave spawn commands and alerts.
#[derive(Debug)]
pub struct Spawning {
    wave_cooldown: Duration,
    base_count: u32,
    clock: Duration,
    wave_index: u32,
    schedule: Option<Schedule<WaveAction>>,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawn director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            wave_cooldown: config.wave_cooldown,
            base_count: config.base_count,
            clock: Duration::ZERO,
            wave_index: 0,
            schedule: None,
            rng_state: config.rng_seed,
        }
    }

    /// Index of the next wave to spawn (one-based once the first wave fires).
    #[must_use]
    pub const fn wave_index(&self) -> u32 {
        self.wave_index
    }

    /// Consumes events and immutable views to emit spawn commands and the
    /// per-tick threat alert.
    pub fn handle(
        &mut self,
        events: &[Event],
        rat_view: &RatView,
        crops_exist: bool,
        grass_cells: &[Position],
        viewport: Viewport,
        out_commands: &mut Vec<Command>,
        out_alerts: &mut Vec<DirectorAlert>,
    ) {
        let mut advanced = false;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.clock = self.clock.saturating_add(*dt);
                advanced = true;
            }
        }

        if !advanced {
            return;
        }

        self.publish_alert(rat_view, viewport, out_alerts);

        if self.schedule.is_none() && rat_view.is_empty() && crops_exist {
            tracing::debug!(wave = self.wave_index + 1, "arming attack wave");
            self.schedule = Some(Schedule::new(
                self.clock,
                vec![(self.wave_cooldown, WaveAction::Spawn)],
            ));
        }

        let mut fired = Vec::new();
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.check(self.clock, &mut fired);
            if schedule.is_complete() {
                // The one-shot instance is spent; the next quiet field arms
                // a fresh one.
                self.schedule = None;
            }
        }

        for action in fired {
            debug_assert_eq!(action, WaveAction::Spawn);
            if grass_cells.is_empty() {
                continue;
            }

            self.wave_index += 1;
            let count = wave_count(self.base_count, self.wave_index);
            let cells = self.sample_cells(grass_cells, count);
            tracing::debug!(
                wave = self.wave_index,
                count = cells.len(),
                "attack wave spawning"
            );
            out_commands.push(Command::SpawnRats { cells });
        }
    }

    /// Republishes the directional threat signal for this tick. Directions
    /// with no off-screen rats are implicitly cleared by the full republish;
    /// zero off-screen rats yield a distinct all-clear rather than an empty
    /// direction set.
    fn publish_alert(
        &self,
        rat_view: &RatView,
        viewport: Viewport,
        out_alerts: &mut Vec<DirectorAlert>,
    ) {
        let mut directions = CompassSet::empty();
        for rat in rat_view.iter() {
            if !viewport.in_view(rat.cell) {
                directions.union_with(viewport.offscreen_directions(rat.cell));
            }
        }

        if directions.is_empty() {
            out_alerts.push(DirectorAlert::AllClear);
        } else {
            out_alerts.push(DirectorAlert::Offscreen(directions));
        }
    }

    /// Samples `count` distinct cells uniformly via a Fisher–Yates pass over
    /// the grass set.
    fn sample_cells(&mut self, grass: &[Position], count: u32) -> Vec<Position> {
        let mut cells: Vec<Position> = grass.to_vec();
        for index in (1..cells.len()).rev() {
            let value = self.advance_rng();
            let swap = (value % (index as u64 + 1)) as usize;
            cells.swap(index, swap);
        }

        let take = usize::try_from(count).unwrap_or(usize::MAX).min(cells.len());
        cells.truncate(take);
        cells
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

/// Wave size scales linearly with the wave index: `round(base × index / 2)`.
fn wave_count(base: u32, wave_index: u32) -> u32 {
    (f64::from(base) * (f64::from(wave_index) * 0.5)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_defence_core::RatSnapshot;
    use harvest_defence_core::{Compass, RatId};

    fn viewport_at_origin() -> Viewport {
        Viewport::new(Position::new(0, 0), 40)
    }

    fn time_advanced(ms: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(ms),
        }]
    }

    fn rat_at(cell: Position) -> RatSnapshot {
        RatSnapshot {
            id: RatId::new(0),
            cell,
            ready_for_step: false,
        }
    }

    #[test]
    fn wave_count_matches_the_linear_formula() {
        assert_eq!(wave_count(4, 1), 2);
        assert_eq!(wave_count(4, 2), 4);
        assert_eq!(wave_count(4, 3), 6);
        assert_eq!(wave_count(3, 1), 2, "0.5 fractions round away from zero");
    }

    #[test]
    fn wave_fires_after_the_cooldown_when_quiet_and_tempted() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(5), 4, 0x1234));
        let grass = [Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)];
        let mut commands = Vec::new();
        let mut alerts = Vec::new();

        spawning.handle(
            &time_advanced(4_000),
            &RatView::default(),
            true,
            &grass,
            viewport_at_origin(),
            &mut commands,
            &mut alerts,
        );
        assert!(commands.is_empty(), "cooldown has not elapsed");

        spawning.handle(
            &time_advanced(1_000),
            &RatView::default(),
            true,
            &grass,
            viewport_at_origin(),
            &mut commands,
            &mut alerts,
        );

        match commands.as_slice() {
            [Command::SpawnRats { cells }] => {
                // Wave one spawns round(4 × 0.5) = 2 rats on distinct grass.
                assert_eq!(cells.len(), 2);
                assert!(cells.iter().all(|cell| grass.contains(cell)));
                assert_ne!(cells[0], cells[1]);
            }
            other => panic!("expected one SpawnRats command, got {other:?}"),
        }
    }

    #[test]
    fn waves_do_not_arm_while_rats_remain() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 4, 0x1234));
        let rats = RatView::from_snapshots(vec![rat_at(Position::new(2, 2))]);
        let grass = [Position::new(1, 1)];
        let mut commands = Vec::new();
        let mut alerts = Vec::new();

        for _ in 0..4 {
            spawning.handle(
                &time_advanced(1_000),
                &rats,
                true,
                &grass,
                viewport_at_origin(),
                &mut commands,
                &mut alerts,
            );
        }

        assert!(commands.is_empty());
    }

    #[test]
    fn waves_do_not_arm_without_crops() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 4, 0x1234));
        let grass = [Position::new(1, 1)];
        let mut commands = Vec::new();
        let mut alerts = Vec::new();

        for _ in 0..4 {
            spawning.handle(
                &time_advanced(1_000),
                &RatView::default(),
                false,
                &grass,
                viewport_at_origin(),
                &mut commands,
                &mut alerts,
            );
        }

        assert!(commands.is_empty());
    }

    #[test]
    fn alert_names_the_offscreen_quadrants() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(60), 4, 1));
        let rats = RatView::from_snapshots(vec![rat_at(Position::new(-40, -40))]);
        let mut commands = Vec::new();
        let mut alerts = Vec::new();

        spawning.handle(
            &time_advanced(16),
            &rats,
            false,
            &[],
            viewport_at_origin(),
            &mut commands,
            &mut alerts,
        );

        match alerts.as_slice() {
            [DirectorAlert::Offscreen(directions)] => {
                assert!(directions.contains(Compass::North));
                assert!(directions.contains(Compass::West));
                assert!(!directions.contains(Compass::South));
                assert!(!directions.contains(Compass::East));
            }
            other => panic!("expected an off-screen alert, got {other:?}"),
        }
    }

    #[test]
    fn visible_rats_yield_a_distinct_all_clear() {
        let mut spawning = Spawning::new(Config::new(Duration::from_secs(60), 4, 1));
        let rats = RatView::from_snapshots(vec![rat_at(Position::new(1, 1))]);
        let mut commands = Vec::new();
        let mut alerts = Vec::new();

        spawning.handle(
            &time_advanced(16),
            &rats,
            false,
            &[],
            viewport_at_origin(),
            &mut commands,
            &mut alerts,
        );

        assert_eq!(alerts, vec![DirectorAlert::AllClear]);
    }

    #[test]
    fn sampling_is_deterministic_for_a_fixed_seed() {
        let grass: Vec<Position> = (0..16).map(|index| Position::new(index, 0)).collect();

        let mut first = Spawning::new(Config::new(Duration::from_secs(1), 4, 0xfeed));
        let mut second = Spawning::new(Config::new(Duration::from_secs(1), 4, 0xfeed));

        assert_eq!(first.sample_cells(&grass, 4), second.sample_cells(&grass, 4));
    }
}

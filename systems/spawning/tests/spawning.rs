use std::time::Duration;

use harvest_defence_core::{Command, DirectorAlert, Event};
use harvest_defence_system_spawning::{Config, Spawning};
use harvest_defence_world::{self as world, parse_map, query, World, WorldConfig};

fn world_from(text: &str) -> World {
    World::from_map(
        &parse_map(text).expect("test map parses"),
        WorldConfig::default(),
    )
}

fn run_tick(
    world: &mut World,
    spawning: &mut Spawning,
    dt: Duration,
) -> (Vec<Command>, Vec<DirectorAlert>) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let rat_view = query::rat_view(world);
    let crops = query::crop_cells(world);
    let grass = query::grass_cells(world);
    let mut commands = Vec::new();
    let mut alerts = Vec::new();
    spawning.handle(
        &events,
        &rat_view,
        !crops.is_empty(),
        &grass,
        query::viewport(world),
        &mut commands,
        &mut alerts,
    );
    (commands, alerts)
}

#[test]
fn first_wave_lands_on_grass_once_the_cooldown_elapses() {
    let map = "\
########
#P;;;;;#
#;;,;;;#
#;;;;;;#
########
";
    let mut world = world_from(map);
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(3), 4, 0xbead));

    let mut spawned = 0;
    for _ in 0..4 {
        let (commands, _alerts) = run_tick(&mut world, &mut spawning, Duration::from_secs(1));
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        spawned += events
            .iter()
            .filter(|event| matches!(event, Event::RatSpawned { .. }))
            .count();
    }

    // Wave one spawns round(4 × 0.5) = 2 rats, each on a grass cell.
    assert_eq!(spawned, 2);
    assert_eq!(query::rat_view(&world).len(), 2);
    assert_eq!(spawning.wave_index(), 1);
}

#[test]
fn no_wave_arms_on_a_cropless_field() {
    let mut world = world_from("P;;;;;\n");
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(1), 4, 0xbead));

    for _ in 0..5 {
        let (commands, _alerts) = run_tick(&mut world, &mut spawning, Duration::from_secs(1));
        assert!(commands.is_empty());
    }
    assert_eq!(spawning.wave_index(), 0);
}

#[test]
fn alerts_republish_every_tick() {
    let mut world = world_from("P;,;;;\n");
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(60), 4, 0xbead));

    let (_commands, alerts) = run_tick(&mut world, &mut spawning, Duration::from_millis(16));
    assert_eq!(alerts, vec![DirectorAlert::AllClear]);

    let (_commands, alerts) = run_tick(&mut world, &mut spawning, Duration::from_millis(16));
    assert_eq!(alerts, vec![DirectorAlert::AllClear]);
}

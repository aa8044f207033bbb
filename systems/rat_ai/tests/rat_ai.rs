use std::time::Duration;

use harvest_defence_core::{Command, Position};
use harvest_defence_system_rat_ai::RatAi;
use harvest_defence_world::{self as world, parse_map, query, World, WorldConfig};

fn instant_step_config() -> WorldConfig {
    WorldConfig {
        step_interval: Duration::ZERO,
        ..WorldConfig::default()
    }
}

fn world_from(text: &str, config: WorldConfig) -> World {
    World::from_map(&parse_map(text).expect("test map parses"), config)
}

fn run_tick(world: &mut World, system: &mut RatAi, dt: Duration) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let rat_view = query::rat_view(world);
    let crops = query::crop_cells(world);
    let mut commands = Vec::new();
    system.handle(
        &events,
        &rat_view,
        &crops,
        |cell| !query::can_place(world, cell),
        &mut commands,
    );
    commands
}

#[test]
fn rat_closes_on_an_adjacent_crop_within_one_step() {
    // Grass at (5,5), planted soil at (5,6); the rat starts on the grass.
    let mut map = String::new();
    for row in 0..8 {
        for column in 0..8 {
            map.push(match (column, row) {
                (1, 1) => 'P',
                (5, 6) => ',',
                _ => ';',
            });
        }
        map.push('\n');
    }
    let mut world = world_from(&map, instant_step_config());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnRats {
            cells: vec![Position::new(5, 5)],
        },
        &mut events,
    );

    let mut system = RatAi::default();
    let commands = run_tick(&mut world, &mut system, Duration::from_millis(16));
    assert_eq!(commands.len(), 1, "one ready rat proposes one step");

    let before = Position::new(5, 5);
    let crop = Position::new(5, 6);
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let after = query::rat_view(&world)
        .iter()
        .next()
        .expect("rat survives the step")
        .cell;
    assert!(
        after == crop || crop.manhattan_distance(after) < crop.manhattan_distance(before),
        "step must land on the crop or strictly closer to it"
    );
}

#[test]
fn proposed_steps_avoid_impassable_cells_except_the_crop_itself() {
    let map = "\
##########
#P;;;;;;;#
#;;~~;;;;#
#;;~w;;;;#
#;;;;;;;;#
##########
";
    let mut world = world_from(map, instant_step_config());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnRats {
            cells: vec![Position::new(7, 4)],
        },
        &mut events,
    );

    let crop = Position::new(4, 3);
    let mut system = RatAi::default();
    for _ in 0..32 {
        let commands = run_tick(&mut world, &mut system, Duration::from_millis(16));
        for command in commands {
            if let Command::StepRat { to, .. } = &command {
                assert!(
                    query::can_place(&world, *to) || *to == crop,
                    "step into {to:?} would enter an impassable non-target cell"
                );
            }
            world::apply(&mut world, command, &mut events);
        }
        if query::crop_cells(&world).is_empty() {
            return;
        }
    }
    panic!("rat never reached the crop");
}

#[test]
fn rats_idle_when_no_crop_exists() {
    let mut world = world_from("P;;;;\n", instant_step_config());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnRats {
            cells: vec![Position::new(3, 0)],
        },
        &mut events,
    );

    let mut system = RatAi::default();
    let commands = run_tick(&mut world, &mut system, Duration::from_millis(16));
    assert!(commands.is_empty(), "no crop means no movement");
}

#[test]
fn replays_deterministically() {
    let run = || {
        let map = "\
########
#P;;;;;#
#;;;;w;#
#;;;;;;#
########
";
        let mut world = world_from(map, instant_step_config());
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnRats {
                cells: vec![Position::new(1, 3)],
            },
            &mut events,
        );

        let mut system = RatAi::default();
        let mut transcript = Vec::new();
        for _ in 0..12 {
            let commands = run_tick(&mut world, &mut system, Duration::from_millis(16));
            transcript.extend(commands.iter().cloned());
            for command in commands {
                world::apply(&mut world, command, &mut events);
            }
        }
        transcript
    };

    assert_eq!(run(), run());
}

#[test]
fn steps_are_gated_on_readiness() {
    let config = WorldConfig {
        step_interval: Duration::from_millis(500),
        ..WorldConfig::default()
    };
    let mut world = world_from("P;;;w\n", config);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnRats {
            cells: vec![Position::new(2, 0)],
        },
        &mut events,
    );

    let mut system = RatAi::default();
    let commands = run_tick(&mut world, &mut system, Duration::from_millis(100));
    assert!(commands.is_empty(), "rat has not accrued a full interval");

    let commands = run_tick(&mut world, &mut system, Duration::from_millis(400));
    assert_eq!(commands.len(), 1);
}

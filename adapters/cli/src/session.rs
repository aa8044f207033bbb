//! Interactive session: the dual-cadence loop, input dispatch, and HUD.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result as AnyResult;
use harvest_defence_core::{
    Command, Compass, DirectorAlert, Event, ItemKind, TradeOffer, Viewport,
};
use harvest_defence_rendering::{draw_text, draw_world, palette, TextReveal};
use harvest_defence_rendering_crossterm::Terminal;
use harvest_defence_system_rat_ai::RatAi;
use harvest_defence_system_spawning::Spawning;
use harvest_defence_world::{self as world, query, World};

use crate::config::GameConfig;

const TRADE_GREETING: &str = "Fine weather for wheat. Care to trade?";
const REVEAL_CHARS_PER_TICK: usize = 2;
const FLASH_PERIOD: u64 = 10;

/// Discrete actions the keyboard can request.
#[derive(Clone, Copy, Debug)]
enum PlayerAction {
    Move(Compass),
    UseItem,
    CycleItem,
    OpenTrade,
    Quit,
}

/// Trade dialogue state; `Closed` routes keys to the field.
enum MenuState {
    Closed,
    Trade {
        greeting: TextReveal,
        options: Vec<TradeOffer>,
    },
}

/// Owns the world, the systems, and the terminal for one play session.
pub(crate) struct Session {
    world: World,
    rat_ai: RatAi,
    spawning: Spawning,
    terminal: Terminal,
    config: GameConfig,
    key_map: HashMap<char, PlayerAction>,
    menu: MenuState,
    alert: DirectorAlert,
    inventory_line: String,
    frame: u64,
    running: bool,
}

impl Session {
    pub(crate) fn new(
        world: World,
        spawning: Spawning,
        config: GameConfig,
        terminal: Terminal,
    ) -> Self {
        let mut key_map = HashMap::new();
        let _ = key_map.insert('w', PlayerAction::Move(Compass::North));
        let _ = key_map.insert('a', PlayerAction::Move(Compass::West));
        let _ = key_map.insert('s', PlayerAction::Move(Compass::South));
        let _ = key_map.insert('d', PlayerAction::Move(Compass::East));
        let _ = key_map.insert('e', PlayerAction::UseItem);
        let _ = key_map.insert('i', PlayerAction::CycleItem);
        let _ = key_map.insert('t', PlayerAction::OpenTrade);
        let _ = key_map.insert('q', PlayerAction::Quit);

        let inventory_line = inventory_line(&world);
        Self {
            world,
            rat_ai: RatAi::default(),
            spawning,
            terminal,
            config,
            key_map,
            menu: MenuState::Closed,
            alert: DirectorAlert::AllClear,
            inventory_line,
            frame: 0,
            running: true,
        }
    }

    /// Runs the loop until the player quits. Two independent cadences share
    /// one thread: the game tick advances simulation and redraws, the event
    /// tick polls input. Whichever interval has elapsed runs; neither blocks
    /// the other beyond the synchronous body of one iteration.
    pub(crate) fn run(&mut self) -> AnyResult<()> {
        let game_tick = Duration::from_millis(self.config.game_tick_ms);
        let event_tick = Duration::from_millis(self.config.event_tick_ms);
        let mut last_game = Instant::now();
        let mut last_event = Instant::now();

        while self.running {
            let now = Instant::now();
            if now.duration_since(last_game) >= game_tick {
                let dt = now.duration_since(last_game);
                last_game = now;
                self.game_tick(dt)?;
            }

            let now = Instant::now();
            if now.duration_since(last_event) >= event_tick {
                last_event = now;
                self.event_tick()?;
            }

            thread::sleep(Duration::from_millis(2));
        }
        Ok(())
    }

    fn game_tick(&mut self, dt: Duration) -> AnyResult<()> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let rat_view = query::rat_view(&self.world);
        let crops = query::crop_cells(&self.world);
        let grass = query::grass_cells(&self.world);
        let viewport = query::viewport(&self.world);

        let mut commands = Vec::new();
        self.rat_ai.handle(
            &events,
            &rat_view,
            &crops,
            |cell| !query::can_place(&self.world, cell),
            &mut commands,
        );

        let mut alerts = Vec::new();
        self.spawning.handle(
            &events,
            &rat_view,
            !crops.is_empty(),
            &grass,
            viewport,
            &mut commands,
            &mut alerts,
        );

        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        if let Some(alert) = alerts.pop() {
            self.alert = alert;
        }

        self.react(&events)?;
        if let MenuState::Trade { greeting, .. } = &mut self.menu {
            greeting.advance(REVEAL_CHARS_PER_TICK);
        }

        self.frame = self.frame.wrapping_add(1);
        self.render()
    }

    /// Absorbs world events at the presentation boundary: rejections become
    /// an audible no-op, inventory notifications refresh the cached HUD line.
    fn react(&mut self, events: &[Event]) -> AnyResult<()> {
        let mut rejected = false;
        let mut inventory_changed = false;
        for event in events {
            match event {
                Event::MoveRejected { .. }
                | Event::TradeRejected { .. }
                | Event::ActionRejected { .. } => rejected = true,
                Event::InventoryChanged => inventory_changed = true,
                Event::TradeCompleted { .. } => {
                    // Stock moved; the open menu must show fresh options.
                    if let MenuState::Trade { options, .. } = &mut self.menu {
                        *options = query::trade_options(&self.world);
                    }
                }
                _ => {}
            }
        }

        if rejected {
            self.terminal.bell()?;
        }
        if inventory_changed {
            self.inventory_line = inventory_line(&self.world);
        }
        Ok(())
    }

    fn event_tick(&mut self) -> AnyResult<()> {
        let Some(key) = self.terminal.poll_key()? else {
            return Ok(());
        };

        if matches!(self.menu, MenuState::Closed) {
            self.handle_field_key(key)
        } else {
            self.handle_menu_key(key)
        }
    }

    fn handle_field_key(&mut self, key: char) -> AnyResult<()> {
        // Unmapped keys are ignored.
        let Some(action) = self.key_map.get(&key).copied() else {
            return Ok(());
        };

        match action {
            PlayerAction::Move(direction) => self.submit(Command::MovePlayer { direction }),
            PlayerAction::UseItem => self.submit(Command::UseItem),
            PlayerAction::CycleItem => {
                let next = next_item(&self.world);
                self.submit(Command::SelectItem { item: next })
            }
            PlayerAction::OpenTrade => {
                if query::npc_adjacent(&self.world) {
                    self.menu = MenuState::Trade {
                        greeting: TextReveal::new(TRADE_GREETING),
                        options: query::trade_options(&self.world),
                    };
                    Ok(())
                } else {
                    self.terminal.bell()
                }
            }
            PlayerAction::Quit => {
                self.running = false;
                Ok(())
            }
        }
    }

    /// Numeric menu dispatch. Range validation lives here, at the interface
    /// boundary: an out-of-range choice beeps and the menu waits for another
    /// key; the simulation core never sees it.
    fn handle_menu_key(&mut self, key: char) -> AnyResult<()> {
        let MenuState::Trade { options, .. } = &self.menu else {
            return Ok(());
        };

        let Some(choice) = key.to_digit(10) else {
            return Ok(());
        };
        let farewell = options.len() as u32 + 1;

        if choice == farewell {
            self.menu = MenuState::Closed;
            return Ok(());
        }
        let Some(offer) = choice
            .checked_sub(1)
            .and_then(|index| options.get(index as usize).copied())
        else {
            return self.terminal.bell();
        };

        self.submit(Command::Trade { offer })
    }

    fn submit(&mut self, command: Command) -> AnyResult<()> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.react(&events)
    }

    fn render(&mut self) -> AnyResult<()> {
        self.terminal.begin_frame()?;

        let viewport = query::viewport(&self.world);
        let sprites = query::draw_order(&self.world);
        draw_world(&mut self.terminal, &viewport, &sprites)?;

        self.draw_alert_border(&viewport)?;
        self.draw_hud(&viewport)?;

        self.terminal.present()
    }

    /// Flashing edge markers naming the quadrants that hold off-screen rats.
    fn draw_alert_border(&mut self, viewport: &Viewport) -> AnyResult<()> {
        let DirectorAlert::Offscreen(directions) = self.alert else {
            return Ok(());
        };
        if self.frame % FLASH_PERIOD >= FLASH_PERIOD / 2 {
            return Ok(());
        }

        let rows = viewport.extent() as u16;
        let columns = rows * 2;
        for direction in directions.iter() {
            let (column, row) = match direction {
                Compass::North => (columns / 2, 0),
                Compass::South => (columns / 2, rows - 1),
                Compass::West => (0, rows / 2),
                Compass::East => (columns - 2, rows / 2),
            };
            draw_text(&mut self.terminal, column, row, "!!", palette::ALERT_YELLOW)?;
        }
        Ok(())
    }

    fn draw_hud(&mut self, viewport: &Viewport) -> AnyResult<()> {
        let base = viewport.extent() as u16;
        let status = format!(
            "Hand: {}   Wave: {}",
            query::active_item(&self.world).label(),
            self.spawning.wave_index(),
        );
        draw_text(&mut self.terminal, 0, base, &status, palette::WHITE)?;
        let line = self.inventory_line.clone();
        draw_text(&mut self.terminal, 0, base + 1, &line, palette::WHITE)?;

        if let MenuState::Trade { greeting, options } = &self.menu {
            let greeting_line = greeting.visible().to_owned();
            let option_lines: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(index, offer)| format!("{}) {}", index + 1, offer_label(offer)))
                .chain(std::iter::once(format!("{}) Farewell", options.len() + 1)))
                .collect();

            draw_text(&mut self.terminal, 0, base + 3, &greeting_line, palette::HOT_PINK)?;
            for (index, line) in option_lines.iter().enumerate() {
                draw_text(
                    &mut self.terminal,
                    0,
                    base + 4 + index as u16,
                    line,
                    palette::WHITE,
                )?;
            }
        }
        Ok(())
    }
}

/// Next item after the active one, in inventory display order.
fn next_item(world: &World) -> ItemKind {
    let held = query::inventory(world);
    let active = query::active_item(world);
    let position = held.iter().position(|(item, _)| *item == active);
    match position {
        Some(index) => held[(index + 1) % held.len()].0,
        None => active,
    }
}

fn inventory_line(world: &World) -> String {
    let entries: Vec<String> = query::inventory(world)
        .into_iter()
        .map(|(item, count)| format!("{} x{}", item.label(), count))
        .collect();
    entries.join("  ")
}

fn offer_label(offer: &TradeOffer) -> String {
    format!(
        "Give {} {} for {} {}",
        offer.gives_count(),
        offer.gives().label(),
        offer.takes_count(),
        offer.takes().label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_defence_world::{parse_map, WorldConfig};

    fn test_world() -> World {
        World::from_map(
            &parse_map("P;\n").expect("map parses"),
            WorldConfig::default(),
        )
    }

    #[test]
    fn next_item_cycles_in_display_order() {
        let world = test_world();
        // Starting hand is the shovel; the next slot holds seeds.
        assert_eq!(next_item(&world), ItemKind::Seeds);
    }

    #[test]
    fn offer_labels_read_naturally() {
        let offer = TradeOffer::new(ItemKind::Wheat, 1, ItemKind::Quid, 1);
        assert_eq!(offer_label(&offer), "Give 1 Wheat for 1 Quid");
    }

    #[test]
    fn inventory_line_lists_counts() {
        let world = test_world();
        let line = inventory_line(&world);
        assert!(line.contains("Shovel x1"));
        assert!(line.contains("Seeds x6"));
    }
}

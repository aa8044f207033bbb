#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Harvest Defence.
//!
//! All mutation flows through [`apply`]: adapters and systems submit
//! [`Command`] values, the world resolves them deterministically, and
//! broadcasts [`Event`] values describing what actually happened. Read access
//! goes through the [`query`] module.

mod camera;
mod registry;
mod schedule;
mod terrain;

pub use schedule::Schedule;
pub use terrain::{parse_map, MapError, WorldMap, DEFAULT_MAP};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use harvest_defence_core::{
    ActionError, Command, Compass, Event, ItemKind, Position, RatId, TileKind, TradeError,
    TradeOffer, WELCOME_BANNER,
};

use camera::Camera;
use registry::{EntityId, EntityPayload, RatState, Registry};
use terrain::{TileAction, TileState};

/// Item display and fallback-selection order.
const ITEM_ORDER: [ItemKind; 7] = [
    ItemKind::Shovel,
    ItemKind::Seeds,
    ItemKind::Scythe,
    ItemKind::Stick,
    ItemKind::ScarecrowKit,
    ItemKind::Wheat,
    ItemKind::Quid,
];

/// Exchanges the trader is willing to make, subject to stock on both sides.
const TRADE_OFFERS: [TradeOffer; 3] = [
    TradeOffer::new(ItemKind::Wheat, 1, ItemKind::Quid, 1),
    TradeOffer::new(ItemKind::Quid, 1, ItemKind::Seeds, 4),
    TradeOffer::new(ItemKind::Quid, 3, ItemKind::ScarecrowKit, 1),
];

/// Tuning parameters for the simulation.
#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    /// Minimum simulated time required between successive rat steps.
    pub step_interval: Duration,
    /// Time a planted cell takes to mature into wheat.
    pub growth: Duration,
    /// Cadence at which a hole scans its neighbours for water.
    pub spill_interval: Duration,
    /// Upper bound (exclusive) on the randomised glisten delay.
    pub max_glisten: Duration,
    /// Time a rat survives once no crop exists anywhere.
    pub starvation: Duration,
    /// Viewport extent in terminal rows, used for visibility tests.
    pub viewport_extent: u32,
    /// Seed for the world's internal random sequence (glisten delays).
    pub rng_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(500),
            growth: Duration::from_secs(12),
            spill_interval: Duration::from_secs(2),
            max_glisten: Duration::from_secs(4),
            starvation: Duration::from_secs(10),
            viewport_extent: 40,
            rng_seed: 0x4a3f_91d2_c07b_5e68,
        }
    }
}

/// Represents the authoritative Harvest Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    clock: Duration,
    registry: Registry,
    camera: Camera,
    player: EntityId,
    inventory: HashMap<ItemKind, u32>,
    active_item: ItemKind,
    npc: Option<EntityId>,
    npc_stock: HashMap<ItemKind, u32>,
    rats: BTreeMap<RatId, EntityId>,
    next_rat: u32,
    rng: u64,
}

impl World {
    /// Creates a world from the built-in default layout.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let map = parse_map(DEFAULT_MAP).expect("default layout parses");
        Self::from_map(&map, config)
    }

    /// Creates a world from a parsed symbolic map.
    #[must_use]
    pub fn from_map(map: &WorldMap, config: WorldConfig) -> Self {
        let mut registry = Registry::new();
        let mut rng = config.rng_seed;

        for &(cell, kind) in map.tiles() {
            let tile = armed_tile(kind, Duration::ZERO, &config, &mut rng);
            let _ = registry.insert(cell, EntityPayload::Tile(tile));
        }

        let player = registry.insert(map.player(), EntityPayload::Player);
        let npc = map.npc().map(|cell| registry.insert(cell, EntityPayload::Npc));

        let mut inventory = HashMap::new();
        let _ = inventory.insert(ItemKind::Shovel, 1);
        let _ = inventory.insert(ItemKind::Seeds, 6);
        let _ = inventory.insert(ItemKind::Scythe, 1);
        let _ = inventory.insert(ItemKind::Stick, 1);

        let mut npc_stock = HashMap::new();
        let _ = npc_stock.insert(ItemKind::Seeds, 12);
        let _ = npc_stock.insert(ItemKind::ScarecrowKit, 2);
        let _ = npc_stock.insert(ItemKind::Quid, 8);

        Self {
            banner: WELCOME_BANNER,
            camera: Camera::new(map.player(), config.viewport_extent),
            config,
            clock: Duration::ZERO,
            registry,
            player,
            inventory,
            active_item: ItemKind::Shovel,
            npc,
            npc_stock,
            rats: BTreeMap::new(),
            next_rat: 0,
            rng,
        }
    }

    fn player_cell(&self) -> Position {
        self.registry
            .get(self.player)
            .expect("player is never destroyed")
            .position()
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        // Collision resolution runs first, over the start-of-tick snapshot.
        self.resolve_collisions(out_events);
        self.advance_terrain(out_events);
        self.advance_actors(dt, out_events);
    }

    /// Invokes the collide capability for every co-located entity pair.
    ///
    /// Rats are the only collide-capable entities; their interaction with a
    /// crop-stage tile devours it. Handlers are idempotent: once the first
    /// rat has cleared the cell, further pairings in the same pass no-op.
    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        for (cell, occupants) in self.registry.crowded_cells() {
            for id in &occupants {
                let Some(rat) = self.registry.get(*id).and_then(|e| e.rat().map(|r| r.id))
                else {
                    continue;
                };

                for other in &occupants {
                    if other == id {
                        continue;
                    }
                    let crop = self
                        .registry
                        .get(*other)
                        .and_then(|e| e.tile())
                        .map(|tile| tile.kind)
                        .filter(|kind| kind.is_crop_stage());
                    if crop.is_some() {
                        self.transition(cell, TileKind::Grass, out_events);
                        out_events.push(Event::CropEaten { cell, rat });
                    }
                }
            }
        }
    }

    /// Fires due terrain schedules and applies the resulting transitions.
    ///
    /// All spill checks due this tick see the water set as it stood when the
    /// pass began, so diffusion advances one cell per interval per hole.
    fn advance_terrain(&mut self, out_events: &mut Vec<Event>) {
        let water: HashSet<Position> = self
            .registry
            .iter()
            .filter(|entity| {
                entity
                    .tile()
                    .map(|tile| tile.kind == TileKind::Water)
                    .unwrap_or(false)
            })
            .map(|entity| entity.position())
            .collect();

        let mut pending: Vec<(EntityId, Position, TileAction)> = Vec::new();
        for id in self.registry.ids() {
            let clock = self.clock;
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            let cell = entity.position();
            let Some(tile) = entity.tile_mut() else {
                continue;
            };
            let Some(schedule) = tile.schedule.as_mut() else {
                continue;
            };

            let mut fired = Vec::new();
            schedule.check(clock, &mut fired);
            if schedule.is_complete() {
                tile.schedule = None;
            }
            pending.extend(fired.into_iter().map(|action| (id, cell, action)));
        }

        for (id, cell, action) in pending {
            if self.registry.get(id).is_none() {
                continue;
            }
            match action {
                TileAction::SpillCheck => {
                    if cell.surrounding().any(|neighbour| water.contains(&neighbour)) {
                        self.transition(cell, TileKind::Water, out_events);
                    } else {
                        self.rearm_tile(id, TileAction::SpillCheck, self.config.spill_interval);
                    }
                }
                TileAction::Grow => {
                    self.transition(cell, TileKind::Wheat, out_events);
                }
                TileAction::Glisten => {
                    let delay = glisten_delay(&self.config, &mut self.rng);
                    if let Some(tile) =
                        self.registry.get_mut(id).and_then(|entity| entity.tile_mut())
                    {
                        tile.glistening = !tile.glistening;
                    }
                    self.rearm_tile(id, TileAction::Glisten, delay);
                }
            }
        }
    }

    fn rearm_tile(&mut self, id: EntityId, action: TileAction, delay: Duration) {
        let clock = self.clock;
        if let Some(tile) = self.registry.get_mut(id).and_then(|entity| entity.tile_mut()) {
            tile.schedule = Some(Schedule::new(clock, vec![(delay, action)]));
        }
    }

    fn advance_actors(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let crops_exist = self
            .registry
            .iter()
            .any(|entity| entity.tile().map(|t| t.kind.is_crop_stage()).unwrap_or(false));

        let pairs: Vec<(RatId, EntityId)> =
            self.rats.iter().map(|(rat, id)| (*rat, *id)).collect();
        let mut starved: Vec<(RatId, EntityId, Position)> = Vec::new();

        for (rat_id, entity_id) in pairs {
            let Some(entity) = self.registry.get_mut(entity_id) else {
                continue;
            };
            let cell = entity.position();
            let Some(rat) = entity.rat_mut() else {
                continue;
            };

            rat.accumulator = rat.accumulator.saturating_add(dt);
            if crops_exist {
                rat.hunger = Duration::ZERO;
            } else {
                rat.hunger = rat.hunger.saturating_add(dt);
                if rat.hunger >= self.config.starvation {
                    starved.push((rat_id, entity_id, cell));
                }
            }
        }

        for (rat_id, entity_id, cell) in starved {
            let _ = self.registry.remove(entity_id);
            let _ = self.rats.remove(&rat_id);
            tracing::debug!(rat = rat_id.get(), ?cell, "rat starved");
            out_events.push(Event::RatStarved { rat: rat_id, cell });
        }
    }

    fn move_player(&mut self, direction: Compass, out_events: &mut Vec<Event>) {
        let (dx, dy) = direction.delta();
        let from = self.player_cell();
        let to = from.offset(dx, dy);

        if !self.registry.can_place(to) {
            out_events.push(Event::MoveRejected { direction });
            return;
        }

        let _ = self.registry.reposition(self.player, to);
        self.camera.follow(to, (dx, dy));
        out_events.push(Event::PlayerMoved { from, to });
    }

    fn select_item(&mut self, item: ItemKind, out_events: &mut Vec<Event>) {
        if !self.inventory.contains_key(&item) {
            out_events.push(Event::ActionRejected {
                item,
                reason: ActionError::NotCarried,
            });
            return;
        }
        if self.active_item != item {
            self.active_item = item;
            out_events.push(Event::InventoryChanged);
        }
    }

    fn use_item(&mut self, out_events: &mut Vec<Event>) {
        let item = self.active_item;
        assert!(
            self.inventory.contains_key(&item),
            "active item must be present in the inventory"
        );

        if !item.is_wieldable() {
            out_events.push(Event::ActionRejected {
                item,
                reason: ActionError::NotWieldable,
            });
            return;
        }

        let cell = self.player_cell();
        match item {
            ItemKind::Shovel => {
                if self.tile_kind_at(cell) == Some(TileKind::Grass) {
                    self.transition(cell, TileKind::Soil, out_events);
                } else {
                    out_events.push(Event::ActionRejected {
                        item,
                        reason: ActionError::NoTarget,
                    });
                }
            }
            ItemKind::Seeds => {
                if self.tile_kind_at(cell) == Some(TileKind::Soil) {
                    self.transition(cell, TileKind::PlantedSoil, out_events);
                    self.consume_item(ItemKind::Seeds, 1, out_events);
                } else {
                    out_events.push(Event::ActionRejected {
                        item,
                        reason: ActionError::NoTarget,
                    });
                }
            }
            ItemKind::ScarecrowKit => {
                if self.tile_kind_at(cell) == Some(TileKind::Grass) {
                    self.transition(cell, TileKind::Scarecrow, out_events);
                    self.consume_item(ItemKind::ScarecrowKit, 1, out_events);
                } else {
                    out_events.push(Event::ActionRejected {
                        item,
                        reason: ActionError::NoTarget,
                    });
                }
            }
            ItemKind::Scythe => {
                let ripe: Vec<Position> = cell
                    .surrounding()
                    .filter(|reach| self.tile_kind_at(*reach) == Some(TileKind::Wheat))
                    .collect();
                if ripe.is_empty() {
                    out_events.push(Event::ActionRejected {
                        item,
                        reason: ActionError::NoTarget,
                    });
                    return;
                }
                let count = ripe.len() as u32;
                for reach in ripe {
                    self.transition(reach, TileKind::Grass, out_events);
                }
                self.credit_item(ItemKind::Wheat, count, out_events);
            }
            ItemKind::Stick => {
                let felled: Vec<(RatId, EntityId, Position)> = cell
                    .surrounding()
                    .flat_map(|reach| {
                        self.registry
                            .objects_at(reach)
                            .into_iter()
                            .filter_map(|entity| {
                                entity.rat().map(|rat| (rat.id, entity.id(), reach))
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
                if felled.is_empty() {
                    out_events.push(Event::ActionRejected {
                        item,
                        reason: ActionError::NoTarget,
                    });
                    return;
                }
                for (rat, entity_id, reach) in felled {
                    let _ = self.registry.remove(entity_id);
                    let _ = self.rats.remove(&rat);
                    tracing::debug!(rat = rat.get(), ?reach, "rat felled by player");
                    out_events.push(Event::RatDefeated { rat, cell: reach });
                }
            }
            ItemKind::Wheat | ItemKind::Quid => unreachable!("guarded by is_wieldable"),
        }
    }

    fn trade(&mut self, offer: TradeOffer, out_events: &mut Vec<Event>) {
        let held = self.inventory.get(&offer.gives()).copied().unwrap_or(0);
        if held < offer.gives_count() {
            out_events.push(Event::TradeRejected {
                offer,
                reason: TradeError::InsufficientGoods,
            });
            return;
        }

        let stock = self.npc_stock.get(&offer.takes()).copied().unwrap_or(0);
        if stock < offer.takes_count() {
            out_events.push(Event::TradeRejected {
                offer,
                reason: TradeError::OutOfStock,
            });
            return;
        }

        deduct(&mut self.inventory, offer.gives(), offer.gives_count());
        *self.npc_stock.entry(offer.gives()).or_insert(0) += offer.gives_count();
        deduct(&mut self.npc_stock, offer.takes(), offer.takes_count());
        *self.inventory.entry(offer.takes()).or_insert(0) += offer.takes_count();

        self.ensure_active_item();
        out_events.push(Event::TradeCompleted { offer });
        out_events.push(Event::InventoryChanged);
    }

    fn spawn_rats(&mut self, cells: &[Position], out_events: &mut Vec<Event>) {
        for &cell in cells {
            if !self.registry.can_place(cell) {
                continue;
            }
            if self.tile_kind_at(cell) != Some(TileKind::Grass) {
                continue;
            }

            let rat = RatId::new(self.next_rat);
            self.next_rat += 1;
            let id = self.registry.insert(cell, EntityPayload::Rat(RatState::new(rat)));
            let _ = self.rats.insert(rat, id);
            tracing::debug!(rat = rat.get(), ?cell, "rat spawned");
            out_events.push(Event::RatSpawned { rat, cell });
        }
    }

    fn step_rat(&mut self, rat: RatId, to: Position, out_events: &mut Vec<Event>) {
        let Some(&entity_id) = self.rats.get(&rat) else {
            return;
        };
        let Some(entity) = self.registry.get(entity_id) else {
            return;
        };
        let from = entity.position();

        let ready = entity
            .rat()
            .map(|state| state.accumulator >= self.config.step_interval)
            .unwrap_or(false);
        if !ready {
            return;
        }

        let dx = (to.x() - from.x()).abs();
        let dy = (to.y() - from.y()).abs();
        if dx.max(dy) != 1 {
            return;
        }

        if !self.rat_can_enter(to) {
            return;
        }

        let _ = self.registry.reposition(entity_id, to);
        if let Some(state) = self.registry.get_mut(entity_id).and_then(|e| e.rat_mut()) {
            state.accumulator = state.accumulator.saturating_sub(self.config.step_interval);
        }
        tracing::debug!(rat = rat.get(), ?from, ?to, "rat stepped");
        out_events.push(Event::RatStepped { rat, from, to });
    }

    /// A rat may enter a cell that is either freely placeable or blocked
    /// only by a crop-stage tile: the lunge that precedes the collide-eat.
    fn rat_can_enter(&self, cell: Position) -> bool {
        self.registry.objects_at(cell).iter().all(|entity| {
            !entity.impassable()
                || entity
                    .tile()
                    .map(|tile| tile.kind.is_crop_stage())
                    .unwrap_or(false)
        })
    }

    fn tile_kind_at(&self, cell: Position) -> Option<TileKind> {
        self.registry
            .terrain_at(cell)
            .and_then(|entity| entity.tile())
            .map(|tile| tile.kind)
    }

    /// Replaces the terrain layer at a cell with a freshly armed tile.
    fn transition(&mut self, cell: Position, to: TileKind, out_events: &mut Vec<Event>) {
        let Some(previous) = self.registry.clear_cell(cell) else {
            return;
        };
        let Some(from) = previous.tile().map(|tile| tile.kind) else {
            return;
        };

        let tile = armed_tile(to, self.clock, &self.config, &mut self.rng);
        let _ = self.registry.insert(cell, EntityPayload::Tile(tile));
        tracing::debug!(?cell, ?from, ?to, "terrain transitioned");
        out_events.push(Event::TileChanged { cell, from, to });
    }

    fn consume_item(&mut self, item: ItemKind, count: u32, out_events: &mut Vec<Event>) {
        deduct(&mut self.inventory, item, count);
        self.ensure_active_item();
        out_events.push(Event::InventoryChanged);
    }

    fn credit_item(&mut self, item: ItemKind, count: u32, out_events: &mut Vec<Event>) {
        *self.inventory.entry(item).or_insert(0) += count;
        out_events.push(Event::InventoryChanged);
    }

    /// Keeps the active-item invariant: the selection always names an item
    /// actually present in the inventory.
    fn ensure_active_item(&mut self) {
        if self.inventory.contains_key(&self.active_item) {
            return;
        }
        assert!(
            !self.inventory.is_empty(),
            "player inventory must never be empty"
        );
        self.active_item = ITEM_ORDER
            .iter()
            .copied()
            .find(|item| self.inventory.contains_key(item))
            .expect("non-empty inventory holds an ordered item");
    }
}

/// Removes `count` of `item`, pruning the key once the count reaches zero so
/// zero-count entries never linger.
fn deduct(holdings: &mut HashMap<ItemKind, u32>, item: ItemKind, count: u32) {
    if let Some(held) = holdings.get_mut(&item) {
        *held = held.saturating_sub(count);
        if *held == 0 {
            let _ = holdings.remove(&item);
        }
    }
}

/// Builds a tile with its initial lifecycle schedule armed.
fn armed_tile(kind: TileKind, now: Duration, config: &WorldConfig, rng: &mut u64) -> TileState {
    let mut tile = TileState::new(kind);
    tile.schedule = match kind {
        TileKind::Hole => Some(Schedule::new(
            now,
            vec![(config.spill_interval, TileAction::SpillCheck)],
        )),
        TileKind::PlantedSoil => Some(Schedule::new(now, vec![(config.growth, TileAction::Grow)])),
        TileKind::Water => Some(Schedule::new(
            now,
            vec![(glisten_delay(config, rng), TileAction::Glisten)],
        )),
        _ => None,
    };
    tile
}

/// Draws the next glisten delay from `[1, max_glisten)` seconds.
fn glisten_delay(config: &WorldConfig, rng: &mut u64) -> Duration {
    *rng = next_random(*rng);
    let ceiling = (config.max_glisten.as_millis() as u64).max(1_001);
    Duration::from_millis(1_000 + *rng % (ceiling - 1_000))
}

fn next_random(state: u64) -> u64 {
    state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::SelectItem { item } => world.select_item(item, out_events),
        Command::UseItem => world.use_item(out_events),
        Command::Trade { offer } => world.trade(offer, out_events),
        Command::SpawnRats { cells } => world.spawn_rats(&cells, out_events),
        Command::StepRat { rat, to } => world.step_rat(rat, to, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use harvest_defence_core::{
        ItemKind, Position, RatSnapshot, RatView, Sprite, SpriteKind, TileKind, TradeOffer,
        Viewport,
    };

    use super::{EntityPayload, World, TRADE_OFFERS};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current simulated clock, summed from tick deltas.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// True iff no entity at the cell reports itself impassable.
    #[must_use]
    pub fn can_place(world: &World, cell: Position) -> bool {
        world.registry.can_place(cell)
    }

    /// Terrain kind occupying the cell, if the coordinate is populated.
    #[must_use]
    pub fn tile_at(world: &World, cell: Position) -> Option<TileKind> {
        world.tile_kind_at(cell)
    }

    /// Captures a read-only view of the rats inhabiting the field.
    #[must_use]
    pub fn rat_view(world: &World) -> RatView {
        let snapshots: Vec<RatSnapshot> = world
            .rats
            .iter()
            .filter_map(|(rat, id)| {
                let entity = world.registry.get(*id)?;
                let state = entity.rat()?;
                Some(RatSnapshot {
                    id: *rat,
                    cell: entity.position(),
                    ready_for_step: state.accumulator >= world.config.step_interval,
                })
            })
            .collect();
        RatView::from_snapshots(snapshots)
    }

    /// Cells currently holding a crop-stage tile, in coordinate order.
    #[must_use]
    pub fn crop_cells(world: &World) -> Vec<Position> {
        cells_of_kind(world, TileKind::is_crop_stage)
    }

    /// Cells currently holding grass, in coordinate order.
    #[must_use]
    pub fn grass_cells(world: &World) -> Vec<Position> {
        cells_of_kind(world, |kind| kind == TileKind::Grass)
    }

    fn cells_of_kind(world: &World, matches: impl Fn(TileKind) -> bool) -> Vec<Position> {
        let mut cells: Vec<Position> = world
            .registry
            .iter()
            .filter(|entity| entity.tile().map(|tile| matches(tile.kind)).unwrap_or(false))
            .map(|entity| entity.position())
            .collect();
        cells.sort();
        cells
    }

    /// Current camera view rectangle.
    #[must_use]
    pub fn viewport(world: &World) -> Viewport {
        world.camera.viewport()
    }

    /// Cell the player currently occupies.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.player_cell()
    }

    /// Cell the trader stands on, if the map placed one.
    #[must_use]
    pub fn npc_position(world: &World) -> Option<Position> {
        world
            .npc
            .and_then(|id| world.registry.get(id))
            .map(|entity| entity.position())
    }

    /// Whether the player stands within one cell of the trader.
    #[must_use]
    pub fn npc_adjacent(world: &World) -> bool {
        let Some(npc) = npc_position(world) else {
            return false;
        };
        let player = world.player_cell();
        let dx = (npc.x() - player.x()).abs();
        let dy = (npc.y() - player.y()).abs();
        dx.max(dy) <= 1
    }

    /// Player holdings in display order, with counts.
    #[must_use]
    pub fn inventory(world: &World) -> Vec<(ItemKind, u32)> {
        super::ITEM_ORDER
            .iter()
            .filter_map(|item| world.inventory.get(item).map(|count| (*item, *count)))
            .collect()
    }

    /// Item currently in the player's hand.
    #[must_use]
    pub fn active_item(world: &World) -> ItemKind {
        world.active_item
    }

    /// Offers the trader can currently fulfil from stock.
    #[must_use]
    pub fn trade_options(world: &World) -> Vec<TradeOffer> {
        TRADE_OFFERS
            .iter()
            .copied()
            .filter(|offer| {
                world.npc_stock.get(&offer.takes()).copied().unwrap_or(0) >= offer.takes_count()
            })
            .collect()
    }

    /// Complete draw order: entities grouped by coordinate, each group
    /// ordered so the highest-priority entity comes last.
    #[must_use]
    pub fn draw_order(world: &World) -> Vec<Sprite> {
        world
            .registry
            .draw_order()
            .into_iter()
            .map(|entity| Sprite {
                cell: entity.position(),
                sprite: match entity.payload() {
                    EntityPayload::Tile(tile) => SpriteKind::Tile {
                        kind: tile.kind,
                        glistening: tile.glistening,
                    },
                    EntityPayload::Player => SpriteKind::Player,
                    EntityPayload::Npc => SpriteKind::Npc,
                    EntityPayload::Rat(_) => SpriteKind::Rat,
                },
            })
            .collect()
    }
}

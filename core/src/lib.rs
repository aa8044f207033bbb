#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Harvest Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Harvest Defence.";

/// Offsets of the eight cells surrounding a coordinate, in scan order.
pub const SURROUNDING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Location of a single grid cell on the sparse, unbounded world plane.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position shifted by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the squared Euclidean distance between two positions.
    ///
    /// Squared distances preserve ordering, which is all nearest-target
    /// selection requires, and keep the arithmetic in integers.
    #[must_use]
    pub fn squared_distance(self, other: Position) -> u64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        (dx * dx + dy * dy) as u64
    }

    /// Iterates over the eight cells surrounding this position in scan order.
    pub fn surrounding(self) -> impl Iterator<Item = Position> {
        SURROUNDING_OFFSETS
            .into_iter()
            .map(move |(dx, dy)| self.offset(dx, dy))
    }
}

/// Cardinal movement directions available to actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    /// Movement toward decreasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward increasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Compass {
    /// Grid offset produced by one step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// All four directions in presentation order.
    #[must_use]
    pub const fn all() -> [Compass; 4] {
        [Self::North, Self::East, Self::South, Self::West]
    }
}

/// Set of compass directions packed into a single byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CompassSet {
    bits: u8,
}

impl CompassSet {
    /// Creates an empty direction set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    const fn mask(direction: Compass) -> u8 {
        match direction {
            Compass::North => 0b0001,
            Compass::East => 0b0010,
            Compass::South => 0b0100,
            Compass::West => 0b1000,
        }
    }

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Compass) {
        self.bits |= Self::mask(direction);
    }

    /// Reports whether the set contains the provided direction.
    #[must_use]
    pub const fn contains(&self, direction: Compass) -> bool {
        self.bits & Self::mask(direction) != 0
    }

    /// Reports whether no direction is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Merges another set into this one.
    pub fn union_with(&mut self, other: CompassSet) {
        self.bits |= other.bits;
    }

    /// Iterates over the directions present in the set.
    pub fn iter(&self) -> impl Iterator<Item = Compass> + '_ {
        Compass::all()
            .into_iter()
            .filter(|direction| self.contains(*direction))
    }
}

/// Unique identifier assigned to a rat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RatId(u32);

impl RatId {
    /// Creates a new rat identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain tile variants occupying the zindex-0 layer of a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground that actors may walk on.
    Grass,
    /// Perimeter wall ringing the playable field.
    Boundary,
    /// Dug irrigation channel; fills with water spilling from a neighbour.
    Hole,
    /// Standing water; glistens on a randomised cadence.
    Water,
    /// Tilled ground ready for planting.
    Soil,
    /// Seeded ground that will grow into wheat.
    PlantedSoil,
    /// Mature crop ready to harvest.
    Wheat,
    /// Standing obstacle rats must path around.
    Scarecrow,
}

impl TileKind {
    /// Reports whether actors are blocked from entering this tile.
    #[must_use]
    pub const fn is_impassable(self) -> bool {
        match self {
            Self::Grass | Self::Hole => false,
            Self::Boundary
            | Self::Water
            | Self::Soil
            | Self::PlantedSoil
            | Self::Wheat
            | Self::Scarecrow => true,
        }
    }

    /// Reports whether the tile is a crop-stage variant rats hunt for.
    #[must_use]
    pub const fn is_crop_stage(self) -> bool {
        matches!(self, Self::PlantedSoil | Self::Wheat)
    }
}

/// Items the player may hold, select, and use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Tills the grass underfoot into soil.
    Shovel,
    /// Plants the soil underfoot.
    Seeds,
    /// Harvests mature wheat within arm's reach.
    Scythe,
    /// Fells rats within arm's reach.
    Stick,
    /// Stands a scarecrow on the grass underfoot.
    ScarecrowKit,
    /// Harvested wheat; trade goods.
    Wheat,
    /// Coin of the realm.
    Quid,
}

impl ItemKind {
    /// Reports whether the item can be wielded via `UseItem`.
    #[must_use]
    pub const fn is_wieldable(self) -> bool {
        match self {
            Self::Shovel | Self::Seeds | Self::Scythe | Self::Stick | Self::ScarecrowKit => true,
            Self::Wheat | Self::Quid => false,
        }
    }

    /// Short human-readable label for menus and the HUD.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shovel => "Shovel",
            Self::Seeds => "Seeds",
            Self::Scythe => "Scythe",
            Self::Stick => "Wooden Stick",
            Self::ScarecrowKit => "Scarecrow Kit",
            Self::Wheat => "Wheat",
            Self::Quid => "Quid",
        }
    }
}

/// A trade the NPC is willing to make, from the player's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeOffer {
    gives: ItemKind,
    gives_count: u32,
    takes: ItemKind,
    takes_count: u32,
}

impl TradeOffer {
    /// Creates a new offer: the player gives `gives_count` of `gives` and
    /// receives `takes_count` of `takes`.
    #[must_use]
    pub const fn new(gives: ItemKind, gives_count: u32, takes: ItemKind, takes_count: u32) -> Self {
        Self {
            gives,
            gives_count,
            takes,
            takes_count,
        }
    }

    /// Item the player hands over.
    #[must_use]
    pub const fn gives(&self) -> ItemKind {
        self.gives
    }

    /// Number of items the player hands over.
    #[must_use]
    pub const fn gives_count(&self) -> u32 {
        self.gives_count
    }

    /// Item the player receives.
    #[must_use]
    pub const fn takes(&self) -> ItemKind {
        self.takes
    }

    /// Number of items the player receives.
    #[must_use]
    pub const fn takes_count(&self) -> u32 {
        self.takes_count
    }
}

/// Reasons a trade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum TradeError {
    /// The player does not hold enough of the offered goods.
    #[error("not enough goods to trade")]
    InsufficientGoods,
    /// The trader has run out of the requested stock.
    #[error("trader is out of stock")]
    OutOfStock,
}

/// Reasons an item use may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ActionError {
    /// The selected item cannot be wielded.
    #[error("item cannot be wielded")]
    NotWieldable,
    /// The requested item is not in the inventory.
    #[error("item is not in the inventory")]
    NotCarried,
    /// Nothing within reach for the item to act on.
    #[error("nothing here to use that on")]
    NoTarget,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player advance one cell in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Compass,
    },
    /// Changes the player's active item selection.
    SelectItem {
        /// Item the player wants in hand.
        item: ItemKind,
    },
    /// Wields the player's active item at the player's location.
    UseItem,
    /// Requests the exchange described by the provided offer.
    Trade {
        /// Offer accepted from the trader's option list.
        offer: TradeOffer,
    },
    /// Requests that a new wave of rats enter the field at the given cells.
    SpawnRats {
        /// Cells selected for rat placement.
        cells: Vec<Position>,
    },
    /// Requests that a rat advance a single step to the given cell.
    StepRat {
        /// Identifier of the rat attempting to move.
        rat: RatId,
        /// Destination cell chosen by the pathfinder.
        to: Position,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after the move.
        to: Position,
    },
    /// Reports that a movement request hit an impassable cell.
    MoveRejected {
        /// Direction the rejected step was headed.
        direction: Compass,
    },
    /// Announces that inventory contents or the active selection changed.
    InventoryChanged,
    /// Confirms that a terrain tile transitioned between kinds.
    TileChanged {
        /// Coordinate whose terrain layer changed.
        cell: Position,
        /// Kind occupying the cell before the transition.
        from: TileKind,
        /// Kind occupying the cell after the transition.
        to: TileKind,
    },
    /// Reports that a rat devoured the crop at a cell.
    CropEaten {
        /// Coordinate of the crop that was eaten.
        cell: Position,
        /// Rat responsible for the meal.
        rat: RatId,
    },
    /// Confirms that a rat was placed into the field.
    RatSpawned {
        /// Identifier assigned to the newly spawned rat.
        rat: RatId,
        /// Cell the rat occupies after spawning.
        cell: Position,
    },
    /// Confirms that a rat advanced between two cells.
    RatStepped {
        /// Identifier of the rat that advanced.
        rat: RatId,
        /// Cell the rat occupied before moving.
        from: Position,
        /// Cell the rat occupies after the move.
        to: Position,
    },
    /// Reports that a rat starved with no crops left to hunt.
    RatStarved {
        /// Identifier of the rat that starved.
        rat: RatId,
        /// Cell the rat occupied when it was removed.
        cell: Position,
    },
    /// Reports that the player felled a rat.
    RatDefeated {
        /// Identifier of the rat that was felled.
        rat: RatId,
        /// Cell the rat occupied when it was removed.
        cell: Position,
    },
    /// Confirms that a trade completed and both inventories were updated.
    TradeCompleted {
        /// Offer that was executed.
        offer: TradeOffer,
    },
    /// Reports that a trade request was rejected.
    TradeRejected {
        /// Offer that failed.
        offer: TradeOffer,
        /// Specific reason the trade failed.
        reason: TradeError,
    },
    /// Reports that an item use request was rejected.
    ActionRejected {
        /// Item that was wielded.
        item: ItemKind,
        /// Specific reason the use failed.
        reason: ActionError,
    },
}

/// Signal republished by the spawn director once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectorAlert {
    /// No rat is currently outside the camera's view.
    AllClear,
    /// Directions in which off-screen rats currently lie.
    Offscreen(CompassSet),
}

/// Camera-centred view rectangle used for visibility and alert partitioning.
///
/// The horizontal half-extent is a quarter of the viewport rows because world
/// cells render two terminal columns wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    focus: Position,
    extent: u32,
}

impl Viewport {
    /// Creates a viewport centred on `focus` spanning `extent` rows.
    #[must_use]
    pub const fn new(focus: Position, extent: u32) -> Self {
        Self { focus, extent }
    }

    /// World position at the centre of the view.
    #[must_use]
    pub const fn focus(&self) -> Position {
        self.focus
    }

    /// Viewport extent measured in terminal rows.
    #[must_use]
    pub const fn extent(&self) -> u32 {
        self.extent
    }

    /// Half of the view's height, in world cells.
    #[must_use]
    pub const fn half_height(&self) -> i32 {
        (self.extent / 2) as i32
    }

    /// Half of the view's width, in world cells.
    #[must_use]
    pub const fn half_width(&self) -> i32 {
        (self.extent / 4) as i32
    }

    /// Reports whether the provided cell falls inside the view.
    #[must_use]
    pub fn in_view(&self, cell: Position) -> bool {
        let dx = (cell.x() - self.focus.x()).abs();
        let dy = (cell.y() - self.focus.y()).abs();
        dx < self.half_width() && dy < self.half_height()
    }

    /// Compass directions in which the provided cell lies beyond the view.
    ///
    /// A cell sitting exactly on a view edge reports no direction; callers
    /// treating an empty set as "all clear" match the director's contract.
    #[must_use]
    pub fn offscreen_directions(&self, cell: Position) -> CompassSet {
        let mut directions = CompassSet::empty();

        if cell.y() < self.focus.y() - self.half_height() {
            directions.insert(Compass::North);
        }
        if cell.y() > self.focus.y() + self.half_height() {
            directions.insert(Compass::South);
        }
        if cell.x() < self.focus.x() - self.half_width() {
            directions.insert(Compass::West);
        }
        if cell.x() > self.focus.x() + self.half_width() {
            directions.insert(Compass::East);
        }

        directions
    }
}

/// Drawable appearance of an entity, dispatched on by rendering adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    /// A terrain tile, with its cosmetic glisten flag.
    Tile {
        /// Terrain variant occupying the cell.
        kind: TileKind,
        /// Whether the tile currently glistens (water only).
        glistening: bool,
    },
    /// The player character.
    Player,
    /// The wandering trader.
    Npc,
    /// A rat.
    Rat,
}

/// One entry of the world's draw order: a cell and what to draw there.
///
/// Entries arrive grouped by coordinate with each group ordered so the
/// highest-priority entity is last (painter's order).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    /// World cell the entity occupies.
    pub cell: Position,
    /// Appearance to draw at the cell.
    pub sprite: SpriteKind,
}

/// Immutable representation of a single rat's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatSnapshot {
    /// Unique identifier assigned to the rat.
    pub id: RatId,
    /// Grid cell currently occupied by the rat.
    pub cell: Position,
    /// Indicates whether the rat accrued enough time to advance.
    pub ready_for_step: bool,
}

/// Read-only snapshot describing all rats within the field.
#[derive(Clone, Debug, Default)]
pub struct RatView {
    snapshots: Vec<RatSnapshot>,
}

impl RatView {
    /// Creates a new rat view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RatSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured rat snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &RatSnapshot> {
        self.snapshots.iter()
    }

    /// Number of rats captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no rats remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RatSnapshot> {
        self.snapshots
    }
}

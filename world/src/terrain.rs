//! Terrain tile state and symbolic map parsing.

use harvest_defence_core::{Position, TileKind};
use thiserror::Error;

use crate::schedule::Schedule;

/// Deferred lifecycle actions a terrain tile may schedule for itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TileAction {
    /// Scan the eight neighbours for water and spill if any is found.
    SpillCheck,
    /// Mature planted soil into wheat.
    Grow,
    /// Toggle the cosmetic glisten flag and re-arm with a fresh delay.
    Glisten,
}

/// Terrain-layer state stored for one tile entity.
///
/// Every tile owns its own lifecycle timer; a spent schedule is replaced with
/// a fresh instance when the behaviour recurs (spill checks, glisten).
#[derive(Clone, Debug)]
pub(crate) struct TileState {
    pub(crate) kind: TileKind,
    pub(crate) schedule: Option<Schedule<TileAction>>,
    pub(crate) glistening: bool,
}

impl TileState {
    pub(crate) fn new(kind: TileKind) -> Self {
        Self {
            kind,
            schedule: None,
            glistening: false,
        }
    }
}

/// Errors raised while parsing a symbolic world map.
///
/// All of these are fatal configuration errors: construction aborts rather
/// than substituting a default tile.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The map contains a character outside the tile code table.
    #[error("unrecognised tile code {code:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Offending character.
        code: char,
        /// Zero-based row of the character.
        row: usize,
        /// Zero-based column of the character.
        column: usize,
    },
    /// The map never places a player start.
    #[error("map does not place a player start")]
    MissingPlayer,
    /// The map places a second player start.
    #[error("map places a second player start at row {row}, column {column}")]
    DuplicatePlayer {
        /// Zero-based row of the second start.
        row: usize,
        /// Zero-based column of the second start.
        column: usize,
    },
}

/// Validated world layout produced from a symbolic map.
#[derive(Clone, Debug)]
pub struct WorldMap {
    tiles: Vec<(Position, TileKind)>,
    player: Position,
    npc: Option<Position>,
}

impl WorldMap {
    /// Terrain tiles laid out by the map, one per populated coordinate.
    #[must_use]
    pub fn tiles(&self) -> &[(Position, TileKind)] {
        &self.tiles
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn player(&self) -> Position {
        self.player
    }

    /// Cell the trader stands on, if the map places one.
    #[must_use]
    pub const fn npc(&self) -> Option<Position> {
        self.npc
    }
}

/// Parses a symbolic map into a validated layout.
///
/// Tile codes: `;` grass, `#` boundary, `o` hole, `~` water, `=` soil,
/// `,` planted soil, `w` wheat, `T` scarecrow, `P` player start (on grass),
/// `N` trader (on grass). Spaces leave the coordinate unpopulated. Any other
/// character is a fatal [`MapError::UnknownSymbol`].
pub fn parse_map(text: &str) -> Result<WorldMap, MapError> {
    let mut tiles = Vec::new();
    let mut player = None;
    let mut npc = None;

    for (row, line) in text.lines().enumerate() {
        for (column, code) in line.chars().enumerate() {
            let position = Position::new(column as i32, row as i32);
            let kind = match code {
                ' ' => continue,
                ';' => TileKind::Grass,
                '#' => TileKind::Boundary,
                'o' => TileKind::Hole,
                '~' => TileKind::Water,
                '=' => TileKind::Soil,
                ',' => TileKind::PlantedSoil,
                'w' => TileKind::Wheat,
                'T' => TileKind::Scarecrow,
                'P' => {
                    if player.is_some() {
                        return Err(MapError::DuplicatePlayer { row, column });
                    }
                    player = Some(position);
                    TileKind::Grass
                }
                'N' => {
                    npc = Some(position);
                    TileKind::Grass
                }
                _ => {
                    return Err(MapError::UnknownSymbol { code, row, column });
                }
            };
            tiles.push((position, kind));
        }
    }

    let player = player.ok_or(MapError::MissingPlayer)?;
    Ok(WorldMap { tiles, player, npc })
}

/// Layout used when no map file is supplied: a walled field with a pond,
/// a dug channel, tilled ground, and a trader in the north-east corner.
pub const DEFAULT_MAP: &str = "\
##############################################
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;N;;;#
#;;~~~;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;~~~~~oo;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;~~~;;;o;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;o;;;;;;====;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;====;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;==,,;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;P;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;www;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;w;w;;;;;;T;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
#;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;#
##############################################
";

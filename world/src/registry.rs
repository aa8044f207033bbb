//! Spatial registry owning every entity, keyed by grid coordinate.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use harvest_defence_core::{Position, RatId};

use crate::terrain::TileState;

/// Draw priority shared by all actors; lower than terrain so actors paint on
/// top of the tile beneath them.
const ACTOR_ZINDEX: i32 = -10;

/// Handle identifying one entity inside the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EntityId(u64);

/// Mutable per-rat simulation state.
#[derive(Clone, Debug)]
pub(crate) struct RatState {
    pub(crate) id: RatId,
    pub(crate) accumulator: Duration,
    pub(crate) hunger: Duration,
}

impl RatState {
    pub(crate) fn new(id: RatId) -> Self {
        Self {
            id,
            accumulator: Duration::ZERO,
            hunger: Duration::ZERO,
        }
    }
}

/// Capability-bearing payload of an entity, dispatched by pattern matching.
#[derive(Clone, Debug)]
pub(crate) enum EntityPayload {
    Tile(TileState),
    Player,
    Npc,
    Rat(RatState),
}

/// One entity indexed by the registry.
///
/// The position field is private to this module: moving an entity goes
/// through [`Registry::reposition`], which removes and reinserts the bucket
/// entry, so an entity is reachable at exactly one coordinate key at any
/// instant.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    id: EntityId,
    position: Position,
    payload: EntityPayload,
}

impl Entity {
    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    /// Draw priority; lower values paint on top within a cell.
    pub(crate) fn zindex(&self) -> i32 {
        match self.payload {
            EntityPayload::Tile(_) => 0,
            EntityPayload::Player | EntityPayload::Npc | EntityPayload::Rat(_) => ACTOR_ZINDEX,
        }
    }

    /// Whether actors are blocked from entering this entity's cell.
    pub(crate) fn impassable(&self) -> bool {
        match &self.payload {
            EntityPayload::Tile(tile) => tile.kind.is_impassable(),
            EntityPayload::Player | EntityPayload::Npc | EntityPayload::Rat(_) => true,
        }
    }

    pub(crate) fn payload(&self) -> &EntityPayload {
        &self.payload
    }

    pub(crate) fn tile(&self) -> Option<&TileState> {
        match &self.payload {
            EntityPayload::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    pub(crate) fn tile_mut(&mut self) -> Option<&mut TileState> {
        match &mut self.payload {
            EntityPayload::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    pub(crate) fn rat(&self) -> Option<&RatState> {
        match &self.payload {
            EntityPayload::Rat(rat) => Some(rat),
            _ => None,
        }
    }

    pub(crate) fn rat_mut(&mut self) -> Option<&mut RatState> {
        match &mut self.payload {
            EntityPayload::Rat(rat) => Some(rat),
            _ => None,
        }
    }
}

/// Owns all entities and the sparse coordinate index over them.
#[derive(Clone, Debug, Default)]
pub(crate) struct Registry {
    entities: BTreeMap<EntityId, Entity>,
    buckets: HashMap<Position, Vec<EntityId>>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entity at the provided position and returns its handle.
    pub(crate) fn insert(&mut self, position: Position, payload: EntityPayload) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let previous = self.entities.insert(
            id,
            Entity {
                id,
                position,
                payload,
            },
        );
        debug_assert!(previous.is_none(), "entity ids are never reused");
        self.buckets.entry(position).or_default().push(id);
        id
    }

    /// Removes an entity, silently succeeding if it is already gone.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        self.vacate(entity.position, id);
        Some(entity)
    }

    fn vacate(&mut self, position: Position, id: EntityId) {
        if let Some(bucket) = self.buckets.get_mut(&position) {
            bucket.retain(|held| *held != id);
            if bucket.is_empty() {
                let _ = self.buckets.remove(&position);
            }
        }
    }

    /// Moves an entity to a new cell by removing and reinserting its index
    /// entry. Returns false if the entity does not exist.
    pub(crate) fn reposition(&mut self, id: EntityId, to: Position) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let from = entity.position;
        entity.position = to;

        self.vacate(from, id);
        self.buckets.entry(to).or_default().push(id);
        true
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All entities currently indexed at the provided cell, in insertion
    /// order. Reflects only live index entries; never stale positions.
    pub(crate) fn objects_at(&self, position: Position) -> Vec<&Entity> {
        self.buckets
            .get(&position)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter_map(|id| self.entities.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True iff no entity at the cell reports itself impassable. Placement
    /// and movement legality derive solely from this predicate.
    pub(crate) fn can_place(&self, position: Position) -> bool {
        self.buckets.get(&position).map_or(true, |bucket| {
            bucket
                .iter()
                .filter_map(|id| self.entities.get(id))
                .all(|entity| !entity.impassable())
        })
    }

    /// Removes only the terrain-layer entity (zindex 0) at the cell, leaving
    /// actors untouched.
    pub(crate) fn clear_cell(&mut self, position: Position) -> Option<Entity> {
        let terrain_id = self
            .buckets
            .get(&position)?
            .iter()
            .copied()
            .find(|id| self.entities.get(id).is_some_and(|e| e.zindex() == 0))?;
        self.remove(terrain_id)
    }

    /// The terrain-layer entity at the cell, if one exists.
    pub(crate) fn terrain_at(&self, position: Position) -> Option<&Entity> {
        self.buckets.get(&position)?.iter().find_map(|id| {
            self.entities
                .get(id)
                .filter(|entity| entity.zindex() == 0)
        })
    }

    /// Iterates all entities in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of every entity handle, in identifier order. Used when a
    /// pass mutates the registry while walking it.
    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Snapshot of every cell holding more than one entity, with occupants,
    /// ordered by coordinate. Collision resolution runs over this snapshot so
    /// mid-pass mutations cannot join the same pass.
    pub(crate) fn crowded_cells(&self) -> Vec<(Position, Vec<EntityId>)> {
        let mut cells: Vec<(Position, Vec<EntityId>)> = self
            .buckets
            .iter()
            .filter(|(_, bucket)| bucket.len() >= 2)
            .map(|(position, bucket)| (*position, bucket.clone()))
            .collect();
        cells.sort_by_key(|(position, _)| *position);
        cells
    }

    /// Entities grouped by coordinate, each group ordered by descending
    /// z-index so the highest-priority entity is last (painter's order).
    /// Cross-cell ordering is by coordinate for determinism; cells are
    /// visually disjoint so any cross-cell order presents identically.
    pub(crate) fn draw_order(&self) -> Vec<&Entity> {
        let mut cells: Vec<&Position> = self.buckets.keys().collect();
        cells.sort();

        let mut ordered = Vec::with_capacity(self.entities.len());
        for cell in cells {
            let mut group = self.objects_at(*cell);
            group.sort_by(|a, b| b.zindex().cmp(&a.zindex()));
            ordered.extend(group);
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_defence_core::TileKind;

    fn tile(kind: TileKind) -> EntityPayload {
        EntityPayload::Tile(TileState::new(kind))
    }

    #[test]
    fn can_place_is_false_iff_an_impassable_entity_occupies_the_cell() {
        // Exercise the invariant over a pseudo-random scatter of entities.
        let mut registry = Registry::new();
        let mut state: u64 = 0x51ab_3c44_9d21_7e05;
        let mut next = || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            state
        };

        let kinds = [
            TileKind::Grass,
            TileKind::Hole,
            TileKind::Water,
            TileKind::Wheat,
            TileKind::Boundary,
            TileKind::Soil,
        ];

        for _ in 0..200 {
            let cell = Position::new((next() % 12) as i32, (next() % 12) as i32);
            if next() % 4 == 0 {
                let _ = registry.insert(cell, EntityPayload::Rat(RatState::new(RatId::new(0))));
            } else {
                let kind = kinds[(next() % kinds.len() as u64) as usize];
                let _ = registry.insert(cell, tile(kind));
            }
        }

        for x in 0..12 {
            for y in 0..12 {
                let cell = Position::new(x, y);
                let blocked = registry
                    .objects_at(cell)
                    .iter()
                    .any(|entity| entity.impassable());
                assert_eq!(registry.can_place(cell), !blocked, "cell {cell:?}");
            }
        }
    }

    #[test]
    fn clear_cell_removes_terrain_and_leaves_actors() {
        let mut registry = Registry::new();
        let cell = Position::new(3, 4);
        let _ = registry.insert(cell, tile(TileKind::Wheat));
        let rat = registry.insert(cell, EntityPayload::Rat(RatState::new(RatId::new(7))));

        let removed = registry.clear_cell(cell).expect("terrain entity removed");
        assert_eq!(removed.tile().expect("tile payload").kind, TileKind::Wheat);

        let remaining = registry.objects_at(cell);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), rat);
        assert!(registry.terrain_at(cell).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = Registry::new();
        let id = registry.insert(Position::new(0, 0), tile(TileKind::Grass));

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.objects_at(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn reposition_keeps_entity_under_exactly_one_key() {
        let mut registry = Registry::new();
        let from = Position::new(1, 1);
        let to = Position::new(2, 1);
        let id = registry.insert(from, EntityPayload::Player);

        assert!(registry.reposition(id, to));

        assert!(registry.objects_at(from).is_empty());
        let occupants = registry.objects_at(to);
        assert_eq!(occupants.len(), 1);
        assert_eq!(occupants[0].id(), id);
        assert_eq!(occupants[0].position(), to);
    }

    #[test]
    fn draw_order_paints_actors_after_terrain_within_a_cell() {
        let mut registry = Registry::new();
        let cell = Position::new(5, 5);
        let _ = registry.insert(cell, EntityPayload::Player);
        let _ = registry.insert(cell, tile(TileKind::Grass));

        let ordered = registry.draw_order();
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].zindex(), 0);
        assert_eq!(ordered[1].zindex(), ACTOR_ZINDEX);
    }

    #[test]
    fn crowded_cells_reports_only_shared_coordinates() {
        let mut registry = Registry::new();
        let shared = Position::new(2, 2);
        let lonely = Position::new(9, 9);
        let _ = registry.insert(shared, tile(TileKind::Grass));
        let _ = registry.insert(shared, EntityPayload::Rat(RatState::new(RatId::new(1))));
        let _ = registry.insert(lonely, tile(TileKind::Grass));

        let crowded = registry.crowded_cells();
        assert_eq!(crowded.len(), 1);
        assert_eq!(crowded[0].0, shared);
        assert_eq!(crowded[0].1.len(), 2);
    }
}

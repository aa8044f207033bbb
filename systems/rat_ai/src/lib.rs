#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic rat movement system: greedy pathfinding toward crops.
//!
//! Every ready rat recomputes its nearest crop-stage target and proposes one
//! discrete step toward it. The search is greedy best-first on the Manhattan
//! distance-to-target heuristic alone, not shortest-path: rats take locally
//! plausible detours around obstacles rather than optimal routes.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use harvest_defence_core::{Command, Event, Position, RatView};

/// Hard ceiling on explored cells. Maps are ringed by boundary tiles, so the
/// frontier normally exhausts long before this; the ceiling keeps a malformed
/// unenclosed map from expanding across the unbounded plane.
const SEARCH_LIMIT: usize = 4_096;

/// Pure system that reacts to world events and emits rat step commands.
#[derive(Debug, Default)]
pub struct RatAi;

impl RatAi {
    /// Consumes events and immutable views to emit one step per ready rat.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        rat_view: &RatView,
        crop_cells: &[Position],
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Position) -> bool,
    {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for rat in rat_view.iter() {
            if !rat.ready_for_step {
                continue;
            }

            // No crop anywhere: the rat targets its own cell and idles.
            let target = nearest_crop(rat.cell, crop_cells).unwrap_or(rat.cell);
            if target == rat.cell {
                continue;
            }

            let Some(step) = next_step(rat.cell, target, &is_blocked) else {
                continue;
            };
            tracing::debug!(rat = rat.id.get(), ?step, ?target, "rat step planned");
            out.push(Command::StepRat {
                rat: rat.id,
                to: step,
            });
        }
    }
}

/// Closest crop by Euclidean distance, ties broken by coordinate order.
fn nearest_crop(from: Position, crops: &[Position]) -> Option<Position> {
    crops
        .iter()
        .copied()
        .min_by_key(|crop| (from.squared_distance(*crop), *crop))
}

/// Greedy best-first search returning the first step toward `destination`.
///
/// The frontier is ordered by Manhattan distance to the target (no
/// accumulated path cost). Expansion covers the 8-neighbourhood, skipping
/// blocked and already-visited cells, except the destination itself, which
/// is always enterable: crops are impassable, and the final lunge onto one
/// is what hands the rat to collision resolution. Returns `None` when the
/// frontier exhausts without reaching the target, leaving the rat in place.
fn next_step<F>(start: Position, destination: Position, is_blocked: &F) -> Option<Position>
where
    F: Fn(Position) -> bool,
{
    let mut frontier: BinaryHeap<Reverse<(u32, Position)>> = BinaryHeap::new();
    frontier.push(Reverse((0, start)));
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut reached = false;

    while let Some(Reverse((_, current))) = frontier.pop() {
        if current == destination {
            reached = true;
            break;
        }
        if came_from.len() >= SEARCH_LIMIT {
            break;
        }

        for neighbour in current.surrounding() {
            if neighbour == start || came_from.contains_key(&neighbour) {
                continue;
            }
            if neighbour != destination && is_blocked(neighbour) {
                continue;
            }

            let priority = destination.manhattan_distance(neighbour);
            frontier.push(Reverse((priority, neighbour)));
            let _ = came_from.insert(neighbour, current);
        }
    }

    if !reached {
        return None;
    }

    // Walk the backtrack chain until the cell adjacent to the start.
    let mut backtrack = destination;
    while came_from.get(&backtrack) != Some(&start) {
        backtrack = *came_from.get(&backtrack)?;
    }
    Some(backtrack)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beelines_across_open_ground() {
        let step = next_step(Position::new(5, 5), Position::new(5, 9), &|_| false);
        assert_eq!(step, Some(Position::new(5, 6)));
    }

    #[test]
    fn lunges_onto_an_adjacent_blocked_destination() {
        // The destination models a crop: impassable, yet enterable as the
        // final step.
        let destination = Position::new(5, 6);
        let step = next_step(Position::new(5, 5), destination, &|cell| cell == destination);
        assert_eq!(step, Some(destination));
    }

    #[test]
    fn routes_around_a_wall() {
        let wall = [
            Position::new(1, -1),
            Position::new(1, 0),
            Position::new(1, 1),
        ];
        let start = Position::new(0, 0);
        let step = next_step(start, Position::new(3, 0), &|cell| wall.contains(&cell))
            .expect("a detour exists");

        assert!(!wall.contains(&step));
        let dx = (step.x() - start.x()).abs();
        let dy = (step.y() - start.y()).abs();
        assert_eq!(dx.max(dy), 1, "only one discrete step is taken");
    }

    #[test]
    fn exhausted_frontier_keeps_the_rat_in_place() {
        let start = Position::new(0, 0);
        let enclosed: Vec<Position> = start.surrounding().collect();
        let step = next_step(start, Position::new(9, 9), &|cell| enclosed.contains(&cell));
        assert_eq!(step, None);
    }

    #[test]
    fn repeated_stepping_reaches_a_static_target_in_linear_steps() {
        let target = Position::new(11, 11);
        let mut current = Position::new(0, 0);
        let mut steps = 0;

        while current != target {
            current = next_step(current, target, &|_| false).expect("open grid is reachable");
            steps += 1;
            assert!(steps <= 24, "convergence must be linear in grid size");
        }

        assert_eq!(current, target);
    }

    #[test]
    fn nearest_crop_prefers_euclidean_distance() {
        let crops = [Position::new(8, 0), Position::new(2, 2)];
        assert_eq!(
            nearest_crop(Position::new(0, 0), &crops),
            Some(Position::new(2, 2))
        );
        assert_eq!(nearest_crop(Position::new(0, 0), &[]), None);
    }
}

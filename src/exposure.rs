//! Exposure resolution. Writes go straight into the live population while
//! scanning, which is safe because exposure only ever moves a target from
//! `Susceptible` to `Incubating` and sources are never targets of their own
//! write.

use crate::agent::Agent;
use crate::disease::EXPOSURE_RADIUS;
use crate::geometry::Rect;
use crate::quadtree::Quadtree;

/// One newly exposed agent and the first agent found to expose it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Exposure {
    pub source: i64,
    pub target: i64,
}

/// Scans every ordered pair of agents in population order.
pub fn resolve_pairwise(agents: &mut [Agent]) -> Vec<Exposure> {
    let mut exposures = Vec::new();

    for source in 0..agents.len() {
        for target in 0..agents.len() {
            expose_pair(agents, source, target, &mut exposures);
        }
    }

    exposures
}

/// Same result as `resolve_pairwise`, but only looks at targets the index
/// places inside each source's exposure square. `index` must hold the
/// current position of every agent under its population index.
pub fn resolve_indexed(agents: &mut [Agent], index: &Quadtree) -> Vec<Exposure> {
    let mut exposures = Vec::new();

    for source in 0..agents.len() {
        if !agents[source].health().is_infected() {
            continue;
        }

        let square = Rect::new_centered(agents[source].pos(), EXPOSURE_RADIUS);
        for target in index.find_in_bounds(square) {
            expose_pair(agents, source, target, &mut exposures);
        }
    }

    exposures
}

fn expose_pair(agents: &mut [Agent], source: usize, target: usize, out: &mut Vec<Exposure>) {
    if source == target || target >= agents.len() || !agents[source].can_expose(&agents[target]) {
        return;
    }

    if agents[target].expose() {
        log::trace!(
            "entity {} exposed by entity {} at {}",
            agents[target].id(),
            agents[source].id(),
            agents[target].pos()
        );
        out.push(Exposure {
            source: agents[source].id(),
            target: agents[target].id(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::Gates;
    use crate::geometry::Position;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn agent(id: i64, gates: &str, x: i32, y: i32, infected: bool) -> Agent {
        Agent::new(id, Gates::parse(gates), vec![Position::new(x, y)], infected).unwrap()
    }

    #[test]
    fn test_square_neighbourhood() {
        let mut agents = vec![
            agent(1, "AB", 5, 5, true),
            agent(2, "AB", 8, 8, false),
            agent(3, "AB", 9, 5, false),
            agent(4, "AB", 2, 2, false),
            agent(5, "AB", 5, 1, false),
        ];

        let exposures = resolve_pairwise(&mut agents);
        let targets: Vec<i64> = exposures.iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![2, 4]);
        assert!(agents[1].health().is_incubating());
        assert!(!agents[2].health().is_incubating());
        assert!(agents[3].health().is_incubating());
        assert!(!agents[4].health().is_incubating());
    }

    #[test]
    fn test_ineligible_targets_are_skipped() {
        let mut agents = vec![
            agent(1, "ABCD", 5, 5, true),
            agent(2, "EFGH", 5, 6, false),
            agent(3, "AB", 5, 4, true),
        ];

        let exposures = resolve_pairwise(&mut agents);
        assert!(exposures.is_empty());
        assert_eq!(agents[1].health(), crate::agent::Health::Susceptible);
    }

    #[test]
    fn test_dead_infectious_source_still_exposes() {
        let mut agents = vec![agent(1, "ABC", 3, 3, true), agent(2, "A", 6, 6, false)];
        for _ in 0..12 {
            agents[0].step();
        }
        assert!(!agents[0].is_alive());
        assert!(agents[0].health().is_infected());

        let exposures = resolve_pairwise(&mut agents);
        assert_eq!(exposures, vec![Exposure { source: 1, target: 2 }]);
    }

    #[test]
    fn test_exposure_is_credited_once() {
        let mut agents = vec![
            agent(1, "A", 4, 4, true),
            agent(2, "A", 5, 5, true),
            agent(3, "A", 6, 6, false),
        ];

        let exposures = resolve_pairwise(&mut agents);
        assert_eq!(exposures, vec![Exposure { source: 1, target: 3 }]);
    }

    #[test]
    fn test_indexed_matches_pairwise() {
        let mut rng = StdRng::seed_from_u64(42);
        let size = 25;
        let gates = ["AB", "ABC", "EF", "A", "BCD", "H"];

        for _ in 0..20 {
            let agents: Vec<Agent> = (0..80)
                .map(|id| {
                    agent(
                        id,
                        gates[rng.gen_range(0..gates.len())],
                        rng.gen_range(1..=size),
                        rng.gen_range(1..=size),
                        rng.gen_bool(0.1),
                    )
                })
                .collect();
            let positions: Vec<Position> = agents.iter().map(|a| a.pos()).collect();
            let index = Quadtree::new_with_positions(
                Rect::new(Position::new(1, 1), Position::new(size, size)),
                &positions,
            );

            let mut pairwise = agents.clone();
            let mut indexed = agents;
            let mut expected: Vec<i64> = resolve_pairwise(&mut pairwise)
                .into_iter()
                .map(|e| e.target)
                .collect();
            let mut actual: Vec<i64> = resolve_indexed(&mut indexed, &index)
                .into_iter()
                .map(|e| e.target)
                .collect();
            expected.sort_unstable();
            actual.sort_unstable();
            assert_eq!(actual, expected);

            for (a, b) in pairwise.iter().zip(indexed.iter()) {
                assert_eq!(a.health(), b.health());
            }
        }
    }
}

use crate::disease::{Gate, Gates};
use crate::geometry::Position;
use crate::scenario::{EntitySpec, Scenario};
use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Chance that a generated agent carries any given gate.
const GATE_PROBABILITY: f64 = 0.35;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub size: i32,
    pub agents: usize,
    pub turns: usize,
    /// How many agents start infected. Capped at `agents`.
    pub infected: usize,
    pub seed: u64,
}

/// Builds a random scenario. Agents start anywhere on the grid and take one
/// step of at most one cell per axis each turn, never leaving the grid. The
/// same options always give the same scenario.
pub fn generate(options: &GeneratorOptions) -> Scenario {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let size = options.size.max(1);
    let cells = Uniform::new_inclusive(1, size);
    let step = Uniform::new_inclusive(-1, 1);

    let infected = rand::seq::index::sample(
        &mut rng,
        options.agents,
        options.infected.min(options.agents),
    )
    .into_vec();

    let entities = (0..options.agents)
        .map(|index| {
            let gates = Gate::ALL
                .into_iter()
                .filter(|_| rng.gen_bool(GATE_PROBABILITY))
                .fold(Gates::default(), Gates::with);

            let mut pos = Position::new_random(&cells, &cells, &mut rng);
            let mut trajectory = Vec::with_capacity(options.turns + 1);
            trajectory.push(pos);
            for _ in 0..options.turns {
                pos = (pos + Position::new_random(&step, &step, &mut rng)).clamp(1, size);
                trajectory.push(pos);
            }

            EntitySpec {
                id: index as i64 + 1,
                gates,
                infected: infected.contains(&index),
                trajectory,
            }
        })
        .collect();

    log::info!(
        "generated {} entities on a {size}x{size} grid for {} turns (seed {})",
        options.agents,
        options.turns,
        options.seed
    );

    Scenario {
        size,
        turn_count: options.turns,
        entities,
    }
}
